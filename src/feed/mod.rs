//! Atom feed generation, the terminal build step.
//!
//! The artifact is fully regenerated on every build and overwrites any prior
//! file at the output path; there is no incremental state. External readers
//! depend on the per-entry field set (title, canonical link, summary, publish
//! date) and on entries appearing in priority order, so callers hand in the
//! already-ordered post list. Feed generation is best-effort: the orchestrator
//! logs a failure and the build still succeeds.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use atom_syndication::{Entry, Feed, FixedDateTime, Link, Text};
use chrono::Utc;
use html_escape::decode_html_entities;
use thiserror::Error;

use crate::config::SiteMeta;
use crate::domain::Post;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("failed to write feed artifact: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize feed: {0}")]
    Atom(#[from] atom_syndication::Error),
}

/// Serializes the feed for `posts` (already in priority order) to `writer`.
pub fn write_feed<W: Write>(
    site: &SiteMeta,
    posts: &[Arc<Post>],
    writer: W,
) -> Result<(), FeedError> {
    assemble(site, posts).write_to(writer)?;
    Ok(())
}

/// Writes the artifact at `path`, replacing any previous build's output.
pub fn generate(site: &SiteMeta, posts: &[Arc<Post>], path: &Path) -> Result<(), FeedError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    write_feed(site, posts, BufWriter::new(file))
}

/// Canonical page URL for a post, `{site}/post/{id}`.
pub fn canonical_link(site: &SiteMeta, id: &str) -> String {
    format!("{}/post/{}", site.url.as_str().trim_end_matches('/'), id)
}

fn assemble(site: &SiteMeta, posts: &[Arc<Post>]) -> Feed {
    let generated_at = Utc::now().fixed_offset();
    Feed {
        title: Text::plain(site.title.clone()),
        id: site.url.to_string(),
        updated: generated_at,
        subtitle: Some(Text::plain(site.description.clone())),
        lang: Some(site.language.clone()),
        links: vec![alternate_link(site.url.to_string())],
        entries: posts
            .iter()
            .map(|post| entry(site, post, generated_at))
            .collect(),
        ..Feed::default()
    }
}

fn entry(site: &SiteMeta, post: &Post, generated_at: FixedDateTime) -> Entry {
    let link = canonical_link(site, &post.id);
    let date = post.date.map(|d| d.fixed_offset());

    Entry {
        title: Text::plain(decode_html_entities(&post.title).into_owned()),
        id: link.clone(),
        // Atom requires `updated`; an undated post carries the build time.
        updated: date.unwrap_or(generated_at),
        published: date,
        summary: post
            .summary
            .as_deref()
            .map(|s| Text::plain(decode_html_entities(s).into_owned())),
        links: vec![alternate_link(link)],
        ..Entry::default()
    }
}

fn alternate_link(href: String) -> Link {
    Link {
        href,
        rel: "alternate".to_string(),
        ..Link::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn site() -> SiteMeta {
        SiteMeta {
            title: "Example Site".into(),
            description: "A test site".into(),
            url: url::Url::parse("https://example.com").unwrap(),
            language: "en".into(),
        }
    }

    fn post(value: serde_json::Value) -> Arc<Post> {
        Arc::new(serde_json::from_value(value).unwrap())
    }

    fn render(posts: &[Arc<Post>]) -> Feed {
        let mut buf = Vec::new();
        write_feed(&site(), posts, &mut buf).unwrap();
        Feed::read_from(buf.as_slice()).unwrap()
    }

    #[test]
    fn test_entries_preserve_input_order() {
        let posts = vec![
            post(json!({"id": 2, "title": "Pinned", "date": "2024-06-01", "top": true})),
            post(json!({"id": 1, "title": "Older", "date": "2023-01-01"})),
        ];
        let feed = render(&posts);
        assert_eq!(feed.entries.len(), 2);
        assert_eq!(feed.entries[0].title.value, "Pinned");
        assert_eq!(feed.entries[1].title.value, "Older");
    }

    #[test]
    fn test_entry_carries_required_fields() {
        let posts = vec![post(json!({
            "id": 7,
            "title": "Hello",
            "description": "A summary",
            "date": "2023-01-01"
        }))];
        let feed = render(&posts);

        let entry = &feed.entries[0];
        assert_eq!(entry.title.value, "Hello");
        assert_eq!(entry.links[0].href, "https://example.com/post/7");
        assert_eq!(entry.summary.as_ref().unwrap().value, "A summary");
        assert!(entry.published.is_some());
    }

    #[test]
    fn test_undated_post_has_no_published_date() {
        let feed = render(&[post(json!({"id": 1, "title": "No date"}))]);
        assert!(feed.entries[0].published.is_none());
    }

    #[test]
    fn test_html_entities_decoded() {
        let feed = render(&[post(json!({
            "id": 1,
            "title": "Tips &amp; Tricks",
            "description": "&lt;3"
        }))]);
        assert_eq!(feed.entries[0].title.value, "Tips & Tricks");
        assert_eq!(feed.entries[0].summary.as_ref().unwrap().value, "<3");
    }

    #[test]
    fn test_feed_metadata_from_site() {
        let feed = render(&[]);
        assert_eq!(feed.title.value, "Example Site");
        assert_eq!(feed.subtitle.as_ref().unwrap().value, "A test site");
        assert_eq!(feed.lang.as_deref(), Some("en"));
    }

    #[test]
    fn test_generate_overwrites_previous_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("atom.xml");

        let first = vec![
            post(json!({"id": 1, "title": "One", "date": "2023-01-01"})),
            post(json!({"id": 2, "title": "Two", "date": "2023-02-01"})),
        ];
        generate(&site(), &first, &path).unwrap();

        let second = vec![post(json!({"id": 3, "title": "Three", "date": "2024-01-01"}))];
        generate(&site(), &second, &path).unwrap();

        let feed = Feed::read_from(std::io::BufReader::new(File::open(&path).unwrap())).unwrap();
        assert_eq!(feed.entries.len(), 1);
        assert_eq!(feed.entries[0].title.value, "Three");
    }
}
