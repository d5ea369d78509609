use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;

use crate::aggregate;
use crate::app::{AppContext, Result};
use crate::domain::Post;
use crate::feed;

/// Runs a full build: drain the post corpus, derive the indexes, export them
/// as JSON artifacts for the page renderer, then generate the feed.
///
/// The feed is the terminal step and is best-effort: a feed failure is logged
/// and the build still reports success. A backend outage degrades the corpus
/// to empty (fail-open in the repository) and likewise never fails the build.
pub async fn build_site(ctx: &AppContext) -> Result<()> {
    let corpus = ctx.repository.fetch_corpus(ctx.config.api.page_size).await;
    println!("Fetched {} posts", corpus.len());

    let posts: Vec<Arc<Post>> = corpus.into_iter().map(Arc::new).collect();

    let tags = aggregate::build_tag_index(&posts);
    let categories = aggregate::build_category_index(&posts);
    let archives = aggregate::build_archive_index(&posts);

    let mut ordered = posts.clone();
    aggregate::sort_by_priority(&mut ordered);

    let data_dir = ctx.config.build.data_dir();
    fs::create_dir_all(&data_dir)?;
    write_artifact(&data_dir.join("posts.json"), &ordered)?;
    write_artifact(&data_dir.join("tags.json"), &tags)?;
    write_artifact(&data_dir.join("categories.json"), &categories)?;
    write_artifact(&data_dir.join("archives.json"), &archives)?;
    println!(
        "Indexed {} tags, {} categories, {} years",
        tags.len(),
        categories.len(),
        archives.sorted_years().len()
    );

    let feed_path = ctx.config.build.feed_path();
    match feed::generate(&ctx.config.site, &ordered, &feed_path) {
        Ok(()) => println!("Wrote feed to {}", feed_path.display()),
        Err(err) => {
            tracing::warn!(path = %feed_path.display(), error = %err, "feed generation failed, build continues");
        }
    }

    Ok(())
}

pub async fn show_post(ctx: &AppContext, id: &str) -> Result<()> {
    match ctx.repository.fetch_post_detail(id).await {
        Some(post) => println!("{}", serde_json::to_string_pretty(&post)?),
        None => println!("Post not found: {id}"),
    }
    Ok(())
}

/// Regenerates the feed from a fresh corpus fetch.
pub async fn rebuild_feed(ctx: &AppContext) -> Result<()> {
    let corpus = ctx.repository.fetch_corpus(ctx.config.api.page_size).await;
    let mut posts: Vec<Arc<Post>> = corpus.into_iter().map(Arc::new).collect();
    aggregate::sort_by_priority(&mut posts);

    let feed_path = ctx.config.build.feed_path();
    feed::generate(&ctx.config.site, &posts, &feed_path)?;
    println!("Wrote feed to {}", feed_path.display());
    Ok(())
}

fn write_artifact<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    fs::write(path, serde_json::to_vec_pretty(value)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::result::Result;

    use crate::client::TransportError;
    use crate::config::Config;
    use crate::repo::{PostListPayload, PostSource};

    struct StaticSource(serde_json::Value);

    #[async_trait]
    impl PostSource for StaticSource {
        async fn list_posts(
            &self,
            page: u32,
            _page_size: u32,
        ) -> Result<PostListPayload, TransportError> {
            if page > 1 {
                return Ok(PostListPayload::default());
            }
            Ok(serde_json::from_value(self.0.clone()).unwrap())
        }

        async fn post_detail(&self, _id: &str) -> Result<Post, TransportError> {
            Err(TransportError::Envelope("not served".into()))
        }
    }

    struct DownSource;

    #[async_trait]
    impl PostSource for DownSource {
        async fn list_posts(
            &self,
            _page: u32,
            _page_size: u32,
        ) -> Result<PostListPayload, TransportError> {
            Err(TransportError::Envelope("backend down".into()))
        }

        async fn post_detail(&self, _id: &str) -> Result<Post, TransportError> {
            Err(TransportError::Envelope("backend down".into()))
        }
    }

    fn test_config(output_dir: &Path) -> Config {
        let mut config = Config::default();
        config.build.output_dir = output_dir.to_path_buf();
        config
    }

    #[tokio::test]
    async fn test_build_writes_all_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let source = StaticSource(serde_json::json!({
            "posts": [
                {"id": 1, "title": "First", "tags": "a,b", "date": "2023-01-01"},
                {"id": 2, "title": "Pinned", "tags": ["b"], "date": "2024-06-01", "top": true}
            ],
            "total": 2
        }));
        let ctx = AppContext::with_source(test_config(dir.path()), Arc::new(source));

        build_site(&ctx).await.unwrap();

        let data = dir.path().join("data");
        for name in ["posts.json", "tags.json", "categories.json", "archives.json"] {
            assert!(data.join(name).exists(), "missing {name}");
        }
        assert!(dir.path().join("atom.xml").exists());

        // posts.json is in priority order: the pinned post leads
        let posts: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(data.join("posts.json")).unwrap()).unwrap();
        assert_eq!(posts[0]["id"], "2");

        let tags: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(data.join("tags.json")).unwrap()).unwrap();
        assert_eq!(tags["b"]["count"], 2);
    }

    #[tokio::test]
    async fn test_build_succeeds_with_backend_down() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = AppContext::with_source(test_config(dir.path()), Arc::new(DownSource));

        // fail-open all the way down: empty indexes, build still succeeds
        build_site(&ctx).await.unwrap();

        let tags: serde_json::Value = serde_json::from_str(
            &fs::read_to_string(dir.path().join("data").join("tags.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(tags, serde_json::json!({}));
    }

    #[tokio::test]
    async fn test_show_post_handles_missing_post() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = AppContext::with_source(test_config(dir.path()), Arc::new(DownSource));
        show_post(&ctx, "42").await.unwrap();
    }
}
