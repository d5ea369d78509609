//! Pure index builders over a fully fetched post list.
//!
//! Everything here is synchronous and I/O-free: the build orchestrator awaits
//! the complete corpus first, then derives the tag, category, and archive
//! indexes plus the priority ordering in one pass each. Buckets hold
//! [`Arc<Post>`] clones, so every index references the same fetched object
//! and the resulting snapshots are immutable by construction. Rebuilding from
//! the same input yields structurally identical output.
//!
//! Malformed records degrade per-record: a post without tags is absent from
//! the tag index only, a post without a date is absent from the archive index
//! only. No input ever makes aggregation fail; empty input yields empty
//! indexes.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::domain::Post;

/// One index bucket. `count` always equals `articles.len()`.
#[derive(Debug, Clone, Serialize)]
pub struct Bucket {
    pub count: usize,
    pub articles: Vec<Arc<Post>>,
}

/// Label → bucket mapping whose keys iterate in first-seen order across the
/// input post list. Serializes as a JSON object in that order.
#[derive(Debug, Clone, Default)]
pub struct LabelIndex {
    order: Vec<String>,
    buckets: HashMap<String, Bucket>,
}

impl LabelIndex {
    fn insert(&mut self, label: &str, post: &Arc<Post>) {
        match self.buckets.get_mut(label) {
            Some(bucket) => {
                bucket.count += 1;
                bucket.articles.push(Arc::clone(post));
            }
            None => {
                self.order.push(label.to_string());
                self.buckets.insert(
                    label.to_string(),
                    Bucket {
                        count: 1,
                        articles: vec![Arc::clone(post)],
                    },
                );
            }
        }
    }

    pub fn get(&self, label: &str) -> Option<&Bucket> {
        self.buckets.get(label)
    }

    /// Labels in first-seen order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Bucket)> {
        self.order.iter().map(|l| (l.as_str(), &self.buckets[l]))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl Serialize for LabelIndex {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.order.len()))?;
        for (label, bucket) in self.iter() {
            map.serialize_entry(label, bucket)?;
        }
        map.end()
    }
}

/// Year → bucket mapping plus the distinct years in descending order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ArchiveIndex {
    buckets: LabelIndex,
    sorted_years: Vec<String>,
}

impl ArchiveIndex {
    pub fn get(&self, year: &str) -> Option<&Bucket> {
        self.buckets.get(year)
    }

    /// Distinct years present, strictly descending numerically.
    pub fn sorted_years(&self) -> &[String] {
        &self.sorted_years
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

pub fn build_tag_index(posts: &[Arc<Post>]) -> LabelIndex {
    fn tags(post: &Post) -> &[String] {
        &post.tags
    }
    build_label_index(posts, tags)
}

pub fn build_category_index(posts: &[Arc<Post>]) -> LabelIndex {
    fn categories(post: &Post) -> &[String] {
        &post.categories
    }
    build_label_index(posts, categories)
}

fn build_label_index(posts: &[Arc<Post>], labels: fn(&Post) -> &[String]) -> LabelIndex {
    let mut index = LabelIndex::default();
    for post in posts {
        // A post with no labels is skipped for this index only.
        for label in labels(post) {
            index.insert(label, post);
        }
    }
    index
}

pub fn build_archive_index(posts: &[Arc<Post>]) -> ArchiveIndex {
    let mut buckets = LabelIndex::default();
    for post in posts {
        // Undated posts appear in no archive bucket.
        let Some(year) = post.year() else { continue };
        buckets.insert(&format!("{year:04}"), post);
    }

    let mut sorted_years: Vec<String> = buckets.labels().map(String::from).collect();
    sorted_years.sort_by_key(|year| std::cmp::Reverse(year.parse::<i32>().unwrap_or(i32::MIN)));

    ArchiveIndex {
        buckets,
        sorted_years,
    }
}

/// Total order for listing posts: pinned (`top`) posts sort before unpinned
/// ones irrespective of date; within the same pin state, newer dates first,
/// and a missing date after any present date. Remaining ties are resolved by
/// the stable sort in [`sort_by_priority`], which keeps fetch order.
pub fn priority_cmp(a: &Post, b: &Post) -> Ordering {
    b.top.cmp(&a.top).then_with(|| b.date.cmp(&a.date))
}

pub fn sort_by_priority(posts: &mut [Arc<Post>]) {
    posts.sort_by(|a, b| priority_cmp(a, b));
}
