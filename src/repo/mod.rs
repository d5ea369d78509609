//! Pagination-aware post retrieval with the fail-open policy.
//!
//! Every transport failure is absorbed here: callers above the repository get
//! an empty page, an empty corpus, or `None` — never an error. An unavailable
//! backend degrades the archive and tag views to empty instead of aborting
//! the build. Absorbed errors are logged at warn level.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::client::{ContentClient, TransportError};
use crate::domain::Post;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// List payload inside the service envelope. Both fields default when absent.
#[derive(Debug, Default, Deserialize)]
pub struct PostListPayload {
    #[serde(default)]
    pub posts: Vec<Post>,
    #[serde(default)]
    pub total: u64,
}

/// One page of posts, as handed to callers.
#[derive(Debug, Default)]
pub struct PostPage {
    pub posts: Vec<Post>,
    pub total: u64,
}

/// Seam between the repository and the content service, so tests can inject
/// failing or paging sources without a network.
#[async_trait]
pub trait PostSource: Send + Sync {
    async fn list_posts(&self, page: u32, page_size: u32)
        -> Result<PostListPayload, TransportError>;

    async fn post_detail(&self, id: &str) -> Result<Post, TransportError>;
}

#[async_trait]
impl PostSource for ContentClient {
    async fn list_posts(
        &self,
        page: u32,
        page_size: u32,
    ) -> Result<PostListPayload, TransportError> {
        let resource = self.posts_resource().to_string();
        self.fetch_list(&resource, page, page_size).await
    }

    async fn post_detail(&self, id: &str) -> Result<Post, TransportError> {
        let resource = self.posts_resource().to_string();
        self.fetch_by_id(&resource, id).await
    }
}

pub struct PostRepository {
    source: Arc<dyn PostSource>,
}

impl PostRepository {
    pub fn new(source: Arc<dyn PostSource>) -> Self {
        Self { source }
    }

    /// Fetches one page of posts. Fail-open: any error degrades to an empty
    /// page (`posts: [], total: 0`) and is never propagated.
    pub async fn fetch_all_posts(&self, page: u32, page_size: u32) -> PostPage {
        match self.source.list_posts(page, page_size).await {
            Ok(payload) => PostPage {
                posts: payload.posts,
                total: payload.total,
            },
            Err(err) => {
                tracing::warn!(page, page_size, error = %err, "post list unavailable, using empty page");
                PostPage::default()
            }
        }
    }

    /// First page with the service defaults.
    pub async fn fetch_front_page(&self) -> PostPage {
        self.fetch_all_posts(DEFAULT_PAGE, DEFAULT_PAGE_SIZE).await
    }

    /// Fetches a single post. Fail-open: `None` on any error.
    pub async fn fetch_post_detail(&self, id: &str) -> Option<Post> {
        match self.source.post_detail(id).await {
            Ok(post) => Some(post),
            Err(err) => {
                tracing::warn!(id, error = %err, "post detail unavailable");
                None
            }
        }
    }

    /// Drains every page so aggregation always sees the complete corpus.
    ///
    /// A failure on the first page yields an empty corpus; a failure later
    /// stops pagination and returns the posts accumulated so far. Either way
    /// the caller gets a usable (possibly degraded) list, never an error.
    pub async fn fetch_corpus(&self, page_size: u32) -> Vec<Post> {
        let page_size = page_size.max(1);
        let mut posts: Vec<Post> = Vec::new();
        let mut page = DEFAULT_PAGE;

        loop {
            let payload = match self.source.list_posts(page, page_size).await {
                Ok(payload) => payload,
                Err(err) => {
                    tracing::warn!(page, error = %err, "pagination stopped, keeping posts fetched so far");
                    break;
                }
            };

            let fetched = payload.posts.len();
            posts.extend(payload.posts);

            if fetched == 0 || fetched < page_size as usize || posts.len() as u64 >= payload.total {
                break;
            }
            page += 1;
        }

        posts
    }
}
