use std::sync::Arc;

use crate::app::error::Result;
use crate::client::ContentClient;
use crate::config::Config;
use crate::repo::{PostRepository, PostSource};

/// Wires the configuration and repository together for one build execution.
pub struct AppContext {
    pub config: Config,
    pub repository: PostRepository,
}

impl AppContext {
    pub fn new(config: Config) -> Result<Self> {
        let client = Arc::new(ContentClient::new(&config.api)?);
        Ok(Self {
            repository: PostRepository::new(client),
            config,
        })
    }

    /// Context over an arbitrary post source, used by tests.
    pub fn with_source(config: Config, source: Arc<dyn PostSource>) -> Self {
        Self {
            repository: PostRepository::new(source),
            config,
        }
    }
}
