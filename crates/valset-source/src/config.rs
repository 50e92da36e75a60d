use std::time::Duration;

/// Settings shared by all loaders.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Base URL of the hosted dataset rows API.
    pub hub_endpoint: String,

    /// Fixed hub config; the first config offering the split is used when unset.
    pub hub_config: Option<String>,

    /// Rows requested per hub page.
    pub page_size: usize,

    /// Per-request timeout for remote fetches.
    pub timeout: Duration,

    pub user_agent: String,
}

impl LoaderConfig {
    pub const DEFAULT_HUB_ENDPOINT: &'static str = "https://datasets-server.huggingface.co";

    // The rows API refuses pages larger than this.
    pub const MAX_PAGE_SIZE: usize = 100;

    pub fn with_hub_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.hub_endpoint = endpoint.into();
        self
    }

    pub fn with_hub_config(mut self, config: impl Into<String>) -> Self {
        self.hub_config = Some(config.into());
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.clamp(1, Self::MAX_PAGE_SIZE);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            hub_endpoint: Self::DEFAULT_HUB_ENDPOINT.to_owned(),
            hub_config: None,
            page_size: Self::MAX_PAGE_SIZE,
            timeout: Duration::from_secs(300),
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_owned(),
        }
    }
}
