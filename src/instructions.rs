use crate::config::Config;
use crate::errors::ContextError;
use reqwest::Client;
use std::path::PathBuf;
use std::time::Duration;
use tokio::fs as async_fs;
use tracing::{debug, info, warn};

pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Sources the optional custom-instructions block: a configured URL wins and
/// refreshes the cache; without a URL the last cached body is used.
pub struct InstructionsProvider {
    cache_path: PathBuf,
    client: Client,
}

impl InstructionsProvider {
    pub fn new(cache_path: PathBuf) -> Self {
        InstructionsProvider {
            cache_path,
            client: Client::new(),
        }
    }

    /// Only called when `use_custom_instructions` is enabled; the assembler
    /// omits the section entirely otherwise.
    pub async fn get_instructions(&self, config: &Config) -> String {
        let url = config.custom_instructions_url.trim();
        if url.is_empty() {
            debug!("No custom instructions URL configured, using cache");
            return self.load_cache().await;
        }

        match self.fetch(url).await {
            Ok(body) => {
                self.save_cache(&body).await;
                body
            }
            Err(e) => {
                // Fetch failures are explicit in the document rather than
                // silently masked by stale cache content.
                warn!("Custom instructions fetch failed: {}", e);
                format!("<!-- Failed to fetch custom instructions: {} -->", e)
            }
        }
    }

    /// Single bounded-timeout GET; anything but a 2xx is a failure.
    pub async fn fetch(&self, url: &str) -> Result<String, ContextError> {
        debug!("Fetching custom instructions from {}", url);
        let response = self
            .client
            .get(url)
            .timeout(FETCH_TIMEOUT)
            .send()
            .await
            .map_err(|e| ContextError::FetchError(e.to_string()))?;
        let response = response
            .error_for_status()
            .map_err(|e| ContextError::FetchError(e.to_string()))?;
        response
            .text()
            .await
            .map_err(|e| ContextError::FetchError(e.to_string()))
    }

    async fn load_cache(&self) -> String {
        match async_fs::read_to_string(&self.cache_path).await {
            Ok(content) => content,
            Err(_) => String::new(),
        }
    }

    async fn save_cache(&self, content: &str) {
        if let Some(parent) = self.cache_path.parent() {
            if let Err(e) = async_fs::create_dir_all(parent).await {
                warn!("Could not create cache directory: {}", e);
                return;
            }
        }
        match async_fs::write(&self.cache_path, content).await {
            Ok(()) => info!("Custom instructions cached at {}", self.cache_path.display()),
            Err(e) => warn!("Could not write instructions cache: {}", e),
        }
    }
}
