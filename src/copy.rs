use crate::errors::ContextError;
use arboard::Clipboard;
use async_trait::async_trait;
use tracing::{debug, info};

#[async_trait]
pub trait ContextCopier {
    async fn copy_to_clipboard(&self, content: &str) -> Result<(), ContextError>;
}

pub struct BasicContextCopier;

#[async_trait]
impl ContextCopier for BasicContextCopier {
    async fn copy_to_clipboard(&self, content: &str) -> Result<(), ContextError> {
        debug!("Initializing clipboard");
        let mut clipboard =
            Clipboard::new().map_err(|e| ContextError::ClipboardInitError(e.to_string()))?;

        clipboard
            .set_text(content.to_owned())
            .map_err(|e| ContextError::ClipboardWriteError(e.to_string()))?;

        info!("Context copied to clipboard.");
        Ok(())
    }
}

pub async fn copy_context_to_clipboard(content: &str) -> Result<(), ContextError> {
    let copier = BasicContextCopier;
    copier.copy_to_clipboard(content).await
}
