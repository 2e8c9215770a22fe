use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContextError {
    #[error("Clipboard initialization failed: {0}")]
    ClipboardInitError(String),

    #[error("Clipboard write failed: {0}")]
    ClipboardWriteError(String),

    #[error("IO Error: {0}")]
    IoError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Fetch failed: {0}")]
    FetchError(String),

    #[error("Pattern error: {0}")]
    PatternError(String),
}

impl From<std::io::Error> for ContextError {
    fn from(err: std::io::Error) -> Self {
        ContextError::IoError(err.to_string())
    }
}

impl From<glob::PatternError> for ContextError {
    fn from(err: glob::PatternError) -> Self {
        ContextError::PatternError(err.to_string())
    }
}
