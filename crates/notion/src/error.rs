use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotionError {
    #[error("Notion API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Batch of {size} blocks exceeds the limit of {max}")]
    BatchTooLarge { size: usize, max: usize },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, NotionError>;
