//! Error taxonomy for explorer pages and backend calls

use thiserror::Error;

/// Everything that can go wrong between a route and a rendered page
#[derive(Debug, Error)]
pub enum ExplorerError {
    #[error("entity not found")]
    NotFound,

    #[error("unknown tab '{0}'")]
    TabNotFound(String),

    #[error("page number must be positive")]
    PageNonPositive,

    #[error("page is past the last page ({last_page})")]
    PageOverflow { last_page: u64 },

    #[error("invalid route: {0}")]
    InvalidRoute(String),

    #[error("invalid cursor: {0}")]
    InvalidCursor(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("graphql error: {0}")]
    Graphql(String),

    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("upstream error: {0}")]
    Upstream(String),
}

impl ExplorerError {
    /// Whether the error came from the backend rather than from user input
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            ExplorerError::Http(_)
                | ExplorerError::Graphql(_)
                | ExplorerError::Decode(_)
                | ExplorerError::Upstream(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ExplorerError>;
