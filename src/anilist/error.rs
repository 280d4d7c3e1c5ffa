use thiserror::Error;

/// How a single AniList page request failed. The batch fetcher picks its retry
/// behaviour from the variant.
#[derive(Debug, Error)]
pub enum AniListError {
    #[error("AniList rate limit hit (status 429)")]
    RateLimited,

    #[error("AniList HTTP error (status {status}): {body}")]
    Http { status: u16, body: String },

    #[error("AniList request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Failed to parse AniList JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("AniList GraphQL error: {0}")]
    GraphQl(String),
}

impl AniListError {
    /// GraphQL errors describe the query itself, so repeating it cannot help.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, AniListError::GraphQl(_))
    }
}
