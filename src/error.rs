#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[cfg(feature = "api")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{operation} failed{}: {detail}", .status.map(|s| format!(" with status {s}")).unwrap_or_default())]
    Api {
        operation: &'static str,
        status: Option<u16>,
        detail: String,
    },
    #[error("Unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Configuration error: {0}")]
    Config(String),
}
