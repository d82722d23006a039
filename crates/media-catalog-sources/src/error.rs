/// Errors raised while reading or writing a record file
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid record data: {0}")]
    Invalid(String),

    #[error("Unsupported format: {0}")]
    Unsupported(String),
}

impl CodecError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported(msg.into())
    }
}

/// Errors raised by a metadata fetcher
///
/// "No results" is never an error: fetchers return an empty list for that.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {0}")]
    Api(String),

    #[error("Fetcher not configured: {0}")]
    NotConfigured(String),

    #[error("Fetch timed out after {0}s")]
    Timeout(u64),
}
