use thiserror::Error;

/// Errors that can occur while fetching or recognising a recipe source
#[derive(Error, Debug)]
pub enum RecipeError {
    /// Failed to fetch the page (network, TLS, body decoding)
    #[error("Failed to fetch URL: {0}")]
    Fetch(#[from] reqwest::Error),

    /// Upstream answered with a non-success status
    #[error("Upstream fetch failed: {0}")]
    UpstreamStatus(u16),

    /// Missing or non-http(s) URL
    #[error("Missing or invalid URL: {0}")]
    InvalidUrl(String),

    /// No structured recipe markup in the document
    #[error("No recipe markup found in this document")]
    NoRecipeFound,

    /// OCR engine failure for a single image
    #[error("OCR failed: {0}")]
    Ocr(String),

    /// Reading an input file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON where JSON was required
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}
