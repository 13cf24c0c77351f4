//! Error types for the legislative-documents client.

/// Errors that can occur when talking to the House legislative-documents site.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The request could not be sent or its body could not be read.
    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    /// The site returned a non-success status with a body snippet.
    #[error("Request failed with status {status}")]
    HttpStatus { status: u16, body: String },
    /// The configured base URL could not be joined with an endpoint path.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}
