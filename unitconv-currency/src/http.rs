//! HTTP collaborator for the currency payloads

use async_trait::async_trait;
use thiserror::Error;

/// Transport failures. Callers treat all of them alike, the split is for logs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HttpError {
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    #[error("request timeout: {0}")]
    Timeout(String),

    #[error("server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    #[error("http error: {0}")]
    Other(String),
}

/// Fetches the two currency payloads as raw JSON text.
///
/// Both requests are parameterized by the source currency code and the
/// response language set beforehand.
#[async_trait]
pub trait CurrencyHttpClient: Send + Sync {
    fn set_source_currency_code(&self, code: &str);
    fn set_response_language(&self, language: &str);

    /// Per-country metadata, a JSON array of `CurrencyStaticData`
    async fn get_currency_metadata(&self) -> Result<String, HttpError>;

    /// Exchange rates against the source currency, a JSON array of `{"An", "Rt"}`
    async fn get_currency_ratios(&self) -> Result<String, HttpError>;
}
