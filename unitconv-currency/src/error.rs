//! Currency loader errors
//!
//! Every variant is recoverable: the public loader operations turn them into a
//! `false` result and a warning.

use thiserror::Error;
use unitconv_loader::NetworkAccessBehavior;
use crate::{HttpError, SettingsError};

#[derive(Error, Debug)]
pub enum CurrencyError {
    #[error("http: {0}")]
    Http(#[from] HttpError),

    #[error("cannot parse {what}: {reason}")]
    Parse { what: &'static str, reason: String },

    #[error("settings: {0}")]
    Settings(#[from] SettingsError),

    #[error("network access is {0:?}")]
    NetworkGated(NetworkAccessBehavior),

    #[error("no cached timestamp")]
    MissingTimestamp,

    #[error("cache is older than the allowed age")]
    StaleCache,

    #[error("cache language {cached:?} does not match {current:?}")]
    LanguageMismatch { cached: Option<String>, current: String },

    #[error("no runtime available to run the load")]
    NoRuntime,
}

impl CurrencyError {
    pub fn parse(what: &'static str, reason: impl ToString) -> Self {
        CurrencyError::Parse { what, reason: reason.to_string() }
    }
}
