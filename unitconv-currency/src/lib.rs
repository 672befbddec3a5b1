//! unitconv Currency - Currency data loader
//!
//! Serves the currency category from two JSON payloads: per-country metadata
//! and USD based exchange rates. Payloads come from the local cache while it is
//! fresh and from the web otherwise.
//!
//! Load order: cache (same language, younger than a day), then web. Whatever
//! source wins is finalized into units and a complete ratio table, and the
//! view model is told exactly once through `currency_data_load_finished`.

mod config;
mod error;
mod http;
mod reqwest_client;
mod settings;
mod rounding;
mod parse;
mod loader;
pub mod mock;

pub use config::CurrencyConfig;
pub use error::CurrencyError;
pub use http::{CurrencyHttpClient, HttpError};
pub use reqwest_client::ReqwestCurrencyClient;
pub use settings::{LocalSettings, MemorySettings, FileSettings, SettingsError, keys};
pub use rounding::{round_currency_ratio, format_ratio};
pub use parse::{parse_static_data, parse_ratios, ParsedPayloads};
pub use loader::{CurrencyDataLoader, CurrencyLoadStatus, is_older_than, format_timestamp};
