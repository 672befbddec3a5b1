//! Canned currency client for tests and offline runs

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use async_trait::async_trait;
use crate::{CurrencyHttpClient, HttpError};

pub const MOCK_STATIC_JSON: &str = r#"[{"CountryCode":"USA","CountryName":"United States","CurrencyCode":"USD","CurrencyName":"Dollar","CurrencySymbol":"$"},{"CountryCode":"EUR","CountryName":"Europe","CurrencyCode":"EUR","CurrencyName":"Euro","CurrencySymbol":"€"}]"#;

pub const MOCK_RATIOS_JSON: &str = r#"[{"An":"USD","Ch":0,"Pc":0,"Rt":1},{"An":"EUR","Ch":0.003803,"Pc":0.4149,"Rt":0.920503,"Yh":0.9667,"Yl":0.86701}]"#;

/// Client answering from fixed payloads.
///
/// `force_web_failure` makes every request fail with a connection error.
#[derive(Debug)]
pub struct MockCurrencyClient {
    static_json: Mutex<String>,
    ratios_json: Mutex<String>,
    fail: AtomicBool,
    requests: AtomicUsize,
    language: Mutex<String>,
}

impl Default for MockCurrencyClient {
    fn default() -> Self {
        Self::new(MOCK_STATIC_JSON, MOCK_RATIOS_JSON)
    }
}

impl MockCurrencyClient {
    pub fn new(static_json: &str, ratios_json: &str) -> Self {
        Self {
            static_json: Mutex::new(static_json.to_string()),
            ratios_json: Mutex::new(ratios_json.to_string()),
            fail: AtomicBool::new(false),
            requests: AtomicUsize::new(0),
            language: Mutex::new(String::new()),
        }
    }

    pub fn force_web_failure(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn set_payloads(&self, static_json: &str, ratios_json: &str) {
        if let Ok(mut s) = self.static_json.lock() {
            *s = static_json.to_string();
        }
        if let Ok(mut r) = self.ratios_json.lock() {
            *r = ratios_json.to_string();
        }
    }

    /// Number of payload requests served or failed so far
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    pub fn language(&self) -> String {
        self.language.lock().map(|l| l.clone()).unwrap_or_default()
    }

    fn respond(&self, body: &Mutex<String>) -> Result<String, HttpError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(HttpError::ConnectionFailed("forced failure".to_string()));
        }
        body.lock()
            .map(|b| b.clone())
            .map_err(|e| HttpError::Other(e.to_string()))
    }
}

#[async_trait]
impl CurrencyHttpClient for MockCurrencyClient {
    fn set_source_currency_code(&self, _code: &str) {}

    fn set_response_language(&self, language: &str) {
        if let Ok(mut current) = self.language.lock() {
            *current = language.to_string();
        }
    }

    async fn get_currency_metadata(&self) -> Result<String, HttpError> {
        self.respond(&self.static_json)
    }

    async fn get_currency_ratios(&self) -> Result<String, HttpError> {
        self.respond(&self.ratios_json)
    }
}
