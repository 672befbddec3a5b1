//! Currency loader configuration

use std::time::Duration;
use serde::Deserialize;

const DEFAULT_LANGUAGE: &str = "en-US";

/// Endpoints, language and cache lifetimes for the currency loader.
///
/// URL templates may contain `{source}` (source currency code) and `{lang}`
/// (response language), both substituted per request.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CurrencyConfig {
    pub metadata_url: String,
    pub ratios_url: String,
    pub language: String,
    /// Oldest cache that may still be used without refetching
    #[serde(with = "secs")]
    pub day_duration: Duration,
    /// Age after which loaded rates are flagged as outdated
    #[serde(with = "secs")]
    pub week_duration: Duration,
    #[serde(with = "secs")]
    pub request_timeout: Duration,
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        Self::with_base_url("https://go.microsoft.com/fwlink")
    }
}

impl CurrencyConfig {
    /// Config pointing both payloads at `base`
    pub fn with_base_url(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            metadata_url: format!("{base}/currency/metadata?source={{source}}&lang={{lang}}"),
            ratios_url: format!("{base}/currency/ratios?source={{source}}"),
            language: system_language(),
            day_duration: Duration::from_secs(24 * 60 * 60),
            week_duration: Duration::from_secs(7 * 24 * 60 * 60),
            request_timeout: Duration::from_secs(30),
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Primary language subtag, lowercased ("ar" for "ar-SA")
    pub fn primary_language(&self) -> String {
        self.language
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase()
    }

    /// Whether unit names should put the currency before the country
    pub fn is_rtl_language(&self) -> bool {
        matches!(self.primary_language().as_str(), "ar" | "fa" | "he" | "ur")
    }
}

/// First user language reported by the OS, normalized to BCP-47 dashes
fn system_language() -> String {
    sys_locale::get_locale()
        .map(|locale| locale.split('.').next().unwrap_or_default().replace('_', "-"))
        .filter(|locale| !locale.is_empty() && locale != "C" && locale != "POSIX")
        .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string())
}

mod secs {
    use std::time::Duration;
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_templates() {
        let config = CurrencyConfig::with_base_url("http://localhost:9000/");
        assert_eq!(config.metadata_url, "http://localhost:9000/currency/metadata?source={source}&lang={lang}");
        assert_eq!(config.ratios_url, "http://localhost:9000/currency/ratios?source={source}");
        assert_eq!(config.day_duration, Duration::from_secs(86_400));
        assert_eq!(config.week_duration, config.day_duration * 7);
    }

    #[test]
    fn test_rtl_detection() {
        let config = CurrencyConfig::default();
        assert!(config.clone().with_language("ar-SA").is_rtl_language());
        assert!(config.clone().with_language("he").is_rtl_language());
        assert!(!config.clone().with_language("en-US").is_rtl_language());
        assert_eq!(config.with_language("FA_IR").primary_language(), "fa");
    }

    #[test]
    fn test_deserialize_partial() {
        let config: CurrencyConfig = serde_json::from_str(r#"{"language":"fr-FR","day_duration":60}"#).unwrap();
        assert_eq!(config.language, "fr-FR");
        assert_eq!(config.day_duration, Duration::from_secs(60));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }
}
