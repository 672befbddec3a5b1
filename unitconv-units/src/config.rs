//! Region settings for the standard tables

use serde::{Deserialize, Serialize};

/// Region-dependent choices of default units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitsConfig {
    /// Two-letter region code, e.g. "US", "GB", "KR"
    pub region: String,
}

impl Default for UnitsConfig {
    fn default() -> Self {
        Self { region: "US".to_string() }
    }
}

impl UnitsConfig {
    pub fn new(region: impl Into<String>) -> Self {
        Self { region: region.into().to_uppercase() }
    }

    /// Region of a BCP-47 style locale ("en-US", "ko_KR"), falling back to the default
    pub fn from_locale(locale: &str) -> Self {
        locale
            .split(['-', '_', '.'])
            .skip(1)
            .find(|part| part.len() == 2 && part.chars().all(|c| c.is_ascii_alphabetic()))
            .map(Self::new)
            .unwrap_or_default()
    }

    fn is(&self, code: &str) -> bool {
        self.region == code
    }

    /// US customary units as the target side
    pub fn uses_us_customary(&self) -> bool {
        ["US", "FM", "MH", "PW", "LR"].iter().any(|c| self.is(c))
    }

    pub fn uses_si(&self) -> bool {
        !self.uses_us_customary()
    }

    pub fn uses_fahrenheit(&self) -> bool {
        self.uses_us_customary() || ["BS", "KY", "LR"].iter().any(|c| self.is(c))
    }

    pub fn uses_watt_instead_of_kilowatt(&self) -> bool {
        self.is("GB")
    }

    /// Korean floor-space unit
    pub fn uses_pyeong(&self) -> bool {
        self.is("KR") || self.is("KP")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_locale() {
        assert_eq!(UnitsConfig::from_locale("en-GB").region, "GB");
        assert_eq!(UnitsConfig::from_locale("ko_KR.UTF-8").region, "KR");
        assert_eq!(UnitsConfig::from_locale("zh-Hant-TW").region, "TW");
        assert_eq!(UnitsConfig::from_locale("fr").region, "US");
    }

    #[test]
    fn test_region_flags() {
        let us = UnitsConfig::new("us");
        assert!(us.uses_us_customary());
        assert!(us.uses_fahrenheit());
        assert!(!us.uses_si());

        let bahamas = UnitsConfig::new("BS");
        assert!(bahamas.uses_si());
        assert!(bahamas.uses_fahrenheit());

        let gb = UnitsConfig::new("GB");
        assert!(gb.uses_watt_instead_of_kilowatt());
        assert!(!gb.uses_fahrenheit());

        assert!(UnitsConfig::new("KR").uses_pyeong());
        assert!(!UnitsConfig::new("JP").uses_pyeong());
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: UnitsConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, UnitsConfig::default());
    }
}
