//! Unit and category descriptions

use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use serde::{Serialize, Deserialize};
use crate::ConversionData;

/// A convertible unit. Identity is the numeric `id`; every other field is display data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
    pub id: i32,
    pub name: String,
    /// Name read out by assistive technology (e.g. "United States Dollar")
    pub accessible_name: String,
    pub abbreviation: String,
    /// Eligible as the default "from" unit when a category is first selected
    pub is_conversion_source: bool,
    /// Eligible as the default "to" unit when a category is first selected
    pub is_conversion_target: bool,
    /// Novelty unit (bananas, soccer fields) only shown among suggestions
    pub is_whimsical: bool,
}

/// Null-object unit returned whenever a lookup misses.
pub const EMPTY_UNIT: Unit = Unit {
    id: -1,
    name: String::new(),
    accessible_name: String::new(),
    abbreviation: String::new(),
    is_conversion_source: true,
    is_conversion_target: true,
    is_whimsical: false,
};

impl Unit {
    pub fn new(
        id: i32,
        name: impl Into<String>,
        abbreviation: impl Into<String>,
        is_conversion_source: bool,
        is_conversion_target: bool,
        is_whimsical: bool,
    ) -> Self {
        let name = name.into();
        Unit {
            id,
            accessible_name: name.clone(),
            name,
            abbreviation: abbreviation.into(),
            is_conversion_source,
            is_conversion_target,
            is_whimsical,
        }
    }

    /// Builder: override the accessible name
    pub fn with_accessible_name(mut self, accessible_name: impl Into<String>) -> Self {
        self.accessible_name = accessible_name.into();
        self
    }

    /// Check whether this is the `EMPTY_UNIT` sentinel
    pub fn is_empty(&self) -> bool {
        self.id == EMPTY_UNIT.id
    }
}

impl Default for Unit {
    fn default() -> Self {
        EMPTY_UNIT
    }
}

impl PartialEq for Unit {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Unit {}

impl Hash for Unit {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// A group of mutually convertible units.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i32,
    pub name: String,
    pub supports_negative: bool,
}

impl Category {
    pub fn new(id: i32, name: impl Into<String>, supports_negative: bool) -> Self {
        Category { id, name: name.into(), supports_negative }
    }
}

impl Default for Category {
    fn default() -> Self {
        Category { id: -1, name: String::new(), supports_negative: false }
    }
}

impl PartialEq for Category {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Category {}

impl Hash for Category {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Per-country currency metadata as published by the currency service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CurrencyStaticData {
    pub country_code: String,
    pub country_name: String,
    pub currency_code: String,
    pub currency_name: String,
    pub currency_symbol: String,
}

/// Raw exchange rate of `target_currency_code` against `source_currency_code`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyRatio {
    pub ratio: f64,
    pub source_currency_code: String,
    pub target_currency_code: String,
}

/// Conversions from one unit to every unit of its category
pub type RatioMap = HashMap<Unit, ConversionData>;

/// The full directed conversion table of a category
pub type UnitRatioMap = HashMap<Unit, RatioMap>;

/// Units of a newly selected category plus the default from/to pair
pub type CategorySelection = (Vec<Unit>, Unit, Unit);

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_unit_equality_by_id() {
        let a = Unit::new(7, "Meter", "m", true, false, false);
        let b = Unit::new(7, "Metre", "m", false, true, true);
        assert_eq!(a, b);

        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }

    #[test]
    fn test_empty_unit() {
        assert!(EMPTY_UNIT.is_empty());
        assert!(Unit::default().is_empty());
        assert!(!Unit::new(0, "Zero", "z", false, false, false).is_empty());
    }

    #[test]
    fn test_accessible_name_defaults_to_name() {
        let unit = Unit::new(1, "Acre", "ac", false, false, false);
        assert_eq!(unit.accessible_name, "Acre");
        let unit = unit.with_accessible_name("Acres");
        assert_eq!(unit.accessible_name, "Acres");
    }

    #[test]
    fn test_category_equality_by_id() {
        assert_eq!(Category::new(4, "Volume", false), Category::new(4, "Vol", true));
        assert_ne!(Category::new(4, "Volume", false), Category::new(5, "Volume", false));
    }

    #[test]
    fn test_static_data_field_names() {
        let json = r#"{"CountryCode":"USA","CountryName":"United States","CurrencyCode":"USD","CurrencyName":"Dollar","CurrencySymbol":"$"}"#;
        let data: CurrencyStaticData = serde_json::from_str(json).unwrap();
        assert_eq!(data.currency_code, "USD");
        assert_eq!(data.currency_symbol, "$");
    }
}
