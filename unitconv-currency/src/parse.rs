//! Payload parsing

use std::collections::HashMap;
use serde::Deserialize;
use unitconv_core::{CurrencyRatio, CurrencyStaticData};
use crate::CurrencyError;

/// Every rate in the ratios payload is quoted against this currency
pub(crate) const SOURCE_CURRENCY_CODE: &str = "USD";

#[derive(Deserialize)]
struct RawRatio {
    #[serde(rename = "An")]
    code: String,
    #[serde(rename = "Rt")]
    ratio: f64,
}

/// Both payloads, parsed together
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedPayloads {
    pub static_data: Vec<CurrencyStaticData>,
    pub ratios: HashMap<String, CurrencyRatio>,
}

impl ParsedPayloads {
    /// All-or-nothing: either payload failing discards both
    pub fn parse(static_json: &str, ratios_json: &str) -> Result<Self, CurrencyError> {
        Ok(Self {
            static_data: parse_static_data(static_json)?,
            ratios: parse_ratios(ratios_json)?,
        })
    }
}

/// Country metadata sorted by country name
pub fn parse_static_data(json: &str) -> Result<Vec<CurrencyStaticData>, CurrencyError> {
    let mut data: Vec<CurrencyStaticData> =
        serde_json::from_str(json).map_err(|e| CurrencyError::parse("static data", e))?;
    data.sort_by(|a, b| a.country_name.cmp(&b.country_name));
    Ok(data)
}

/// Rates keyed by target currency code
pub fn parse_ratios(json: &str) -> Result<HashMap<String, CurrencyRatio>, CurrencyError> {
    let raw: Vec<RawRatio> = serde_json::from_str(json).map_err(|e| CurrencyError::parse("ratios", e))?;
    Ok(raw
        .into_iter()
        .map(|r| {
            let ratio = CurrencyRatio {
                ratio: r.ratio,
                source_currency_code: SOURCE_CURRENCY_CODE.to_string(),
                target_currency_code: r.code.clone(),
            };
            (r.code, ratio)
        })
        .collect())
}
