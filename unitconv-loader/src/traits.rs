//! Loader traits

use std::sync::Arc;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use unitconv_core::{Category, RatioMap, Unit};
use crate::CurrencyCallback;

/// How freely the currency loader may touch the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkAccessBehavior {
    /// Unrestricted
    #[default]
    Normal,
    /// Metered connection, fetch only on explicit request
    OptIn,
    /// No connectivity
    Offline,
}

/// Source of categories, units and conversion ratios.
///
/// Lookups never fail: a miss yields an empty result the caller renders as nothing.
pub trait ConverterDataLoader: Send + Sync {
    /// Populate internal tables. Safe to call more than once.
    fn load_data(&self);
    fn ordered_categories(&self) -> Vec<Category>;
    fn ordered_units(&self, category: &Category) -> Vec<Unit>;
    fn ordered_ratios(&self, unit: &Unit) -> RatioMap;
    fn supports_category(&self, category: &Category) -> bool;
}

/// Currency specific operations on top of [`ConverterDataLoader`].
#[async_trait]
pub trait CurrencyConverterDataLoader: Send + Sync {
    fn set_view_model_callback(&self, callback: Arc<dyn CurrencyCallback>);

    /// Symbols of both units, or two empty strings unless both are known
    fn currency_symbols(&self, from: &Unit, to: &Unit) -> (String, String);

    /// Short and long "1 X = r Y" strings, or two empty strings unless both are known
    fn currency_ratio_equality(&self, from: &Unit, to: &Unit) -> (String, String);

    /// Human readable time of the loaded rates, empty when nothing is loaded
    fn currency_timestamp(&self) -> String;

    /// Remember the pair as the last used currencies
    fn save_selected_units(&self, from: &Unit, to: &Unit);

    async fn try_load_data_from_cache(&self) -> bool;
    async fn try_load_data_from_web(&self) -> bool;
    /// Same as [`Self::try_load_data_from_web`] but ignores metered gating
    async fn try_load_data_from_web_override(&self) -> bool;
}
