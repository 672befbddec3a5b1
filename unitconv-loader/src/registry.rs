//! Loader routing

use std::sync::Arc;
use unitconv_core::Category;
use crate::{ConverterDataLoader, CurrencyConverterDataLoader};

/// The currency loader seen through both of its traits
#[derive(Clone)]
pub struct CurrencyHandle {
    pub data: Arc<dyn ConverterDataLoader>,
    pub currency: Arc<dyn CurrencyConverterDataLoader>,
}

/// The standard loader plus an optional currency loader.
///
/// Categories are routed to the currency loader first, so a category it claims
/// never reaches the standard tables.
#[derive(Clone)]
pub struct LoaderSet {
    standard: Arc<dyn ConverterDataLoader>,
    currency: Option<CurrencyHandle>,
}

impl LoaderSet {
    pub fn new<S: ConverterDataLoader + 'static>(standard: S) -> Self {
        Self::from_arc(Arc::new(standard))
    }

    pub fn from_arc(standard: Arc<dyn ConverterDataLoader>) -> Self {
        Self { standard, currency: None }
    }

    pub fn with_currency<C>(mut self, loader: Arc<C>) -> Self
    where
        C: ConverterDataLoader + CurrencyConverterDataLoader + 'static,
    {
        let data: Arc<dyn ConverterDataLoader> = loader.clone();
        let currency: Arc<dyn CurrencyConverterDataLoader> = loader;
        self.currency = Some(CurrencyHandle { data, currency });
        self
    }

    pub fn standard(&self) -> &dyn ConverterDataLoader {
        self.standard.as_ref()
    }

    pub fn currency(&self) -> Option<&CurrencyHandle> {
        self.currency.as_ref()
    }

    /// Whether `category` is served by the currency loader
    pub fn is_currency_category(&self, category: &Category) -> bool {
        self.currency.as_ref().is_some_and(|c| c.data.supports_category(category))
    }

    /// The loader serving `category`, if any
    pub fn for_category(&self, category: &Category) -> Option<&dyn ConverterDataLoader> {
        if let Some(currency) = &self.currency {
            if currency.data.supports_category(category) {
                return Some(currency.data.as_ref());
            }
        }
        if self.standard.supports_category(category) {
            return Some(self.standard.as_ref());
        }
        None
    }
}
