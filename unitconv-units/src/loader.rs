//! Standard data loader backed by the static unit tables

use std::collections::HashMap;
use std::sync::RwLock;
use tracing::debug;
use unitconv_core::{ids, Category, ConversionData, RatioMap, Unit};
use unitconv_loader::ConverterDataLoader;
use crate::{UnitTable, UnitsConfig};

/// Tables materialized by `load_data`
#[derive(Default)]
struct Loaded {
    categories: Vec<Category>,
    units: HashMap<i32, Vec<Unit>>,
    ratios: HashMap<i32, RatioMap>,
}

/// Serves every built-in category except currency.
pub struct StandardDataLoader {
    config: UnitsConfig,
    loaded: RwLock<Loaded>,
}

impl StandardDataLoader {
    pub fn new(config: UnitsConfig) -> Self {
        Self { config, loaded: RwLock::new(Loaded::default()) }
    }

    pub fn config(&self) -> &UnitsConfig {
        &self.config
    }

    fn build(&self) -> Loaded {
        let table = UnitTable::new(&self.config);
        let mut loaded = Loaded { categories: table.categories().to_vec(), ..Loaded::default() };

        for category in table.categories() {
            let units: Vec<Unit> = table.ordered_units(category.id).into_iter().map(|u| u.unit).collect();
            for from in &units {
                let ratios = units.iter()
                    .map(|to| (to.clone(), Self::conversion(&table, from, to)))
                    .collect();
                loaded.ratios.insert(from.id, ratios);
            }
            loaded.units.insert(category.id, units);
        }
        loaded
    }

    /// Explicit affine data when present, otherwise `from factor / to factor`
    fn conversion(table: &UnitTable, from: &Unit, to: &Unit) -> ConversionData {
        if let Some(explicit) = table.explicit(from.id, to.id) {
            return explicit;
        }
        match (table.factor(from.id), table.factor(to.id)) {
            (Some(source), Some(target)) => ConversionData::linear(source / target),
            _ => ConversionData::identity(),
        }
    }
}

impl Default for StandardDataLoader {
    fn default() -> Self {
        Self::new(UnitsConfig::default())
    }
}

impl ConverterDataLoader for StandardDataLoader {
    fn load_data(&self) {
        let loaded = self.build();
        debug!(region = %self.config.region, categories = loaded.categories.len(), "standard unit tables loaded");
        let mut guard = self.loaded.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = loaded;
    }

    fn ordered_categories(&self) -> Vec<Category> {
        let guard = self.loaded.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.categories.clone()
    }

    fn ordered_units(&self, category: &Category) -> Vec<Unit> {
        let guard = self.loaded.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.units.get(&category.id).cloned().unwrap_or_default()
    }

    fn ordered_ratios(&self, unit: &Unit) -> RatioMap {
        let guard = self.loaded.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.ratios.get(&unit.id).cloned().unwrap_or_default()
    }

    fn supports_category(&self, category: &Category) -> bool {
        category.id != ids::CURRENCY
    }
}
