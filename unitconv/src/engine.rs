//! The conversion engine

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};
use unitconv_core::format::{round_significant, to_scientific, trim_trailing_zeros};
use unitconv_core::{convert, Category, CategorySelection, ConverterError, Unit, UnitRatioMap, EMPTY_UNIT};
use unitconv_loader::{ConverterCallback, CurrencyCallback, LoaderSet};
use crate::codec::{EngineState, Preferences};
use crate::Command;

/// Digits kept in either entry buffer
pub const MAXIMUM_DIGITS_ALLOWED: usize = 15;
/// Significant digits aimed for while the input is short
pub const OPTIMAL_DIGITS_ALLOWED: usize = 7;

const OPTIMAL_DECIMAL_ALLOWED: f64 = 1e-6;
const MINIMUM_DECIMAL_ALLOWED: f64 = 1e-14;

/// Converted value for one suggested unit, before formatting
struct Suggestion {
    magnitude: f64,
    value: f64,
    unit: Unit,
}

/// Closest magnitude to the input first; on a tie the larger value wins
fn by_magnitude(a: &Suggestion, b: &Suggestion) -> Ordering {
    let (abs_a, abs_b) = (a.magnitude.abs(), b.magnitude.abs());
    let ordering = if abs_a == abs_b {
        b.magnitude.partial_cmp(&a.magnitude)
    } else {
        abs_a.partial_cmp(&abs_b)
    };
    ordering.unwrap_or(Ordering::Equal)
}

fn round_suggested(value: f64) -> String {
    let digits = if value.abs() < 100.0 {
        2
    } else if value.abs() < 1000.0 {
        1
    } else {
        0
    };
    let mut rounded = round_significant(value, digits);
    trim_trailing_zeros(&mut rounded);
    rounded
}

fn parse_display(display: &str) -> f64 {
    display.parse().unwrap_or(0.0)
}

/// Stateful converter driven by entry commands.
///
/// Owns the current category, the from/to pair and both entry buffers. All
/// display updates go to the registered [`ConverterCallback`].
pub struct UnitConverter {
    loaders: LoaderSet,
    callback: Option<Arc<dyn ConverterCallback>>,
    currency_callback: Option<Arc<dyn CurrencyCallback>>,

    categories: Vec<Category>,
    category_units: HashMap<Category, Vec<Unit>>,
    ratio_map: UnitRatioMap,

    current_category: Category,
    from: Unit,
    to: Unit,
    current_display: String,
    return_display: String,
    current_has_decimal: bool,
    return_has_decimal: bool,
    switched_active: bool,
}

impl UnitConverter {
    pub fn new(loaders: LoaderSet) -> Self {
        let mut converter = Self {
            loaders,
            callback: None,
            currency_callback: None,
            categories: Vec::new(),
            category_units: HashMap::new(),
            ratio_map: UnitRatioMap::new(),
            current_category: Category::default(),
            from: EMPTY_UNIT,
            to: EMPTY_UNIT,
            current_display: "0".to_string(),
            return_display: "0".to_string(),
            current_has_decimal: false,
            return_has_decimal: false,
            switched_active: false,
        };
        converter.reset();
        converter
    }

    /// Converter over the built-in unit tables only
    pub fn with_standard_units(config: unitconv_units::UnitsConfig) -> Self {
        Self::new(LoaderSet::new(unitconv_units::StandardDataLoader::new(config)))
    }

    /// Cold start: load the standard tables and select the first ready category.
    /// Discards any session state.
    pub fn initialize(&mut self) {
        self.loaders.standard().load_data();
        self.reset();
    }

    /// Categories are loaded and a selection exists
    pub fn is_ready(&self) -> bool {
        !self.categories.is_empty()
    }

    fn check_load(&mut self) -> bool {
        if self.categories.is_empty() {
            self.reset();
        }
        !self.categories.is_empty()
    }

    pub fn categories(&mut self) -> Vec<Category> {
        self.check_load();
        self.categories.clone()
    }

    /// Units of `category` in display order, empty when nothing serves it
    pub fn category_units(&mut self, category: &Category) -> Vec<Unit> {
        self.check_load();
        self.category_units.get(category).cloned().unwrap_or_default()
    }

    pub fn current_category(&self) -> &Category {
        &self.current_category
    }

    pub fn from_unit(&self) -> &Unit {
        &self.from
    }

    pub fn to_unit(&self) -> &Unit {
        &self.to
    }

    /// Value being edited and the converted value
    pub fn displays(&self) -> (&str, &str) {
        (&self.current_display, &self.return_display)
    }

    pub fn switched_active(&self) -> bool {
        self.switched_active
    }

    /// Switch category, returning its units and default from/to.
    ///
    /// The outgoing category remembers its pair for when it is selected again.
    pub fn set_current_category(&mut self, category: &Category) -> CategorySelection {
        if let Some(currency) = self.loaders.currency() {
            if currency.data.supports_category(category) {
                currency.data.load_data();
            }
        }

        let mut units = Vec::new();
        if self.check_load() {
            if self.current_category.id != category.id {
                self.remember_selection();
                self.current_category = self
                    .categories
                    .iter()
                    .find(|c| c.id == category.id)
                    .cloned()
                    .unwrap_or_else(|| category.clone());
                self.clear_values();
                self.switched_active = false;
                debug!(category = self.current_category.id, "category selected");
            }
            units = self.category_units.get(category).cloned().unwrap_or_default();
        }

        self.initialize_selected_units();
        self.calculate();
        (units, self.from.clone(), self.to.clone())
    }

    /// Change the pair without touching the buffers
    pub fn set_current_unit_types(&mut self, from: &Unit, to: &Unit) {
        if !self.check_load() {
            return;
        }
        self.from = from.clone();
        self.to = to.clone();
        self.calculate();
        self.update_currency_symbols();
        self.update_view_model();
    }

    /// Make the other side the input; `new_value` becomes the edit buffer.
    /// Anything that is not a finite number is taken as "0".
    pub fn switch_active(&mut self, new_value: &str) {
        if !self.check_load() {
            return;
        }
        let new_value = match new_value.parse::<f64>() {
            Ok(value) if value.is_finite() => new_value.to_string(),
            _ => {
                debug!(value = new_value, "non-numeric switch value");
                "0".to_string()
            }
        };
        std::mem::swap(&mut self.from, &mut self.to);
        std::mem::swap(&mut self.current_has_decimal, &mut self.return_has_decimal);
        self.return_display = std::mem::replace(&mut self.current_display, new_value);
        self.current_has_decimal = self.current_display.contains('.');
        self.switched_active = true;

        if self.is_currency_selected() {
            if let (Some(currency), Some(callback)) = (self.loaders.currency(), &self.currency_callback) {
                let (ratio, accessible) = currency.currency.currency_ratio_equality(&self.from, &self.to);
                callback.currency_ratios_callback(&ratio, &accessible);
            }
        }
    }

    pub fn send_command(&mut self, command: Command) {
        if !self.check_load() {
            return;
        }

        let mut clear_front = self.current_display == "0" || self.current_display == "-0";
        let digits = self.current_display.trim_start_matches('-').len();
        let mut clear_back = if self.current_has_decimal {
            digits.saturating_sub(1) >= MAXIMUM_DIGITS_ALLOWED
        } else {
            digits >= MAXIMUM_DIGITS_ALLOWED
        };
        if command != Command::Negate && self.switched_active {
            self.clear_values();
            self.switched_active = false;
            clear_front = true;
            clear_back = false;
        }

        match command {
            Command::Decimal => {
                clear_front = false;
                clear_back = false;
                if !self.current_has_decimal {
                    self.current_display.push('.');
                    self.current_has_decimal = true;
                }
            }
            Command::Backspace => {
                clear_front = false;
                clear_back = false;
                let negative = self.current_display.starts_with('-');
                if (!negative && self.current_display.len() > 1) || self.current_display.len() > 2 {
                    if self.current_display.pop() == Some('.') {
                        self.current_has_decimal = false;
                    }
                } else {
                    self.current_display = "0".to_string();
                    self.current_has_decimal = false;
                }
            }
            Command::Negate => {
                clear_front = false;
                clear_back = false;
                if self.current_category.supports_negative {
                    match self.current_display.strip_prefix('-') {
                        Some(rest) => self.current_display = rest.to_string(),
                        None => self.current_display.insert(0, '-'),
                    }
                }
            }
            Command::Clear => {
                clear_front = false;
                clear_back = false;
                self.clear_values();
            }
            Command::Reset => {
                clear_front = false;
                clear_back = false;
                self.clear_values();
                self.reset();
            }
            digit => {
                if let Some(c) = digit.digit_char() {
                    self.current_display.push(c);
                }
            }
        }

        if clear_front {
            // Drop the placeholder zero, keeping a leading sign
            let zero = usize::from(self.current_display.starts_with('-'));
            self.current_display.remove(zero);
        }
        if clear_back {
            self.current_display.pop();
            if let Some(callback) = &self.callback {
                callback.max_digits_reached();
            }
        }

        self.calculate();
        self.update_view_model();
    }

    pub fn set_view_model_callback(&mut self, callback: Arc<dyn ConverterCallback>) {
        self.callback = Some(callback);
        if self.check_load() {
            self.update_view_model();
        }
    }

    /// Route currency status to `callback`; also registers it with the currency loader
    pub fn set_view_model_currency_callback(&mut self, callback: Arc<dyn CurrencyCallback>) {
        if let Some(currency) = self.loaders.currency() {
            currency.currency.set_view_model_callback(callback.clone());
        }
        self.currency_callback = Some(callback);
    }

    /// Force a web fetch of currency rates, then reload tables keeping the selection.
    /// Returns whether the fetch succeeded and the rates timestamp.
    pub async fn refresh_currency_ratios(&mut self) -> (bool, String) {
        let Some(currency) = self.loaders.currency().cloned() else {
            return (false, String::new());
        };

        let did_load = currency.currency.try_load_data_from_web_override().await;
        let timestamp = currency.currency.currency_timestamp();
        if did_load {
            self.reset_categories_and_ratios();
        }
        if let Some(callback) = &self.currency_callback {
            callback.currency_data_load_finished(did_load);
        }
        (did_load, timestamp)
    }

    /// Reload every category from its loader. The current category, pair and
    /// buffers survive when the units still exist.
    pub fn reset_categories_and_ratios(&mut self) {
        let category = self.current_category.clone();
        let (from, to) = (self.from.clone(), self.to.clone());
        let current_display = self.current_display.clone();
        let current_has_decimal = self.current_has_decimal;

        self.reset();
        if let Some(known) = self.categories.iter().find(|c| c.id == category.id).cloned() {
            let units = self.category_units.get(&known).cloned().unwrap_or_default();
            self.current_category = known;
            match (units.iter().find(|u| u.id == from.id), units.iter().find(|u| u.id == to.id)) {
                (Some(from), Some(to)) => {
                    self.from = from.clone();
                    self.to = to.clone();
                }
                _ => self.initialize_selected_units(),
            }
            self.current_display = current_display;
            self.current_has_decimal = current_has_decimal;
            self.calculate();
        }

        self.update_currency_symbols();
        self.update_view_model();
    }

    /// Suggested values in every other unit of the category, closest magnitude first.
    /// At most one whimsical unit is appended. Currency gets none.
    pub fn calculate_suggested(&self) -> Vec<(String, Unit)> {
        if self.is_currency_selected() {
            return Vec::new();
        }
        let (Some(ratios), Some(units)) = (self.ratio_map.get(&self.from), self.category_units.get(&self.current_category)) else {
            return Vec::new();
        };

        let value = parse_display(&self.current_display);
        let mut regular = Vec::new();
        let mut whimsical = Vec::new();
        for unit in units.iter().filter(|u| **u != self.from) {
            let Some(data) = ratios.get(unit) else {
                continue;
            };
            let converted = convert(value, data);
            let entry = Suggestion { magnitude: converted.abs().log10(), value: converted, unit: unit.clone() };
            if unit.is_whimsical {
                whimsical.push(entry);
            } else {
                regular.push(entry);
            }
        }
        regular.sort_by(by_magnitude);
        whimsical.sort_by(by_magnitude);

        let supports_negative = self.current_category.supports_negative;
        let mut suggested: Vec<(String, Unit)> = regular
            .into_iter()
            .map(|entry| (round_suggested(entry.value), entry.unit))
            .filter(|(rounded, _)| parse_display(rounded) != 0.0 || supports_negative)
            .collect();

        let best_whimsical = whimsical.into_iter().find_map(|entry| {
            let fits = entry.value.is_finite() && entry.value.abs() < 10f64.powi(MAXIMUM_DIGITS_ALLOWED as i32);
            let rounded = round_suggested(entry.value);
            (fits && parse_display(&rounded) != 0.0).then_some((rounded, entry.unit))
        });
        suggested.extend(best_whimsical);
        suggested
    }

    pub fn serialize(&mut self) -> String {
        if !self.check_load() {
            return String::new();
        }
        EngineState {
            category: self.current_category.clone(),
            from: self.from.clone(),
            to: self.to.clone(),
            current_has_decimal: self.current_has_decimal,
            return_has_decimal: self.return_has_decimal,
            switched_active: self.switched_active,
            current_display: self.current_display.clone(),
            return_display: self.return_display.clone(),
            currency_fresh: self.currency_loaded(),
        }
        .encode()
    }

    /// Restore a session. Malformed input leaves the engine freshly reset.
    pub fn deserialize(&mut self, serialized: &str) {
        self.reset();
        if serialized.is_empty() {
            return;
        }

        match EngineState::decode(serialized).and_then(|state| self.apply_state(state)) {
            Ok(()) => debug!(category = self.current_category.id, "session restored"),
            Err(e) => {
                warn!(error = %e, code = e.code(), "discarding malformed converter state");
                self.reset();
            }
        }
        if self.callback.is_some() {
            self.update_view_model();
        }
    }

    fn apply_state(&mut self, state: EngineState) -> Result<(), ConverterError> {
        let (category, from, to) = self.resolve(&state.category, &state.from, &state.to)?;

        self.current_category = category;
        self.from = from;
        self.to = to;
        self.current_has_decimal = state.current_has_decimal;
        self.return_has_decimal = state.return_has_decimal;
        self.switched_active = state.switched_active;
        self.current_display = state.current_display;
        self.return_display = state.return_display;

        if state.currency_fresh && self.is_currency_selected() && !self.currency_loaded() {
            if let Some(currency) = self.loaders.currency() {
                currency.data.load_data();
            }
        }
        Ok(())
    }

    /// Known instances for a persisted selection. Currency units may not be
    /// loaded yet, so they are accepted as persisted.
    fn resolve(&self, category: &Category, from: &Unit, to: &Unit) -> Result<(Category, Unit, Unit), ConverterError> {
        let category = self
            .categories
            .iter()
            .find(|c| c.id == category.id)
            .cloned()
            .ok_or(ConverterError::UnknownCategory(category.id))?;
        let units = self.category_units.get(&category).map(Vec::as_slice).unwrap_or_default();
        let lenient = self.loaders.is_currency_category(&category);

        let find = |unit: &Unit| -> Result<Unit, ConverterError> {
            if unit.is_empty() {
                return Ok(EMPTY_UNIT);
            }
            match units.iter().find(|u| u.id == unit.id) {
                Some(known) => Ok(known.clone()),
                None if lenient => Ok(unit.clone()),
                None => Err(ConverterError::UnknownUnit(unit.id)),
            }
        };
        Ok((category, find(from)?, find(to)?))
    }

    /// Current category and pair, without the buffers
    pub fn save_user_preferences(&self) -> String {
        Preferences { category: self.current_category.clone(), from: self.from.clone(), to: self.to.clone() }.encode()
    }

    /// Apply saved preferences. Anything unreadable or unknown is ignored.
    pub fn restore_user_preferences(&mut self, preferences: &str) {
        if preferences.is_empty() || !self.check_load() {
            return;
        }
        let restored = Preferences::decode(preferences)
            .and_then(|prefs| self.resolve(&prefs.category, &prefs.from, &prefs.to));
        match restored {
            Ok((category, from, to)) => {
                if category.id != self.current_category.id {
                    self.remember_selection();
                    self.clear_values();
                }
                self.current_category = category;
                self.from = from;
                self.to = to;
                self.remember_selection();
                self.calculate();
                if self.callback.is_some() {
                    self.update_view_model();
                }
            }
            Err(e) => warn!(error = %e, code = e.code(), "ignoring user preferences"),
        }
    }

    /// Rebuild every table from the loaders and select the first ready category
    fn reset(&mut self) {
        self.categories = self.loaders.standard().ordered_categories();
        self.clear_values();
        self.switched_active = false;
        self.category_units.clear();
        self.ratio_map.clear();

        let Some(first) = self.categories.first() else {
            return;
        };
        self.current_category = first.clone();

        let mut ready_found = false;
        for category in &self.categories {
            let Some(loader) = self.loaders.for_category(category) else {
                continue;
            };
            let units = loader.ordered_units(category);
            if !units.is_empty() {
                for unit in &units {
                    self.ratio_map.insert(unit.clone(), loader.ordered_ratios(unit));
                }
                if !ready_found {
                    self.current_category = category.clone();
                    ready_found = true;
                }
            }
            self.category_units.insert(category.clone(), units);
        }

        self.initialize_selected_units();
        self.calculate();
    }

    /// First source and first target unit of the current category, or EMPTY_UNIT for both
    fn initialize_selected_units(&mut self) {
        let units = self.category_units.get(&self.current_category);
        let from = units.and_then(|u| u.iter().find(|u| u.is_conversion_source));
        let to = units.and_then(|u| u.iter().find(|u| u.is_conversion_target));
        (self.from, self.to) = match (from, to) {
            (Some(from), Some(to)) => (from.clone(), to.clone()),
            _ => (EMPTY_UNIT, EMPTY_UNIT),
        };
    }

    /// Flag the current pair as the category's defaults
    fn remember_selection(&mut self) {
        let (from, to) = (self.from.id, self.to.id);
        let Some(units) = self.category_units.get_mut(&self.current_category) else {
            return;
        };
        if !units.iter().any(|u| u.id == from) || !units.iter().any(|u| u.id == to) {
            return;
        }
        for unit in units.iter_mut() {
            unit.is_conversion_source = unit.id == from;
            unit.is_conversion_target = unit.id == to;
        }
    }

    fn clear_values(&mut self) {
        self.current_has_decimal = false;
        self.return_has_decimal = false;
        self.current_display = "0".to_string();
    }

    fn any_unit_is_empty(&self) -> bool {
        self.from.is_empty() || self.to.is_empty()
    }

    fn is_currency_selected(&self) -> bool {
        self.loaders.is_currency_category(&self.current_category)
    }

    fn currency_loaded(&self) -> bool {
        self.category_units
            .iter()
            .any(|(category, units)| !units.is_empty() && self.loaders.is_currency_category(category))
    }

    /// Recompute the converted display from the edit buffer
    fn calculate(&mut self) {
        let data = self.ratio_map.get(&self.from).and_then(|ratios| ratios.get(&self.to)).copied();
        let data = match data {
            Some(data) if !self.any_unit_is_empty() && !data.is_identity() => data,
            _ => {
                self.return_display = self.current_display.clone();
                trim_trailing_zeros(&mut self.return_display);
                self.return_has_decimal = self.return_display.contains('.');
                return;
            }
        };

        let result = convert(parse_display(&self.current_display), &data);
        let mut display = round_significant(result, MAXIMUM_DIGITS_ALLOWED);
        trim_trailing_zeros(&mut display);
        let mut pre_decimal = display.find('.').unwrap_or(display.len());
        if result < 0.0 {
            pre_decimal = pre_decimal.saturating_sub(1);
        }

        if pre_decimal > MAXIMUM_DIGITS_ALLOWED || (result != 0.0 && result.abs() < MINIMUM_DECIMAL_ALLOWED) {
            display = to_scientific(result);
        } else {
            let rounded = display.parse::<f64>().unwrap_or(result);
            let digits = if self.current_display.len() <= OPTIMAL_DIGITS_ALLOWED && rounded.abs() >= OPTIMAL_DECIMAL_ALLOWED {
                OPTIMAL_DIGITS_ALLOWED - pre_decimal.min(OPTIMAL_DIGITS_ALLOWED)
            } else {
                MAXIMUM_DIGITS_ALLOWED - pre_decimal.min(MAXIMUM_DIGITS_ALLOWED)
            };
            display = round_significant(rounded, digits);
            trim_trailing_zeros(&mut display);
        }

        self.return_display = display;
        self.return_has_decimal = self.return_display.contains('.');
    }

    fn update_currency_symbols(&self) {
        if !self.is_currency_selected() || self.any_unit_is_empty() {
            return;
        }
        let Some(currency) = self.loaders.currency() else {
            return;
        };
        currency.currency.save_selected_units(&self.from, &self.to);

        if let Some(callback) = &self.currency_callback {
            let (from_symbol, to_symbol) = currency.currency.currency_symbols(&self.from, &self.to);
            let (ratio, accessible) = currency.currency.currency_ratio_equality(&self.from, &self.to);
            callback.currency_symbols_callback(&from_symbol, &to_symbol);
            callback.currency_ratios_callback(&ratio, &accessible);
        }
    }

    fn update_view_model(&self) {
        if let Some(callback) = &self.callback {
            callback.display_callback(&self.current_display, &self.return_display);
            callback.suggested_value_callback(&self.calculate_suggested());
        }
    }
}
