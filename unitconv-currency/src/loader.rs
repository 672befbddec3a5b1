//! Currency data loader

use std::collections::{HashMap, HashSet};
use std::fmt::Display;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use async_trait::async_trait;
use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use serde::Deserialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use unitconv_core::{ids, Category, ConversionData, RatioMap, Unit};
use unitconv_loader::{ConverterDataLoader, CurrencyCallback, CurrencyConverterDataLoader, NetworkAccessBehavior};
use crate::parse::SOURCE_CURRENCY_CODE;
use crate::settings::keys;
use crate::{format_ratio, round_currency_ratio, CurrencyConfig, CurrencyError, CurrencyHttpClient, LocalSettings, ParsedPayloads};

const DEFAULT_FROM_CURRENCY: &str = SOURCE_CURRENCY_CODE;
const DEFAULT_TO_CURRENCY: &str = "EUR";

const DEFAULT_FROM_TO_JSON: &str = include_str!("../data/default_from_to.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CurrencyLoadStatus {
    #[default]
    NotLoaded,
    FailedToLoad,
    LoadedFromCache,
    LoadedFromWeb,
}

#[derive(Debug, Clone, Deserialize)]
struct RegionalDefault {
    from: String,
    to: String,
}

/// Finalized units and ratios. Replaced wholesale, never patched.
#[derive(Default)]
struct Tables {
    generation: u64,
    units: Vec<Unit>,
    ratios: HashMap<Unit, RatioMap>,
    symbols: HashMap<Unit, String>,
}

#[derive(Default)]
struct LoaderState {
    status: CurrencyLoadStatus,
    timestamp: Option<DateTime<Utc>>,
    behavior: NetworkAccessBehavior,
    metered_override: bool,
}

struct Inner {
    config: CurrencyConfig,
    client: Arc<dyn CurrencyHttpClient>,
    settings: Arc<dyn LocalSettings>,
    regional_defaults: HashMap<String, RegionalDefault>,
    tables: Mutex<Tables>,
    state: Mutex<LoaderState>,
    callback: Mutex<Option<Arc<dyn CurrencyCallback>>>,
    generation: AtomicU64,
}

/// Loader for the currency category.
///
/// Cheap to clone; clones share tables, status and callback.
#[derive(Clone)]
pub struct CurrencyDataLoader {
    inner: Arc<Inner>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Whether `timestamp` is strictly more than `duration` before `now`
pub fn is_older_than(timestamp: DateTime<Utc>, now: DateTime<Utc>, duration: Duration) -> bool {
    match TimeDelta::from_std(duration) {
        Ok(limit) => now.signed_duration_since(timestamp) > limit,
        Err(_) => false,
    }
}

/// "Updated Mar 5, 2024 2:07 PM"
pub fn format_timestamp<Tz: TimeZone>(timestamp: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    format!("Updated {}", timestamp.format("%b %-d, %Y %-I:%M %p"))
}

impl CurrencyDataLoader {
    pub fn new(config: CurrencyConfig, client: Arc<dyn CurrencyHttpClient>, settings: Arc<dyn LocalSettings>) -> Self {
        client.set_source_currency_code(SOURCE_CURRENCY_CODE);
        client.set_response_language(&config.language);

        let regional_defaults = serde_json::from_str(DEFAULT_FROM_TO_JSON).unwrap_or_else(|e| {
            warn!(error = %e, "regional currency defaults unreadable");
            HashMap::new()
        });

        Self {
            inner: Arc::new(Inner {
                config,
                client,
                settings,
                regional_defaults,
                tables: Mutex::new(Tables::default()),
                state: Mutex::new(LoaderState::default()),
                callback: Mutex::new(None),
                generation: AtomicU64::new(0),
            }),
        }
    }

    pub fn config(&self) -> &CurrencyConfig {
        &self.inner.config
    }

    pub fn status(&self) -> CurrencyLoadStatus {
        lock(&self.inner.state).status
    }

    pub fn load_finished(&self) -> bool {
        self.status() != CurrencyLoadStatus::NotLoaded
    }

    pub fn loaded_from_cache(&self) -> bool {
        self.status() == CurrencyLoadStatus::LoadedFromCache
    }

    pub fn loaded_from_web(&self) -> bool {
        self.status() == CurrencyLoadStatus::LoadedFromWeb
    }

    pub fn network_behavior(&self) -> NetworkAccessBehavior {
        lock(&self.inner.state).behavior
    }

    /// Record a connectivity change and republish it to the view model
    pub fn set_network_behavior(&self, behavior: NetworkAccessBehavior) {
        lock(&self.inner.state).behavior = behavior;
        debug!(?behavior, "network behavior changed");
        if let Some(callback) = self.callback() {
            callback.network_behavior_changed(behavior);
        }
    }

    /// Track a stream of connectivity changes until the sender goes away
    pub fn follow_network_behavior(&self, mut rx: watch::Receiver<NetworkAccessBehavior>) -> JoinHandle<()> {
        let loader = self.clone();
        tokio::spawn(async move {
            let initial = *rx.borrow_and_update();
            loader.set_network_behavior(initial);
            while rx.changed().await.is_ok() {
                let behavior = *rx.borrow_and_update();
                loader.set_network_behavior(behavior);
            }
        })
    }

    /// Cache first, then web. Reports the outcome to the view model exactly once.
    pub async fn load(&self) -> bool {
        let mut did_load = self.try_load_data_from_cache().await;
        if !did_load {
            did_load = self.try_load_data_from_web().await;
        }
        self.update_displayed_timestamp();
        self.notify_data_load_finished(did_load);
        did_load
    }

    fn callback(&self) -> Option<Arc<dyn CurrencyCallback>> {
        lock(&self.inner.callback).clone()
    }

    fn reset_status(&self) {
        lock(&self.inner.state).status = CurrencyLoadStatus::NotLoaded;
    }

    fn next_generation(&self) -> u64 {
        self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// A load newer than `generation` already installed its tables
    fn is_superseded(&self, generation: u64) -> bool {
        generation < lock(&self.inner.tables).generation
    }

    fn notify_data_load_finished(&self, did_load: bool) {
        if !did_load {
            lock(&self.inner.state).status = CurrencyLoadStatus::FailedToLoad;
        }
        if let Some(callback) = self.callback() {
            callback.currency_data_load_finished(did_load);
        }
    }

    fn update_displayed_timestamp(&self) {
        let Some(callback) = self.callback() else {
            return;
        };
        let timestamp = lock(&self.inner.state).timestamp;
        let is_week_old = timestamp
            .map(|t| is_older_than(t, Utc::now(), self.inner.config.week_duration))
            .unwrap_or(true);
        callback.currency_timestamp_callback(&self.currency_timestamp(), is_week_old);
    }

    async fn load_from_cache(&self) -> Result<(), CurrencyError> {
        let generation = self.next_generation();
        let settings = &self.inner.settings;

        let stamp = settings.get(keys::CACHE_TIMESTAMP_KEY).ok_or(CurrencyError::MissingTimestamp)?;
        let timestamp = DateTime::parse_from_rfc3339(&stamp)
            .map_err(|e| CurrencyError::parse("cache timestamp", e))?
            .with_timezone(&Utc);
        if is_older_than(timestamp, Utc::now(), self.inner.config.day_duration) {
            return Err(CurrencyError::StaleCache);
        }

        let cached = settings.get(keys::CACHE_LANGCODE_KEY);
        if cached.as_deref() != Some(self.inner.config.language.as_str()) {
            return Err(CurrencyError::LanguageMismatch { cached, current: self.inner.config.language.clone() });
        }

        let static_json = settings.read_cache_file(keys::STATIC_DATA_FILENAME).await?;
        let ratios_json = settings.read_cache_file(keys::ALL_RATIOS_DATA_FILENAME).await?;
        let parsed = ParsedPayloads::parse(&static_json, &ratios_json)?;

        {
            let mut state = lock(&self.inner.state);
            state.timestamp = Some(timestamp);
            state.status = CurrencyLoadStatus::LoadedFromCache;
        }
        self.finalize_units(generation, parsed);
        Ok(())
    }

    async fn load_from_web(&self, bypass_gating: bool) -> Result<(), CurrencyError> {
        let generation = self.next_generation();
        if !bypass_gating {
            let state = lock(&self.inner.state);
            match state.behavior {
                NetworkAccessBehavior::Offline => return Err(CurrencyError::NetworkGated(state.behavior)),
                NetworkAccessBehavior::OptIn if !state.metered_override => {
                    return Err(CurrencyError::NetworkGated(state.behavior));
                }
                _ => {}
            }
        }

        let static_json = self.inner.client.get_currency_metadata().await?;
        let ratios_json = self.inner.client.get_currency_ratios().await?;
        let parsed = ParsedPayloads::parse(&static_json, &ratios_json)?;
        if self.is_superseded(generation) {
            debug!(generation, "newer currency tables installed, dropping web payloads");
            return Ok(());
        }

        let now = Utc::now();
        if let Err(e) = self.write_cache(&static_json, &ratios_json, now).await {
            warn!(error = %e, "failed to write currency cache");
        }

        {
            let mut state = lock(&self.inner.state);
            state.timestamp = Some(now);
            state.status = CurrencyLoadStatus::LoadedFromWeb;
        }
        self.finalize_units(generation, parsed);
        Ok(())
    }

    async fn write_cache(&self, static_json: &str, ratios_json: &str, now: DateTime<Utc>) -> Result<(), CurrencyError> {
        let settings = &self.inner.settings;
        settings.write_cache_file(keys::STATIC_DATA_FILENAME, static_json).await?;
        settings.write_cache_file(keys::ALL_RATIOS_DATA_FILENAME, ratios_json).await?;
        settings.set(keys::CACHE_TIMESTAMP_KEY, &now.to_rfc3339())?;
        settings.set(keys::CACHE_LANGCODE_KEY, &self.inner.config.language)?;
        Ok(())
    }

    /// Preferred from/to pairs, best first
    fn default_candidates(&self) -> Vec<(String, String)> {
        let settings = &self.inner.settings;
        let mut candidates = Vec::with_capacity(3);

        if let (Some(from), Some(to)) = (settings.get(keys::CURRENCY_UNIT_FROM_KEY), settings.get(keys::CURRENCY_UNIT_TO_KEY)) {
            candidates.push((from, to));
        }

        let language = &self.inner.config.language;
        let regional = self.inner.regional_defaults.get(language).or_else(|| {
            self.inner
                .regional_defaults
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(language))
                .map(|(_, pair)| pair)
        });
        if let Some(pair) = regional {
            candidates.push((pair.from.clone(), pair.to.clone()));
        }

        candidates.push((DEFAULT_FROM_CURRENCY.to_string(), DEFAULT_TO_CURRENCY.to_string()));
        candidates
    }

    /// Turn parsed payloads into units and a complete ratio table, then install them
    /// unless a newer load already has.
    fn finalize_units(&self, generation: u64, parsed: ParsedPayloads) {
        let rtl = self.inner.config.is_rtl_language();

        let mut units = Vec::new();
        let mut rates = Vec::new();
        let mut symbols = HashMap::new();
        for data in &parsed.static_data {
            let Some(rate) = parsed.ratios.get(&data.currency_code) else {
                continue;
            };
            if rate.ratio <= 0.0 {
                continue;
            }

            let id = ids::CURRENCY_UNIT_BASE + units.len() as i32 + 1;
            let (name, accessible_name) = if rtl {
                (format!("{} - {}", data.currency_name, data.country_name), format!("{} {}", data.currency_name, data.country_name))
            } else {
                (format!("{} - {}", data.country_name, data.currency_name), format!("{} {}", data.country_name, data.currency_name))
            };
            let unit = Unit::new(id, name, data.currency_code.clone(), false, false, false)
                .with_accessible_name(accessible_name);

            symbols.insert(unit.clone(), data.currency_symbol.clone());
            rates.push(rate.ratio);
            units.push(unit);
        }

        let codes: HashSet<&str> = units.iter().map(|u| u.abbreviation.as_str()).collect();
        let selected = self
            .default_candidates()
            .into_iter()
            .find(|(from, to)| codes.contains(from.as_str()) && codes.contains(to.as_str()));

        if let Some((from, to)) = &selected {
            if let Some(unit) = units.iter_mut().find(|u| &u.abbreviation == from) {
                unit.is_conversion_source = true;
            }
            if let Some(unit) = units.iter_mut().find(|u| &u.abbreviation == to) {
                unit.is_conversion_target = true;
            }
        }

        let mut ratios = HashMap::with_capacity(units.len());
        for (source, source_rate) in units.iter().zip(&rates) {
            debug_assert!(*source_rate > 0.0);
            let map: RatioMap = units
                .iter()
                .zip(&rates)
                .map(|(target, target_rate)| {
                    (target.clone(), ConversionData::linear(round_currency_ratio(target_rate / source_rate)))
                })
                .collect();
            ratios.insert(source.clone(), map);
        }

        {
            let mut tables = lock(&self.inner.tables);
            if generation < tables.generation {
                debug!(generation, current = tables.generation, "discarding superseded currency tables");
                return;
            }
            *tables = Tables { generation, units, ratios, symbols };
            info!(currencies = tables.units.len(), "currency tables finalized");
        }

        if let Some((from, to)) = selected {
            self.save_selected_codes(&from, &to);
        }
    }

    fn save_selected_codes(&self, from: &str, to: &str) {
        let settings = &self.inner.settings;
        let result = settings
            .set(keys::CURRENCY_UNIT_FROM_KEY, from)
            .and_then(|_| settings.set(keys::CURRENCY_UNIT_TO_KEY, to));
        if let Err(e) = result {
            warn!(error = %e, "failed to save selected currencies");
        }
    }

    /// Current table unit with the same id as `unit`
    fn lookup<'a>(tables: &'a Tables, unit: &Unit) -> Option<&'a Unit> {
        tables.ratios.get_key_value(unit).map(|(key, _)| key)
    }
}

impl ConverterDataLoader for CurrencyDataLoader {
    /// Start a load on the ambient runtime. Calls after a finished load only
    /// report the current outcome again.
    fn load_data(&self) {
        if self.load_finished() {
            let did_load = self.loaded_from_cache() || self.loaded_from_web();
            self.notify_data_load_finished(did_load);
            return;
        }

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let loader = self.clone();
                handle.spawn(async move {
                    loader.load().await;
                });
            }
            Err(_) => {
                warn!(error = %CurrencyError::NoRuntime, "currency load skipped");
                self.notify_data_load_finished(false);
            }
        }
    }

    /// The currency category itself comes from the standard loader
    fn ordered_categories(&self) -> Vec<Category> {
        Vec::new()
    }

    fn ordered_units(&self, _category: &Category) -> Vec<Unit> {
        lock(&self.inner.tables).units.clone()
    }

    fn ordered_ratios(&self, unit: &Unit) -> RatioMap {
        lock(&self.inner.tables).ratios.get(unit).cloned().unwrap_or_default()
    }

    fn supports_category(&self, category: &Category) -> bool {
        category.id == ids::CURRENCY
    }
}

#[async_trait]
impl CurrencyConverterDataLoader for CurrencyDataLoader {
    fn set_view_model_callback(&self, callback: Arc<dyn CurrencyCallback>) {
        *lock(&self.inner.callback) = Some(callback.clone());
        callback.network_behavior_changed(self.network_behavior());
    }

    fn currency_symbols(&self, from: &Unit, to: &Unit) -> (String, String) {
        let tables = lock(&self.inner.tables);
        match (tables.symbols.get(from), tables.symbols.get(to)) {
            (Some(a), Some(b)) => (a.clone(), b.clone()),
            _ => (String::new(), String::new()),
        }
    }

    fn currency_ratio_equality(&self, from: &Unit, to: &Unit) -> (String, String) {
        let tables = lock(&self.inner.tables);
        let found = tables.ratios.get(from).and_then(|map| map.get_key_value(to)).zip(Self::lookup(&tables, from));
        let Some(((to, data), from)) = found else {
            return (String::new(), String::new());
        };

        let ratio = format_ratio(data.ratio);
        (
            format!("1 {} = {} {}", from.abbreviation, ratio, to.abbreviation),
            format!("1 {} = {} {}", from.accessible_name, ratio, to.accessible_name),
        )
    }

    fn currency_timestamp(&self) -> String {
        lock(&self.inner.state)
            .timestamp
            .map(|t| format_timestamp(&t.with_timezone(&Local)))
            .unwrap_or_default()
    }

    fn save_selected_units(&self, from: &Unit, to: &Unit) {
        if from.is_empty() || to.is_empty() || from.abbreviation.is_empty() || to.abbreviation.is_empty() {
            return;
        }
        self.save_selected_codes(&from.abbreviation, &to.abbreviation);
    }

    async fn try_load_data_from_cache(&self) -> bool {
        self.reset_status();
        match self.load_from_cache().await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "currency cache not used");
                false
            }
        }
    }

    async fn try_load_data_from_web(&self) -> bool {
        self.reset_status();
        match self.load_from_web(false).await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "currency web load failed");
                false
            }
        }
    }

    async fn try_load_data_from_web_override(&self) -> bool {
        lock(&self.inner.state).metered_override = true;
        self.reset_status();
        match self.load_from_web(true).await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "requested currency refresh failed");
                lock(&self.inner.state).status = CurrencyLoadStatus::FailedToLoad;
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use unitconv_loader::{ConverterEvent, EventSink};
    use crate::mock::MockCurrencyClient;
    use crate::MemorySettings;

    fn setup(language: &str) -> (CurrencyDataLoader, Arc<MockCurrencyClient>, Arc<MemorySettings>) {
        let client = Arc::new(MockCurrencyClient::default());
        let settings = Arc::new(MemorySettings::new());
        let config = CurrencyConfig::with_base_url("http://unused").with_language(language);
        let loader = CurrencyDataLoader::new(config, client.clone(), settings.clone());
        (loader, client, settings)
    }

    fn currency() -> Category {
        Category::new(ids::CURRENCY, "Currency", false)
    }

    fn by_code(loader: &CurrencyDataLoader, code: &str) -> Unit {
        loader.ordered_units(&currency()).into_iter().find(|u| u.abbreviation == code).unwrap()
    }

    async fn seed_cache(settings: &MemorySettings, timestamp: DateTime<Utc>, language: &str) {
        use crate::mock::{MOCK_RATIOS_JSON, MOCK_STATIC_JSON};
        settings.set(keys::CACHE_TIMESTAMP_KEY, &timestamp.to_rfc3339()).unwrap();
        settings.set(keys::CACHE_LANGCODE_KEY, language).unwrap();
        settings.write_cache_file(keys::STATIC_DATA_FILENAME, MOCK_STATIC_JSON).await.unwrap();
        settings.write_cache_file(keys::ALL_RATIOS_DATA_FILENAME, MOCK_RATIOS_JSON).await.unwrap();
    }

    #[tokio::test]
    async fn test_load_from_web() {
        let (loader, _, settings) = setup("en-US");
        assert!(loader.try_load_data_from_web().await);
        assert!(loader.loaded_from_web());

        let units = loader.ordered_units(&currency());
        assert_eq!(units.len(), 2);
        assert_eq!(units[0].name, "Europe - Euro");
        assert_eq!(units[0].id, ids::CURRENCY_UNIT_BASE + 1);
        assert_eq!(units[1].accessible_name, "United States Dollar");
        assert!(units[1].is_conversion_source);
        assert!(units[0].is_conversion_target);

        assert!(settings.read_cache_file(keys::STATIC_DATA_FILENAME).await.is_ok());
        assert_eq!(settings.get(keys::CACHE_LANGCODE_KEY).as_deref(), Some("en-US"));
        assert_eq!(settings.get(keys::CURRENCY_UNIT_FROM_KEY).as_deref(), Some("USD"));
        assert_eq!(settings.get(keys::CURRENCY_UNIT_TO_KEY).as_deref(), Some("EUR"));
    }

    #[tokio::test]
    async fn test_ratio_equality() {
        let (loader, _, _) = setup("en-US");
        assert!(loader.try_load_data_from_web().await);
        let usd = by_code(&loader, "USD");
        let eur = by_code(&loader, "EUR");

        let (short, long) = loader.currency_ratio_equality(&usd, &eur);
        assert_eq!(short, "1 USD = 0.9205 EUR");
        assert_eq!(long, "1 United States Dollar = 0.9205 Europe Euro");

        let unknown = Unit::new(ids::CURRENCY_UNIT_BASE + 99, "Nowhere", "XXX", false, false, false);
        assert_eq!(loader.currency_ratio_equality(&usd, &unknown), (String::new(), String::new()));
    }

    #[tokio::test]
    async fn test_symbols() {
        let (loader, _, _) = setup("en-US");
        let usd = Unit::new(ids::CURRENCY_UNIT_BASE + 2, "", "USD", false, false, false);
        assert_eq!(loader.currency_symbols(&usd, &usd), (String::new(), String::new()));

        assert!(loader.try_load_data_from_web().await);
        let usd = by_code(&loader, "USD");
        let eur = by_code(&loader, "EUR");
        assert_eq!(loader.currency_symbols(&usd, &eur), ("$".to_string(), "€".to_string()));
    }

    #[tokio::test]
    async fn test_ratios_pair_both_ways() {
        let (loader, _, _) = setup("en-US");
        assert!(loader.try_load_data_from_web().await);
        let usd = by_code(&loader, "USD");
        let eur = by_code(&loader, "EUR");

        let there = loader.ordered_ratios(&usd)[&eur].ratio;
        let back = loader.ordered_ratios(&eur)[&usd].ratio;
        assert_eq!(there, 0.9205);
        assert!((there * back - 1.0).abs() < 1e-3);
        assert_eq!(loader.ordered_ratios(&usd)[&usd], ConversionData::identity());
    }

    #[tokio::test]
    async fn test_fresh_cache_is_used() {
        let (loader, client, settings) = setup("en-US");
        seed_cache(&settings, Utc::now() - TimeDelta::hours(1), "en-US").await;
        client.force_web_failure(true);

        assert!(loader.try_load_data_from_cache().await);
        assert!(loader.loaded_from_cache());
        assert_eq!(client.request_count(), 0);
        assert!(loader.currency_timestamp().starts_with("Updated "));
    }

    #[tokio::test]
    async fn test_stale_cache_is_rejected() {
        let (loader, _, settings) = setup("en-US");
        seed_cache(&settings, Utc::now() - TimeDelta::days(2), "en-US").await;

        assert!(!loader.try_load_data_from_cache().await);
        assert_eq!(loader.status(), CurrencyLoadStatus::NotLoaded);
        assert!(loader.ordered_units(&currency()).is_empty());
    }

    #[tokio::test]
    async fn test_cache_language_mismatch() {
        let (loader, _, settings) = setup("fr-FR");
        seed_cache(&settings, Utc::now(), "en-US").await;
        assert!(!loader.try_load_data_from_cache().await);
    }

    #[tokio::test]
    async fn test_cache_without_timestamp() {
        let (loader, _, _) = setup("en-US");
        assert!(!loader.try_load_data_from_cache().await);
        assert_eq!(loader.currency_timestamp(), "");
    }

    #[tokio::test]
    async fn test_failed_load_notifies_once() {
        let (loader, client, _) = setup("en-US");
        client.force_web_failure(true);
        let (sink, mut rx) = EventSink::channel();
        loader.set_view_model_callback(Arc::new(sink));

        assert!(!loader.load().await);
        assert_eq!(loader.status(), CurrencyLoadStatus::FailedToLoad);

        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        let finished: Vec<_> = events.iter().filter(|e| matches!(e, ConverterEvent::CurrencyDataLoadFinished { .. })).collect();
        assert_eq!(finished, vec![&ConverterEvent::CurrencyDataLoadFinished { did_load: false }]);
        assert!(events.contains(&ConverterEvent::CurrencyTimestamp { timestamp: String::new(), is_week_old: true }));
    }

    #[tokio::test]
    async fn test_failed_web_keeps_previous_tables() {
        let (loader, client, _) = setup("en-US");
        assert!(loader.try_load_data_from_web().await);
        client.force_web_failure(true);
        assert!(!loader.try_load_data_from_web().await);
        assert_eq!(loader.ordered_units(&currency()).len(), 2);
    }

    #[tokio::test]
    async fn test_load_data_spawns_on_runtime() {
        let (loader, _, _) = setup("en-US");
        let (sink, mut rx) = EventSink::channel();
        loader.set_view_model_callback(Arc::new(sink));
        loader.load_data();

        loop {
            match rx.recv().await.unwrap() {
                ConverterEvent::CurrencyDataLoadFinished { did_load } => {
                    assert!(did_load);
                    break;
                }
                _ => continue,
            }
        }
        assert!(loader.loaded_from_web());
    }

    #[test]
    fn test_load_data_without_runtime() {
        let (loader, _, _) = setup("en-US");
        let (sink, mut rx) = EventSink::channel();
        loader.set_view_model_callback(Arc::new(sink));
        loader.load_data();

        assert_eq!(rx.try_recv().unwrap(), ConverterEvent::NetworkBehaviorChanged { behavior: NetworkAccessBehavior::Normal });
        assert_eq!(rx.try_recv().unwrap(), ConverterEvent::CurrencyDataLoadFinished { did_load: false });
        assert_eq!(loader.status(), CurrencyLoadStatus::FailedToLoad);
    }

    #[tokio::test]
    async fn test_offline_blocks_web() {
        let (loader, client, _) = setup("en-US");
        loader.set_network_behavior(NetworkAccessBehavior::Offline);
        assert!(!loader.try_load_data_from_web().await);
        assert_eq!(client.request_count(), 0);
    }

    #[tokio::test]
    async fn test_metered_requires_override() {
        let (loader, client, _) = setup("en-US");
        loader.set_network_behavior(NetworkAccessBehavior::OptIn);
        assert!(!loader.try_load_data_from_web().await);
        assert_eq!(client.request_count(), 0);

        assert!(loader.try_load_data_from_web_override().await);
        assert!(loader.loaded_from_web());
        // The override sticks for later plain loads
        assert!(loader.try_load_data_from_web().await);
    }

    #[tokio::test]
    async fn test_override_failure_marks_failed() {
        let (loader, client, _) = setup("en-US");
        client.force_web_failure(true);
        assert!(!loader.try_load_data_from_web_override().await);
        assert_eq!(loader.status(), CurrencyLoadStatus::FailedToLoad);
    }

    #[tokio::test]
    async fn test_last_used_pair_wins() {
        let (loader, _, settings) = setup("en-US");
        settings.set(keys::CURRENCY_UNIT_FROM_KEY, "EUR").unwrap();
        settings.set(keys::CURRENCY_UNIT_TO_KEY, "USD").unwrap();
        assert!(loader.try_load_data_from_web().await);
        assert!(by_code(&loader, "EUR").is_conversion_source);
        assert!(by_code(&loader, "USD").is_conversion_target);
    }

    #[tokio::test]
    async fn test_unresolvable_pairs_fall_back() {
        // Last used and regional (en-GB: GBP/EUR) both miss, the fixed pair resolves
        let (loader, _, settings) = setup("en-GB");
        settings.set(keys::CURRENCY_UNIT_FROM_KEY, "JPY").unwrap();
        settings.set(keys::CURRENCY_UNIT_TO_KEY, "USD").unwrap();
        assert!(loader.try_load_data_from_web().await);
        assert!(by_code(&loader, "USD").is_conversion_source);
        assert!(by_code(&loader, "EUR").is_conversion_target);
        assert_eq!(settings.get(keys::CURRENCY_UNIT_FROM_KEY).as_deref(), Some("USD"));
    }

    #[tokio::test]
    async fn test_regional_default() {
        let (loader, _, _) = setup("fr-FR");
        assert!(loader.try_load_data_from_web().await);
        assert!(by_code(&loader, "EUR").is_conversion_source);
        assert!(by_code(&loader, "USD").is_conversion_target);
    }

    #[tokio::test]
    async fn test_rtl_names() {
        let (loader, _, _) = setup("ar-SA");
        assert!(loader.try_load_data_from_web().await);
        let usd = by_code(&loader, "USD");
        assert_eq!(usd.name, "Dollar - United States");
        assert_eq!(usd.accessible_name, "Dollar United States");
    }

    #[tokio::test]
    async fn test_unmatched_and_zero_rates_dropped() {
        let (loader, client, _) = setup("en-US");
        client.set_payloads(
            r#"[{"CountryCode":"USA","CountryName":"United States","CurrencyCode":"USD","CurrencyName":"Dollar","CurrencySymbol":"$"},
                {"CountryCode":"JPN","CountryName":"Japan","CurrencyCode":"JPY","CurrencyName":"Yen","CurrencySymbol":"¥"},
                {"CountryCode":"XXX","CountryName":"Nowhere","CurrencyCode":"XXX","CurrencyName":"None","CurrencySymbol":"?"}]"#,
            r#"[{"An":"USD","Rt":1},{"An":"JPY","Rt":0}]"#,
        );
        assert!(loader.try_load_data_from_web().await);
        let units = loader.ordered_units(&currency());
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].abbreviation, "USD");
    }

    #[tokio::test]
    async fn test_superseded_tables_discarded() {
        let (loader, _, _) = setup("en-US");
        assert!(loader.try_load_data_from_web().await);
        let parsed = ParsedPayloads::parse(crate::mock::MOCK_STATIC_JSON, r#"[{"An":"USD","Rt":1}]"#).unwrap();
        loader.finalize_units(0, parsed);
        assert_eq!(loader.ordered_units(&currency()).len(), 2);
    }

    #[tokio::test]
    async fn test_superseded_web_load_keeps_cache() {
        let (loader, client, settings) = setup("en-US");
        assert!(loader.try_load_data_from_web().await);
        let stamp = settings.get(keys::CACHE_TIMESTAMP_KEY);
        let status = loader.status();

        // A later load already won; this fetch must not touch the cache
        lock(&loader.inner.tables).generation = u64::MAX;
        client.set_payloads(crate::mock::MOCK_STATIC_JSON, r#"[{"An":"USD","Rt":1},{"An":"EUR","Rt":0.5}]"#);
        assert!(loader.load_from_web(false).await.is_ok());

        let cached = settings.read_cache_file(keys::ALL_RATIOS_DATA_FILENAME).await.unwrap();
        assert_eq!(cached, crate::mock::MOCK_RATIOS_JSON);
        assert_eq!(settings.get(keys::CACHE_TIMESTAMP_KEY), stamp);
        assert_eq!(loader.status(), status);
    }

    #[tokio::test]
    async fn test_follow_network_behavior() {
        let (loader, _, _) = setup("en-US");
        let (sink, mut rx) = EventSink::channel();
        loader.set_view_model_callback(Arc::new(sink));
        let (tx, behavior_rx) = watch::channel(NetworkAccessBehavior::Normal);
        let handle = loader.follow_network_behavior(behavior_rx);
        tx.send(NetworkAccessBehavior::Offline).unwrap();

        loop {
            if rx.recv().await.unwrap() == (ConverterEvent::NetworkBehaviorChanged { behavior: NetworkAccessBehavior::Offline }) {
                break;
            }
        }
        assert_eq!(loader.network_behavior(), NetworkAccessBehavior::Offline);
        drop(tx);
        handle.await.unwrap();
    }

    #[test]
    fn test_staleness_boundary() {
        let now = Utc.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap();
        let day = Duration::from_secs(86_400);
        assert!(!is_older_than(now - TimeDelta::days(1), now, day));
        assert!(is_older_than(now - TimeDelta::days(1) - TimeDelta::nanoseconds(1), now, day));
        assert!(!is_older_than(now, now, day));
    }

    #[test]
    fn test_format_timestamp() {
        let afternoon = Utc.with_ymd_and_hms(2024, 3, 5, 14, 7, 0).unwrap();
        assert_eq!(format_timestamp(&afternoon), "Updated Mar 5, 2024 2:07 PM");
        let midnight = Utc.with_ymd_and_hms(2023, 12, 25, 0, 30, 0).unwrap();
        assert_eq!(format_timestamp(&midnight), "Updated Dec 25, 2023 12:30 AM");
    }

    #[test]
    fn test_supports_only_currency() {
        let (loader, _, _) = setup("en-US");
        assert!(loader.supports_category(&currency()));
        assert!(!loader.supports_category(&Category::new(ids::LENGTH, "Length", false)));
        assert!(loader.ordered_categories().is_empty());
    }
}
