//! unitconv JSON-RPC Server
//!
//! Line delimited JSON-RPC 2.0 over stdin/stdout. Engine callbacks are pushed
//! to stdout as `event` notifications as soon as they happen.
//!
//! Methods:
//! - initialize: Load the unit tables and restore saved preferences
//! - categories / units: List categories, or the units of one
//! - set_category / set_units: Change the selection
//! - command: Send keypresses (`{"keys": "-12.5"}` or `{"command": "backspace"}`)
//! - switch_active: Make the result side the input
//! - suggested: Suggested values for the current input
//! - serialize / deserialize: Save or restore the full session
//! - save_preferences / restore_preferences: Persist the selection
//! - refresh_currency: Force a web refresh of exchange rates
//! - set_network_behavior: normal, opt_in or offline

use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;
use unitconv::{Command, UnitConverter};
use unitconv_core::{Category, Unit};
use unitconv_currency::{keys, CurrencyConfig, CurrencyDataLoader, FileSettings, LocalSettings, ReqwestCurrencyClient};
use unitconv_loader::{ConverterDataLoader, ConverterEvent, EventSink, LoaderSet, NetworkAccessBehavior};
use unitconv_units::{StandardDataLoader, UnitsConfig};

const SERVER_NAME: &str = "unitconv";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Server settings, read from `UNITCONV_*` environment variables
#[derive(Debug, Clone, Default)]
struct RpcConfig {
    /// Settings and cache directory
    data_path: Option<PathBuf>,
    currency_url: Option<String>,
    language: Option<String>,
    region: Option<String>,
}

impl RpcConfig {
    fn from_env() -> Self {
        Self {
            data_path: env::var("UNITCONV_DATA_PATH").ok().map(PathBuf::from),
            currency_url: env::var("UNITCONV_CURRENCY_URL").ok(),
            language: env::var("UNITCONV_LANGUAGE").ok(),
            region: env::var("UNITCONV_REGION").ok(),
        }
    }

    fn data_path(&self) -> PathBuf {
        self.data_path.clone().unwrap_or_else(|| PathBuf::from("unitconv-data"))
    }

    fn currency(&self) -> CurrencyConfig {
        let config = match &self.currency_url {
            Some(base) => CurrencyConfig::with_base_url(base),
            None => CurrencyConfig::default(),
        };
        match &self.language {
            Some(language) => config.with_language(language.clone()),
            None => config,
        }
    }

    fn units(&self, language: &str) -> UnitsConfig {
        match &self.region {
            Some(region) => UnitsConfig::new(region.clone()),
            None => UnitsConfig::from_locale(language),
        }
    }
}

// JSON-RPC types
#[derive(Debug, Deserialize)]
struct RpcRequest {
    #[allow(dead_code)]
    jsonrpc: String,
    id: Option<JsonValue>,
    method: String,
    #[serde(default)]
    params: Option<JsonValue>,
}

#[derive(Debug, Serialize)]
struct RpcResponse {
    jsonrpc: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<RpcError>,
}

#[derive(Debug, Serialize)]
struct RpcNotification<'a> {
    jsonrpc: &'static str,
    method: &'static str,
    params: &'a ConverterEvent,
}

#[derive(Debug, Serialize)]
struct RpcError {
    code: i32,
    message: String,
}

impl RpcError {
    fn parse(e: serde_json::Error) -> Self {
        Self { code: -32700, message: format!("Parse error: {e}") }
    }

    fn method_not_found(method: &str) -> Self {
        Self { code: -32601, message: format!("Method not found: {method}") }
    }

    fn invalid_params(message: impl Into<String>) -> Self {
        Self { code: -32602, message: message.into() }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self { code: -32603, message: message.into() }
    }
}

fn params<T: for<'de> Deserialize<'de>>(params: &Option<JsonValue>) -> Result<T, RpcError> {
    let value = params.clone().unwrap_or_else(|| json!({}));
    serde_json::from_value(value).map_err(|e| RpcError::invalid_params(e.to_string()))
}

#[derive(Debug, Deserialize)]
struct IdParams {
    id: i32,
}

#[derive(Debug, Deserialize)]
struct UnitsParams {
    from: i32,
    to: i32,
}

#[derive(Debug, Deserialize)]
struct CommandParams {
    #[serde(default)]
    command: Option<Command>,
    #[serde(default)]
    keys: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ValueParams {
    value: String,
}

#[derive(Debug, Deserialize)]
struct StateParams {
    state: String,
}

#[derive(Debug, Deserialize)]
struct BehaviorParams {
    behavior: NetworkAccessBehavior,
}

/// One engine session plus the collaborators it persists through
struct Server {
    converter: UnitConverter,
    currency: Option<CurrencyDataLoader>,
    settings: Arc<dyn LocalSettings>,
}

impl Server {
    fn new(loaders: LoaderSet, currency: Option<CurrencyDataLoader>, settings: Arc<dyn LocalSettings>, sink: EventSink) -> Self {
        let mut converter = UnitConverter::new(loaders);
        converter.set_view_model_callback(Arc::new(sink.clone()));
        converter.set_view_model_currency_callback(Arc::new(sink));
        Self { converter, currency, settings }
    }

    async fn handle(&mut self, request: &RpcRequest) -> RpcResponse {
        let result = match request.method.as_str() {
            "initialize" => self.initialize(),
            "ping" => Ok(json!({})),
            "categories" => Ok(json!(self.converter.categories())),
            "units" => self.units(&request.params),
            "set_category" => self.set_category(&request.params),
            "set_units" => self.set_units(&request.params),
            "command" => self.command(&request.params),
            "switch_active" => params::<ValueParams>(&request.params).map(|p| {
                self.converter.switch_active(&p.value);
                self.displays()
            }),
            "suggested" => Ok(self.suggested()),
            "serialize" => Ok(json!({ "state": self.converter.serialize() })),
            "deserialize" => params::<StateParams>(&request.params).map(|p| {
                self.converter.deserialize(&p.state);
                self.selection()
            }),
            "save_preferences" => self.save_preferences().await,
            "restore_preferences" => Ok(self.restore_preferences()),
            "refresh_currency" => Ok(self.refresh_currency().await),
            "set_network_behavior" => self.set_network_behavior(&request.params),
            _ => Err(RpcError::method_not_found(&request.method)),
        };

        match result {
            Ok(r) => RpcResponse { jsonrpc: "2.0", id: request.id.clone(), result: Some(r), error: None },
            Err(e) => RpcResponse { jsonrpc: "2.0", id: request.id.clone(), result: None, error: Some(e) },
        }
    }

    fn initialize(&mut self) -> Result<JsonValue, RpcError> {
        self.converter.initialize();
        self.restore_preferences();
        if let Some(currency) = &self.currency {
            currency.load_data();
        }
        info!(categories = self.converter.categories().len(), "engine initialized");

        Ok(json!({
            "serverInfo": { "name": SERVER_NAME, "version": SERVER_VERSION },
            "categories": self.converter.categories(),
            "selection": self.selection(),
        }))
    }

    fn find_category(&mut self, id: i32) -> Result<Category, RpcError> {
        self.converter
            .categories()
            .into_iter()
            .find(|c| c.id == id)
            .ok_or_else(|| RpcError::invalid_params(format!("Unknown category: {id}")))
    }

    fn units(&mut self, raw: &Option<JsonValue>) -> Result<JsonValue, RpcError> {
        let p: IdParams = params(raw)?;
        let category = self.find_category(p.id)?;
        Ok(json!(self.converter.category_units(&category)))
    }

    fn set_category(&mut self, raw: &Option<JsonValue>) -> Result<JsonValue, RpcError> {
        let p: IdParams = params(raw)?;
        let category = self.find_category(p.id)?;
        let (units, from, to) = self.converter.set_current_category(&category);
        Ok(json!({ "units": units, "from": from, "to": to }))
    }

    fn set_units(&mut self, raw: &Option<JsonValue>) -> Result<JsonValue, RpcError> {
        let p: UnitsParams = params(raw)?;
        let category = self.converter.current_category().clone();
        let units = self.converter.category_units(&category);
        let find = |id: i32| -> Result<Unit, RpcError> {
            units
                .iter()
                .find(|u| u.id == id)
                .cloned()
                .ok_or_else(|| RpcError::invalid_params(format!("Unknown unit {id} in category {}", category.id)))
        };
        let (from, to) = (find(p.from)?, find(p.to)?);
        self.converter.set_current_unit_types(&from, &to);
        Ok(self.selection())
    }

    fn command(&mut self, raw: &Option<JsonValue>) -> Result<JsonValue, RpcError> {
        let p: CommandParams = params(raw)?;
        let commands = match (p.command, p.keys) {
            (Some(command), None) => vec![command],
            (None, Some(keys)) => Command::from_keys(&keys)
                .ok_or_else(|| RpcError::invalid_params(format!("Unsupported keys: {keys}")))?,
            _ => return Err(RpcError::invalid_params("Expected exactly one of command or keys")),
        };
        for command in commands {
            self.converter.send_command(command);
        }
        Ok(self.displays())
    }

    fn suggested(&self) -> JsonValue {
        let values: Vec<JsonValue> = self
            .converter
            .calculate_suggested()
            .into_iter()
            .map(|(value, unit)| json!({ "value": value, "unit": unit }))
            .collect();
        json!(values)
    }

    async fn save_preferences(&self) -> Result<JsonValue, RpcError> {
        let preferences = self.converter.save_user_preferences();
        self.settings
            .set(keys::USER_PREFERENCES_KEY, &preferences)
            .map_err(|e| RpcError::internal(e.to_string()))?;
        self.settings.flush().await.map_err(|e| RpcError::internal(e.to_string()))?;
        Ok(json!({ "saved": true }))
    }

    fn restore_preferences(&mut self) -> JsonValue {
        if let Some(preferences) = self.settings.get(keys::USER_PREFERENCES_KEY) {
            self.converter.restore_user_preferences(&preferences);
        }
        self.selection()
    }

    async fn refresh_currency(&mut self) -> JsonValue {
        let (did_load, timestamp) = self.converter.refresh_currency_ratios().await;
        json!({ "didLoad": did_load, "timestamp": timestamp })
    }

    fn set_network_behavior(&mut self, raw: &Option<JsonValue>) -> Result<JsonValue, RpcError> {
        let p: BehaviorParams = params(raw)?;
        let currency = self
            .currency
            .as_ref()
            .ok_or_else(|| RpcError::invalid_params("No currency loader configured"))?;
        currency.set_network_behavior(p.behavior);
        Ok(json!({ "behavior": p.behavior }))
    }

    /// Background currency loads finish outside any request
    fn on_event(&mut self, event: &ConverterEvent) {
        if let ConverterEvent::CurrencyDataLoadFinished { did_load: true } = event {
            self.converter.reset_categories_and_ratios();
        }
    }

    fn displays(&self) -> JsonValue {
        let (current, result) = self.converter.displays();
        json!({ "current": current, "result": result })
    }

    fn selection(&self) -> JsonValue {
        json!({
            "category": self.converter.current_category(),
            "from": self.converter.from_unit(),
            "to": self.converter.to_unit(),
            "displays": self.displays(),
        })
    }
}

async fn write_line<T: Serialize>(stdout: &mut tokio::io::Stdout, message: &T) -> std::io::Result<()> {
    let line = serde_json::to_string(message)?;
    stdout.write_all(line.as_bytes()).await?;
    stdout.write_all(b"\n").await?;
    stdout.flush().await
}

fn build_server(config: &RpcConfig, sink: EventSink) -> Server {
    let currency_config = config.currency();
    let units = StandardDataLoader::new(config.units(&currency_config.language));
    let mut loaders = LoaderSet::new(units);

    let settings: Arc<dyn LocalSettings> = match FileSettings::open(config.data_path()) {
        Ok(settings) => Arc::new(settings),
        Err(e) => {
            warn!(error = %e, path = %config.data_path().display(), "settings unavailable, using memory");
            Arc::new(unitconv_currency::MemorySettings::new())
        }
    };

    let currency = match ReqwestCurrencyClient::new(&currency_config) {
        Ok(client) => {
            let loader = CurrencyDataLoader::new(currency_config, Arc::new(client), settings.clone());
            loaders = loaders.with_currency(Arc::new(loader.clone()));
            Some(loader)
        }
        Err(e) => {
            warn!(error = %e, "currency disabled");
            None
        }
    };

    Server::new(loaders, currency, settings, sink)
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config = RpcConfig::from_env();
    let (sink, mut events) = EventSink::channel();
    let mut server = build_server(&config, sink);
    info!(version = SERVER_VERSION, data_path = %config.data_path().display(), "unitconv server started");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => {
                        info!("client disconnected");
                        break;
                    }
                    Err(e) => {
                        error!(error = %e, "failed to read input");
                        break;
                    }
                };
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let response = match serde_json::from_str::<RpcRequest>(line) {
                    Ok(request) => {
                        debug!(method = %request.method, "processing");
                        let response = server.handle(&request).await;
                        // Notifications get no response
                        if request.id.is_none() {
                            continue;
                        }
                        response
                    }
                    Err(e) => {
                        warn!(error = %e, "unparseable request");
                        RpcResponse { jsonrpc: "2.0", id: None, result: None, error: Some(RpcError::parse(e)) }
                    }
                };
                if let Err(e) = write_line(&mut stdout, &response).await {
                    error!(error = %e, "failed to write response");
                    break;
                }
            }
            Some(event) = events.recv() => {
                server.on_event(&event);
                let notification = RpcNotification { jsonrpc: "2.0", method: "event", params: &event };
                if let Err(e) = write_line(&mut stdout, &notification).await {
                    error!(error = %e, "failed to write event");
                    break;
                }
            }
        }
    }

    if let Err(e) = server.settings.flush().await {
        warn!(error = %e, "failed to flush settings");
    }
    info!("server shutting down");
}
