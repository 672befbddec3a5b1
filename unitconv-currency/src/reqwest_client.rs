//! Reqwest-backed currency client

use std::sync::RwLock;
use async_trait::async_trait;
use tracing::debug;
use crate::{CurrencyConfig, CurrencyHttpClient, HttpError};

/// Production client fetching both payloads over HTTPS.
pub struct ReqwestCurrencyClient {
    client: reqwest::Client,
    metadata_url: String,
    ratios_url: String,
    source: RwLock<String>,
    language: RwLock<String>,
}

impl ReqwestCurrencyClient {
    pub fn new(config: &CurrencyConfig) -> Result<Self, HttpError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(Self::convert_error)?;
        Ok(Self::with_client(client, config))
    }

    /// Use a preconfigured `reqwest::Client`
    pub fn with_client(client: reqwest::Client, config: &CurrencyConfig) -> Self {
        Self {
            client,
            metadata_url: config.metadata_url.clone(),
            ratios_url: config.ratios_url.clone(),
            source: RwLock::new("USD".to_string()),
            language: RwLock::new(config.language.clone()),
        }
    }

    fn convert_error(err: reqwest::Error) -> HttpError {
        if err.is_timeout() {
            HttpError::Timeout(err.to_string())
        } else if err.is_connect() {
            HttpError::ConnectionFailed(err.to_string())
        } else {
            HttpError::Other(err.to_string())
        }
    }

    fn expand(&self, template: &str) -> String {
        let source = self.source.read().map(|s| s.clone()).unwrap_or_default();
        let language = self.language.read().map(|l| l.clone()).unwrap_or_default();
        template.replace("{source}", &source).replace("{lang}", &language)
    }

    async fn fetch(&self, template: &str) -> Result<String, HttpError> {
        let url = self.expand(template);
        debug!(%url, "fetching currency payload");

        let response = self.client.get(&url).send().await.map_err(Self::convert_error)?;
        let status = response.status();
        let body = response.text().await.map_err(Self::convert_error)?;
        if !status.is_success() {
            return Err(HttpError::ServerError { status: status.as_u16(), message: body });
        }
        Ok(body)
    }
}

#[async_trait]
impl CurrencyHttpClient for ReqwestCurrencyClient {
    fn set_source_currency_code(&self, code: &str) {
        if let Ok(mut source) = self.source.write() {
            *source = code.to_string();
        }
    }

    fn set_response_language(&self, language: &str) {
        if let Ok(mut current) = self.language.write() {
            *current = language.to_string();
        }
    }

    async fn get_currency_metadata(&self) -> Result<String, HttpError> {
        self.fetch(&self.metadata_url).await
    }

    async fn get_currency_ratios(&self) -> Result<String, HttpError> {
        self.fetch(&self.ratios_url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> ReqwestCurrencyClient {
        let config = CurrencyConfig::with_base_url(&server.uri()).with_language("en-US");
        ReqwestCurrencyClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_fetches_metadata_with_language() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/currency/metadata"))
            .and(query_param("source", "USD"))
            .and(query_param("lang", "fr-FR"))
            .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        client.set_response_language("fr-FR");
        assert_eq!(client.get_currency_metadata().await.unwrap(), "[]");
    }

    #[tokio::test]
    async fn test_fetches_ratios_for_source() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/currency/ratios"))
            .and(query_param("source", "EUR"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"[{"An":"USD","Rt":1.08}]"#))
            .mount(&server)
            .await;

        let client = client_for(&server);
        client.set_source_currency_code("EUR");
        assert!(client.get_currency_ratios().await.unwrap().contains("USD"));
    }

    #[tokio::test]
    async fn test_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("down"))
            .mount(&server)
            .await;

        let err = client_for(&server).get_currency_ratios().await.unwrap_err();
        assert_eq!(err, HttpError::ServerError { status: 503, message: "down".to_string() });
    }

    #[tokio::test]
    async fn test_connection_refused() {
        let config = CurrencyConfig::with_base_url("http://127.0.0.1:1");
        let client = ReqwestCurrencyClient::new(&config).unwrap();
        assert!(client.get_currency_metadata().await.is_err());
    }
}
