//! HTTP boundary to the calculation service.
//!
//! Transport lives here; each endpoint module turns the raw body into a typed
//! outcome with a pure function so the interpretation can be tested natively.

pub mod calculate;
pub mod simulation;

pub use calculate::{calculate_bet, BetRequest};
pub use simulation::{run_simulation, ScenarioConfig, SimulationResultBundle};

use gloo::net::http::{Request, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};

use crate::config::ApiConfig;
use crate::error::ApiError;

#[derive(Clone, Debug, PartialEq)]
pub struct ApiClient {
    config: ApiConfig,
}

impl ApiClient {
    pub fn new(config: ApiConfig) -> Self {
        Self { config }
    }

    pub fn base_url(&self) -> &str {
        self.config.base_url()
    }

    /// GET with query parameters; returns the raw body.
    pub async fn get_text(&self, endpoint: &str, query: &[(&str, String)]) -> Result<String, ApiError> {
        let url = self.config.endpoint(endpoint);
        log::debug!("GET {}", url);
        let request = Request::get(&url).query(query.iter().map(|(k, v)| (*k, v.as_str())));
        Self::send(request).await
    }

    /// POST a JSON body; returns the raw body.
    pub async fn post_text<B: Serialize>(&self, endpoint: &str, body: &B) -> Result<String, ApiError> {
        let url = self.config.endpoint(endpoint);
        log::debug!("POST {}", url);
        let request = Request::post(&url)
            .header("Content-Type", "application/json")
            .json(body)
            .map_err(|e| ApiError::Network(e.to_string()))?;
        let response = request.send().await.map_err(|e| ApiError::Network(e.to_string()))?;
        Self::read_body(response).await
    }

    async fn send(request: RequestBuilder) -> Result<String, ApiError> {
        let response = request.send().await.map_err(|e| ApiError::Network(e.to_string()))?;
        Self::read_body(response).await
    }

    /// The service reports failures in the JSON envelope, so non-2xx bodies
    /// are still handed back for interpretation.
    async fn read_body(response: Response) -> Result<String, ApiError> {
        if !response.ok() {
            log::warn!("{} answered HTTP {}", response.url(), response.status());
        }
        response.text().await.map_err(|e| ApiError::Network(e.to_string()))
    }
}

/// Decode a response envelope. Text that is not JSON is a `Network` error.
/// Valid JSON that is not an object yields `None`, which callers read as an
/// empty response. An object that does not fit `T` is a `Network` error too.
pub(crate) fn parse_envelope<T: DeserializeOwned>(body: &str) -> Result<Option<T>, ApiError> {
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| ApiError::Network(format!("unreadable response: {}", e)))?;
    if !value.is_object() {
        log::debug!("response body is not an object: {}", value);
        return Ok(None);
    }
    serde_json::from_value(value)
        .map(Some)
        .map_err(|e| ApiError::Network(format!("unexpected response shape: {}", e)))
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new(ApiConfig::default())
    }
}
