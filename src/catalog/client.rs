//! HTTP catalog provider
//!
//! Blocking client for the remote catalog API. The resolution pipeline
//! issues one query at a time, each keyed by the previous stage's result.

use super::error::{CatalogApiError, Result};
use super::types::{CatalogOption, InstanceType, NetworkCatalog, ServicePlan};
use super::{CatalogParams, CatalogProvider};
use crate::config::types::RemoteConfig;
use log::debug;
use reqwest::Url;
use reqwest::blocking::{Client, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// User agent for API requests
const USER_AGENT: &str = concat!("prov-ctl/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct DataResponse<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InstanceTypeResponse {
    instance_type: InstanceType,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InstanceTypesResponse {
    #[serde(default)]
    instance_types: Vec<InstanceType>,
}

#[derive(Debug, Deserialize)]
struct PlansResponse {
    #[serde(default)]
    plans: Vec<ServicePlan>,
}

/// API error response format
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: Option<String>,
    msg: Option<String>,
    message: Option<String>,
}

impl ApiErrorResponse {
    fn get_message(&self) -> String {
        self.message
            .clone()
            .or_else(|| self.msg.clone())
            .or_else(|| self.error.clone())
            .unwrap_or_else(|| "Unknown error".to_string())
    }
}

/// Error for a failed status, preferring the message inside a JSON body
fn status_error(status: u16, body: &str) -> CatalogApiError {
    let message = serde_json::from_str::<ApiErrorResponse>(body)
        .map(|e| e.get_message())
        .unwrap_or_else(|_| body.to_string());
    CatalogApiError::from_status(status, message)
}

/// Client for the remote catalog
pub struct HttpCatalogProvider {
    http_client: Client,
    api_url: String,
    token: Option<String>,
}

impl HttpCatalogProvider {
    /// Create a provider for a base URL with an optional bearer token
    pub fn with_url(api_url: impl Into<String>, token: Option<String>) -> Result<Self> {
        Self::build(api_url.into(), token, Duration::from_secs(30))
    }

    /// Create a provider from the `[remote]` configuration section
    pub fn from_config(remote: &RemoteConfig) -> Result<Self> {
        Self::build(
            remote.resolved_url(),
            remote.token(),
            Duration::from_secs(remote.timeout_secs),
        )
    }

    fn build(api_url: String, token: Option<String>, timeout: Duration) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(CatalogApiError::Transport)?;

        Ok(Self {
            http_client,
            api_url: api_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let url = Url::parse_with_params(&self.url(path), query)
            .map_err(|e| CatalogApiError::Decode(format!("invalid catalog URL: {}", e)))?;
        debug!("GET {}", url);

        let mut request = self.http_client.get(url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let response = request.send()?;
        Self::handle_response(response)
    }

    /// Handle the HTTP response, converting errors appropriately
    fn handle_response<T: DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();

        if status.is_success() {
            response
                .json::<T>()
                .map_err(|e| CatalogApiError::Decode(e.to_string()))
        } else {
            let error_body = response.text().unwrap_or_default();
            let error_message = serde_json::from_str::<ApiErrorResponse>(&error_body)
                .map(|e| e.get_message())
                .unwrap_or_else(|_| error_body.clone());
            Err(CatalogApiError::from_status(status.as_u16(), error_message))
        }
    }
}

impl CatalogProvider for HttpCatalogProvider {
    /// Endpoint: GET /api/options/{source}
    fn options(&self, source: &str, params: &CatalogParams) -> Result<Vec<CatalogOption>> {
        let query: Vec<(&str, &str)> = params.iter().collect();
        let response: DataResponse<Vec<Option<CatalogOption>>> =
            self.get(&format!("/api/options/{}", source), &query)?;
        Ok(response.data.into_iter().flatten().collect())
    }

    /// Endpoint: GET /api/instance-types/{id}
    fn instance_type(&self, id: i64) -> Result<Option<InstanceType>> {
        match self.get::<InstanceTypeResponse>(&format!("/api/instance-types/{}", id), &[]) {
            Ok(response) => Ok(Some(response.instance_type)),
            Err(CatalogApiError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Endpoint: GET /api/instance-types?name= and ?code=
    fn search_instance_types(&self, token: &str) -> Result<Vec<InstanceType>> {
        let mut found = self
            .get::<InstanceTypesResponse>("/api/instance-types", &[("name", token)])?
            .instance_types;
        let by_code = self
            .get::<InstanceTypesResponse>("/api/instance-types", &[("code", token)])?
            .instance_types;
        for instance_type in by_code {
            if !found.iter().any(|t| t.id == instance_type.id) {
                found.push(instance_type);
            }
        }
        Ok(found)
    }

    /// Endpoint: GET /api/instances/service-plans
    fn service_plans(&self, params: &CatalogParams) -> Result<Vec<ServicePlan>> {
        let query: Vec<(&str, &str)> = params.iter().collect();
        Ok(self
            .get::<PlansResponse>("/api/instances/service-plans", &query)?
            .plans)
    }

    /// Endpoint: GET /api/options/zoneNetworkOptions
    fn network_options(&self, params: &CatalogParams) -> Result<NetworkCatalog> {
        let query: Vec<(&str, &str)> = params.iter().collect();
        let response: DataResponse<Option<NetworkCatalog>> =
            self.get("/api/options/zoneNetworkOptions", &query)?;
        Ok(response.data.unwrap_or_default())
    }
}
