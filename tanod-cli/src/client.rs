//! API Client
//!
//! HTTP client for a running tracking server. Officer identity travels in
//! the `X-Officer-Id` header the way the auth gateway forwards it.

use crate::error::{CliError, CliResult};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;
use tanod_api::{ErrorResponse, HealthResponse, SessionResponse};
use tanod_core::TrackedOfficer;

const OFFICER_HEADER: &str = "x-officer-id";
const ROLE_HEADER: &str = "x-officer-role";

/// Tracking API client
pub struct TanodClient {
    client: Client,
    base_url: String,
}

impl TanodClient {
    /// Create a new client
    pub fn new(base_url: impl Into<String>) -> CliResult<Self> {
        Self::with_timeout(base_url, 30)
    }

    /// Create with custom timeout
    pub fn with_timeout(base_url: impl Into<String>, timeout_secs: u64) -> CliResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| CliError::connection(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub async fn health(&self) -> CliResult<HealthResponse> {
        let url = format!("{}/health", self.base_url);
        handle_response(self.client.get(&url).send().await?).await
    }

    /// Report a position as the given officer
    pub async fn report_location(
        &self,
        officer_id: &str,
        latitude: f64,
        longitude: f64,
    ) -> CliResult<TrackedOfficer> {
        let url = format!("{}/api/v1/locations", self.base_url);
        let request = self
            .client
            .post(&url)
            .json(&json!({ "latitude": latitude, "longitude": longitude }));
        handle_response(as_officer(request, officer_id).send().await?).await
    }

    /// Snapshot of active officers
    pub async fn active(&self) -> CliResult<Vec<TrackedOfficer>> {
        let url = format!("{}/api/v1/locations/active", self.base_url);
        handle_response(self.client.get(&url).send().await?).await
    }

    pub async fn login(&self, officer_id: &str) -> CliResult<SessionResponse> {
        let url = format!("{}/api/v1/session/login", self.base_url);
        handle_response(as_officer(self.client.post(&url), officer_id).send().await?).await
    }

    pub async fn logout(&self, officer_id: &str) -> CliResult<SessionResponse> {
        let url = format!("{}/api/v1/session/logout", self.base_url);
        handle_response(as_officer(self.client.post(&url), officer_id).send().await?).await
    }

    /// Register or update a directory profile. Returns true when created.
    pub async fn upsert_officer(
        &self,
        officer_id: &str,
        name: &str,
        picture: Option<&str>,
    ) -> CliResult<bool> {
        let url = format!("{}/api/v1/officers/{}", self.base_url, officer_id);
        let response = self
            .client
            .put(&url)
            .json(&json!({ "name": name, "picture": picture }))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(status == reqwest::StatusCode::CREATED)
        } else {
            Err(error_from(response).await)
        }
    }
}

fn as_officer(request: RequestBuilder, officer_id: &str) -> RequestBuilder {
    request
        .header(OFFICER_HEADER, officer_id)
        .header(ROLE_HEADER, "tanod")
}

async fn handle_response<T: DeserializeOwned>(response: Response) -> CliResult<T> {
    if response.status().is_success() {
        Ok(response.json().await?)
    } else {
        Err(error_from(response).await)
    }
}

async fn error_from(response: Response) -> CliError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    match serde_json::from_str::<ErrorResponse>(&body) {
        Ok(error) => CliError::api(status, error.code, error.message),
        Err(_) => CliError::api(status, "UNKNOWN", body),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tanod_api::{start_background_server, ApiConfig};

    async fn spawn_server() -> TanodClient {
        let config = ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            ..ApiConfig::default()
        };
        let addr = start_background_server(config).await.unwrap();
        TanodClient::new(format!("http://{}/", addr)).unwrap()
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client = TanodClient::new("http://localhost:3000/").unwrap();
        assert_eq!(client.base_url, "http://localhost:3000");
    }

    #[tokio::test]
    async fn test_report_and_snapshot_round_trip() {
        let client = spawn_server().await;

        assert!(client.upsert_officer("A", "Andres", None).await.unwrap());
        assert!(!client.upsert_officer("A", "Andres Cruz", None).await.unwrap());

        let record = client.report_location("A", 14.70, 121.05).await.unwrap();
        assert!(record.is_active());
        assert_eq!(record.officer_name.as_deref(), Some("Andres Cruz"));

        let active = client.active().await.unwrap();
        assert_eq!(active.len(), 1);

        let session = client.logout("A").await.unwrap();
        assert!(!session.is_active);
        assert!(client.active().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_api_error_carries_code() {
        let client = spawn_server().await;

        let err = client.report_location("ghost", 14.70, 121.05).await.unwrap_err();
        match err {
            CliError::ApiError { status, code, .. } => {
                assert_eq!(status, 404);
                assert_eq!(code, "UNKNOWN_OFFICER");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
