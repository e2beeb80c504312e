//! Credential fetcher
//!
//! Issues exactly one POST per call to the backend's connection-details
//! endpoint. Retry policy belongs to the caller; each call requests a fresh
//! token.

use crate::connection::credentials::SessionCredentials;
use crate::error::{ParleyError, Result};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Path of the credential endpoint, relative to the backend base URL.
const CONNECTION_DETAILS_PATH: &str = "/api/connection-details";

#[derive(Serialize)]
struct ConnectionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    room_config: Option<RoomConfig>,
}

#[derive(Serialize)]
struct RoomConfig {
    agents: Vec<AgentHint>,
}

#[derive(Serialize)]
struct AgentHint {
    agent_name: String,
}

impl ConnectionRequest {
    fn new(agent_name: Option<&str>) -> Self {
        Self {
            room_config: agent_name.map(|name| RoomConfig {
                agents: vec![AgentHint {
                    agent_name: name.to_string(),
                }],
            }),
        }
    }
}

/// Source of session credentials, as seen from the supervisor's fetch worker.
///
/// The call blocks the worker thread it runs on; the supervisor never calls
/// it from its event loop. Tests substitute canned sources through this seam.
pub trait CredentialSource: Send + Sync {
    fn fetch_credentials(&self, agent_name: Option<&str>) -> Result<SessionCredentials>;
}

/// HTTP credential fetcher against the Parley backend
pub struct CredentialFetcher {
    http: reqwest::Client,
    base_url: String,
}

impl CredentialFetcher {
    /// Create a fetcher for the given backend base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Request a fresh set of session credentials.
    ///
    /// Sends exactly one request and does not retry. Network-level failures
    /// surface as [`ParleyError::Transport`], non-2xx responses as
    /// [`ParleyError::Server`] with the response body preserved, and
    /// structurally invalid payloads as [`ParleyError::MalformedCredentials`].
    pub async fn fetch(&self, agent_name: Option<&str>) -> Result<SessionCredentials> {
        let url = format!(
            "{}{}",
            self.base_url.trim_end_matches('/'),
            CONNECTION_DETAILS_PATH
        );
        debug!("Requesting connection details from {}", url);

        let response = self
            .http
            .post(&url)
            .json(&ConnectionRequest::new(agent_name))
            .send()
            .await
            .map_err(|e| ParleyError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Credential request rejected with {}: {}", status, body);
            return Err(ParleyError::Server {
                status: status.as_u16(),
                body,
            });
        }

        let credentials: SessionCredentials = response
            .json()
            .await
            .map_err(|e| ParleyError::MalformedCredentials(e.to_string()))?;
        credentials.validate()?;

        info!(
            "Received connection details for room '{}'",
            credentials.room_name
        );
        Ok(credentials)
    }
}

impl CredentialSource for CredentialFetcher {
    fn fetch_credentials(&self, agent_name: Option<&str>) -> Result<SessionCredentials> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| ParleyError::Config(format!("failed to start fetch runtime: {}", e)))?;
        runtime.block_on(self.fetch(agent_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn valid_body() -> serde_json::Value {
        serde_json::json!({
            "serverUrl": "wss://voice.example.com",
            "roomName": "room_1234",
            "participantName": "user",
            "participantToken": "jwt-token"
        })
    }

    #[test]
    fn test_request_body_omits_missing_hint() {
        let body = serde_json::to_value(ConnectionRequest::new(None)).unwrap();
        assert_eq!(body, serde_json::json!({}));
    }

    #[test]
    fn test_request_body_carries_agent_hint() {
        let body = serde_json::to_value(ConnectionRequest::new(Some("support"))).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "room_config": { "agents": [{ "agent_name": "support" }] }
            })
        );
    }

    #[tokio::test]
    async fn test_fetch_resolves_valid_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/connection-details"))
            .respond_with(ResponseTemplate::new(200).set_body_json(valid_body()))
            .expect(1)
            .mount(&server)
            .await;

        let fetcher = CredentialFetcher::new(server.uri());
        let creds = fetcher.fetch(None).await.unwrap();
        assert_eq!(creds.server_url, "wss://voice.example.com");
        assert_eq!(creds.room_name, "room_1234");
        assert_eq!(creds.participant_name, "user");
        assert_eq!(creds.participant_token, "jwt-token");
    }

    #[tokio::test]
    async fn test_fetch_sends_agent_hint() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/connection-details"))
            .and(body_json(serde_json::json!({
                "room_config": { "agents": [{ "agent_name": "support" }] }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(valid_body()))
            .expect(1)
            .mount(&server)
            .await;

        let fetcher = CredentialFetcher::new(server.uri());
        assert!(fetcher.fetch(Some("support")).await.is_ok());
    }

    #[tokio::test]
    async fn test_non_2xx_surfaces_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/connection-details"))
            .respond_with(ResponseTemplate::new(500).set_body_string("credentials not configured"))
            .mount(&server)
            .await;

        let fetcher = CredentialFetcher::new(server.uri());
        match fetcher.fetch(None).await.unwrap_err() {
            ParleyError::Server { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "credentials not configured");
            }
            other => panic!("expected Server error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_field_is_malformed() {
        let server = MockServer::start().await;
        let mut body = valid_body();
        body["participantToken"] = serde_json::json!("");
        Mock::given(method("POST"))
            .and(path("/api/connection-details"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let fetcher = CredentialFetcher::new(server.uri());
        assert!(matches!(
            fetcher.fetch(None).await.unwrap_err(),
            ParleyError::MalformedCredentials(_)
        ));
    }

    #[tokio::test]
    async fn test_missing_field_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/connection-details"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "serverUrl": "wss://x" })),
            )
            .mount(&server)
            .await;

        let fetcher = CredentialFetcher::new(server.uri());
        assert!(matches!(
            fetcher.fetch(None).await.unwrap_err(),
            ParleyError::MalformedCredentials(_)
        ));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_transport_error() {
        // Nothing listens on this port
        let fetcher = CredentialFetcher::new("http://127.0.0.1:9");
        assert!(matches!(
            fetcher.fetch(None).await.unwrap_err(),
            ParleyError::Transport(_)
        ));
    }
}
