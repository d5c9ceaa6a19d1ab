//! Metadata API HTTP client.
//!
//! Blocking reqwest client (no Tokio runtime required). The grid issues
//! one save call per affected row; the server reports failure through a
//! boolean error flag on the response envelope.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use metagrid_engine::apply::{RowStore, StoreError};
use metagrid_engine::row::EntityRow;

use crate::auth::{load_auth, AuthCredentials};

/// Metadata API client (blocking).
#[derive(Clone)]
pub struct MetadataClient {
    http: reqwest::blocking::Client,
    api_base: String,
    token: String,
}

/// Error type for metadata API operations.
#[derive(Debug)]
pub enum ClientError {
    /// No auth credentials configured
    NotAuthenticated,
    /// Network error
    Network(String),
    /// HTTP error with status code
    Http(u16, String),
    /// JSON parsing error
    Parse(String),
    /// Server returned a validation error (4xx with message)
    Validation(String),
    /// Server-side failure reported through the envelope's error flag
    Api(String),
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientError::NotAuthenticated => {
                write!(f, "Not authenticated — run `mgrid login` first")
            }
            ClientError::Network(msg) => write!(f, "Network error: {}", msg),
            ClientError::Http(code, msg) => write!(f, "HTTP {}: {}", code, msg),
            ClientError::Parse(msg) => write!(f, "Parse error: {}", msg),
            ClientError::Validation(msg) => write!(f, "{}", msg),
            ClientError::Api(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for ClientError {}

/// Response envelope shared by all metadata endpoints.
///
/// `error: true` carries a human-readable `message`; `payload` holds
/// the result otherwise.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(default)]
    pub error: bool,
    #[serde(default)]
    pub message: Option<String>,
    pub payload: Option<T>,
}

impl MetadataClient {
    /// Create a client from saved auth credentials.
    pub fn from_saved_auth() -> Result<Self, ClientError> {
        let creds = load_auth().ok_or(ClientError::NotAuthenticated)?;
        Ok(Self::new(creds))
    }

    /// Create a client with explicit credentials and the default
    /// 60-second timeout.
    pub fn new(creds: AuthCredentials) -> Self {
        Self::with_timeout(creds, Duration::from_secs(60))
    }

    pub fn with_timeout(creds: AuthCredentials, timeout: Duration) -> Self {
        let http = reqwest::blocking::Client::builder()
            .user_agent(format!("mgrid/{}", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            api_base: creds.api_base,
            token: creds.token,
        }
    }

    /// Persist one entity row. Returns the row as the server stored it.
    pub fn save_entity(&self, row: &EntityRow) -> Result<EntityRow, ClientError> {
        let url = format!("{}/restapi/metadata/save", self.api_base);
        let resp = self.post_json(&url, row)?;
        unwrap_payload(resp)
    }

    /// List the metadata entities of a class, optionally scoped to a
    /// parent folder. Populates the grid.
    pub fn list_entities(
        &self,
        class: &str,
        parent: Option<u64>,
    ) -> Result<Vec<EntityRow>, ClientError> {
        let mut url = format!("{}/restapi/metadata/entities?class={}", self.api_base, class);
        if let Some(parent) = parent {
            url.push_str(&format!("&parent={}", parent));
        }
        let resp = self.get(&url)?;
        unwrap_payload(resp)
    }

    // ── Internal helpers ────────────────────────────────────────────

    fn get(&self, url: &str) -> Result<reqwest::blocking::Response, ClientError> {
        let response = self
            .http
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .map_err(|e| ClientError::Network(e.to_string()))?;
        check_status(response)
    }

    fn post_json<B: Serialize>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<reqwest::blocking::Response, ClientError> {
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .map_err(|e| ClientError::Network(e.to_string()))?;
        check_status(response)
    }
}

fn check_status(
    response: reqwest::blocking::Response,
) -> Result<reqwest::blocking::Response, ClientError> {
    let status = response.status().as_u16();
    if !response.status().is_success() {
        let body = response.text().unwrap_or_default();
        if status == 422 || status == 400 {
            return Err(ClientError::Validation(body));
        }
        return Err(ClientError::Http(status, body));
    }
    Ok(response)
}

fn unwrap_payload<T: DeserializeOwned>(
    response: reqwest::blocking::Response,
) -> Result<T, ClientError> {
    let envelope: ApiResponse<T> = response
        .json()
        .map_err(|e| ClientError::Parse(e.to_string()))?;
    if envelope.error {
        return Err(ClientError::Api(
            envelope
                .message
                .unwrap_or_else(|| "metadata API error".into()),
        ));
    }
    envelope
        .payload
        .ok_or_else(|| ClientError::Parse("Missing payload in response".into()))
}

impl RowStore for MetadataClient {
    fn save_row(&self, row: &EntityRow) -> Result<EntityRow, StoreError> {
        self.save_entity(row).map_err(|e| StoreError {
            entity_id: row.entity_id.clone(),
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_error_flag_defaults_false() {
        let env: ApiResponse<u32> = serde_json::from_str(r#"{"payload": 7}"#).unwrap();
        assert!(!env.error);
        assert_eq!(env.payload, Some(7));
    }

    #[test]
    fn envelope_carries_server_message() {
        let env: ApiResponse<u32> =
            serde_json::from_str(r#"{"error": true, "message": "Access denied"}"#).unwrap();
        assert!(env.error);
        assert_eq!(env.message.as_deref(), Some("Access denied"));
        assert!(env.payload.is_none());
    }
}
