//! HTTP record store: talks to the signal API over REST.
//!
//! Uses `ureq` (sync) wrapped in `tokio::task::spawn_blocking` to avoid
//! blocking the async runtime.
//!
//! - `GET  {base_url}/signals`                    → JSON array of records
//! - `PUT  {base_url}/signals/{id}/status`        ← raw state id, `text/plain`
//! - `PUT  {base_url}/signals/{id}/description`   ← full description, `text/plain`

use async_trait::async_trait;
use sigboard_storage::{Record, RecordId, RecordStore, StoreError};

use super::StoreConfig;

/// Collection path under the API base URL.
pub const RECORDS_PATH: &str = "signals";

/// A [`RecordStore`] backed by the remote signal API.
pub struct HttpRecordStore {
    config: StoreConfig,
    agent: ureq::Agent,
}

impl HttpRecordStore {
    pub fn new(config: StoreConfig) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(config.timeout))
            .build()
            .into();
        HttpRecordStore { config, agent }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn records_url(&self) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            RECORDS_PATH
        )
    }

    /// URL of one field of one record, e.g. `.../signals/42/status`.
    pub fn field_url(&self, id: &RecordId, field: &str) -> String {
        format!(
            "{}/{}/{}",
            self.records_url(),
            urlencoding::encode(id.as_str()),
            field
        )
    }

    async fn put_text(&self, id: &RecordId, field: &str, body: &str) -> Result<(), StoreError> {
        let url = self.field_url(id, field);
        let agent = self.agent.clone();
        let token = self.config.auth_token.clone();
        let body = body.to_string();
        let id = id.clone();

        tokio::task::spawn_blocking(move || {
            authorize(agent.put(&url), token.as_deref())
                .header("Content-Type", "text/plain")
                .send(body.as_str())
                .map(|_| ())
                .map_err(|e| map_error(e, Some(&id)))
        })
        .await
        .map_err(|e| StoreError::Backend(format!("task join error: {}", e)))?
    }
}

fn authorize<B>(request: ureq::RequestBuilder<B>, token: Option<&str>) -> ureq::RequestBuilder<B> {
    match token {
        Some(token) => request.header("Authorization", &format!("Bearer {}", token)),
        None => request,
    }
}

/// Translate a transport-level failure into the store taxonomy.
fn map_error(error: ureq::Error, id: Option<&RecordId>) -> StoreError {
    match error {
        ureq::Error::StatusCode(401) => StoreError::Unauthorized,
        ureq::Error::StatusCode(404) => match id {
            Some(id) => StoreError::NotFound { id: id.to_string() },
            None => StoreError::Rejected {
                status: 404,
                message: "collection not found".to_string(),
            },
        },
        ureq::Error::StatusCode(status) => StoreError::Rejected {
            status,
            message: format!("HTTP {}", status),
        },
        ureq::Error::Json(e) => StoreError::Decode(e.to_string()),
        other => StoreError::Transport(other.to_string()),
    }
}

#[async_trait]
impl RecordStore for HttpRecordStore {
    async fn list_records(&self) -> Result<Vec<Record>, StoreError> {
        let url = self.records_url();
        let agent = self.agent.clone();
        let token = self.config.auth_token.clone();

        tokio::task::spawn_blocking(move || {
            let response = authorize(agent.get(&url), token.as_deref())
                .header("Accept", "application/json")
                .call()
                .map_err(|e| map_error(e, None))?;

            response
                .into_body()
                .read_json::<Vec<Record>>()
                .map_err(|e| StoreError::Decode(e.to_string()))
        })
        .await
        .map_err(|e| StoreError::Backend(format!("task join error: {}", e)))?
    }

    async fn update_status(&self, id: &RecordId, status: &str) -> Result<(), StoreError> {
        self.put_text(id, "status", status).await
    }

    async fn update_description(&self, id: &RecordId, description: &str) -> Result<(), StoreError> {
        self.put_text(id, "description", description).await
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
