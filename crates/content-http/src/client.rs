//! Blocking HTTP client driven from async code
//!
//! Requests go through a shared `ureq` agent on tokio's blocking pool. There
//! are no retries: every failure is reported once as a [`StoreError`].

use std::sync::Arc;

use async_trait::async_trait;
use content_core::{
    Action, ActionResult, ClientConfig, ContentStore, Document, DocumentId, DocumentSource,
    Mutation, StoreError,
};
use serde_json::json;

use crate::wire::{Endpoints, decode_document, decode_transaction, error_message};

/// One prepared request, owned so it can move onto the blocking pool.
#[derive(Debug, Clone)]
struct Request {
    url: String,
    token: Option<String>,
    body: Option<Vec<u8>>,
}

/// Content store backed by the remote HTTP API.
#[derive(Clone)]
pub struct HttpStore {
    agent: ureq::Agent,
    endpoints: Endpoints,
    config: Arc<ClientConfig>,
}

impl HttpStore {
    pub fn new(config: Arc<ClientConfig>) -> Self {
        let agent_config = ureq::Agent::config_builder()
            .timeout_global(Some(config.timeout()))
            .http_status_as_error(false)
            .build();

        Self {
            agent: ureq::Agent::new_with_config(agent_config),
            endpoints: Endpoints::new(&config),
            config,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn get(&self, url: String) -> Request {
        Request {
            url,
            token: self.config.token.clone(),
            body: None,
        }
    }

    fn post(&self, url: String, body: &serde_json::Value) -> Result<Request, StoreError> {
        let body = serde_json::to_vec(body)
            .map_err(|e| StoreError::Decode(format!("failed to serialize request: {}", e)))?;
        Ok(Request {
            url,
            token: self.config.token.clone(),
            body: Some(body),
        })
    }

    /// Run a request on the blocking pool, returning status and body text.
    async fn execute(&self, request: Request) -> Result<(u16, String), StoreError> {
        let agent = self.agent.clone();
        tokio::task::spawn_blocking(move || send(&agent, &request))
            .await
            .map_err(|e| StoreError::Transport(format!("request task failed: {}", e)))?
    }
}

fn send(agent: &ureq::Agent, request: &Request) -> Result<(u16, String), StoreError> {
    let auth = request.token.as_ref().map(|t| format!("Bearer {}", t));

    let result = match &request.body {
        None => {
            let mut builder = agent.get(&request.url);
            if let Some(auth) = &auth {
                builder = builder.header("Authorization", auth);
            }
            builder.call()
        }
        Some(body) => {
            let mut builder = agent
                .post(&request.url)
                .header("Content-Type", "application/json");
            if let Some(auth) = &auth {
                builder = builder.header("Authorization", auth);
            }
            builder.send(&body[..])
        }
    };

    let mut response = result.map_err(|e| StoreError::Transport(e.to_string()))?;
    let status = response.status().as_u16();
    let text = response
        .body_mut()
        .read_to_string()
        .map_err(|e| StoreError::Transport(format!("failed to read response: {}", e)))?;

    Ok((status, text))
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

#[async_trait]
impl DocumentSource for HttpStore {
    async fn fetch_document(&self, id: &DocumentId) -> Result<Option<Document>, StoreError> {
        let url = self.endpoints.document(&id.to_string());
        tracing::debug!(id = %id, "Fetching document");

        let (status, body) = self.execute(self.get(url)).await?;
        match status {
            404 => Ok(None),
            s if is_success(s) => decode_document(&body),
            s => Err(StoreError::Rejected {
                status: s,
                message: error_message(&body),
            }),
        }
    }
}

#[async_trait]
impl ContentStore for HttpStore {
    async fn perform_action(&self, action: &Action) -> Result<ActionResult, StoreError> {
        let body = json!({ "actions": [action] });
        let request = self.post(self.endpoints.actions(), &body)?;

        let (status, body) = self.execute(request).await?;
        if !is_success(status) {
            tracing::debug!(status, action = %action.kind(), "Action rejected");
            return Err(StoreError::Rejected {
                status,
                message: error_message(&body),
            });
        }
        decode_transaction(&body)
    }

    async fn mutate(&self, mutation: &Mutation) -> Result<ActionResult, StoreError> {
        let body = json!({ "mutations": [mutation.to_json()] });
        let request = self.post(self.endpoints.mutate(), &body)?;

        let (status, body) = self.execute(request).await?;
        if !is_success(status) {
            tracing::debug!(status, "Mutation rejected");
            return Err(StoreError::Rejected {
                status,
                message: error_message(&body),
            });
        }
        decode_transaction(&body)
    }
}
