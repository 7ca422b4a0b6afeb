//! Langfuse backend seam and its HTTP implementation.
//!
//! # Responsibilities
//! - Define the trace-then-generation call shape the logger depends on
//! - Post each record to the public ingestion API with basic auth
//! - Surface non-success statuses and per-event rejections as errors
//!
//! # Design Decisions
//! - One ingestion batch per record; the logger awaits the trace before the generation
//! - Every request carries a client-side timeout; nothing is retried

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use crate::integrations::langfuse::credentials::LangfuseCredentials;
use crate::integrations::langfuse::types::{
    GenerationHandle, GenerationParams, LangfuseError, LangfuseResult, TraceHandle, TraceParams,
};

const INGESTION_PATH: &str = "api/public/ingestion";

/// The calls the logger makes against a Langfuse-compatible backend.
#[async_trait]
pub trait LangfuseBackend: Send + Sync {
    async fn trace(&self, params: TraceParams) -> LangfuseResult<TraceHandle>;

    async fn generation(
        &self,
        trace: &TraceHandle,
        params: GenerationParams,
    ) -> LangfuseResult<GenerationHandle>;
}

#[derive(Serialize)]
struct IngestionBatch<'a, T: Serialize> {
    batch: [IngestionEvent<'a, T>; 1],
}

#[derive(Serialize)]
struct IngestionEvent<'a, T: Serialize> {
    id: String,
    timestamp: String,
    #[serde(rename = "type")]
    kind: &'static str,
    body: &'a T,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationBody<'a> {
    trace_id: &'a str,
    #[serde(flatten)]
    params: &'a GenerationParams,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct IngestionResponse {
    errors: Vec<IngestionFailure>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct IngestionFailure {
    id: String,
    message: Option<String>,
    error: Option<serde_json::Value>,
}

/// Talks to `<host>/api/public/ingestion`.
#[derive(Debug, Clone)]
pub struct HttpLangfuseBackend {
    http: reqwest::Client,
    endpoint: Url,
    credentials: LangfuseCredentials,
}

impl HttpLangfuseBackend {
    pub fn new(credentials: LangfuseCredentials, request_timeout: Duration) -> LangfuseResult<Self> {
        let endpoint = credentials
            .host
            .join(INGESTION_PATH)
            .map_err(|source| LangfuseError::InvalidHost {
                host: credentials.host.to_string(),
                source,
            })?;
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()?;

        tracing::info!(endpoint = %endpoint, "Langfuse HTTP backend initialized");

        Ok(Self {
            http,
            endpoint,
            credentials,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn ingest<T: Serialize + Sync>(&self, kind: &'static str, body: &T) -> LangfuseResult<()> {
        let event_id = Uuid::new_v4().to_string();
        let batch = IngestionBatch {
            batch: [IngestionEvent {
                id: event_id.clone(),
                timestamp: Utc::now().to_rfc3339(),
                kind,
                body,
            }],
        };

        let response = self
            .http
            .post(self.endpoint.clone())
            .basic_auth(
                self.credentials.public_key.expose(),
                Some(self.credentials.secret_key.expose()),
            )
            .json(&batch)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LangfuseError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: IngestionResponse = response.json().await.unwrap_or_default();
        if let Some(failure) = parsed.errors.into_iter().next() {
            let message = failure
                .message
                .or_else(|| failure.error.map(|e| e.to_string()))
                .unwrap_or_else(|| "unknown error".to_string());
            return Err(LangfuseError::Rejected {
                event_id: if failure.id.is_empty() { event_id } else { failure.id },
                message,
            });
        }

        tracing::debug!(kind, event_id = %event_id, "Langfuse event ingested");
        Ok(())
    }
}

#[async_trait]
impl LangfuseBackend for HttpLangfuseBackend {
    async fn trace(&self, params: TraceParams) -> LangfuseResult<TraceHandle> {
        self.ingest("trace-create", &params).await?;
        Ok(TraceHandle { id: params.id })
    }

    async fn generation(
        &self,
        trace: &TraceHandle,
        params: GenerationParams,
    ) -> LangfuseResult<GenerationHandle> {
        let body = GenerationBody {
            trace_id: &trace.id,
            params: &params,
        };
        self.ingest("generation-create", &body).await?;
        Ok(GenerationHandle {
            id: params.id,
            trace_id: trace.id.clone(),
        })
    }
}
