//! Push a metrics snapshot to a Prometheus Pushgateway
//!
//! One call, one request: the registry is gathered and encoded up front, the
//! credential decorates the request, and the outcome is returned as-is.
//! There is no retry; a failed push is reported once and abandoned.

use crate::domain::credential::Credential;
use crate::domain::errors::PushError;
use crate::domain::push_job::PushJob;
use crate::infrastructure::core::HttpClientFactory;
use prometheus::{Encoder, Registry, TextEncoder};
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{debug, info};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

// Gateway error bodies can be whole HTML pages.
const MAX_ERROR_BODY_CHARS: usize = 512;

/// Encoded metrics, frozen at the moment they were gathered
#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    pub families: usize,
    pub content_type: String,
    pub body: String,
}

/// Outcome of a successful push
#[derive(Debug, Clone, Serialize)]
pub struct PushReport {
    pub timestamp: String,
    pub job: String,
    pub endpoint: String,
    pub method: String,
    pub status: u16,
    pub metric_families: usize,
    pub body_bytes: usize,
    pub elapsed_ms: u64,
}

/// Authenticated pusher
pub struct Pusher {
    client: Client,
    credential: Credential,
}

impl Pusher {
    pub fn new(credential: Credential, timeout: Duration, connect_timeout: Duration) -> Self {
        Self::with_client(
            HttpClientFactory::create_client(timeout, connect_timeout),
            credential,
        )
    }

    pub fn with_client(client: Client, credential: Credential) -> Self {
        Self { client, credential }
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    /// Gather `registry`, check it against the job's labels and encode it
    pub fn snapshot(job: &PushJob, registry: &Registry) -> Result<MetricsSnapshot, PushError> {
        let metric_families = registry.gather();
        job.check_label_conflicts(&metric_families)?;

        let encoder = TextEncoder::new();
        let body = encoder.encode_to_string(&metric_families)?;
        Ok(MetricsSnapshot {
            families: metric_families.len(),
            content_type: encoder.format_type().to_string(),
            body,
        })
    }

    /// Snapshot `registry` and push it
    pub async fn push(&self, job: &PushJob, registry: &Registry) -> Result<PushReport, PushError> {
        let snapshot = Self::snapshot(job, registry)?;
        self.push_snapshot(job, snapshot).await
    }

    /// Push an already taken snapshot
    pub async fn push_snapshot(
        &self,
        job: &PushJob,
        snapshot: MetricsSnapshot,
    ) -> Result<PushReport, PushError> {
        let endpoint = job.endpoint()?;
        let url = endpoint.to_string();
        let method = job.push_method();
        let body_bytes = snapshot.body.len();

        debug!(
            "Pusher: {} {} ({} families, {} bytes, auth={})",
            method,
            url,
            snapshot.families,
            body_bytes,
            self.credential.scheme().as_str()
        );

        let request = self
            .client
            .request(method.as_http(), endpoint)
            .header(CONTENT_TYPE, snapshot.content_type)
            .body(snapshot.body);
        let request = self.credential.apply_to_request(request);

        let start = Instant::now();
        let response = request.send().await.map_err(|source| PushError::Transport {
            url: url.clone(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PushError::Protocol {
                url,
                status,
                body: body.trim().chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        let elapsed_ms = start.elapsed().as_millis() as u64;
        info!("Pusher: {} {} -> {} in {}ms", method, url, status, elapsed_ms);

        Ok(PushReport {
            timestamp: chrono::Utc::now().to_rfc3339(),
            job: job.job_name().to_string(),
            endpoint: url,
            method: method.to_string(),
            status: status.as_u16(),
            metric_families: snapshot.families,
            body_bytes,
            elapsed_ms,
        })
    }
}

/// One-shot push with a default client
pub async fn push(
    job: &PushJob,
    credential: &Credential,
    registry: &Registry,
) -> Result<PushReport, PushError> {
    Pusher::new(credential.clone(), DEFAULT_TIMEOUT, DEFAULT_CONNECT_TIMEOUT)
        .push(job, registry)
        .await
}
