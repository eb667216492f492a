//! Blockade Labs skybox client.
//!
//! Skybox generation is asynchronous on the provider side: a submit call
//! returns a job id, and the job is polled until it completes or fails.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use wildshot_core::collaborators::SceneGenerator;
use wildshot_core::error::DomainError;

use crate::error::StudioError;
use crate::{api_error, http_client};

const SERVICE: &str = "blockade";
const BLOCKADE_BASE_URL: &str = "https://backend.blockadelabs.com/api/v1";
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);
const DEFAULT_MAX_POLLS: u32 = 60;

/// Provider-side job states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkyboxStatus {
    /// Queued, not yet picked up.
    Pending,
    /// Handed to a worker.
    Dispatched,
    /// Rendering.
    Processing,
    /// Finished; `file_url` holds the panorama.
    Complete,
    /// Cancelled by the provider.
    Abort,
    /// Rendering failed.
    Error,
}

impl SkyboxStatus {
    /// Whether polling should stop.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Complete | Self::Abort | Self::Error)
    }
}

/// A skybox job as returned by submit and status calls.
#[derive(Debug, Clone, Deserialize)]
pub struct SkyboxJob {
    /// Provider job identifier, used for polling.
    pub id: u64,
    /// Current job state.
    pub status: SkyboxStatus,
    /// Panorama URL; blank until the job completes.
    #[serde(default)]
    pub file_url: Option<String>,
    /// Provider's explanation when the job fails.
    #[serde(default)]
    pub error_message: Option<String>,
}

impl SkyboxJob {
    /// The finished panorama URL, if the job completed with a file.
    #[must_use]
    pub fn panorama_url(&self) -> Option<&str> {
        match self.status {
            SkyboxStatus::Complete => self.file_url.as_deref().filter(|u| !u.is_empty()),
            _ => None,
        }
    }
}

#[derive(Deserialize)]
struct StatusEnvelope {
    request: SkyboxJob,
}

#[derive(Serialize)]
struct SubmitRequest<'a> {
    prompt: &'a str,
}

/// Blockade Labs skybox API client.
pub struct BlockadeClient {
    http_client: reqwest::Client,
    api_key: String,
    base_url: String,
    poll_interval: Duration,
    max_polls: u32,
}

impl BlockadeClient {
    /// Creates a client for the public API.
    ///
    /// # Errors
    ///
    /// Returns `StudioError::Network` if the HTTP client cannot be built.
    pub fn new(api_key: String) -> Result<Self, StudioError> {
        Ok(Self {
            http_client: http_client()?,
            api_key,
            base_url: BLOCKADE_BASE_URL.to_owned(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_polls: DEFAULT_MAX_POLLS,
        })
    }

    /// Points the client at another host.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Overrides the polling cadence.
    #[must_use]
    pub fn with_polling(mut self, interval: Duration, max_polls: u32) -> Self {
        self.poll_interval = interval;
        self.max_polls = max_polls.max(1);
        self
    }

    async fn submit(&self, prompt: &str) -> Result<SkyboxJob, StudioError> {
        let response = self
            .http_client
            .post(format!("{}/skybox", self.base_url))
            .header("x-api-key", &self.api_key)
            .json(&SubmitRequest { prompt })
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(api_error(SERVICE, response).await);
        }
        response.json().await.map_err(|e| StudioError::Parse {
            service: SERVICE,
            detail: e.to_string(),
        })
    }

    async fn status(&self, job_id: u64) -> Result<SkyboxJob, StudioError> {
        let response = self
            .http_client
            .get(format!("{}/imagine/requests/{job_id}", self.base_url))
            .header("x-api-key", &self.api_key)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(api_error(SERVICE, response).await);
        }
        let envelope: StatusEnvelope = response.json().await.map_err(|e| StudioError::Parse {
            service: SERVICE,
            detail: e.to_string(),
        })?;
        Ok(envelope.request)
    }

    /// Submits a skybox job and waits for it to finish.
    ///
    /// # Errors
    ///
    /// Returns `StudioError::Timeout` when the job is still running after the
    /// last poll, or any transport/API error along the way.
    pub async fn generate_skybox(&self, prompt: &str) -> Result<SkyboxJob, StudioError> {
        let mut job = self.submit(prompt).await?;
        tracing::debug!(job_id = job.id, status = ?job.status, "Skybox job submitted");

        let mut polls = 0;
        while !job.status.is_terminal() {
            if polls == self.max_polls {
                return Err(StudioError::Timeout {
                    service: SERVICE,
                    job: job.id.to_string(),
                    attempts: polls,
                });
            }
            tokio::time::sleep(self.poll_interval).await;
            job = self.status(job.id).await?;
            polls += 1;
        }

        tracing::info!(job_id = job.id, status = ?job.status, polls, "Skybox job finished");
        Ok(job)
    }
}

#[async_trait]
impl SceneGenerator for BlockadeClient {
    async fn generate_panorama(&self, prompt: &str) -> Result<Option<String>, DomainError> {
        let job = self.generate_skybox(prompt).await?;
        if let Some(message) = &job.error_message {
            tracing::warn!(job_id = job.id, error = %message, "Skybox job failed");
        }
        Ok(job.panorama_url().map(str::to_owned))
    }
}
