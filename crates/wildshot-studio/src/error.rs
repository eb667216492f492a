//! Studio client errors.

use thiserror::Error;
use wildshot_core::error::DomainError;

/// Errors raised by the studio HTTP clients.
#[derive(Debug, Error)]
pub enum StudioError {
    /// The request never got a response.
    #[error("network error: {0}")]
    Network(String),

    /// The service answered with a non-success status.
    #[error("{service} returned {status}: {body}")]
    Api {
        /// Which service failed.
        service: &'static str,
        /// HTTP status code.
        status: u16,
        /// Response body, if readable.
        body: String,
    },

    /// The response body did not have the expected shape.
    #[error("{service} response could not be parsed: {detail}")]
    Parse {
        /// Which service failed.
        service: &'static str,
        /// What was wrong.
        detail: String,
    },

    /// A job was still running after the last poll.
    #[error("{service} job {job} did not finish after {attempts} polls")]
    Timeout {
        /// Which service.
        service: &'static str,
        /// Provider job identifier.
        job: String,
        /// Number of polls made.
        attempts: u32,
    },
}

impl From<StudioError> for DomainError {
    fn from(err: StudioError) -> Self {
        DomainError::Collaborator(err.to_string())
    }
}

impl From<reqwest::Error> for StudioError {
    fn from(err: reqwest::Error) -> Self {
        StudioError::Network(err.to_string())
    }
}
