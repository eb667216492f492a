//! Wildshot Studio: HTTP adapters for the external AI services.
//!
//! Each client implements one or more collaborator ports from
//! `wildshot_core::collaborators`:
//!
//! - [`blockade::BlockadeClient`]: skybox panoramas ([`SceneGenerator`])
//! - [`fal::FalClient`]: fallback panoramas and creative upscaling
//!   ([`SceneGenerator`], [`ImageEnhancer`])
//! - [`gemini::GeminiClient`]: species identification ([`VisionAnalyzer`])
//! - [`groq::GroqClient`]: structured score records ([`ScoreFormatter`])
//!
//! [`SceneGenerator`]: wildshot_core::collaborators::SceneGenerator
//! [`ImageEnhancer`]: wildshot_core::collaborators::ImageEnhancer
//! [`VisionAnalyzer`]: wildshot_core::collaborators::VisionAnalyzer
//! [`ScoreFormatter`]: wildshot_core::collaborators::ScoreFormatter

pub mod blockade;
pub mod error;
pub mod fal;
pub mod gemini;
pub mod groq;
pub mod scene;
pub mod unconfigured;

use std::time::Duration;

use error::StudioError;

const USER_AGENT: &str = concat!("wildshot/", env!("CARGO_PKG_VERSION"));

/// Per-request timeout for every studio call.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Builds the shared `reqwest` client configuration.
///
/// # Errors
///
/// Returns `StudioError::Network` if the TLS backend cannot be initialized.
pub fn http_client() -> Result<reqwest::Client, StudioError> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|e| StudioError::Network(e.to_string()))
}

/// Reads a non-2xx response into `StudioError::Api`.
pub(crate) async fn api_error(service: &'static str, response: reqwest::Response) -> StudioError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    StudioError::Api {
        service,
        status,
        body,
    }
}
