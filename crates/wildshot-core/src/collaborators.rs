//! Ports to the external services an expedition depends on.
//!
//! Every implementation is network-backed and asynchronous. The expedition
//! context only ever sees these traits; concrete HTTP clients live in
//! `wildshot-studio` and the result archive in `wildshot-event-store`.

use async_trait::async_trait;

use crate::error::DomainError;

/// Generates a 360° panoramic scene for a biome.
#[async_trait]
pub trait SceneGenerator: Send + Sync {
    /// Returns the URL of a new equirectangular panorama, or `None` when the
    /// provider produced nothing usable.
    async fn generate_panorama(&self, prompt: &str) -> Result<Option<String>, DomainError>;
}

/// Upscales a cropped region of a panorama.
#[async_trait]
pub trait ImageEnhancer: Send + Sync {
    /// Returns the URL of the enhanced image.
    async fn upscale(&self, image_url: &str, prompt: &str) -> Result<String, DomainError>;
}

/// Describes the creatures and plants visible in an image.
#[async_trait]
pub trait VisionAnalyzer: Send + Sync {
    /// Returns free-form analysis text. Identified species are expected to be
    /// wrapped in `**` markers.
    async fn analyze(&self, prompt: &str, image_url: &str) -> Result<String, DomainError>;
}

/// Asks a text model to restate an analysis as a `{species, score}` record.
#[async_trait]
pub trait ScoreFormatter: Send + Sync {
    /// Returns the raw completion text; callers parse it.
    async fn format_score(&self, analysis: &str, score: u32) -> Result<String, DomainError>;
}

/// Stores the final result of a finished expedition.
#[async_trait]
pub trait ResultArchive: Send + Sync {
    /// Records `final_score` for `player_name`.
    async fn persist_result(&self, player_name: &str, final_score: u32) -> Result<(), DomainError>;
}
