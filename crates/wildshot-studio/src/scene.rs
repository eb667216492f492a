//! Scene generation with a fallback provider.

use std::sync::Arc;

use async_trait::async_trait;
use wildshot_core::collaborators::SceneGenerator;
use wildshot_core::error::DomainError;

/// Tries `primary` first and asks `fallback` when it errors or comes back
/// empty. Only the fallback's error is surfaced.
pub struct FallbackSceneGenerator {
    primary: Arc<dyn SceneGenerator>,
    fallback: Arc<dyn SceneGenerator>,
}

impl FallbackSceneGenerator {
    #[must_use]
    pub fn new(primary: Arc<dyn SceneGenerator>, fallback: Arc<dyn SceneGenerator>) -> Self {
        Self { primary, fallback }
    }
}

#[async_trait]
impl SceneGenerator for FallbackSceneGenerator {
    async fn generate_panorama(&self, prompt: &str) -> Result<Option<String>, DomainError> {
        match self.primary.generate_panorama(prompt).await {
            Ok(Some(url)) => return Ok(Some(url)),
            Ok(None) => tracing::warn!("Primary scene generator returned nothing, falling back"),
            Err(e) => tracing::warn!(error = %e, "Primary scene generator failed, falling back"),
        }
        self.fallback.generate_panorama(prompt).await
    }
}
