//! Stand-in for a service whose API key was not provided.

use async_trait::async_trait;
use wildshot_core::collaborators::{ImageEnhancer, SceneGenerator, ScoreFormatter, VisionAnalyzer};
use wildshot_core::error::DomainError;

/// Fails every call with a collaborator error naming the missing variable,
/// so the server still starts without every key configured.
#[derive(Debug, Clone, Copy)]
pub struct Unconfigured {
    /// Environment variable that would enable the service.
    pub env_var: &'static str,
}

impl Unconfigured {
    fn error(self) -> DomainError {
        DomainError::Collaborator(format!("{} is not set", self.env_var))
    }
}

#[async_trait]
impl SceneGenerator for Unconfigured {
    async fn generate_panorama(&self, _prompt: &str) -> Result<Option<String>, DomainError> {
        Err(self.error())
    }
}

#[async_trait]
impl ImageEnhancer for Unconfigured {
    async fn upscale(&self, _image_url: &str, _prompt: &str) -> Result<String, DomainError> {
        Err(self.error())
    }
}

#[async_trait]
impl VisionAnalyzer for Unconfigured {
    async fn analyze(&self, _prompt: &str, _image_url: &str) -> Result<String, DomainError> {
        Err(self.error())
    }
}

#[async_trait]
impl ScoreFormatter for Unconfigured {
    async fn format_score(&self, _analysis: &str, _score: u32) -> Result<String, DomainError> {
        Err(self.error())
    }
}
