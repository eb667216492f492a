//! fal.ai client: text-to-image panoramas and the creative upscaler.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use wildshot_core::collaborators::{ImageEnhancer, SceneGenerator};
use wildshot_core::error::DomainError;

use crate::error::StudioError;
use crate::{api_error, http_client};

const SERVICE: &str = "fal";
const FAL_BASE_URL: &str = "https://fal.run";
const TEXT_TO_IMAGE_MODEL: &str = "fal-ai/fast-sdxl";
const UPSCALER_MODEL: &str = "fal-ai/creative-upscaler";

#[derive(Serialize)]
struct TextToImageRequest<'a> {
    prompt: &'a str,
    image_size: ImageSize,
    num_images: u8,
}

/// Equirectangular panoramas are twice as wide as they are tall.
#[derive(Serialize)]
struct ImageSize {
    width: u32,
    height: u32,
}

#[derive(Serialize)]
struct UpscaleRequest<'a> {
    image_url: &'a str,
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct FalImage {
    url: String,
}

#[derive(Debug, Deserialize)]
struct TextToImageResponse {
    #[serde(default)]
    images: Vec<FalImage>,
}

#[derive(Debug, Deserialize)]
struct UpscaleResponse {
    image: FalImage,
}

/// fal.ai synchronous inference client.
pub struct FalClient {
    http_client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl FalClient {
    /// Creates a client for the public API.
    ///
    /// # Errors
    ///
    /// Returns `StudioError::Network` if the HTTP client cannot be built.
    pub fn new(api_key: String) -> Result<Self, StudioError> {
        Ok(Self {
            http_client: http_client()?,
            api_key,
            base_url: FAL_BASE_URL.to_owned(),
        })
    }

    /// Points the client at another host.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn run<B, R>(&self, model: &str, body: &B) -> Result<R, StudioError>
    where
        B: Serialize + Sync,
        R: for<'de> Deserialize<'de> + Send,
    {
        let response = self
            .http_client
            .post(format!("{}/{model}", self.base_url))
            .header("Authorization", format!("Key {}", self.api_key))
            .json(body)
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
}

#[async_trait]
impl SceneGenerator for FalClient {
    async fn generate_panorama(&self, prompt: &str) -> Result<Option<String>, DomainError> {
        let request = TextToImageRequest {
            prompt,
            image_size: ImageSize {
                width: 2048,
                height: 1024,
            },
            num_images: 1,
        };
        let response: TextToImageResponse = self.run(TEXT_TO_IMAGE_MODEL, &request).await?;
        Ok(first_image_url(response))
    }
}

#[async_trait]
impl ImageEnhancer for FalClient {
    async fn upscale(&self, image_url: &str, prompt: &str) -> Result<String, DomainError> {
        let response: UpscaleResponse = self
            .run(UPSCALER_MODEL, &UpscaleRequest { image_url, prompt })
            .await?;
        tracing::debug!(url = %response.image.url, "Image upscaled");
        Ok(response.image.url)
    }
}

fn first_image_url(response: TextToImageResponse) -> Option<String> {
    response
        .images
        .into_iter()
        .map(|image| image.url)
        .find(|url| !url.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_to_image_response_yields_first_url() {
        let body = r#"{"images":[{"url":"https://fal.media/a.png","width":2048},{"url":"https://fal.media/b.png"}],"seed":1}"#;

        let response: TextToImageResponse = serde_json::from_str(body).unwrap();

        assert_eq!(
            first_image_url(response).as_deref(),
            Some("https://fal.media/a.png")
        );
    }

    #[test]
    fn test_text_to_image_response_without_images_yields_none() {
        let response: TextToImageResponse = serde_json::from_str(r#"{"seed":1}"#).unwrap();

        assert_eq!(first_image_url(response), None);
    }

    #[test]
    fn test_upscale_response_parses_image_url() {
        let body = r#"{"image":{"url":"https://fal.media/up.png","content_type":"image/png"}}"#;

        let response: UpscaleResponse = serde_json::from_str(body).unwrap();

        assert_eq!(response.image.url, "https://fal.media/up.png");
    }

    #[test]
    fn test_text_to_image_request_is_twice_as_wide_as_tall() {
        let request = TextToImageRequest {
            prompt: "a reef",
            image_size: ImageSize {
                width: 2048,
                height: 1024,
            },
            num_images: 1,
        };

        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["image_size"]["width"], 2048);
        assert_eq!(json["image_size"]["height"], 1024);
        assert_eq!(json["prompt"], "a reef");
    }
}
