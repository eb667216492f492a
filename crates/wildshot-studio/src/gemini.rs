//! Google Gemini vision client.
//!
//! Gemini takes images inline, so the photo is fetched first and sent as
//! base64 alongside the identification prompt. `data:` URLs are decoded
//! in place without a network round trip.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use wildshot_core::collaborators::VisionAnalyzer;
use wildshot_core::error::DomainError;

use crate::error::StudioError;
use crate::{api_error, http_client};

const SERVICE: &str = "gemini";
const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const VISION_MODEL: &str = "gemini-1.5-flash";
const FALLBACK_MIME_TYPE: &str = "image/jpeg";

/// An image ready to be sent inline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    /// Image media type, e.g. `image/png`.
    pub mime_type: String,
    /// Base64 (standard alphabet) encoded bytes.
    pub data: String,
}

impl InlineImage {
    /// Encodes raw bytes.
    #[must_use]
    pub fn from_bytes(mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: STANDARD.encode(bytes),
        }
    }

    /// Splits a base64 `data:` URL. Returns `None` for anything else.
    #[must_use]
    pub fn from_data_url(url: &str) -> Option<Self> {
        let rest = url.strip_prefix("data:")?;
        let (header, data) = rest.split_once(',')?;
        let mime_type = header.strip_suffix(";base64")?;
        Some(Self {
            mime_type: if mime_type.is_empty() {
                FALLBACK_MIME_TYPE.to_owned()
            } else {
                mime_type.to_owned()
            },
            data: data.to_owned(),
        })
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 2],
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text { text: &'a str },
    Inline { inline_data: InlineData<'a> },
}

#[derive(Serialize)]
struct InlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

/// Gemini `generateContent` client.
pub struct GeminiClient {
    http_client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    /// Creates a client for the public API.
    ///
    /// # Errors
    ///
    /// Returns `StudioError::Network` if the HTTP client cannot be built.
    pub fn new(api_key: String) -> Result<Self, StudioError> {
        Ok(Self {
            http_client: http_client()?,
            api_key,
            base_url: GEMINI_BASE_URL.to_owned(),
        })
    }

    /// Points the client at another host.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn fetch_image(&self, image_url: &str) -> Result<InlineImage, StudioError> {
        if let Some(image) = InlineImage::from_data_url(image_url) {
            return Ok(image);
        }
        let response = self.http_client.get(image_url).send().await?;
        if !response.status().is_success() {
            return Err(api_error("image host", response).await);
        }
        let mime_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map_or(FALLBACK_MIME_TYPE, |v| v.split(';').next().unwrap_or(v).trim())
            .to_owned();
        let bytes = response.bytes().await?;
        Ok(InlineImage::from_bytes(mime_type, &bytes))
    }

    /// Sends `prompt` with the image and returns the model's text.
    ///
    /// # Errors
    ///
    /// Returns a `StudioError` if the image cannot be fetched, the call
    /// fails, or the response carries no text.
    pub async fn describe(&self, prompt: &str, image_url: &str) -> Result<String, StudioError> {
        let image = self.fetch_image(image_url).await?;
        let request = GenerateRequest {
            contents: [Content {
                parts: [
                    Part::Text { text: prompt },
                    Part::Inline {
                        inline_data: InlineData {
                            mime_type: &image.mime_type,
                            data: &image.data,
                        },
                    },
                ],
            }],
        };

        let response = self
            .http_client
            .post(format!(
                "{}/models/{VISION_MODEL}:generateContent",
                self.base_url
            ))
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(api_error(SERVICE, response).await);
        }
        let body: GenerateResponse = response.json().await.map_err(|e| StudioError::Parse {
            service: SERVICE,
            detail: e.to_string(),
        })?;

        candidate_text(body).ok_or_else(|| StudioError::Parse {
            service: SERVICE,
            detail: "no candidate text".to_owned(),
        })
    }
}

#[async_trait]
impl VisionAnalyzer for GeminiClient {
    async fn analyze(&self, prompt: &str, image_url: &str) -> Result<String, DomainError> {
        Ok(self.describe(prompt, image_url).await?)
    }
}

/// Concatenates the text parts of the first candidate.
fn candidate_text(response: GenerateResponse) -> Option<String> {
    let candidate = response.candidates.into_iter().next()?;
    let text: String = candidate
        .content
        .parts
        .into_iter()
        .filter_map(|p| p.text)
        .collect();
    (!text.trim().is_empty()).then_some(text)
}
