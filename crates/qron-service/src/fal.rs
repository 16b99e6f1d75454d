//! Style transfer service client.
//!
//! Sends the base QR bitmap and the enhanced prompt to the hosted
//! illusion-diffusion endpoint and returns the stylized image URL. The
//! diffusion parameters are fixed to structure-preserving values: denoising
//! strength stays below 1.0 so the QR geometry survives stylization.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Guidance scale for the diffusion run.
const GUIDANCE_SCALE: f64 = 8.5;

/// Number of inference steps.
const NUM_INFERENCE_STEPS: u32 = 50;

/// Denoising strength. Kept below 1.0 to retain QR structure.
const STRENGTH: f64 = 0.75;

/// ControlNet conditioning scale.
const CONTROLNET_CONDITIONING_SCALE: f64 = 1.5;

/// Model path on the style-transfer host.
const MODEL_PATH: &str = "fal-ai/illusion-diffusion";

/// Error type for style transfer operations.
#[derive(Debug, thiserror::Error)]
pub enum StyleError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service returned a non-success status.
    #[error("style service error: HTTP {status} - {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw error body (logged, never forwarded to clients).
        body: String,
    },

    /// The service responded without an image URL.
    #[error("style service returned no image")]
    NoImage,
}

/// Style transfer request payload.
#[derive(Debug, Serialize)]
struct StyleRequest<'a> {
    prompt: &'a str,
    image_url: &'a str,
    qr_code_content: &'a str,
    guidance_scale: f64,
    num_inference_steps: u32,
    strength: f64,
    controlnet_conditioning_scale: f64,
}

/// Style transfer response payload.
///
/// The service has returned both a single `image` object and an `images`
/// array across versions; accept either.
#[derive(Debug, Deserialize)]
struct StyleResponse {
    #[serde(default)]
    image: Option<ImageRef>,
    #[serde(default)]
    images: Vec<ImageRef>,
}

#[derive(Debug, Deserialize)]
struct ImageRef {
    url: String,
}

/// Style transfer API client.
#[derive(Debug, Clone)]
pub struct StyleClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl StyleClient {
    /// Create a new style transfer client.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built (should not happen with
    /// default settings).
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    /// Stylize a QR bitmap with the given prompt; returns the image URL.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-2xx response, or a
    /// response without an image URL.
    pub async fn stylize(
        &self,
        image_data_url: &str,
        qr_content: &str,
        prompt: &str,
    ) -> Result<String, StyleError> {
        let url = format!("{}/{MODEL_PATH}", self.base_url);
        let request = StyleRequest {
            prompt,
            image_url: image_data_url,
            qr_code_content: qr_content,
            guidance_scale: GUIDANCE_SCALE,
            num_inference_steps: NUM_INFERENCE_STEPS,
            strength: STRENGTH,
            controlnet_conditioning_scale: CONTROLNET_CONDITIONING_SCALE,
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Key {}", self.api_key))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StyleError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: StyleResponse = response.json().await?;
        parsed
            .image
            .map(|i| i.url)
            .or_else(|| parsed.images.into_iter().next().map(|i| i.url))
            .ok_or(StyleError::NoImage)
    }
}
