//! QR base renderer client.
//!
//! Fetches a plain scannable QR bitmap from the public QR-rendering API and
//! hands it to the style pipeline as a data URL. Error correction is pinned
//! at the highest level so stylization can degrade contrast without breaking
//! scannability.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::Client;

/// Rendered QR size in pixels (square).
const QR_SIZE_PX: u32 = 1024;

/// Quiet-zone width in modules.
const QR_QUIET_ZONE: u32 = 2;

/// Error type for QR render operations.
#[derive(Debug, thiserror::Error)]
pub enum QrError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The renderer returned a non-success status.
    #[error("QR renderer error: HTTP {status}")]
    Api {
        /// HTTP status code.
        status: u16,
    },
}

/// QR base renderer API client.
#[derive(Debug, Clone)]
pub struct QrRenderClient {
    client: Client,
    base_url: String,
}

impl QrRenderClient {
    /// Create a new QR renderer client.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built (should not happen with
    /// default settings).
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Render a QR code for `content` and return it as a PNG data URL.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-2xx response.
    pub async fn render_data_url(&self, content: &str) -> Result<String, QrError> {
        let url = format!("{}/v1/create-qr-code/", self.base_url);
        let size = format!("{QR_SIZE_PX}x{QR_SIZE_PX}");
        let qzone = QR_QUIET_ZONE.to_string();

        let response = self
            .client
            .get(&url)
            .query(&[
                ("size", size.as_str()),
                ("ecc", "H"),
                ("qzone", qzone.as_str()),
                ("format", "png"),
                ("data", content),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(QrError::Api {
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await?;
        Ok(format!("data:image/png;base64,{}", BASE64.encode(&bytes)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_trims_trailing_slash() {
        let client = QrRenderClient::new("https://api.qrserver.com/");
        assert_eq!(client.base_url, "https://api.qrserver.com");
    }
}
