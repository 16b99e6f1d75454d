//! Delivery email client.
//!
//! Sends the finished QRON image to the purchaser via the hosted email
//! API's `mail/send` endpoint.

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;

/// Error type for email operations.
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The sender returned a non-success status.
    #[error("email service error: HTTP {status} - {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw error body (logged, never forwarded to clients).
        body: String,
    },
}

#[derive(Debug, Serialize)]
struct MailSend<'a> {
    personalizations: Vec<Personalization<'a>>,
    from: Address<'a>,
    subject: &'a str,
    content: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Personalization<'a> {
    to: Vec<Address<'a>>,
}

#[derive(Debug, Serialize)]
struct Address<'a> {
    email: &'a str,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(rename = "type")]
    content_type: &'a str,
    value: String,
}

/// Email sender API client.
#[derive(Debug, Clone)]
pub struct EmailClient {
    client: Client,
    base_url: String,
    api_key: String,
    from: String,
}

impl EmailClient {
    /// Create a new email client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Email API base URL
    /// * `api_key` - API key
    /// * `from` - Verified sender address
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built (should not happen with
    /// default settings).
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        from: impl Into<String>,
    ) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            from: from.into(),
        }
    }

    /// Send the delivery email for a finished QRON.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-2xx response.
    pub async fn send_delivery(
        &self,
        to: &str,
        image_url: &str,
        mode: &str,
        destination_url: &str,
    ) -> Result<(), EmailError> {
        let url = format!("{}/v3/mail/send", self.base_url);
        let body = MailSend {
            personalizations: vec![Personalization {
                to: vec![Address { email: to }],
            }],
            from: Address { email: &self.from },
            subject: "Your QRON QR Code is Ready!",
            content: vec![Content {
                content_type: "text/html",
                value: delivery_html(image_url, mode, destination_url),
            }],
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EmailError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}

/// Render the delivery email body.
fn delivery_html(image_url: &str, mode: &str, destination_url: &str) -> String {
    format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
  <h1 style="color: #7c3aed;">Your QRON QR Code</h1>
  <p>Thank you for your purchase! Your {mode} QR code is ready.</p>
  <div style="background: #f3f4f6; padding: 20px; border-radius: 8px; margin: 20px 0;">
    <img src="{image_url}" alt="Your QR Code" style="max-width: 100%; border-radius: 8px;">
  </div>
  <p><strong>Destination URL:</strong> {destination_url}</p>
  <p>
    <a href="{image_url}" download="qron-{mode}.png"
       style="background: #7c3aed; color: white; padding: 12px 24px; text-decoration: none; border-radius: 6px; display: inline-block;">
      Download High-Res Image
    </a>
  </p>
</div>"#
    )
}
