//! Payment gateway client implementation.

use std::time::Duration;

use reqwest::Client;

use super::signature;
use super::types::{CheckoutSession, StripeErrorResponse};

/// Error type for payment gateway operations.
#[derive(Debug, thiserror::Error)]
pub enum StripeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The gateway returned an error.
    #[error("gateway API error: {error_type} - {message}")]
    Api {
        /// Error type.
        error_type: String,
        /// Error message.
        message: String,
        /// Error code.
        code: Option<String>,
    },

    /// Invalid webhook signature.
    #[error("invalid webhook signature")]
    InvalidSignature,

    /// Configuration error.
    #[error("configuration error: {0}")]
    Configuration(String),
}

/// Payment gateway API client.
#[derive(Debug, Clone)]
pub struct StripeClient {
    client: Client,
    base_url: String,
    api_key: String,
    webhook_secret: Option<String>,
}

/// One checkout line item: name, description, and unit price in cents.
#[derive(Debug, Clone)]
pub struct LineItem {
    /// Product name shown on the hosted checkout page.
    pub name: String,
    /// Product description.
    pub description: String,
    /// Unit price in cents.
    pub amount_cents: i64,
}

impl StripeClient {
    /// Create a new gateway client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Gateway API base URL
    /// * `api_key` - Secret API key (`sk_test_...` or `sk_live_...`)
    /// * `webhook_secret` - Optional webhook signing secret (`whsec_...`)
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        webhook_secret: Option<String>,
    ) -> Result<Self, StripeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| StripeError::Configuration(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            webhook_secret,
        })
    }

    /// Create a hosted checkout session.
    ///
    /// The metadata pairs are round-tripped byte-for-byte through the
    /// gateway and re-read by the webhook handler; they are the only record
    /// of purchase intent the gateway holds.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a gateway error response.
    pub async fn create_checkout_session(
        &self,
        line_item: &LineItem,
        customer_email: &str,
        success_url: &str,
        cancel_url: &str,
        metadata: &[(&str, &str)],
    ) -> Result<CheckoutSession, StripeError> {
        let params = vec![
            ("mode", "payment".to_string()),
            ("success_url", success_url.to_string()),
            ("cancel_url", cancel_url.to_string()),
            ("customer_email", customer_email.to_string()),
            ("payment_method_types[0]", "card".to_string()),
            ("line_items[0][price_data][currency]", "usd".to_string()),
            (
                "line_items[0][price_data][product_data][name]",
                line_item.name.clone(),
            ),
            (
                "line_items[0][price_data][product_data][description]",
                line_item.description.clone(),
            ),
            (
                "line_items[0][price_data][unit_amount]",
                line_item.amount_cents.to_string(),
            ),
            ("line_items[0][quantity]", "1".to_string()),
        ];

        let metadata_params: Vec<(String, String)> = metadata
            .iter()
            .map(|(k, v)| (format!("metadata[{k}]"), (*v).to_string()))
            .collect();

        let form: Vec<(&str, &str)> = params
            .iter()
            .map(|(k, v)| (*k, v.as_str()))
            .chain(metadata_params.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .collect();

        tracing::debug!(
            email = %customer_email,
            amount_cents = %line_item.amount_cents,
            "Creating checkout session"
        );

        let response = self
            .client
            .post(format!("{}/checkout/sessions", self.base_url))
            .basic_auth(&self.api_key, Option::<&str>::None)
            .form(&form)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Verify a webhook signature header against the raw delivery body.
    ///
    /// The t/v1 scheme and the constant-time comparison live in the
    /// `signature` module.
    ///
    /// # Errors
    ///
    /// Returns `Configuration` if no signing secret is configured, and
    /// `InvalidSignature` if the header is malformed or no signature
    /// matches.
    pub fn verify_webhook_signature(
        &self,
        payload: &str,
        signature_header: &str,
    ) -> Result<(), StripeError> {
        let secret = self
            .webhook_secret
            .as_ref()
            .ok_or_else(|| StripeError::Configuration("Webhook secret not configured".into()))?;

        signature::verify(secret, payload, signature_header)
    }

    /// Handle API response and convert errors.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, StripeError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response.json().await?);
        }

        let error_body: Result<StripeErrorResponse, _> = response.json().await;

        match error_body {
            Ok(gateway_error) => Err(StripeError::Api {
                error_type: gateway_error.error.error_type,
                message: gateway_error.error.message,
                code: gateway_error.error.code,
            }),
            Err(_) => Err(StripeError::Api {
                error_type: "unknown".to_string(),
                message: format!("HTTP {status}"),
                code: None,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_with_secret(secret: &str) -> StripeClient {
        StripeClient::new(
            "https://api.stripe.com/v1",
            "sk_test_xxx",
            Some(secret.to_string()),
        )
        .unwrap()
    }

    #[test]
    fn client_trims_trailing_slash() {
        let client = StripeClient::new("https://api.stripe.com/v1/", "sk_test_xxx", None).unwrap();
        assert_eq!(client.base_url, "https://api.stripe.com/v1");
    }

    #[test]
    fn valid_signature_verifies() {
        let secret = "whsec_test";
        let client = client_with_secret(secret);
        let payload = r#"{"id":"evt_test","type":"checkout.session.completed"}"#;

        let header = signature::sign_header(secret, "1700000000", payload);

        assert!(client.verify_webhook_signature(payload, &header).is_ok());
    }

    #[test]
    fn wrong_signature_is_rejected() {
        let client = client_with_secret("whsec_test");
        let payload = r#"{"id":"evt_test"}"#;
        let header = "t=1700000000,v1=deadbeef";

        assert!(matches!(
            client.verify_webhook_signature(payload, header),
            Err(StripeError::InvalidSignature)
        ));
    }

    #[test]
    fn missing_secret_is_a_configuration_error() {
        let client = StripeClient::new("https://api.stripe.com/v1", "sk_test_xxx", None).unwrap();
        assert!(matches!(
            client.verify_webhook_signature("{}", "t=1,v1=aa"),
            Err(StripeError::Configuration(_))
        ));
    }
}
