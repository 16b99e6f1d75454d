//! Application state.

use std::sync::Arc;

use qron_core::Catalog;
use qron_store::RocksStore;

use crate::config::ServiceConfig;
use crate::email::EmailClient;
use crate::fal::StyleClient;
use crate::qr::QrRenderClient;
use crate::stripe::StripeClient;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// The storage backend.
    pub store: Arc<RocksStore>,

    /// Service configuration.
    pub config: ServiceConfig,

    /// The mode / preset / plan catalog, loaded once at startup.
    pub catalog: Arc<Catalog>,

    /// QR base renderer client.
    pub qr: Arc<QrRenderClient>,

    /// Style transfer client (optional).
    pub style: Option<Arc<StyleClient>>,

    /// Payment gateway client (optional).
    pub stripe: Option<Arc<StripeClient>>,

    /// Email delivery client (optional).
    pub email: Option<Arc<EmailClient>>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(store: Arc<RocksStore>, config: ServiceConfig) -> Self {
        let qr = Arc::new(QrRenderClient::new(&config.qr_api_url));

        let style = config.fal_api_key.as_ref().map(|key| {
            tracing::info!(style_url = %config.fal_api_url, "Style transfer enabled");
            Arc::new(StyleClient::new(&config.fal_api_url, key))
        });

        if style.is_none() {
            tracing::warn!("Style transfer not configured - generation will be unavailable");
        }

        let stripe = config.stripe_api_key.as_ref().and_then(|key| {
            match StripeClient::new(
                &config.stripe_api_url,
                key,
                config.stripe_webhook_secret.clone(),
            ) {
                Ok(client) => {
                    tracing::info!("Payment gateway enabled");
                    Some(Arc::new(client))
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to create gateway client");
                    None
                }
            }
        });

        if stripe.is_none() {
            tracing::warn!("Payment gateway not configured - checkout will be unavailable");
        }

        let email = config.sendgrid_api_key.as_ref().map(|key| {
            tracing::info!(from = %config.email_from, "Email delivery enabled");
            Arc::new(EmailClient::new(
                &config.sendgrid_api_url,
                key,
                &config.email_from,
            ))
        });

        if email.is_none() {
            tracing::warn!("Email sender not configured - delivery emails will be skipped");
        }

        Self {
            store,
            config,
            catalog: Arc::new(Catalog::builtin()),
            qr,
            style,
            stripe,
            email,
        }
    }

    /// Build the tracking link embedded in a QRON's QR content.
    #[must_use]
    pub fn tracking_link(&self, qron_id: &qron_core::QronId) -> String {
        format!(
            "{}/r/{qron_id}",
            self.config.public_base_url.trim_end_matches('/')
        )
    }
}
