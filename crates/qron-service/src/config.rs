//! Service configuration.

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Address to listen on (default: "0.0.0.0:8080").
    pub listen_addr: String,

    /// Path to the `RocksDB` data directory (default: "/data/qron").
    pub data_dir: String,

    /// Identity provider base URL for JWKS validation.
    pub auth_base_url: String,

    /// Expected JWT audience (default: "qron").
    pub auth_audience: String,

    /// Payment gateway secret API key (optional; checkout disabled without it).
    pub stripe_api_key: Option<String>,

    /// Payment gateway API base URL (overridable for tests).
    pub stripe_api_url: String,

    /// Payment gateway webhook signing secret.
    pub stripe_webhook_secret: Option<String>,

    /// Style-transfer API key (optional; generation disabled without it).
    pub fal_api_key: Option<String>,

    /// Style-transfer API base URL.
    pub fal_api_url: String,

    /// QR base renderer API base URL.
    pub qr_api_url: String,

    /// Email sender API key (optional; delivery emails skipped without it).
    pub sendgrid_api_key: Option<String>,

    /// Email sender API base URL.
    pub sendgrid_api_url: String,

    /// Verified sender address for delivery emails.
    pub email_from: String,

    /// Public base URL used to build tracking links embedded in QR content.
    pub public_base_url: String,

    /// Frontend URL for checkout success/cancel redirects.
    pub frontend_url: String,

    /// CORS allowed origins.
    pub cors_origins: Vec<String>,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,

    /// Request timeout in seconds.
    pub request_timeout_seconds: u64,
}

impl ServiceConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            listen_addr: std::env::var("LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".into()),
            data_dir: std::env::var("DATA_DIR").unwrap_or_else(|_| "/data/qron".into()),
            auth_base_url: std::env::var("AUTH_BASE_URL")
                .unwrap_or_else(|_| "https://auth.qron.app".into()),
            auth_audience: std::env::var("AUTH_AUDIENCE").unwrap_or_else(|_| "qron".into()),
            stripe_api_key: std::env::var("STRIPE_API_KEY").ok(),
            stripe_api_url: std::env::var("STRIPE_API_URL")
                .unwrap_or_else(|_| "https://api.stripe.com/v1".into()),
            stripe_webhook_secret: std::env::var("STRIPE_WEBHOOK_SECRET").ok(),
            fal_api_key: std::env::var("FAL_API_KEY").ok(),
            fal_api_url: std::env::var("FAL_API_URL").unwrap_or_else(|_| "https://fal.run".into()),
            qr_api_url: std::env::var("QR_API_URL")
                .unwrap_or_else(|_| "https://api.qrserver.com".into()),
            sendgrid_api_key: std::env::var("SENDGRID_API_KEY").ok(),
            sendgrid_api_url: std::env::var("SENDGRID_API_URL")
                .unwrap_or_else(|_| "https://api.sendgrid.com".into()),
            email_from: std::env::var("EMAIL_FROM").unwrap_or_else(|_| "orders@qron.app".into()),
            public_base_url: std::env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| "https://qron.app".into()),
            frontend_url: std::env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".into()),
            cors_origins: std::env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "*".into())
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
            max_body_bytes: std::env::var("MAX_BODY_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1024 * 1024), // 1MB
            request_timeout_seconds: std::env::var("REQUEST_TIMEOUT_SECONDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".into(),
            data_dir: "/data/qron".into(),
            auth_base_url: "https://auth.qron.app".into(),
            auth_audience: "qron".into(),
            stripe_api_key: None,
            stripe_api_url: "https://api.stripe.com/v1".into(),
            stripe_webhook_secret: None,
            fal_api_key: None,
            fal_api_url: "https://fal.run".into(),
            qr_api_url: "https://api.qrserver.com".into(),
            sendgrid_api_key: None,
            sendgrid_api_url: "https://api.sendgrid.com".into(),
            email_from: "orders@qron.app".into(),
            public_base_url: "https://qron.app".into(),
            frontend_url: "http://localhost:3000".into(),
            cors_origins: vec!["*".into()],
            max_body_bytes: 1024 * 1024,
            request_timeout_seconds: 30,
        }
    }
}
