//! Common test utilities for QRON integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::sync::Arc;

use axum::Router;
use axum_test::TestServer;
use tempfile::TempDir;

use qron_core::{Qron, QronId, UserId};
use qron_service::{create_router, AppState, ServiceConfig};
use qron_store::{RocksStore, Store};

/// Webhook signing secret used across webhook tests.
pub const TEST_WEBHOOK_SECRET: &str = "whsec_test_secret";

/// Test harness containing everything needed for integration tests.
pub struct TestHarness {
    /// The test server for making HTTP requests.
    pub server: TestServer,
    /// Direct store handle for seeding and inspecting records.
    pub store: Arc<RocksStore>,
    /// Temporary directory for the database (kept alive for test duration).
    pub _temp_dir: TempDir,
    /// A test user ID for authenticated requests.
    pub test_user_id: UserId,
}

impl TestHarness {
    /// Create a new test harness with a fresh database and no external
    /// services configured.
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    /// Create a harness, letting the caller point external-service URLs at
    /// wiremock servers and enable the relevant API keys.
    pub fn with_config(customize: impl FnOnce(&mut ServiceConfig)) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store =
            Arc::new(RocksStore::open(temp_dir.path()).expect("Failed to open store"));

        let mut config = ServiceConfig {
            listen_addr: "127.0.0.1:0".into(),
            data_dir: temp_dir.path().to_string_lossy().to_string(),
            auth_base_url: "http://localhost".into(),
            auth_audience: "qron".into(),
            stripe_api_key: None,
            stripe_api_url: "http://127.0.0.1:1".into(),
            stripe_webhook_secret: None,
            fal_api_key: None,
            fal_api_url: "http://127.0.0.1:1".into(),
            qr_api_url: "http://127.0.0.1:1".into(),
            sendgrid_api_key: None,
            sendgrid_api_url: "http://127.0.0.1:1".into(),
            email_from: "orders@qron.test".into(),
            public_base_url: "https://qron.test".into(),
            frontend_url: "http://localhost:3000".into(),
            cors_origins: vec!["*".into()],
            max_body_bytes: 1024 * 1024,
            request_timeout_seconds: 30,
        };
        customize(&mut config);

        let state = AppState::new(Arc::clone(&store), config);
        let router: Router = create_router(state);

        let server = TestServer::new(router).expect("Failed to create test server");
        let test_user_id = UserId::generate();

        Self {
            server,
            store,
            _temp_dir: temp_dir,
            test_user_id,
        }
    }

    /// Get the authorization header for user authentication.
    pub fn user_auth_header(&self) -> String {
        format!("Bearer test-token:{}", self.test_user_id)
    }

    /// Get an auth header for an arbitrary user (for testing isolation).
    pub fn auth_header_for(user_id: &UserId) -> String {
        format!("Bearer test-token:{user_id}")
    }

    /// Seed a QRON owned by `user_id` directly into the store.
    pub fn seed_qron(&self, user_id: UserId) -> Qron {
        let id = QronId::generate();
        let qron = Qron::new(
            id,
            user_id,
            "static",
            Some("preset_1".into()),
            "https://example.com",
            format!("https://qron.test/r/{id}"),
            "highly detailed QR code art, scannable, sunset",
            "https://cdn.test/styled.png",
        );
        self.store.put_qron(&qron).expect("Failed to seed QRON");
        qron
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a valid `stripe-signature` header for `payload` under the test
/// signing secret, using the same t/v1 scheme the gateway uses.
pub fn sign_webhook(payload: &str) -> String {
    qron_service::stripe::sign_header(TEST_WEBHOOK_SECRET, "1700000000", payload)
}
