//! Checkout and webhook fulfillment integration tests.
//!
//! The payment gateway, QR renderer, style service, and email sender are all
//! wiremock doubles. Webhook payloads are signed with the same t/v1 scheme
//! the real gateway uses, so signature verification runs for real.

mod common;

use axum::http::StatusCode;
use common::{sign_webhook, TestHarness, TEST_WEBHOOK_SECRET};
use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use qron_core::{OrderStatus, Tier};
use qron_store::Store;

const FAKE_PNG: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// External-service doubles for the full paid-fulfillment path.
struct MockStack {
    qr: MockServer,
    fal: MockServer,
    sendgrid: MockServer,
    stripe: MockServer,
}

impl MockStack {
    async fn start() -> Self {
        Self {
            qr: MockServer::start().await,
            fal: MockServer::start().await,
            sendgrid: MockServer::start().await,
            stripe: MockServer::start().await,
        }
    }

    fn harness(&self) -> TestHarness {
        let qr_url = self.qr.uri();
        let fal_url = self.fal.uri();
        let sendgrid_url = self.sendgrid.uri();
        let stripe_url = self.stripe.uri();
        TestHarness::with_config(move |config| {
            config.qr_api_url = qr_url;
            config.fal_api_url = fal_url;
            config.fal_api_key = Some("fal-test-key".into());
            config.sendgrid_api_url = sendgrid_url;
            config.sendgrid_api_key = Some("sendgrid-test-key".into());
            config.stripe_api_url = stripe_url;
            config.stripe_api_key = Some("sk_test_xxx".into());
            config.stripe_webhook_secret = Some(TEST_WEBHOOK_SECRET.into());
        })
    }

    /// Mount happy-path responders for the QR renderer and email sender.
    async fn mount_qr_and_email(&self) {
        Mock::given(method("GET"))
            .and(path("/v1/create-qr-code/"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(FAKE_PNG))
            .mount(&self.qr)
            .await;
        Mock::given(method("POST"))
            .and(path("/v3/mail/send"))
            .respond_with(ResponseTemplate::new(202))
            .mount(&self.sendgrid)
            .await;
    }
}

fn completed_session_event(session_id: &str, metadata: serde_json::Value) -> String {
    json!({
        "id": format!("evt_{session_id}"),
        "type": "checkout.session.completed",
        "data": {
            "object": {
                "id": session_id,
                "payment_status": "paid",
                "customer_email": "buyer@example.com",
                "amount_total": 500,
                "metadata": metadata
            }
        }
    })
    .to_string()
}

// ============================================================================
// Checkout
// ============================================================================

#[tokio::test]
async fn checkout_creates_session_and_pending_order() {
    let mocks = MockStack::start().await;
    Mock::given(method("POST"))
        .and(path("/checkout/sessions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "cs_test_123",
            "url": "https://checkout.stripe.test/pay/cs_test_123"
        })))
        .mount(&mocks.stripe)
        .await;

    let harness = mocks.harness();

    let response = harness
        .server
        .post("/api/checkout")
        .json(&json!({
            "mode": "static",
            "url": "https://example.com",
            "prompt": "sunset over mountains",
            "email": "buyer@example.com"
        }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["url"], "https://checkout.stripe.test/pay/cs_test_123");
    assert_eq!(body["sessionId"], "cs_test_123");

    let order = harness
        .store
        .get_order_by_session("cs_test_123")
        .unwrap()
        .expect("pending order should exist");
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.email, "buyer@example.com");
    assert_eq!(order.id.to_string(), body["orderId"]);
}

#[tokio::test]
async fn checkout_rejects_missing_email_and_unknown_mode() {
    let mocks = MockStack::start().await;
    let harness = mocks.harness();

    let response = harness
        .server
        .post("/api/checkout")
        .json(&json!({
            "mode": "static",
            "url": "https://example.com",
            "prompt": "sunset"
        }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = harness
        .server
        .post("/api/checkout")
        .json(&json!({
            "mode": "nebula",
            "url": "https://example.com",
            "prompt": "sunset",
            "email": "buyer@example.com"
        }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn checkout_rejects_unknown_and_free_plans() {
    let mocks = MockStack::start().await;
    let harness = mocks.harness();

    let response = harness
        .server
        .post("/api/checkout")
        .json(&json!({ "planId": "platinum", "email": "buyer@example.com" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    // The free plan has nothing to charge for.
    let response = harness
        .server
        .post("/api/checkout")
        .json(&json!({ "planId": "free", "email": "buyer@example.com" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

// ============================================================================
// Webhook Signature
// ============================================================================

#[tokio::test]
async fn webhook_with_invalid_signature_has_no_side_effects() {
    let mocks = MockStack::start().await;

    // Nothing downstream may be touched on unauthenticated input.
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mocks.fal)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(202))
        .expect(0)
        .mount(&mocks.sendgrid)
        .await;

    let harness = mocks.harness();

    let payload = completed_session_event(
        "cs_forged",
        json!({
            "mode": "static",
            "url": "https://example.com",
            "prompt": "sunset",
            "email": "buyer@example.com"
        }),
    );

    let response = harness
        .server
        .post("/api/webhook")
        .add_header("stripe-signature", "t=1700000000,v1=deadbeef")
        .text(payload.clone())
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = harness.server.post("/api/webhook").text(payload).await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn webhook_without_configured_secret_refuses_to_process() {
    let mocks = MockStack::start().await;
    let stripe_url = mocks.stripe.uri();
    let harness = TestHarness::with_config(move |config| {
        config.stripe_api_url = stripe_url;
        config.stripe_api_key = Some("sk_test_xxx".into());
        config.stripe_webhook_secret = None;
    });

    let payload = completed_session_event("cs_nosecret", json!({}));
    let response = harness
        .server
        .post("/api/webhook")
        .add_header("stripe-signature", sign_webhook(&payload))
        .text(payload)
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
}

// ============================================================================
// Fulfillment
// ============================================================================

#[tokio::test]
async fn paid_session_is_fulfilled_and_delivered_exactly_once() {
    let mocks = MockStack::start().await;
    mocks.mount_qr_and_email().await;

    // The style request must carry the buyer's prompt verbatim.
    Mock::given(method("POST"))
        .and(path("/fal-ai/illusion-diffusion"))
        .and(body_string_contains("sunset"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "image": { "url": "https://cdn.test/styled.png" } })),
        )
        .expect(1)
        .mount(&mocks.fal)
        .await;

    let harness = mocks.harness();
    let user_id = harness.test_user_id;

    let payload = completed_session_event(
        "cs_paid_1",
        json!({
            "mode": "static",
            "url": "https://example.com",
            "prompt": "sunset",
            "email": "buyer@example.com",
            "user_id": user_id.to_string()
        }),
    );

    let response = harness
        .server
        .post("/api/webhook")
        .add_header("stripe-signature", sign_webhook(&payload))
        .text(payload)
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["received"], true);

    // The persisted QRON round-trips the session metadata.
    let qrons = harness.store.list_qrons_by_user(&user_id, 10, 0).unwrap();
    assert_eq!(qrons.len(), 1);
    assert_eq!(qrons[0].mode, "static");
    assert_eq!(qrons[0].destination_url, "https://example.com");
    assert!(qrons[0].prompt.contains("sunset"));

    // Exactly one email send was attempted.
    let email_requests = mocks.sendgrid.received_requests().await.unwrap();
    assert_eq!(email_requests.len(), 1);
    let email_body = String::from_utf8_lossy(&email_requests[0].body).to_string();
    assert!(email_body.contains("buyer@example.com"));
    assert!(email_body.contains("https://cdn.test/styled.png"));
}

#[tokio::test]
async fn unpaid_session_is_acknowledged_without_fulfillment() {
    let mocks = MockStack::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mocks.fal)
        .await;

    let harness = mocks.harness();

    let payload = json!({
        "id": "evt_unpaid",
        "type": "checkout.session.completed",
        "data": {
            "object": {
                "id": "cs_unpaid",
                "payment_status": "unpaid",
                "customer_email": "buyer@example.com",
                "metadata": {
                    "mode": "static",
                    "url": "https://example.com",
                    "prompt": "sunset",
                    "email": "buyer@example.com"
                }
            }
        }
    })
    .to_string();

    let response = harness
        .server
        .post("/api/webhook")
        .add_header("stripe-signature", sign_webhook(&payload))
        .text(payload)
        .await;

    response.assert_status_ok();
}

#[tokio::test]
async fn checkout_then_webhook_transitions_the_order_to_fulfilled() {
    let mocks = MockStack::start().await;
    mocks.mount_qr_and_email().await;
    Mock::given(method("POST"))
        .and(path("/checkout/sessions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "cs_lifecycle",
            "url": "https://checkout.stripe.test/pay/cs_lifecycle"
        })))
        .mount(&mocks.stripe)
        .await;
    Mock::given(method("POST"))
        .and(path("/fal-ai/illusion-diffusion"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "image": { "url": "https://cdn.test/styled.png" } })),
        )
        .mount(&mocks.fal)
        .await;

    let harness = mocks.harness();

    harness
        .server
        .post("/api/checkout")
        .json(&json!({
            "mode": "holographic",
            "url": "https://example.com",
            "prompt": "aurora borealis",
            "email": "buyer@example.com"
        }))
        .await
        .assert_status_ok();

    let order = harness
        .store
        .get_order_by_session("cs_lifecycle")
        .unwrap()
        .unwrap();
    assert_eq!(order.status, OrderStatus::Pending);

    let payload = completed_session_event(
        "cs_lifecycle",
        json!({
            "mode": "holographic",
            "url": "https://example.com",
            "prompt": "aurora borealis",
            "email": "buyer@example.com"
        }),
    );
    harness
        .server
        .post("/api/webhook")
        .add_header("stripe-signature", sign_webhook(&payload))
        .text(payload)
        .await
        .assert_status_ok();

    let order = harness
        .store
        .get_order_by_session("cs_lifecycle")
        .unwrap()
        .unwrap();
    assert_eq!(order.status, OrderStatus::Fulfilled);
    let qron_id = order.qron_id.expect("fulfilled order records its QRON");

    // Guest purchase: the QRON exists under a generated owner and carries
    // the metadata round-tripped through the gateway.
    let qron = harness.store.get_qron(&qron_id).unwrap().unwrap();
    assert_eq!(qron.mode, "holographic");
    assert!(qron.prompt.contains("aurora borealis"));
}

#[tokio::test]
async fn failed_fulfillment_is_acknowledged_and_marks_the_order() {
    let mocks = MockStack::start().await;
    mocks.mount_qr_and_email().await;
    Mock::given(method("POST"))
        .and(path("/checkout/sessions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "cs_failing",
            "url": "https://checkout.stripe.test/pay/cs_failing"
        })))
        .mount(&mocks.stripe)
        .await;
    // Style transfer breaks after payment: the charge stands, the artifact
    // never materializes, and only the order row records the damage.
    Mock::given(method("POST"))
        .and(path("/fal-ai/illusion-diffusion"))
        .respond_with(ResponseTemplate::new(500).set_body_string("model overloaded"))
        .mount(&mocks.fal)
        .await;

    let harness = mocks.harness();

    harness
        .server
        .post("/api/checkout")
        .json(&json!({
            "mode": "static",
            "url": "https://example.com",
            "prompt": "sunset",
            "email": "buyer@example.com"
        }))
        .await
        .assert_status_ok();

    let payload = completed_session_event(
        "cs_failing",
        json!({
            "mode": "static",
            "url": "https://example.com",
            "prompt": "sunset",
            "email": "buyer@example.com"
        }),
    );
    let response = harness
        .server
        .post("/api/webhook")
        .add_header("stripe-signature", sign_webhook(&payload))
        .text(payload)
        .await;

    // Still acknowledged so the gateway does not retry indefinitely.
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["received"], true);

    let order = harness
        .store
        .get_order_by_session("cs_failing")
        .unwrap()
        .unwrap();
    assert_eq!(order.status, OrderStatus::Failed);
    assert!(order.failure_reason.is_some());
    assert!(order.qron_id.is_none());

    // No delivery email for a failed fulfillment.
    assert!(mocks.sendgrid.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn plan_purchase_applies_the_tier_and_limit() {
    let mocks = MockStack::start().await;
    let harness = mocks.harness();
    let user_id = harness.test_user_id;

    let payload = completed_session_event(
        "cs_plan",
        json!({
            "plan_id": "pro",
            "email": "buyer@example.com",
            "user_id": user_id.to_string()
        }),
    );

    harness
        .server
        .post("/api/webhook")
        .add_header("stripe-signature", sign_webhook(&payload))
        .text(payload)
        .await
        .assert_status_ok();

    let profile = harness.store.get_profile(&user_id).unwrap().unwrap();
    assert_eq!(profile.tier, Tier::Pro);
    assert_eq!(profile.generations_limit, 500);
}
