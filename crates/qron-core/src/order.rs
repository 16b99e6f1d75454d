//! Purchase orders.
//!
//! An order is the local durable record of a purchase intent. It is created
//! in the `Pending` state when a checkout session is opened and transitioned
//! on webhook receipt, so a paid-but-unfulfilled purchase is visible for
//! reconciliation instead of existing only inside the payment gateway.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{OrderId, QronId, UserId};

/// What was purchased.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum PurchaseIntent {
    /// A one-off stylized QRON.
    Generation {
        /// Generation mode id.
        mode: String,
        /// Destination URL the QRON points at.
        destination_url: String,
        /// The buyer's raw style prompt.
        prompt: String,
    },

    /// A subscription plan upgrade.
    PlanUpgrade {
        /// Plan id (catalog key).
        plan: String,
    },
}

/// Order lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Checkout session opened; payment not yet confirmed.
    Pending,
    /// Payment confirmed and fulfillment completed.
    Fulfilled,
    /// Payment confirmed but fulfillment failed; needs manual attention.
    Failed,
}

/// A purchase order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Order identifier, time-ordered.
    pub id: OrderId,

    /// The payment gateway's checkout session id.
    pub session_id: String,

    /// Customer email for delivery.
    pub email: String,

    /// The purchasing account, when the checkout was made signed-in.
    pub user_id: Option<UserId>,

    /// What was purchased.
    pub intent: PurchaseIntent,

    /// Lifecycle state.
    pub status: OrderStatus,

    /// The QRON produced by fulfillment, when the intent was a generation.
    pub qron_id: Option<QronId>,

    /// Error recorded when fulfillment failed.
    pub failure_reason: Option<String>,

    /// When the order was created.
    pub created_at: DateTime<Utc>,

    /// When the order was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Create a new pending order.
    #[must_use]
    pub fn new(
        session_id: impl Into<String>,
        email: impl Into<String>,
        user_id: Option<UserId>,
        intent: PurchaseIntent,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: OrderId::generate(),
            session_id: session_id.into(),
            email: email.into(),
            user_id,
            intent,
            status: OrderStatus::Pending,
            qron_id: None,
            failure_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Mark the order fulfilled, recording the produced QRON if any.
    pub fn fulfill(&mut self, qron_id: Option<QronId>) {
        self.status = OrderStatus::Fulfilled;
        self.qron_id = qron_id;
        self.failure_reason = None;
        self.updated_at = Utc::now();
    }

    /// Mark the order failed with a reason for later reconciliation.
    pub fn fail(&mut self, reason: impl Into<String>) {
        self.status = OrderStatus::Failed;
        self.failure_reason = Some(reason.into());
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_order_is_pending() {
        let order = Order::new(
            "cs_test_123",
            "buyer@example.com",
            None,
            PurchaseIntent::PlanUpgrade { plan: "pro".into() },
        );
        assert_eq!(order.status, OrderStatus::Pending);
        assert!(order.qron_id.is_none());
        assert!(order.failure_reason.is_none());
    }

    #[test]
    fn fulfill_records_the_qron() {
        let mut order = Order::new(
            "cs_test_123",
            "buyer@example.com",
            Some(UserId::generate()),
            PurchaseIntent::Generation {
                mode: "static".into(),
                destination_url: "https://example.com".into(),
                prompt: "sunset".into(),
            },
        );
        let qron_id = QronId::generate();
        order.fulfill(Some(qron_id));
        assert_eq!(order.status, OrderStatus::Fulfilled);
        assert_eq!(order.qron_id, Some(qron_id));
    }

    #[test]
    fn fail_records_the_reason() {
        let mut order = Order::new(
            "cs_test_123",
            "buyer@example.com",
            None,
            PurchaseIntent::PlanUpgrade { plan: "pro".into() },
        );
        order.fail("style transfer returned no image");
        assert_eq!(order.status, OrderStatus::Failed);
        assert_eq!(
            order.failure_reason.as_deref(),
            Some("style transfer returned no image")
        );
    }

    #[test]
    fn intent_serde_roundtrip() {
        let intent = PurchaseIntent::Generation {
            mode: "holographic".into(),
            destination_url: "https://example.com".into(),
            prompt: "sunset".into(),
        };
        let json = serde_json::to_string(&intent).unwrap();
        let parsed: PurchaseIntent = serde_json::from_str(&json).unwrap();
        assert_eq!(intent, parsed);
    }
}
