//! User profiles.
//!
//! A profile tracks a user's subscription tier and generation quota. It is
//! created lazily with free-tier defaults the first time a user touches an
//! authenticated endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::{Plan, FREE_PLAN_GENERATIONS};
use crate::{Tier, UserId};

/// A user profile with tier and quota accounting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    /// The user ID (from the identity provider).
    pub user_id: UserId,

    /// Email address, when known.
    pub email: Option<String>,

    /// Current subscription tier.
    pub tier: Tier,

    /// Generations consumed in the current period. Monotonic; never decremented.
    pub generations_used: u32,

    /// Generation allowance for the current period. Ignored for enterprise.
    pub generations_limit: u32,

    /// When the profile was created.
    pub created_at: DateTime<Utc>,

    /// When the profile was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Create a new free-tier profile.
    #[must_use]
    pub fn new(user_id: UserId) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            email: None,
            tier: Tier::Free,
            generations_used: 0,
            generations_limit: FREE_PLAN_GENERATIONS,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the email address.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Whether the profile has quota remaining for one more generation.
    #[must_use]
    pub fn has_quota(&self) -> bool {
        self.tier.is_unlimited() || self.generations_used < self.generations_limit
    }

    /// Remaining generations in the current period. `None` means unlimited.
    #[must_use]
    pub fn remaining(&self) -> Option<u32> {
        if self.tier.is_unlimited() {
            None
        } else {
            Some(self.generations_limit.saturating_sub(self.generations_used))
        }
    }

    /// Record one consumed generation.
    pub fn record_generation(&mut self) {
        self.generations_used += 1;
        self.updated_at = Utc::now();
    }

    /// Apply a plan change: reset tier and limit. Usage is never decremented.
    pub fn apply_plan(&mut self, plan: &Plan) {
        self.tier = plan.tier;
        if let Some(limit) = plan.generations_limit {
            self.generations_limit = limit;
        }
        self.updated_at = Utc::now();
    }
}
