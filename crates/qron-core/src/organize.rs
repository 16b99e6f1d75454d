//! Organizational entities attached to QRONs.
//!
//! Folders (many-to-one), tags (many-to-many), living-art schedules, and
//! redirect rules. All are owned by a single account; only the owner may
//! create, rename, or delete them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{FolderId, QronId, RuleId, ScheduleId, TagId, UserId};

/// A user-defined folder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Folder {
    /// Folder identifier.
    pub id: FolderId,
    /// Owning account.
    pub user_id: UserId,
    /// Display name.
    pub name: String,
    /// When the folder was created.
    pub created_at: DateTime<Utc>,
}

impl Folder {
    /// Create a new folder.
    #[must_use]
    pub fn new(user_id: UserId, name: impl Into<String>) -> Self {
        Self {
            id: FolderId::generate(),
            user_id,
            name: name.into(),
            created_at: Utc::now(),
        }
    }
}

/// A user-defined tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    /// Tag identifier.
    pub id: TagId,
    /// Owning account.
    pub user_id: UserId,
    /// Display name.
    pub name: String,
    /// When the tag was created.
    pub created_at: DateTime<Utc>,
}

impl Tag {
    /// Create a new tag.
    #[must_use]
    pub fn new(user_id: UserId, name: impl Into<String>) -> Self {
        Self {
            id: TagId::generate(),
            user_id,
            name: name.into(),
            created_at: Utc::now(),
        }
    }
}

/// How a scheduled artwork change transitions in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    /// Cross-fade between images.
    Fade,
    /// Hard cut.
    Cut,
    /// Morph between images.
    Morph,
    /// Renderer default.
    Default,
}

/// A living-art schedule entry: swap the displayed artwork for a time window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schedule {
    /// Schedule identifier.
    pub id: ScheduleId,
    /// The QRON this schedule applies to.
    pub qron_id: QronId,
    /// Owning account.
    pub user_id: UserId,
    /// Window start.
    pub start_time: DateTime<Utc>,
    /// Window end. `None` means open-ended.
    pub end_time: Option<DateTime<Utc>>,
    /// Image shown during the window.
    pub target_image_url: String,
    /// Transition style.
    pub transition: Transition,
    /// Whether the entry is active.
    pub is_active: bool,
}

/// What a redirect rule keys on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    /// Unconditional fallback rule.
    Default,
    /// Match on device class.
    Device,
    /// Match on a time window.
    Time,
    /// Match on geographic location.
    Location,
    /// Match on request language.
    Language,
    /// Match on referrer.
    Referrer,
    /// A/B split.
    AB,
}

/// A redirect rule attached to a QRON.
///
/// Rules are evaluated in ascending priority order; the first active rule
/// whose conditions hold supplies the redirect target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedirectRule {
    /// Rule identifier.
    pub id: RuleId,
    /// The QRON this rule applies to.
    pub qron_id: QronId,
    /// Owning account.
    pub user_id: UserId,
    /// Display name.
    pub name: String,
    /// Evaluation priority; lower evaluates first.
    pub priority: i32,
    /// What the rule keys on.
    pub kind: RuleKind,
    /// Rule configuration; carries `redirect_url` and kind-specific keys.
    pub configuration: serde_json::Value,
    /// Whether the rule is active.
    pub is_active: bool,
    /// Optional window start for time-based rules.
    pub start_time: Option<DateTime<Utc>>,
    /// Optional window end for time-based rules.
    pub end_time: Option<DateTime<Utc>>,
    /// A/B variant label.
    pub a_b_variant: Option<String>,
    /// A/B weight.
    pub a_b_weight: Option<u32>,
}

impl RedirectRule {
    /// The redirect target carried in the configuration, if any.
    #[must_use]
    pub fn redirect_url(&self) -> Option<&str> {
        self.configuration.get("redirect_url").and_then(|v| v.as_str())
    }

    /// Whether this rule applies at `now`.
    ///
    /// Inactive rules never apply. Rules with a time window apply only
    /// inside it; rules without one always apply. Kind-specific request
    /// matching (device, location, ...) happens at the scan endpoint with
    /// whatever request context is available.
    #[must_use]
    pub fn applies_at(&self, now: DateTime<Utc>) -> bool {
        if !self.is_active {
            return false;
        }
        if let Some(start) = self.start_time {
            if now < start {
                return false;
            }
        }
        if let Some(end) = self.end_time {
            if now > end {
                return false;
            }
        }
        true
    }
}
