//! Database schema definitions and column families.
//!
//! This module defines the column families used in `RocksDB` storage.

/// Column family names for the `RocksDB` database.
pub mod cf {
    /// User profiles, keyed by `user_id`.
    pub const PROFILES: &str = "profiles";

    /// QRON records, keyed by `qron_id` (ULID).
    pub const QRONS: &str = "qrons";

    /// Index: QRONs by owner, keyed by `user_id || qron_id`.
    /// Value is empty (index only).
    pub const QRONS_BY_USER: &str = "qrons_by_user";

    /// Tag assignments, keyed by `qron_id || tag_id`. Value is empty.
    pub const QRON_TAGS: &str = "qron_tags";

    /// Folders, keyed by `user_id || folder_id`.
    pub const FOLDERS: &str = "folders";

    /// Tags, keyed by `user_id || tag_id`.
    pub const TAGS: &str = "tags";

    /// Orders, keyed by `order_id` (ULID).
    pub const ORDERS: &str = "orders";

    /// Index: order by checkout session, keyed by the session id string.
    /// Value is the `order_id` bytes.
    pub const ORDERS_BY_SESSION: &str = "orders_by_session";

    /// Living-art schedules, keyed by `qron_id || schedule_id`.
    pub const SCHEDULES: &str = "schedules";

    /// Redirect rules, keyed by `qron_id || rule_id`.
    pub const REDIRECT_RULES: &str = "redirect_rules";
}

/// Returns all column family names for database initialization.
#[must_use]
pub fn all_column_families() -> Vec<&'static str> {
    vec![
        cf::PROFILES,
        cf::QRONS,
        cf::QRONS_BY_USER,
        cf::QRON_TAGS,
        cf::FOLDERS,
        cf::TAGS,
        cf::ORDERS,
        cf::ORDERS_BY_SESSION,
        cf::SCHEDULES,
        cf::REDIRECT_RULES,
    ]
}
