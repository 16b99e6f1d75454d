//! `RocksDB` storage layer for the QRON storefront.
//!
//! This crate provides persistent storage for profiles, QRONs, orders, and
//! the organizational entities attached to QRONs, using `RocksDB` with
//! column families for efficient indexing.
//!
//! # Architecture
//!
//! The storage uses the following column families:
//!
//! - `profiles`: user profiles, keyed by `user_id`
//! - `qrons`: QRON records, keyed by `qron_id` (ULID)
//! - `qrons_by_user`: index for listing QRONs by owner
//! - `qron_tags`: tag assignments, keyed by `qron_id || tag_id`
//! - `folders` / `tags`: user-owned labels, keyed by `user_id || id`
//! - `orders`: purchase orders, keyed by `order_id` (ULID)
//! - `orders_by_session`: index from checkout session id to order
//! - `schedules` / `redirect_rules`: per-QRON entries, keyed by `qron_id || id`
//!
//! # Example
//!
//! ```no_run
//! use qron_store::{RocksStore, Store};
//! use qron_core::{Profile, UserId};
//!
//! let store = RocksStore::open("/tmp/qron-db").unwrap();
//!
//! let user_id = UserId::generate();
//! let profile = Profile::new(user_id);
//! store.put_profile(&profile).unwrap();
//!
//! let retrieved = store.get_profile(&user_id).unwrap();
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod keys;
pub mod rocks;
pub mod schema;

pub use error::{Result, StoreError};
pub use rocks::RocksStore;

use qron_core::{
    Folder, FolderId, Order, OrderId, Profile, Qron, QronId, RedirectRule, RuleId, Schedule,
    ScheduleId, Tag, TagId, UserId,
};

/// The storage trait defining all database operations.
///
/// This trait abstracts the storage layer, allowing for different
/// implementations (e.g., `RocksDB`, in-memory for testing).
pub trait Store: Send + Sync {
    // =========================================================================
    // Profile Operations
    // =========================================================================

    /// Insert or update a profile record.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_profile(&self, profile: &Profile) -> Result<()>;

    /// Get a profile by user ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_profile(&self, user_id: &UserId) -> Result<Option<Profile>>;

    /// Increment a profile's generation counter by one.
    ///
    /// Returns the new `generations_used` value. This is a read-modify-write
    /// against shared persisted state; concurrent callers near the quota
    /// boundary can interleave.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the profile doesn't exist.
    fn increment_generations(&self, user_id: &UserId) -> Result<u32>;

    // =========================================================================
    // QRON Operations
    // =========================================================================

    /// Insert or update a QRON record, maintaining the owner index.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_qron(&self, qron: &Qron) -> Result<()>;

    /// Get a QRON by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_qron(&self, qron_id: &QronId) -> Result<Option<Qron>>;

    /// List QRONs for a user, ordered by time (newest first).
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_qrons_by_user(
        &self,
        user_id: &UserId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Qron>>;

    /// Increment a QRON's scan counter and return the updated record.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the QRON doesn't exist.
    fn record_scan(&self, qron_id: &QronId) -> Result<Qron>;

    /// Set or clear the folder reference on a QRON.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the QRON doesn't exist.
    fn set_qron_folder(&self, qron_id: &QronId, folder_id: Option<FolderId>) -> Result<()>;

    /// Assign a tag to a QRON. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn tag_qron(&self, qron_id: &QronId, tag_id: &TagId) -> Result<()>;

    /// Remove a tag assignment from a QRON. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn untag_qron(&self, qron_id: &QronId, tag_id: &TagId) -> Result<()>;

    /// List the tag IDs assigned to a QRON.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_qron_tags(&self, qron_id: &QronId) -> Result<Vec<TagId>>;

    // =========================================================================
    // Folder / Tag Operations
    // =========================================================================

    /// Insert or update a folder.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_folder(&self, folder: &Folder) -> Result<()>;

    /// Get a folder owned by a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_folder(&self, user_id: &UserId, folder_id: &FolderId) -> Result<Option<Folder>>;

    /// List a user's folders.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_folders(&self, user_id: &UserId) -> Result<Vec<Folder>>;

    /// Delete a folder. QRONs filed under it keep their dangling reference.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the folder doesn't exist.
    fn delete_folder(&self, user_id: &UserId, folder_id: &FolderId) -> Result<()>;

    /// Insert or update a tag.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_tag(&self, tag: &Tag) -> Result<()>;

    /// Get a tag owned by a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_tag(&self, user_id: &UserId, tag_id: &TagId) -> Result<Option<Tag>>;

    /// List a user's tags.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_tags(&self, user_id: &UserId) -> Result<Vec<Tag>>;

    /// Delete a tag.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the tag doesn't exist.
    fn delete_tag(&self, user_id: &UserId, tag_id: &TagId) -> Result<()>;

    // =========================================================================
    // Order Operations
    // =========================================================================

    /// Insert or update an order, maintaining the session index.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_order(&self, order: &Order) -> Result<()>;

    /// Get an order by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_order(&self, order_id: &OrderId) -> Result<Option<Order>>;

    /// Get an order by its checkout session id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_order_by_session(&self, session_id: &str) -> Result<Option<Order>>;

    // =========================================================================
    // Schedule / Redirect Rule Operations
    // =========================================================================

    /// Insert or update a living-art schedule.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_schedule(&self, schedule: &Schedule) -> Result<()>;

    /// List the schedules attached to a QRON.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_schedules(&self, qron_id: &QronId) -> Result<Vec<Schedule>>;

    /// Delete a schedule.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the schedule doesn't exist.
    fn delete_schedule(&self, qron_id: &QronId, schedule_id: &ScheduleId) -> Result<()>;

    /// Insert or update a redirect rule.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_rule(&self, rule: &RedirectRule) -> Result<()>;

    /// List the redirect rules attached to a QRON, in priority order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_rules(&self, qron_id: &QronId) -> Result<Vec<RedirectRule>>;

    /// Delete a redirect rule.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the rule doesn't exist.
    fn delete_rule(&self, qron_id: &QronId, rule_id: &RuleId) -> Result<()>;
}
