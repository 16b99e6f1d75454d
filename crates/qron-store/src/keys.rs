//! Key encoding utilities for `RocksDB`.
//!
//! This module provides functions for encoding and decoding keys used in
//! column families. Composite keys are fixed-width `owner (16 bytes) ||
//! entity (16 bytes)` so that prefix iteration over the owner yields the
//! owner's entities, and ULID-keyed entities iterate chronologically.

use qron_core::{FolderId, QronId, RuleId, ScheduleId, TagId, UserId};

/// Create a profile key from a user ID.
#[must_use]
pub fn profile_key(user_id: &UserId) -> Vec<u8> {
    user_id.as_bytes().to_vec()
}

/// Create a QRON key from a QRON ID.
#[must_use]
pub fn qron_key(qron_id: &QronId) -> Vec<u8> {
    qron_id.to_bytes().to_vec()
}

/// Create a user-QRON index key.
///
/// Format: `user_id (16 bytes) || qron_id (16 bytes)`
///
/// Since ULIDs are time-ordered, QRONs for a user will be sorted by time.
#[must_use]
pub fn user_qron_key(user_id: &UserId, qron_id: &QronId) -> Vec<u8> {
    compose(user_id.as_bytes(), &qron_id.to_bytes())
}

/// Create a prefix for iterating all QRONs for a user.
#[must_use]
pub fn user_qrons_prefix(user_id: &UserId) -> Vec<u8> {
    user_id.as_bytes().to_vec()
}

/// Extract the QRON ID from a user-QRON index key.
///
/// # Panics
///
/// Panics if the key is not at least 32 bytes.
#[must_use]
pub fn extract_qron_id_from_user_key(key: &[u8]) -> QronId {
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&key[16..32]);
    QronId::from_bytes(bytes).expect("valid ULID bytes")
}

/// Create a tag-assignment key: `qron_id || tag_id`.
#[must_use]
pub fn qron_tag_key(qron_id: &QronId, tag_id: &TagId) -> Vec<u8> {
    compose(&qron_id.to_bytes(), tag_id.as_bytes())
}

/// Create a prefix for iterating all tag assignments of a QRON.
#[must_use]
pub fn qron_tags_prefix(qron_id: &QronId) -> Vec<u8> {
    qron_id.to_bytes().to_vec()
}

/// Extract the tag ID from a tag-assignment key.
///
/// # Panics
///
/// Panics if the key is not at least 32 bytes.
#[must_use]
pub fn extract_tag_id_from_qron_tag_key(key: &[u8]) -> TagId {
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&key[16..32]);
    TagId::from_uuid(uuid_from_bytes(bytes))
}

/// Create a folder key: `user_id || folder_id`.
#[must_use]
pub fn folder_key(user_id: &UserId, folder_id: &FolderId) -> Vec<u8> {
    compose(user_id.as_bytes(), folder_id.as_bytes())
}

/// Create a tag key: `user_id || tag_id`.
#[must_use]
pub fn tag_key(user_id: &UserId, tag_id: &TagId) -> Vec<u8> {
    compose(user_id.as_bytes(), tag_id.as_bytes())
}

/// Create a prefix for iterating all folders or tags of a user.
#[must_use]
pub fn user_owned_prefix(user_id: &UserId) -> Vec<u8> {
    user_id.as_bytes().to_vec()
}

/// Create an order key from an order ID.
#[must_use]
pub fn order_key(order_id: &qron_core::OrderId) -> Vec<u8> {
    order_id.to_bytes().to_vec()
}

/// Create an order-by-session index key from a checkout session id.
#[must_use]
pub fn order_session_key(session_id: &str) -> Vec<u8> {
    session_id.as_bytes().to_vec()
}

/// Create a schedule key: `qron_id || schedule_id`.
#[must_use]
pub fn schedule_key(qron_id: &QronId, schedule_id: &ScheduleId) -> Vec<u8> {
    compose(&qron_id.to_bytes(), schedule_id.as_bytes())
}

/// Create a redirect-rule key: `qron_id || rule_id`.
#[must_use]
pub fn rule_key(qron_id: &QronId, rule_id: &RuleId) -> Vec<u8> {
    compose(&qron_id.to_bytes(), rule_id.as_bytes())
}

/// Create a prefix for iterating all schedules or rules of a QRON.
#[must_use]
pub fn qron_owned_prefix(qron_id: &QronId) -> Vec<u8> {
    qron_id.to_bytes().to_vec()
}

fn compose(left: &[u8], right: &[u8]) -> Vec<u8> {
    let mut key = Vec::with_capacity(32);
    key.extend_from_slice(left);
    key.extend_from_slice(right);
    key
}

fn uuid_from_bytes(bytes: [u8; 16]) -> uuid::Uuid {
    uuid::Uuid::from_bytes(bytes)
}
