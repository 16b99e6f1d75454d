//! `RocksDB` storage implementation.
//!
//! This module provides the `RocksStore` implementation of the `Store` trait.

use std::path::Path;
use std::sync::Arc;

use rocksdb::{
    BoundColumnFamily, ColumnFamilyDescriptor, DBWithThreadMode, IteratorMode, MultiThreaded,
    Options, WriteBatch,
};

use qron_core::{
    Folder, FolderId, Order, OrderId, Profile, Qron, QronId, RedirectRule, RuleId, Schedule,
    ScheduleId, Tag, TagId, UserId,
};

use crate::error::{Result, StoreError};
use crate::keys;
use crate::schema::{all_column_families, cf};
use crate::Store;

/// RocksDB-backed storage implementation.
pub struct RocksStore {
    db: Arc<DBWithThreadMode<MultiThreaded>>,
}

impl RocksStore {
    /// Open or create a `RocksDB` database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors: Vec<_> = all_column_families()
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect();

        let db = DBWithThreadMode::open_cf_descriptors(&opts, path, cf_descriptors)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Get a column family handle.
    fn cf(&self, name: &str) -> Result<Arc<BoundColumnFamily<'_>>> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StoreError::Database(format!("column family not found: {name}")))
    }

    /// Serialize a value using CBOR.
    fn serialize<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(value, &mut buf)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(buf)
    }

    /// Deserialize a value from CBOR.
    fn deserialize<T: serde::de::DeserializeOwned>(data: &[u8]) -> Result<T> {
        ciborium::from_reader(data).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    /// Get and deserialize a single value.
    fn get_value<T: serde::de::DeserializeOwned>(
        &self,
        cf_name: &str,
        key: &[u8],
    ) -> Result<Option<T>> {
        let cf = self.cf(cf_name)?;
        self.db
            .get_cf(&cf, key)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    /// Serialize and put a single value.
    fn put_value<T: serde::Serialize>(&self, cf_name: &str, key: &[u8], value: &T) -> Result<()> {
        let cf = self.cf(cf_name)?;
        let data = Self::serialize(value)?;
        self.db
            .put_cf(&cf, key, data)
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    /// Collect all values under a key prefix in a column family.
    fn scan_prefix<T: serde::de::DeserializeOwned>(
        &self,
        cf_name: &str,
        prefix: &[u8],
    ) -> Result<Vec<T>> {
        let cf = self.cf(cf_name)?;
        let iter = self
            .db
            .iterator_cf(&cf, IteratorMode::From(prefix, rocksdb::Direction::Forward));

        let mut values = Vec::new();
        for item in iter {
            let (key, value) = item.map_err(|e| StoreError::Database(e.to_string()))?;
            if !key.starts_with(prefix) {
                break;
            }
            values.push(Self::deserialize(&value)?);
        }
        Ok(values)
    }

    /// Delete a key, erroring if it was absent.
    fn delete_existing(&self, cf_name: &str, key: &[u8]) -> Result<()> {
        let cf = self.cf(cf_name)?;
        let exists = self
            .db
            .get_cf(&cf, key)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .is_some();
        if !exists {
            return Err(StoreError::NotFound);
        }
        self.db
            .delete_cf(&cf, key)
            .map_err(|e| StoreError::Database(e.to_string()))
    }
}

impl Store for RocksStore {
    // =========================================================================
    // Profile Operations
    // =========================================================================

    fn put_profile(&self, profile: &Profile) -> Result<()> {
        self.put_value(cf::PROFILES, &keys::profile_key(&profile.user_id), profile)
    }

    fn get_profile(&self, user_id: &UserId) -> Result<Option<Profile>> {
        self.get_value(cf::PROFILES, &keys::profile_key(user_id))
    }

    fn increment_generations(&self, user_id: &UserId) -> Result<u32> {
        // Read-modify-write: concurrent callers can interleave here, so two
        // requests at the quota boundary may both observe the pre-increment
        // count.
        let mut profile = self.get_profile(user_id)?.ok_or(StoreError::NotFound)?;
        profile.record_generation();
        self.put_profile(&profile)?;
        Ok(profile.generations_used)
    }

    // =========================================================================
    // QRON Operations
    // =========================================================================

    fn put_qron(&self, qron: &Qron) -> Result<()> {
        let cf_qrons = self.cf(cf::QRONS)?;
        let cf_by_user = self.cf(cf::QRONS_BY_USER)?;

        let qron_key = keys::qron_key(&qron.id);
        let user_key = keys::user_qron_key(&qron.user_id, &qron.id);
        let value = Self::serialize(qron)?;

        let mut batch = WriteBatch::default();
        batch.put_cf(&cf_qrons, &qron_key, &value);
        batch.put_cf(&cf_by_user, &user_key, []); // Index entry (empty value)

        self.db
            .write(batch)
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    fn get_qron(&self, qron_id: &QronId) -> Result<Option<Qron>> {
        self.get_value(cf::QRONS, &keys::qron_key(qron_id))
    }

    fn list_qrons_by_user(
        &self,
        user_id: &UserId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Qron>> {
        let cf_by_user = self.cf(cf::QRONS_BY_USER)?;
        let prefix = keys::user_qrons_prefix(user_id);

        let iter = self.db.iterator_cf(
            &cf_by_user,
            IteratorMode::From(&prefix, rocksdb::Direction::Forward),
        );

        // Collect matching keys first; ULIDs are naturally time-ordered.
        let mut all_keys: Vec<Vec<u8>> = Vec::new();
        for item in iter {
            let (key, _) = item.map_err(|e| StoreError::Database(e.to_string()))?;
            if !key.starts_with(&prefix) {
                break;
            }
            all_keys.push(key.to_vec());
        }

        // Reverse to get newest first.
        all_keys.reverse();

        let mut qrons = Vec::new();
        for key in all_keys.into_iter().skip(offset) {
            if qrons.len() >= limit {
                break;
            }
            let qron_id = keys::extract_qron_id_from_user_key(&key);
            if let Some(qron) = self.get_qron(&qron_id)? {
                qrons.push(qron);
            }
        }

        Ok(qrons)
    }

    fn record_scan(&self, qron_id: &QronId) -> Result<Qron> {
        let mut qron = self.get_qron(qron_id)?.ok_or(StoreError::NotFound)?;
        qron.scan_count += 1;
        self.put_qron(&qron)?;
        Ok(qron)
    }

    fn set_qron_folder(&self, qron_id: &QronId, folder_id: Option<FolderId>) -> Result<()> {
        let mut qron = self.get_qron(qron_id)?.ok_or(StoreError::NotFound)?;
        qron.folder_id = folder_id;
        self.put_qron(&qron)
    }

    fn tag_qron(&self, qron_id: &QronId, tag_id: &TagId) -> Result<()> {
        let cf = self.cf(cf::QRON_TAGS)?;
        self.db
            .put_cf(&cf, keys::qron_tag_key(qron_id, tag_id), [])
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    fn untag_qron(&self, qron_id: &QronId, tag_id: &TagId) -> Result<()> {
        let cf = self.cf(cf::QRON_TAGS)?;
        self.db
            .delete_cf(&cf, keys::qron_tag_key(qron_id, tag_id))
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    fn list_qron_tags(&self, qron_id: &QronId) -> Result<Vec<TagId>> {
        let cf = self.cf(cf::QRON_TAGS)?;
        let prefix = keys::qron_tags_prefix(qron_id);

        let iter = self
            .db
            .iterator_cf(&cf, IteratorMode::From(&prefix, rocksdb::Direction::Forward));

        let mut tags = Vec::new();
        for item in iter {
            let (key, _) = item.map_err(|e| StoreError::Database(e.to_string()))?;
            if !key.starts_with(&prefix) {
                break;
            }
            tags.push(keys::extract_tag_id_from_qron_tag_key(&key));
        }
        Ok(tags)
    }

    // =========================================================================
    // Folder / Tag Operations
    // =========================================================================

    fn put_folder(&self, folder: &Folder) -> Result<()> {
        self.put_value(
            cf::FOLDERS,
            &keys::folder_key(&folder.user_id, &folder.id),
            folder,
        )
    }

    fn get_folder(&self, user_id: &UserId, folder_id: &FolderId) -> Result<Option<Folder>> {
        self.get_value(cf::FOLDERS, &keys::folder_key(user_id, folder_id))
    }

    fn list_folders(&self, user_id: &UserId) -> Result<Vec<Folder>> {
        let mut folders: Vec<Folder> =
            self.scan_prefix(cf::FOLDERS, &keys::user_owned_prefix(user_id))?;
        folders.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(folders)
    }

    fn delete_folder(&self, user_id: &UserId, folder_id: &FolderId) -> Result<()> {
        self.delete_existing(cf::FOLDERS, &keys::folder_key(user_id, folder_id))
    }

    fn put_tag(&self, tag: &Tag) -> Result<()> {
        self.put_value(cf::TAGS, &keys::tag_key(&tag.user_id, &tag.id), tag)
    }

    fn get_tag(&self, user_id: &UserId, tag_id: &TagId) -> Result<Option<Tag>> {
        self.get_value(cf::TAGS, &keys::tag_key(user_id, tag_id))
    }

    fn list_tags(&self, user_id: &UserId) -> Result<Vec<Tag>> {
        let mut tags: Vec<Tag> = self.scan_prefix(cf::TAGS, &keys::user_owned_prefix(user_id))?;
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }

    fn delete_tag(&self, user_id: &UserId, tag_id: &TagId) -> Result<()> {
        self.delete_existing(cf::TAGS, &keys::tag_key(user_id, tag_id))
    }

    // =========================================================================
    // Order Operations
    // =========================================================================

    fn put_order(&self, order: &Order) -> Result<()> {
        let cf_orders = self.cf(cf::ORDERS)?;
        let cf_by_session = self.cf(cf::ORDERS_BY_SESSION)?;

        let order_key = keys::order_key(&order.id);
        let session_key = keys::order_session_key(&order.session_id);
        let value = Self::serialize(order)?;

        let mut batch = WriteBatch::default();
        batch.put_cf(&cf_orders, &order_key, &value);
        batch.put_cf(&cf_by_session, &session_key, order.id.to_bytes());

        self.db
            .write(batch)
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    fn get_order(&self, order_id: &OrderId) -> Result<Option<Order>> {
        self.get_value(cf::ORDERS, &keys::order_key(order_id))
    }

    fn get_order_by_session(&self, session_id: &str) -> Result<Option<Order>> {
        let cf = self.cf(cf::ORDERS_BY_SESSION)?;
        let Some(id_bytes) = self
            .db
            .get_cf(&cf, keys::order_session_key(session_id))
            .map_err(|e| StoreError::Database(e.to_string()))?
        else {
            return Ok(None);
        };

        let mut bytes = [0u8; 16];
        if id_bytes.len() != 16 {
            return Err(StoreError::Serialization(
                "malformed order id in session index".into(),
            ));
        }
        bytes.copy_from_slice(&id_bytes);
        let order_id =
            OrderId::from_bytes(bytes).map_err(|e| StoreError::Serialization(e.to_string()))?;
        self.get_order(&order_id)
    }

    // =========================================================================
    // Schedule / Redirect Rule Operations
    // =========================================================================

    fn put_schedule(&self, schedule: &Schedule) -> Result<()> {
        self.put_value(
            cf::SCHEDULES,
            &keys::schedule_key(&schedule.qron_id, &schedule.id),
            schedule,
        )
    }

    fn list_schedules(&self, qron_id: &QronId) -> Result<Vec<Schedule>> {
        let mut schedules: Vec<Schedule> =
            self.scan_prefix(cf::SCHEDULES, &keys::qron_owned_prefix(qron_id))?;
        schedules.sort_by_key(|s| s.start_time);
        Ok(schedules)
    }

    fn delete_schedule(&self, qron_id: &QronId, schedule_id: &ScheduleId) -> Result<()> {
        self.delete_existing(cf::SCHEDULES, &keys::schedule_key(qron_id, schedule_id))
    }

    fn put_rule(&self, rule: &RedirectRule) -> Result<()> {
        self.put_value(
            cf::REDIRECT_RULES,
            &keys::rule_key(&rule.qron_id, &rule.id),
            rule,
        )
    }

    fn list_rules(&self, qron_id: &QronId) -> Result<Vec<RedirectRule>> {
        let mut rules: Vec<RedirectRule> =
            self.scan_prefix(cf::REDIRECT_RULES, &keys::qron_owned_prefix(qron_id))?;
        rules.sort_by_key(|r| r.priority);
        Ok(rules)
    }

    fn delete_rule(&self, qron_id: &QronId, rule_id: &RuleId) -> Result<()> {
        self.delete_existing(cf::REDIRECT_RULES, &keys::rule_key(qron_id, rule_id))
    }
}
