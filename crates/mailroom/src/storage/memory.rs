//! In-memory storage implementation
//!
//! Records live for the lifetime of the process. Records are spread over
//! lock stripes keyed by user so writers for different users rarely contend;
//! the identifier sequence is the only store-wide point of serialization.

use log::{debug, warn};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::EmailStore;
use crate::config::StoreConfig;
use crate::error::{EmailError, Result};
use crate::models::{EmailId, EmailRecord, Folder, UserId};

/// Records of the users that hash to one stripe
type Shard = HashMap<UserId, HashMap<EmailId, EmailRecord>>;

/// In-memory implementation of EmailStore
///
/// Uses lock-striped HashMaps for thread-safe access and an atomic counter
/// for identifier issuance.
pub struct InMemoryEmailStore {
    shards: Vec<RwLock<Shard>>,
    /// Next identifier to hand out
    next_id: AtomicU64,
    first_id: u64,
}

impl InMemoryEmailStore {
    /// Create a new empty store with default settings
    pub fn new() -> Self {
        Self::with_config(&StoreConfig::default())
    }

    /// Create a new empty store with the given stripe count and first identifier
    pub fn with_config(config: &StoreConfig) -> Self {
        let shard_count = config.shard_count.max(1);
        let first_id = config.first_id.max(1);
        Self {
            shards: (0..shard_count).map(|_| RwLock::new(HashMap::new())).collect(),
            next_id: AtomicU64::new(first_id),
            first_id,
        }
    }

    fn shard_index(&self, user_id: UserId) -> usize {
        (user_id.0 % self.shards.len() as u64) as usize
    }

    fn read_shard(&self, user_id: UserId) -> Result<RwLockReadGuard<'_, Shard>> {
        self.shards[self.shard_index(user_id)]
            .read()
            .map_err(|_| EmailError::Storage("record shard lock poisoned".to_string()))
    }

    fn write_shard(&self, user_id: UserId) -> Result<RwLockWriteGuard<'_, Shard>> {
        self.shards[self.shard_index(user_id)]
            .write()
            .map_err(|_| EmailError::Storage("record shard lock poisoned".to_string()))
    }

    /// Take the next identifier from the store-wide sequence
    fn allocate_id(&self) -> Result<EmailId> {
        self.next_id
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |next| next.checked_add(1))
            .map(EmailId)
            .map_err(|_| EmailError::Storage("email identifier sequence exhausted".to_string()))
    }
}

impl Default for InMemoryEmailStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EmailStore for InMemoryEmailStore {
    fn upsert_email(&self, mut email: EmailRecord) -> Result<EmailRecord> {
        let Some(user_id) = email.user_id else {
            warn!("[STORE] Rejected email without a user");
            return Err(EmailError::validation("No user supplied with email"));
        };
        if email.folder.is_none() {
            warn!("[STORE] Rejected email without a folder for user {}", user_id);
            return Err(EmailError::validation("No folder supplied with email"));
        }

        let mut shard = self.write_shard(user_id)?;
        let emails = shard.entry(user_id).or_default();

        // A supplied identifier must already name one of this user's records
        let email_id = match email.id {
            Some(id) if emails.contains_key(&id) => id,
            Some(id) => {
                warn!("[STORE] Rejected email id {} not held by user {}", id, user_id);
                return Err(EmailError::validation(format!(
                    "email identifier {id} is not held by user {user_id}"
                )));
            }
            None => {
                let id = self.allocate_id()?;
                debug!("[STORE] Allocated email id {} for user {}", id, user_id);
                id
            }
        };
        email.id = Some(email_id);

        // The record becomes visible only once this guard drops
        emails.insert(email_id, email.clone());
        drop(shard);

        debug!(
            "[STORE] Saved email {} for user {} in {:?}",
            email_id, user_id, email.folder
        );
        Ok(email)
    }

    fn get_email(&self, user_id: UserId, email_id: EmailId) -> Result<Option<EmailRecord>> {
        let shard = self.read_shard(user_id)?;
        Ok(shard
            .get(&user_id)
            .and_then(|emails| emails.get(&email_id))
            .cloned())
    }

    fn list_emails_by_folder(&self, user_id: UserId, folder: Folder) -> Result<Vec<EmailRecord>> {
        let shard = self.read_shard(user_id)?;
        let Some(emails) = shard.get(&user_id) else {
            return Ok(Vec::new());
        };

        let mut result: Vec<EmailRecord> = emails
            .values()
            .filter(|email| email.is_in(folder))
            .cloned()
            .collect();
        drop(shard);

        result.sort_by_key(|email| email.id);
        Ok(result)
    }

    fn count_emails(&self, user_id: UserId) -> Result<usize> {
        let shard = self.read_shard(user_id)?;
        Ok(shard.get(&user_id).map(|emails| emails.len()).unwrap_or(0))
    }

    fn last_issued_id(&self) -> Option<EmailId> {
        let next = self.next_id.load(Ordering::SeqCst);
        (next > self.first_id).then(|| EmailId(next - 1))
    }
}
