//! Storage trait definitions

use crate::error::Result;
use crate::models::{EmailId, EmailRecord, Folder, UserId};

/// Trait for email record storage
///
/// This trait abstracts over storage backends. The in-memory store is the
/// reference backend; a durable backend plugs in behind the same interface.
/// Implementations hold no business rules beyond the validity of the data
/// they are handed.
pub trait EmailStore: Send + Sync {
    /// Persist a record under (user_id, id), replacing any prior value
    ///
    /// A record without an identifier is first given the next one from the
    /// store-wide sequence. Returns the stored record including its identifier.
    /// Fails with `Validation` if `user_id` or `folder` is unset.
    fn upsert_email(&self, email: EmailRecord) -> Result<EmailRecord>;

    /// Point lookup; `Ok(None)` when nothing is stored at (user_id, id)
    fn get_email(&self, user_id: UserId, email_id: EmailId) -> Result<Option<EmailRecord>>;

    /// All of a user's records currently in `folder`, ordered by identifier
    fn list_emails_by_folder(&self, user_id: UserId, folder: Folder) -> Result<Vec<EmailRecord>>;

    /// Number of records held for a user across all folders
    fn count_emails(&self, user_id: UserId) -> Result<usize>;

    /// Most recently issued identifier, if any
    fn last_issued_id(&self) -> Option<EmailId>;
}
