//! Email record model and its identifiers

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::EmailAddress;
use crate::error::{EmailError, Result};

/// Identifier of the user owning a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Store-assigned identifier of a record
///
/// Issued once, on first persistence, from a single store-wide sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmailId(pub u64);

impl fmt::Display for EmailId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Folder {
    #[serde(rename = "drafts", alias = "draft")]
    Draft,
    Outbox,
    Sent,
    Inbox,
}

impl Folder {
    pub const ALL: [Folder; 4] = [Folder::Draft, Folder::Outbox, Folder::Sent, Folder::Inbox];

    pub fn as_str(&self) -> &'static str {
        match self {
            Folder::Draft => "drafts",
            Folder::Outbox => "outbox",
            Folder::Sent => "sent",
            Folder::Inbox => "inbox",
        }
    }
}

impl fmt::Display for Folder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Folder {
    type Err = EmailError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "drafts" | "draft" => Ok(Folder::Draft),
            "outbox" => Ok(Folder::Outbox),
            "sent" => Ok(Folder::Sent),
            "inbox" => Ok(Folder::Inbox),
            other => Err(EmailError::validation(format!("unknown folder '{other}'"))),
        }
    }
}

/// One email, owned by one user, in one folder at a time
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmailRecord {
    /// Unset until first persisted
    pub id: Option<EmailId>,
    pub user_id: Option<UserId>,
    pub folder: Option<Folder>,
    pub sender: Option<EmailAddress>,
    pub recipients: Vec<EmailAddress>,
    pub carbon_copies: Vec<EmailAddress>,
    pub blind_carbon_copies: Vec<EmailAddress>,
    pub subject: String,
    #[serde(alias = "message")]
    pub body: String,
}

impl EmailRecord {
    /// Create a new record builder
    pub fn builder() -> EmailRecordBuilder {
        EmailRecordBuilder::default()
    }

    /// Decode a record from a JSON request body
    ///
    /// An empty body or a JSON `null` is an absent record.
    pub fn from_json(body: &str) -> Result<Self> {
        if body.trim().is_empty() {
            return Err(EmailError::NullInput);
        }
        let value: serde_json::Value = serde_json::from_str(body)
            .map_err(|e| EmailError::validation(format!("malformed email body: {e}")))?;
        if value.is_null() {
            return Err(EmailError::NullInput);
        }
        serde_json::from_value(value)
            .map_err(|e| EmailError::validation(format!("malformed email body: {e}")))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| EmailError::Storage(e.to_string()))
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    pub fn is_in(&self, folder: Folder) -> bool {
        self.folder == Some(folder)
    }

    /// Copy of this record placed in `folder` for `user_id`
    pub fn assigned(mut self, user_id: UserId, folder: Folder) -> Self {
        self.user_id = Some(user_id);
        self.folder = Some(folder);
        self
    }
}

/// Builder for creating EmailRecord instances
#[derive(Default)]
pub struct EmailRecordBuilder {
    record: EmailRecord,
}

impl EmailRecordBuilder {
    pub fn id(mut self, id: EmailId) -> Self {
        self.record.id = Some(id);
        self
    }

    pub fn user_id(mut self, user_id: UserId) -> Self {
        self.record.user_id = Some(user_id);
        self
    }

    pub fn folder(mut self, folder: Folder) -> Self {
        self.record.folder = Some(folder);
        self
    }

    pub fn sender(mut self, sender: EmailAddress) -> Self {
        self.record.sender = Some(sender);
        self
    }

    pub fn recipients(mut self, recipients: Vec<EmailAddress>) -> Self {
        self.record.recipients = recipients;
        self
    }

    pub fn carbon_copies(mut self, carbon_copies: Vec<EmailAddress>) -> Self {
        self.record.carbon_copies = carbon_copies;
        self
    }

    pub fn blind_carbon_copies(mut self, blind_carbon_copies: Vec<EmailAddress>) -> Self {
        self.record.blind_carbon_copies = blind_carbon_copies;
        self
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.record.subject = subject.into();
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.record.body = body.into();
        self
    }

    pub fn build(self) -> EmailRecord {
        self.record
    }
}
