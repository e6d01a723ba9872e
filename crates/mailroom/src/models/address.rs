//! Email address value type

use serde::{Deserialize, Serialize};

/// An email address with optional display name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailAddress {
    /// Email address (e.g., "jane@example.com")
    pub address: String,
    /// Display name (e.g., "Jane Doe")
    #[serde(default, alias = "senderInfo")]
    pub display_name: Option<String>,
}

impl EmailAddress {
    /// Create a new email address with just the address
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            display_name: None,
        }
    }

    /// Create a new email address with a display name
    pub fn with_name(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            display_name: Some(name.into()),
        }
    }
}
