//! Domain models for email records

mod address;
mod record;

pub use address::EmailAddress;
pub use record::{EmailId, EmailRecord, EmailRecordBuilder, Folder, UserId};
