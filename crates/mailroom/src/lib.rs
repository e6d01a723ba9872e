//! Mailroom crate - Email record storage and lifecycle
//!
//! This crate provides the core of a per-user email service:
//! - Domain models (EmailRecord, EmailAddress, Folder, identifiers)
//! - Storage trait abstraction with a lock-striped in-memory store
//! - Lifecycle service for drafts and the two-phase send
//!
//! Transport, authentication and process wiring live outside this crate.

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod models;
pub mod storage;

pub use config::StoreConfig;
pub use error::{EmailError, Result};
pub use lifecycle::{EmailService, SaveOutcome, SendResult};
pub use models::{EmailAddress, EmailId, EmailRecord, EmailRecordBuilder, Folder, UserId};
pub use storage::{EmailStore, InMemoryEmailStore};
