//! Email lifecycle module
//!
//! Provides the service that moves records between folders: drafts are
//! created and re-saved, and sends go through the outbox into sent.

mod service;

pub use service::{EmailService, SaveOutcome, SendResult};
