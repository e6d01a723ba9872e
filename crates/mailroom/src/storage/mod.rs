//! Storage traits and implementations
//!
//! This module defines the storage abstraction layer for email records.
//! The trait-based design allows swapping the in-memory store for a
//! durable backend without touching the lifecycle service.

mod memory;
mod traits;

pub use memory::InMemoryEmailStore;
pub use traits::EmailStore;
