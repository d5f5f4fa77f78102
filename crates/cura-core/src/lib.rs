//! # cura-core
//!
//! The CURA sync core: the capability traits the application is injected
//! with, the bounded-retry policy, the sync configuration loader, and the
//! Merge/Load Engine that reconciles local and remote user data into one
//! snapshot.
//!
//! The engine is deliberately pure-ish: `Loader::load()` returns a snapshot
//! and never mutates shared in-memory state, so a caller can discard an
//! overlapping or stale result without partial updates leaking anywhere.

pub mod config;
pub mod loader;
pub mod retry;
pub mod traits;

pub use loader::Loader;
pub use retry::RetryPolicy;
