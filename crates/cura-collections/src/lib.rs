//! # cura-collections
//!
//! The write side of the CURA sync core:
//!
//! - `InMemoryLocalStore` — the reference implementation of the `LocalStore`
//!   trait, suitable for tests, demos, and as the template for a real
//!   device-storage adapter.
//! - `UserStore` — one user's in-memory state plus the uniform
//!   persist-then-commit mutators every feature area goes through.
//!
//! The hard invariant throughout: in-memory state is never ahead of durable
//! storage. A mutation first persists the next value; only on success does
//! the in-memory copy change.

pub mod memory;
pub mod user_store;

pub use memory::InMemoryLocalStore;
pub use user_store::{ProfileListField, ProfileSaved, UserStore};
