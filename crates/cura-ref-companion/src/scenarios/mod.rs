//! End-to-end demo scenarios.
//!
//! Each scenario is a self-contained module that wires real CURA components
//! (session gate, loader, user store) to the mock auth, remote, and
//! analysis backends and demonstrates a distinct slice of the app
//! lifecycle.

pub mod daily_use;
pub mod first_login;
pub mod offline_sync;
