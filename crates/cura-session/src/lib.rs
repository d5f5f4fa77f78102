//! # cura-session
//!
//! The gate between "an auth event happened" and "the main application is
//! on screen". `SessionGate` is a small state machine that decides which
//! screen is active, triggers exactly one load per session change, refuses
//! to commit stale load results, and walks a first-time user through the
//! disclaimer and feature tour before anything else.

pub mod gate;

pub use gate::{GateState, LoadCommit, LoadRequest, Screen, SessionGate};
