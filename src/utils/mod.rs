//! Utility functions and helpers
//!
//! This module contains timestamp utilities shared by validation and the service.

pub mod time;

pub use time::{format_instant, parse_instant, StoredClock};
