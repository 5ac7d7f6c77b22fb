//! API module for the xAPI statements endpoint
//!
//! This module maps HTTP requests onto the statement service.

pub mod http;
pub mod rest;
pub mod state;

pub use http::{create_router, STATEMENTS_PATH};
pub use state::AppState;
