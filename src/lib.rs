//! xAPI Learning Record Store
//!
//! A statement endpoint for the Experience API, built on Axum and an
//! append-only JSON-lines statement log.
//!
//! # Features
//!
//! - **Statement Model**: Agents, groups, verbs, activities and statement refs
//!   with the shorthand forms clients commonly send
//! - **Validation**: Structural checks before anything is stored
//! - **Immutable Storage**: Statements are written once, never updated
//! - **Filtered Queries**: Match on actor and activity, paged with
//!   continuation tokens
//! - **Durability**: Every accepted batch is fsynced before the response
//!
//! # Modules
//!
//! - `types`: Statement data model and query envelopes
//! - `validation`: Statement and batch validation
//! - `store`: Storage trait with in-memory and JSON-lines backends
//! - `service`: Identity, stored timestamps, paging and error mapping
//! - `api`: HTTP routes for `/xAPI/statements`
//! - `config`: Environment-based configuration
//! - `utils`: Timestamp helpers
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use xapi_lrs::{create_router, AppState, MemoryStore, StatementService};
//!
//! #[tokio::main]
//! async fn main() -> xapi_lrs::LrsResult<()> {
//!     let service = StatementService::with_store(Arc::new(MemoryStore::new()));
//!     let app = create_router(Arc::new(AppState::new(service)));
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod service;
pub mod store;
pub mod types;
pub mod utils;
pub mod validation;

// Re-export commonly used items at crate root
pub use api::{create_router, AppState};
pub use config::LrsConfig;
pub use service::{PageQuery, ServiceError, ServiceOptions, StatementService};
pub use store::{JsonlStore, JsonlStoreConfig, MemoryStore, StatementStore, StoreError};
pub use types::{
    Actor, Activity, Agent, FilterCriteria, Group, LrsResult, Statement, StatementObject,
    StatementResult, Verb,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
