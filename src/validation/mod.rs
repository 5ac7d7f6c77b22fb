//! Request validation for statements
//!
//! Hard checks reject a statement before the service touches the store.
//! Soft checks only produce warnings, which the service logs.

mod statement;

pub use statement::{
    decode_batch, normalize_id, validate_batch, validate_statement, verb_warning, ValidationError,
    SUPPORTED_VERSION_PREFIX,
};
