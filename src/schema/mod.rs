//! JSON schemas for entity files

pub mod registry;
pub mod validator;

pub use registry::SchemaRegistry;
pub use validator::{SchemaError, SchemaViolation, Validator};
