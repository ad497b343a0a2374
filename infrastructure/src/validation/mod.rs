//! Payload validation adapters.

mod schema;

pub use schema::{FieldKind, FieldSchemaValidator};
