//! arex: ArangoDB example datasets toolkit
//!
//! Creates and removes the example datasets used by the ArangoDB
//! documentation, resolves a user's permission on a database and renders
//! JSON schema validation errors as plain text.

pub mod cli;
pub mod core;
pub mod datasets;
pub mod schema;
