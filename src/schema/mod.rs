//! Schema system - validation and error rendering

pub mod errors;
pub mod validator;

pub use errors::{parse_errors, render_errors, ErrorPanel, ValidationError};
pub use validator::{SchemaError, SchemaValidator};
