//! CLI command implementations

pub mod completions;
pub mod config;
pub mod datasets;
pub mod errors;
pub mod init;
pub mod permission;
pub mod validate;
