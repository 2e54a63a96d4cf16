//! Core module - configuration, database access and permissions

pub mod client;
pub mod config;
pub mod permissions;
pub mod project;
pub mod store;

pub use client::{ApiError, ArangoClient, Auth};
pub use config::{Config, StoreKind};
pub use permissions::{
    is_admin_user, resolve_permission, user_is_admin, HttpPermissionSource, Permission,
    PermissionResolver, PermissionSource,
};
pub use project::{Project, ProjectError};
pub use store::{
    ArangoStore, CollectionInfo, CollectionKind, DocumentMeta, DocumentStore, EdgeDefinition,
    GraphDefinition, SqliteStore, StoreError,
};
