//! Database permission lookup for the current user
//!
//! The server answers `GET /user/{username}/database/{dbName}` with
//! `{"result": "rw" | "ro" | "none"}`. Anything short of a clean answer is
//! treated as `none`, so a failed lookup never grants access.

use std::collections::HashMap;

use serde_json::Value;
use tracing::{debug, warn};

use crate::core::client::ArangoClient;
use crate::core::store::StoreError;

/// Access level of a user on one database
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Permission {
    /// Read and write ("rw")
    ReadWrite,
    /// Read only ("ro")
    ReadOnly,
    /// No access ("none")
    #[default]
    None,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::ReadWrite => "rw",
            Permission::ReadOnly => "ro",
            Permission::None => "none",
        }
    }

    /// Parse a role string; unknown roles map to `None`
    pub fn from_role(role: &str) -> Self {
        role.parse().unwrap_or(Permission::None)
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Permission {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rw" => Ok(Permission::ReadWrite),
            "ro" => Ok(Permission::ReadOnly),
            "none" => Ok(Permission::None),
            _ => Err(format!("Unknown permission: {}", s)),
        }
    }
}

/// Something that can answer the permission read for a user and database
pub trait PermissionSource {
    /// Fetch the raw response body of `GET /user/{username}/database/{database}`
    fn fetch(&self, username: &str, database: &str) -> Result<Value, StoreError>;
}

/// Permission source backed by the REST API of the current database
pub struct HttpPermissionSource {
    client: ArangoClient,
}

impl HttpPermissionSource {
    pub fn new(client: ArangoClient) -> Self {
        Self { client }
    }
}

impl PermissionSource for HttpPermissionSource {
    fn fetch(&self, username: &str, database: &str) -> Result<Value, StoreError> {
        Ok(self.client.get(&["user", username, "database", database])??)
    }
}

/// Request path used as the cache key for a lookup
pub fn permission_path(username: &str, database: &str) -> String {
    format!("/user/{}/database/{}", username, database)
}

/// Read the permission out of a response body's `result` field
fn permission_from_body(body: &Value) -> Option<Permission> {
    body.get("result")
        .and_then(Value::as_str)
        .map(Permission::from_role)
}

/// Look up the permission of `username` on `database`.
///
/// Failures and malformed answers resolve to `Permission::None`.
pub fn resolve_permission(
    source: &dyn PermissionSource,
    username: &str,
    database: &str,
) -> Permission {
    match source.fetch(username, database) {
        Ok(body) => permission_from_body(&body).unwrap_or_default(),
        Err(e) => {
            warn!(username, database, error = %e, "permission lookup failed");
            Permission::None
        }
    }
}

/// Admins hold "rw", and everyone is an admin when authentication is off
pub fn user_is_admin(permission: Permission, authentication_enabled: bool) -> bool {
    permission == Permission::ReadWrite || !authentication_enabled
}

/// Resolve the permission and decide whether the user is an admin
pub fn is_admin_user(
    source: &dyn PermissionSource,
    username: &str,
    database: &str,
    authentication_enabled: bool,
) -> bool {
    let permission = resolve_permission(source, username, database);
    user_is_admin(permission, authentication_enabled)
}

/// Memoizing wrapper around a permission source.
///
/// Successful lookups are cached per request path. Failed lookups are not,
/// so the next call asks the server again.
pub struct PermissionResolver<S: PermissionSource> {
    source: S,
    cache: HashMap<String, Permission>,
}

impl<S: PermissionSource> PermissionResolver<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            cache: HashMap::new(),
        }
    }

    pub fn permission(&mut self, username: &str, database: &str) -> Permission {
        let key = permission_path(username, database);
        if let Some(permission) = self.cache.get(&key) {
            return *permission;
        }

        match self.source.fetch(username, database) {
            Ok(body) => match permission_from_body(&body) {
                Some(permission) => {
                    debug!(path = %key, %permission, "permission resolved");
                    self.cache.insert(key, permission);
                    permission
                }
                None => {
                    warn!(path = %key, "permission response has no result field");
                    Permission::None
                }
            },
            Err(e) => {
                warn!(path = %key, error = %e, "permission lookup failed");
                Permission::None
            }
        }
    }

    pub fn is_admin(
        &mut self,
        username: &str,
        database: &str,
        authentication_enabled: bool,
    ) -> bool {
        user_is_admin(self.permission(username, database), authentication_enabled)
    }

    /// Forget all cached lookups
    pub fn invalidate(&mut self) {
        self.cache.clear();
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use crate::core::client::Auth;
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::thread;
    use std::time::Duration;

    /// Source that replays canned answers and counts calls
    struct Scripted {
        answers: RefCell<VecDeque<Result<Value, StoreError>>>,
        calls: Cell<usize>,
    }

    impl Scripted {
        fn new(answers: Vec<Result<Value, StoreError>>) -> Self {
            Self {
                answers: RefCell::new(answers.into()),
                calls: Cell::new(0),
            }
        }
    }

    impl PermissionSource for Scripted {
        fn fetch(&self, _username: &str, _database: &str) -> Result<Value, StoreError> {
            self.calls.set(self.calls.get() + 1);
            self.answers
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Err(StoreError::InvalidEndpoint("no answer".into())))
        }
    }

    fn server_down() -> StoreError {
        StoreError::Server {
            status: 503,
            code: 503,
            message: "service unavailable".into(),
        }
    }

    #[test]
    fn test_user_is_admin() {
        assert!(user_is_admin(Permission::ReadWrite, true));
        assert!(user_is_admin(Permission::ReadWrite, false));
        assert!(user_is_admin(Permission::ReadOnly, false));
        assert!(!user_is_admin(Permission::ReadOnly, true));
        assert!(!user_is_admin(Permission::None, true));
        assert!(user_is_admin(Permission::None, false));
    }

    #[test]
    fn test_permission_parsing() {
        assert_eq!("rw".parse::<Permission>().unwrap(), Permission::ReadWrite);
        assert_eq!("ro".parse::<Permission>().unwrap(), Permission::ReadOnly);
        assert_eq!("none".parse::<Permission>().unwrap(), Permission::None);
        assert!("admin".parse::<Permission>().is_err());
        assert_eq!(Permission::from_role("RW"), Permission::None);
        assert_eq!(Permission::default(), Permission::None);
        assert_eq!(Permission::ReadOnly.to_string(), "ro");
    }

    #[test]
    fn test_resolve_reads_result_field() {
        let source = Scripted::new(vec![Ok(json!({"error": false, "code": 200, "result": "rw"}))]);
        assert_eq!(
            resolve_permission(&source, "root", "_system"),
            Permission::ReadWrite
        );
    }

    #[test]
    fn test_resolve_degrades_to_none() {
        let source = Scripted::new(vec![
            Err(server_down()),
            Ok(json!({"code": 200})),
            Ok(json!({"result": "superuser"})),
        ]);
        assert_eq!(resolve_permission(&source, "u", "db"), Permission::None);
        assert_eq!(resolve_permission(&source, "u", "db"), Permission::None);
        assert_eq!(resolve_permission(&source, "u", "db"), Permission::None);
    }

    #[test]
    fn test_is_admin_user() {
        let source = Scripted::new(vec![Ok(json!({"result": "ro"})), Ok(json!({"result": "ro"}))]);
        assert!(!is_admin_user(&source, "u", "db", true));
        assert!(is_admin_user(&source, "u", "db", false));

        let failing = Scripted::new(vec![Err(server_down())]);
        assert!(is_admin_user(&failing, "u", "db", false));
    }

    #[test]
    fn test_resolver_caches_success() {
        let source = Scripted::new(vec![Ok(json!({"result": "rw"}))]);
        let mut resolver = PermissionResolver::new(source);

        assert_eq!(resolver.permission("root", "_system"), Permission::ReadWrite);
        assert_eq!(resolver.permission("root", "_system"), Permission::ReadWrite);
        assert_eq!(resolver.source().calls.get(), 1);

        resolver.invalidate();
        // Script is exhausted, so a refetch fails and degrades
        assert_eq!(resolver.permission("root", "_system"), Permission::None);
        assert_eq!(resolver.source().calls.get(), 2);
    }

    #[test]
    fn test_resolver_retries_after_failure() {
        let source = Scripted::new(vec![Err(server_down()), Ok(json!({"result": "ro"}))]);
        let mut resolver = PermissionResolver::new(source);

        assert_eq!(resolver.permission("jane", "shop"), Permission::None);
        assert_eq!(resolver.permission("jane", "shop"), Permission::ReadOnly);
        assert!(!resolver.is_admin("jane", "shop", true));
        assert_eq!(resolver.source().calls.get(), 2);
    }

    #[test]
    fn test_permission_path() {
        assert_eq!(
            permission_path("root", "_system"),
            "/user/root/database/_system"
        );
    }

    /// Answer one HTTP request with a canned response; the handle yields
    /// the request line that was received
    fn serve_once(status: &str, body: &str) -> (String, thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let endpoint = format!("http://{}", listener.local_addr().unwrap());
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );

        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();
            let mut header = String::new();
            while reader.read_line(&mut header).unwrap() > 2 {
                header.clear();
            }
            stream.write_all(response.as_bytes()).unwrap();
            stream.flush().unwrap();
            request_line.trim_end().to_string()
        });
        (endpoint, handle)
    }

    fn http_source(endpoint: &str) -> HttpPermissionSource {
        let auth = Auth::Basic {
            username: "root".into(),
            password: None,
        };
        let client =
            ArangoClient::new(endpoint, "_system", auth, Some(Duration::from_secs(5))).unwrap();
        HttpPermissionSource::new(client)
    }

    #[test]
    fn test_http_source_reads_result_field() {
        let (endpoint, server) = serve_once(
            "200 OK",
            r#"{"error":false,"code":200,"result":"rw"}"#,
        );
        let source = http_source(&endpoint);

        assert_eq!(
            resolve_permission(&source, "root", "_system"),
            Permission::ReadWrite
        );
        assert_eq!(
            server.join().unwrap(),
            "GET /_db/_system/_api/user/root/database/_system HTTP/1.1"
        );
    }

    #[test]
    fn test_http_source_error_status_is_server_error() {
        let (endpoint, server) = serve_once(
            "401 Unauthorized",
            r#"{"error":true,"code":401,"errorNum":11,"errorMessage":"not authorized to execute this request"}"#,
        );
        let source = http_source(&endpoint);

        match source.fetch("root", "_system") {
            Err(StoreError::Server {
                status,
                code,
                message,
            }) => {
                assert_eq!(status, 401);
                assert_eq!(code, 11);
                assert_eq!(message, "not authorized to execute this request");
            }
            other => panic!("expected server error, got {other:?}"),
        }
        server.join().unwrap();
    }

    #[test]
    fn test_http_error_status_resolves_to_none() {
        let (endpoint, server) = serve_once(
            "401 Unauthorized",
            r#"{"error":true,"code":401,"errorNum":11,"errorMessage":"not authorized to execute this request"}"#,
        );
        let source = http_source(&endpoint);

        assert_eq!(
            resolve_permission(&source, "root", "_system"),
            Permission::None
        );
        server.join().unwrap();
    }

    #[test]
    fn test_http_read_only_user_is_not_admin() {
        let (endpoint, server) = serve_once(
            "200 OK",
            r#"{"error":false,"code":200,"result":"ro"}"#,
        );
        let source = http_source(&endpoint);

        assert!(!is_admin_user(&source, "root", "_system", true));
        server.join().unwrap();
    }
}
