//! Blocking HTTP client for the ArangoDB REST API
//!
//! Every request is scoped to one database: paths are resolved below
//! `{endpoint}/_db/{database}/_api/`. Path segments are percent-encoded, so
//! user and collection names can be passed through as-is.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::{Method, StatusCode, Url};
use serde_json::Value;
use tracing::{debug, trace};

use crate::core::store::StoreError;

/// How requests authenticate against the server
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Auth {
    /// Authentication disabled on the server
    #[default]
    None,
    /// HTTP basic auth
    Basic {
        username: String,
        password: Option<String>,
    },
    /// JWT bearer token
    Bearer(String),
}

/// Server error payload (`{"error": true, "errorNum": ..., "errorMessage": ...}`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: u16,
    pub code: i64,
    pub message: String,
}

impl ApiError {
    fn from_body(status: StatusCode, body: &Value) -> Self {
        Self {
            status: status.as_u16(),
            code: body.get("errorNum").and_then(Value::as_i64).unwrap_or(0),
            message: body
                .get("errorMessage")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("request failed")
                        .to_string()
                }),
        }
    }
}

impl From<ApiError> for StoreError {
    fn from(err: ApiError) -> Self {
        StoreError::Server {
            status: err.status,
            code: err.code,
            message: err.message,
        }
    }
}

/// Outcome of a request that reached the server
pub type ApiResult = Result<Value, ApiError>;

/// Client bound to one endpoint and database
#[derive(Debug, Clone)]
pub struct ArangoClient {
    http: Client,
    endpoint: Url,
    database: String,
    auth: Auth,
}

impl ArangoClient {
    /// Create a client; `endpoint` is the server root, e.g. `http://localhost:8529`
    pub fn new(
        endpoint: &str,
        database: &str,
        auth: Auth,
        timeout: Option<Duration>,
    ) -> Result<Self, StoreError> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| StoreError::InvalidEndpoint(format!("{}: {}", endpoint, e)))?;
        if endpoint.cannot_be_a_base() {
            return Err(StoreError::InvalidEndpoint(endpoint.to_string()));
        }

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        Ok(Self {
            http,
            endpoint,
            database: database.to_string(),
            auth,
        })
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Build the URL for an API path given as segments below `_api/`
    pub fn api_url(&self, segments: &[&str]) -> Result<Url, StoreError> {
        let mut url = self.endpoint.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| StoreError::InvalidEndpoint(self.endpoint.to_string()))?;
            path.pop_if_empty();
            path.push("_db");
            path.push(&self.database);
            path.push("_api");
            path.extend(segments);
        }
        Ok(url)
    }

    /// Send a request and decode the JSON response body.
    ///
    /// Transport failures are `Err(StoreError)`; HTTP error statuses come back
    /// as `Ok(Err(ApiError))` so callers can map them to precise store errors.
    pub fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<&Value>,
    ) -> Result<ApiResult, StoreError> {
        debug!(%method, %url, "arangodb request");

        let mut request = self.http.request(method, url);
        request = match &self.auth {
            Auth::None => request,
            Auth::Basic { username, password } => request.basic_auth(username, password.as_ref()),
            Auth::Bearer(token) => request.bearer_auth(token),
        };
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send()?;
        let status = response.status();
        let text = response.text()?;
        trace!(status = status.as_u16(), body = %text, "arangodb response");

        let value: Value = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };

        if status.is_success() {
            Ok(Ok(value))
        } else {
            Ok(Err(ApiError::from_body(status, &value)))
        }
    }

    pub fn get(&self, segments: &[&str]) -> Result<ApiResult, StoreError> {
        let url = self.api_url(segments)?;
        self.send(Method::GET, url, None)
    }

    pub fn post(&self, segments: &[&str], body: &Value) -> Result<ApiResult, StoreError> {
        let url = self.api_url(segments)?;
        self.send(Method::POST, url, Some(body))
    }

    pub fn put(&self, segments: &[&str], body: &Value) -> Result<ApiResult, StoreError> {
        let url = self.api_url(segments)?;
        self.send(Method::PUT, url, Some(body))
    }

    pub fn delete(&self, segments: &[&str]) -> Result<ApiResult, StoreError> {
        let url = self.api_url(segments)?;
        self.send(Method::DELETE, url, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client(endpoint: &str, database: &str) -> ArangoClient {
        ArangoClient::new(endpoint, database, Auth::None, None).unwrap()
    }

    #[test]
    fn test_api_url_scoped_to_database() {
        let c = client("http://localhost:8529", "_system");
        let url = c.api_url(&["collection", "users"]).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8529/_db/_system/_api/collection/users"
        );
    }

    #[test]
    fn test_api_url_trailing_slash_and_encoding() {
        let c = client("https://db.example.com:8530/", "my db");
        let url = c
            .api_url(&["user", "jane doe", "database", "my db"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://db.example.com:8530/_db/my%20db/_api/user/jane%20doe/database/my%20db"
        );
    }

    #[test]
    fn test_invalid_endpoint() {
        let err = ArangoClient::new("not a url", "_system", Auth::None, None).unwrap_err();
        assert!(matches!(err, StoreError::InvalidEndpoint(_)));

        let err = ArangoClient::new("mailto:root@example.com", "_system", Auth::None, None)
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidEndpoint(_)));
    }

    #[test]
    fn test_api_error_from_body() {
        let body = json!({"error": true, "errorNum": 1203, "errorMessage": "collection or view not found"});
        let err = ApiError::from_body(StatusCode::NOT_FOUND, &body);
        assert_eq!(err.status, 404);
        assert_eq!(err.code, 1203);
        assert_eq!(err.message, "collection or view not found");

        let err = ApiError::from_body(StatusCode::UNAUTHORIZED, &Value::Null);
        assert_eq!(err.code, 0);
        assert_eq!(err.message, "Unauthorized");
    }
}
