//! Private HTTP client for the KEF speaker web API
//!
//! KEF's W2 platform speakers (LSX II, LS50 Wireless II, LS60) expose two
//! endpoints on port 80: `/api/getData` to read a settings node and
//! `/api/setData` to write one or to trigger a player action. Both are plain
//! `GET` requests whose parameters travel in the query string and whose
//! answers are JSON. This crate only knows about those two endpoints; the
//! meaning of individual nodes lives in `kef-api`.

mod error;

pub use error::HttpError;

use std::time::Duration;

use serde_json::Value;

/// Value of the `roles` query parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Roles {
    /// Read or write the value of a node
    Value,
    /// Trigger an action on a node (player controls)
    Activate,
}

impl Roles {
    pub fn as_str(&self) -> &'static str {
        match self {
            Roles::Value => "value",
            Roles::Activate => "activate",
        }
    }
}

/// Timeouts applied to every request made by a [`KefHttpClient`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientConfig {
    /// Time allowed to establish the TCP connection
    pub connect_timeout: Duration,
    /// Time allowed for the speaker to answer
    pub read_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            read_timeout: Duration::from_secs(10),
        }
    }
}

/// A minimal blocking client for the `getData` / `setData` endpoints
///
/// Cloning is cheap: clones share the same connection pool.
#[derive(Debug, Clone)]
pub struct KefHttpClient {
    agent: ureq::Agent,
}

impl KefHttpClient {
    /// Create a new client with default timeouts
    pub fn new() -> Self {
        Self::with_config(ClientConfig::default())
    }

    /// Create a client with the given connect and read timeouts
    pub fn with_timeouts(connect: Duration, read: Duration) -> Self {
        Self::with_config(ClientConfig {
            connect_timeout: connect,
            read_timeout: read,
        })
    }

    /// Create a client with custom timeouts
    pub fn with_config(config: ClientConfig) -> Self {
        Self {
            agent: ureq::AgentBuilder::new()
                .timeout_connect(config.connect_timeout)
                .timeout_read(config.read_timeout)
                .build(),
        }
    }

    /// Read a settings node
    ///
    /// Issues `GET http://<host>/api/getData?path=<path>&roles=value` and
    /// returns the JSON array the speaker answers with.
    ///
    /// # Arguments
    /// * `host` - Speaker host name or IP, optionally with `:port`
    /// * `path` - Node path, e.g. `settings:/deviceName`
    pub fn get_data(&self, host: &str, path: &str) -> Result<Vec<Value>, HttpError> {
        let url = get_data_url(host);
        tracing::debug!(%url, path, "getData");

        let response = self
            .agent
            .get(&url)
            .query("path", path)
            .query("roles", Roles::Value.as_str())
            .call()?;

        let body = response
            .into_string()
            .map_err(|e| HttpError::Network(e.to_string()))?;

        parse_node_list(&body)
    }

    /// Write a settings node or activate a player action
    ///
    /// Issues `GET http://<host>/api/setData?path=<path>&roles=<roles>&value=<json>`
    /// where `value` is the compact JSON encoding of `value`.
    ///
    /// # Returns
    /// Whatever JSON the speaker answered with, `Value::Null` for an empty body
    pub fn set_data(
        &self,
        host: &str,
        path: &str,
        roles: Roles,
        value: &Value,
    ) -> Result<Value, HttpError> {
        let url = set_data_url(host);
        let encoded = value.to_string();
        tracing::debug!(%url, path, roles = roles.as_str(), value = %encoded, "setData");

        let response = self
            .agent
            .get(&url)
            .query("path", path)
            .query("roles", roles.as_str())
            .query("value", &encoded)
            .call()?;

        let body = response
            .into_string()
            .map_err(|e| HttpError::Network(e.to_string()))?;

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&body).map_err(|e| HttpError::Parse(e.to_string()))
    }
}

impl Default for KefHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

fn get_data_url(host: &str) -> String {
    format!("http://{}/api/getData", host)
}

fn set_data_url(host: &str) -> String {
    format!("http://{}/api/setData", host)
}

/// Parse a `getData` body, which must be a JSON array of node objects
fn parse_node_list(body: &str) -> Result<Vec<Value>, HttpError> {
    match serde_json::from_str(body) {
        Ok(Value::Array(nodes)) => Ok(nodes),
        Ok(other) => Err(HttpError::Parse(format!(
            "expected a JSON array, got {}",
            json_kind(&other)
        ))),
        Err(e) => Err(HttpError::Parse(e.to_string())),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let _client = KefHttpClient::new();
        let _default_client = KefHttpClient::default();
        let _custom = KefHttpClient::with_config(ClientConfig {
            connect_timeout: Duration::from_millis(200),
            read_timeout: Duration::from_millis(500),
        });
    }

    #[test]
    fn test_with_timeouts_fails_fast_on_unreachable_host() {
        let client =
            KefHttpClient::with_timeouts(Duration::from_millis(200), Duration::from_millis(200));
        let result = client.get_data("127.0.0.1:1", "settings:/deviceName");
        assert!(matches!(result, Err(HttpError::Network(_))));
    }

    #[test]
    fn test_endpoint_urls() {
        assert_eq!(get_data_url("192.168.1.50"), "http://192.168.1.50/api/getData");
        assert_eq!(set_data_url("kef.local:8080"), "http://kef.local:8080/api/setData");
    }

    #[test]
    fn test_roles_strings() {
        assert_eq!(Roles::Value.as_str(), "value");
        assert_eq!(Roles::Activate.as_str(), "activate");
    }

    #[test]
    fn test_parse_node_list() {
        let nodes = parse_node_list(r#"[{"type":"i32_","i32_":42}]"#).unwrap();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0]["i32_"], 42);

        assert!(parse_node_list("[]").unwrap().is_empty());
    }

    #[test]
    fn test_parse_node_list_rejects_objects() {
        match parse_node_list(r#"{"error":"no such path"}"#) {
            Err(HttpError::Parse(msg)) => assert!(msg.contains("an object")),
            other => panic!("Expected HttpError::Parse, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_node_list_rejects_garbage() {
        assert!(matches!(parse_node_list("<html>"), Err(HttpError::Parse(_))));
    }
}
