use kef_http::{ClientConfig, KefHttpClient};
use serde_json::Value;

use crate::operation::{Access, KefOperation};
use crate::{ApiError, Result};

/// A client for executing KEF operations against actual speakers
///
/// This client bridges the stateless operation definitions and the network
/// round trips. It holds no per-speaker state, so a single client can drive
/// any number of speakers.
///
/// # Example
/// ```rust,no_run
/// use kef_api::KefClient;
/// use kef_api::operations::GetVolumeOperation;
///
/// let client = KefClient::new();
/// let volume = client.execute::<GetVolumeOperation>("192.168.1.50", &())?;
/// # Ok::<(), kef_api::ApiError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct KefClient {
    http_client: KefHttpClient,
}

impl KefClient {
    /// Create a new client with default timeouts
    pub fn new() -> Self {
        Self {
            http_client: KefHttpClient::new(),
        }
    }

    /// Create a client with custom timeouts
    pub fn with_config(config: ClientConfig) -> Self {
        Self {
            http_client: KefHttpClient::with_config(config),
        }
    }

    /// Create a client around an existing HTTP client (shares its pool)
    pub fn with_http_client(http_client: KefHttpClient) -> Self {
        Self { http_client }
    }

    /// Execute an operation against a speaker
    ///
    /// Reads go to `getData`; writes and activations go to `setData` with the
    /// value built by the operation.
    ///
    /// # Arguments
    /// * `host` - Speaker host name or IP, optionally with `:port`
    /// * `request` - The operation request data
    ///
    /// # Returns
    /// The parsed response data or an error
    pub fn execute<Op: KefOperation>(&self, host: &str, request: &Op::Request) -> Result<Op::Response> {
        let metadata = Op::metadata();
        tracing::debug!(host, path = metadata.path, access = ?metadata.access, "executing operation");

        let nodes = match Op::ACCESS.set_roles() {
            None => self.http_client.get_data(host, Op::PATH)?,
            Some(roles) => {
                let value = Op::build_value(request)?.ok_or_else(|| {
                    ApiError::InvalidParameter(format!("{} requires a value", Op::PATH))
                })?;

                let answer = self.http_client.set_data(host, Op::PATH, roles, &value)?;
                normalise_answer(answer)
            }
        };

        if Op::ACCESS == Access::Read {
            tracing::trace!(host, path = Op::PATH, nodes = nodes.len(), "read");
        }

        Op::parse_response(&nodes)
    }
}

/// `setData` answers vary between firmware versions; present them as a list
fn normalise_answer(answer: Value) -> Vec<Value> {
    match answer {
        Value::Array(nodes) => nodes,
        Value::Null => Vec::new(),
        other => vec![other],
    }
}
