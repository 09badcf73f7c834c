//! Operation framework
//!
//! Every interaction with the speaker is one `KefOperation`: a node path, an
//! access mode, and a pair of typed request/response values. Operations are
//! stateless; [`crate::KefClient`] executes them against a host.

pub mod macros;

use kef_http::Roles;
use serde_json::Value;

use crate::error::ApiError;

/// How an operation reaches its node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Access {
    /// `getData` with `roles=value`
    Read,
    /// `setData` with `roles=value`
    Write,
    /// `setData` with `roles=activate`
    Activate,
}

impl Access {
    /// Roles sent with a `setData` request, `None` for reads
    pub fn set_roles(&self) -> Option<Roles> {
        match self {
            Access::Read => None,
            Access::Write => Some(Roles::Value),
            Access::Activate => Some(Roles::Activate),
        }
    }
}

/// Base trait for all KEF API operations
///
/// This trait defines the common interface that all speaker operations must
/// implement. It provides type safety through associated types and keeps
/// request building and response parsing next to the node path they belong to.
pub trait KefOperation {
    /// The request data for this operation, `()` for plain reads
    type Request;

    /// The response data for this operation
    type Response;

    /// Node path, e.g. `settings:/kef/play/physicalSource`
    const PATH: &'static str;

    /// Endpoint and roles used to reach the node
    const ACCESS: Access;

    /// Build the JSON object sent as the `value` query parameter
    ///
    /// # Returns
    /// `Ok(None)` for reads, the encoded value for writes and activations
    fn build_value(request: &Self::Request) -> Result<Option<Value>, ApiError>;

    /// Parse the node list the speaker answered with
    ///
    /// # Arguments
    /// * `nodes` - The JSON array from `getData`, or the `setData` answer
    ///   normalised to a list
    fn parse_response(nodes: &[Value]) -> Result<Self::Response, ApiError>;

    /// Metadata for logging and debugging
    fn metadata() -> OperationMetadata {
        OperationMetadata {
            path: Self::PATH,
            access: Self::ACCESS,
        }
    }
}

/// Metadata about an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationMetadata {
    pub path: &'static str,
    pub access: Access,
}
