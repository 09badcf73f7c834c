//! Typed leaf values
//!
//! The speaker wraps every scalar setting in an object that names its own
//! type: `{"type": "i32_", "i32_": 35}`. Reads take the first node of the
//! answer and pull the value out from under its tag; writes build the same
//! object and send it as the `value` query parameter.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::{ApiError, Result};

/// Type tag of a leaf value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LeafType {
    String,
    I16,
    I32,
    I64,
    Bool,
    SpeakerStatus,
    PhysicalSource,
    PlayMode,
}

impl LeafType {
    /// Wire name of the tag
    pub fn tag(&self) -> &'static str {
        match self {
            LeafType::String => "string_",
            LeafType::I16 => "i16_",
            LeafType::I32 => "i32_",
            LeafType::I64 => "i64_",
            LeafType::Bool => "bool_",
            LeafType::SpeakerStatus => "kefSpeakerStatus",
            LeafType::PhysicalSource => "kefPhysicalSource",
            LeafType::PlayMode => "playerPlayMode",
        }
    }
}

/// Build the `{"type": T, T: value}` object for a write
///
/// `"type"` is inserted first and stays first on the wire.
pub fn encode<T: Serialize>(leaf: LeafType, value: &T) -> Result<Value> {
    let value = serde_json::to_value(value)
        .map_err(|e| ApiError::InvalidParameter(format!("{}: {}", leaf.tag(), e)))?;

    let mut object = Map::new();
    object.insert("type".to_string(), Value::String(leaf.tag().to_string()));
    object.insert(leaf.tag().to_string(), value);
    Ok(Value::Object(object))
}

/// Extract the tagged value from the first node of a `getData` answer
///
/// A missing or `null` leaf yields `Ok(None)`. An empty node list and a leaf
/// that does not deserialize into `T` are parse errors.
pub fn extract<T: DeserializeOwned>(nodes: &[Value], leaf: LeafType) -> Result<Option<T>> {
    let first = first_node(nodes)?;

    match first.get(leaf.tag()) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value.clone())
            .map(Some)
            .map_err(|e| ApiError::ParseError(format!("{} leaf: {}", leaf.tag(), e))),
    }
}

/// First node of a `getData` answer
pub fn first_node(nodes: &[Value]) -> Result<&Value> {
    nodes
        .first()
        .ok_or_else(|| ApiError::ParseError("empty node list".to_string()))
}

/// A `bool_` leaf
///
/// Firmware versions disagree on whether booleans travel as JSON booleans or
/// as the strings `"true"`/`"True"`; both are accepted on read. Writes always
/// send a JSON boolean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "RawFlag")]
pub struct Flag(pub bool);

impl Flag {
    pub fn value(&self) -> bool {
        self.0
    }
}

impl From<bool> for Flag {
    fn from(value: bool) -> Self {
        Self(value)
    }
}

impl Serialize for Flag {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_bool(self.0)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawFlag {
    Bool(bool),
    Text(String),
}

impl TryFrom<RawFlag> for Flag {
    type Error = String;

    fn try_from(raw: RawFlag) -> std::result::Result<Self, Self::Error> {
        match raw {
            RawFlag::Bool(value) => Ok(Flag(value)),
            RawFlag::Text(text) => match text.to_ascii_lowercase().as_str() {
                "true" => Ok(Flag(true)),
                "false" => Ok(Flag(false)),
                _ => Err(format!("'{}' is not a boolean", text)),
            },
        }
    }
}
