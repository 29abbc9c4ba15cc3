//! Deferred configuration values.
//!
//! A rule's `roleArn` and `bucket` are either literal strings or references
//! into a JSON file inside a not-yet-materialized artifact. The shape is
//! classified once at deserialization; resolution happens on demand and may
//! trigger artifact materialization.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;

use crate::artifact::ArtifactMap;
use crate::error::TransferError;

/// Classification of an attribute mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    /// A hardcoded literal value.
    Static,
    /// A value resolved from inside an input artifact.
    Remote,
}

/// The raw mapping for one attribute, classified by shape.
///
/// A plain string is a literal. An object carrying `Fn::GetParam` with
/// `[artifactName, filename, jsonKey]` is a reference. Any other object is
/// carried as-is so the unsupported-reference error surfaces at resolution
/// time rather than at parse time.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AttributeMapping {
    /// Literal string value.
    Literal(String),
    /// Reference into a JSON file inside an artifact.
    Reference {
        /// `[artifactName, filename, jsonKey]`.
        #[serde(rename = "Fn::GetParam")]
        get_param: (String, String, String),
    },
    /// Object without the recognized reference key.
    Unrecognized(serde_json::Map<String, Value>),
}

/// Resolves one attribute defined in the rule configuration.
#[derive(Clone)]
pub struct Attribute {
    /// The classified mapping.
    mapping: AttributeMapping,
    /// Artifact map a remote value could be found inside.
    artifacts: Arc<ArtifactMap>,
}

impl Attribute {
    /// Create an attribute over the shared artifact map.
    pub fn new(mapping: AttributeMapping, artifacts: Arc<ArtifactMap>) -> Self {
        Self { mapping, artifacts }
    }

    /// Classification of the underlying mapping. Pure; fixed at construction.
    pub fn kind(&self) -> AttributeKind {
        match self.mapping {
            AttributeMapping::Literal(_) => AttributeKind::Static,
            _ => AttributeKind::Remote,
        }
    }

    /// Resolve the attribute's value.
    ///
    /// Literals return immediately. References await the named artifact's
    /// materialization, then read the key out of the JSON file; the first
    /// caller to need a given artifact pays its materialization cost.
    ///
    /// # Errors
    /// `UnsupportedReference` for unrecognized mapping objects,
    /// `ArtifactNotFound` for references to unknown artifacts, `NullValue`
    /// when the resolved value is null or empty, plus any materialization
    /// or read failure from the artifact itself.
    pub async fn value(&self) -> Result<Value, TransferError> {
        match &self.mapping {
            AttributeMapping::Literal(value) => Ok(Value::String(value.clone())),
            AttributeMapping::Reference {
                get_param: (artifact_name, filename, key),
            } => self.fetch(artifact_name, filename, key).await,
            AttributeMapping::Unrecognized(map) => Err(TransferError::UnsupportedReference {
                keys: map.keys().cloned().collect::<Vec<String>>().join(", "),
            }),
        }
    }

    /// Resolve a reference through its artifact.
    async fn fetch(
        &self,
        artifact_name: &str,
        filename: &str,
        key: &str,
    ) -> Result<Value, TransferError> {
        let artifact = self
            .artifacts
            .get(artifact_name)
            .ok_or_else(|| TransferError::ArtifactNotFound {
                name: artifact_name.to_string(),
            })?;
        artifact.ready().await?;
        let value: Value = artifact.attribute(filename, key).await?;
        if is_falsy(&value) {
            return Err(TransferError::NullValue {
                path: format!("{artifact_name}::{filename}::{key}"),
            });
        }
        Ok(value)
    }
}

/// Null, false, zero, and the empty string all count as "absent".
///
/// Deliberately coarse: existing rule configurations rely on this check to
/// reject unset template outputs, which surface as empty strings.
fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::String(s) => s.is_empty(),
        Value::Number(n) => n.as_f64() == Some(0.0),
        _ => false,
    }
}

/// Render a resolved attribute value as a plain string.
///
/// String values pass through unquoted; anything else uses its JSON form.
pub(crate) fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
