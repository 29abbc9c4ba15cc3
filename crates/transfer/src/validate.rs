//! Rule validation against the embedded user-parameters schema.
//!
//! Mirrors the action's documented configuration contract: an array of rule
//! objects, each naming `roleArn`, `bucket`, and at least one `src` entry of
//! the form `artifact::glob`. Every violation is collected and reported in
//! one aggregated error; `prefix` and `cwd` defaults are applied during
//! typed deserialization.

use jsonschema::Draft;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::attribute::AttributeMapping;
use crate::error::TransferError;

/// One validated transfer rule.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    /// Role granting write access to the destination bucket.
    pub role_arn: AttributeMapping,
    /// Destination bucket.
    pub bucket: AttributeMapping,
    /// Key prefix applied to every uploaded file.
    #[serde(default = "default_prefix")]
    pub prefix: String,
    /// Working directory inside source artifacts that globs match under.
    #[serde(default)]
    pub cwd: String,
    /// `artifact::glob` source entries.
    pub src: Vec<String>,
}

/// Default key prefix.
fn default_prefix() -> String {
    "/".to_string()
}

/// Schema for a value that is either a literal or an artifact reference.
fn attribute_schema() -> Value {
    json!({
        "oneOf": [
            { "type": "string" },
            {
                "type": "object",
                "required": ["Fn::GetParam"],
                "properties": {
                    "Fn::GetParam": {
                        "type": "array",
                        "prefixItems": [
                            { "type": "string" },
                            { "type": "string" },
                            { "type": "string" }
                        ],
                        "minItems": 3,
                        "maxItems": 3
                    }
                }
            }
        ]
    })
}

/// The full user-parameters schema.
fn rules_schema() -> Value {
    json!({
        "type": "array",
        "minItems": 1,
        "uniqueItems": true,
        "items": {
            "type": "object",
            "required": ["roleArn", "bucket", "src"],
            "properties": {
                "roleArn": attribute_schema(),
                "bucket": attribute_schema(),
                "prefix": { "type": "string", "default": "/" },
                "cwd": { "type": "string", "default": "" },
                "src": {
                    "type": "array",
                    "minItems": 1,
                    "uniqueItems": true,
                    "items": { "type": "string", "pattern": "^.+::.+$" }
                }
            }
        }
    })
}

/// Validate raw rule configuration and produce typed rules with defaults.
///
/// # Errors
/// `Validation` carrying every collected schema violation, joined.
pub fn validate(parameters: &Value) -> Result<Vec<Rule>, TransferError> {
    let validator = jsonschema::options()
        .with_draft(Draft::Draft202012)
        .build(&rules_schema())
        .map_err(|err| TransferError::Validation {
            messages: format!("invalid schema: {err}"),
        })?;

    let messages: Vec<String> = validator
        .iter_errors(parameters)
        .map(|err| format!("Schema {err}"))
        .collect();
    if !messages.is_empty() {
        return Err(TransferError::Validation {
            messages: messages.join(". "),
        });
    }

    serde_json::from_value(parameters.clone()).map_err(|err| TransferError::Validation {
        messages: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_rules_with_defaults() {
        let params: Value = json!([
            {
                "roleArn": "arn:aws:iam::111:role/X",
                "bucket": "dest-bucket",
                "src": ["BuildOutput::**/*.js"]
            }
        ]);
        let rules: Vec<Rule> = validate(&params).unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].prefix, "/");
        assert_eq!(rules[0].cwd, "");
        assert_eq!(rules[0].src, vec!["BuildOutput::**/*.js"]);
    }

    #[test]
    fn test_reference_mappings_accepted() {
        let params: Value = json!([
            {
                "roleArn": { "Fn::GetParam": ["DeployOutput", "Outputs.json", "Role"] },
                "bucket": { "Fn::GetParam": ["DeployOutput", "Outputs.json", "Bucket"] },
                "prefix": "/images",
                "cwd": "dist",
                "src": ["BuildOutput::**/*.png"]
            }
        ]);
        let rules: Vec<Rule> = validate(&params).unwrap();
        assert!(matches!(rules[0].role_arn, AttributeMapping::Reference { .. }));
        assert!(matches!(rules[0].bucket, AttributeMapping::Reference { .. }));
        assert_eq!(rules[0].prefix, "/images");
        assert_eq!(rules[0].cwd, "dist");
    }

    #[test]
    fn test_missing_required_keys_rejected() {
        let params: Value = json!([{ "bucket": "b", "src": ["A::*"] }]);
        let err: TransferError = validate(&params).unwrap_err();
        match err {
            TransferError::Validation { messages } => {
                assert!(messages.contains("roleArn"), "{messages}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_empty_rule_list_rejected() {
        let err: TransferError = validate(&json!([])).unwrap_err();
        assert!(matches!(err, TransferError::Validation { .. }));
    }

    #[test]
    fn test_non_array_rejected() {
        let err: TransferError = validate(&json!({ "roleArn": "r" })).unwrap_err();
        assert!(matches!(err, TransferError::Validation { .. }));
    }

    #[test]
    fn test_malformed_src_entry_rejected() {
        let params: Value = json!([
            {
                "roleArn": "r",
                "bucket": "b",
                "src": ["no-delimiter"]
            }
        ]);
        let err: TransferError = validate(&params).unwrap_err();
        assert!(matches!(err, TransferError::Validation { .. }));
    }

    #[test]
    fn test_empty_src_rejected() {
        let params: Value = json!([{ "roleArn": "r", "bucket": "b", "src": [] }]);
        let err: TransferError = validate(&params).unwrap_err();
        assert!(matches!(err, TransferError::Validation { .. }));
    }

    #[test]
    fn test_violations_aggregate() {
        let params: Value = json!([
            { "bucket": "b", "src": ["ok::*"] },
            { "roleArn": "r", "src": ["no-delimiter"] }
        ]);
        match validate(&params).unwrap_err() {
            TransferError::Validation { messages } => {
                // Both rules contribute violations to the same message.
                assert!(messages.contains("roleArn"), "{messages}");
                assert!(messages.contains("bucket"), "{messages}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
