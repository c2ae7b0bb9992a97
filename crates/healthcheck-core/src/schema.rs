//! Provider replies checked against the declared report schema.

use std::sync::OnceLock;

use jsonschema::JSONSchema;
use serde_json::Value;
use thiserror::Error;

use crate::report::report_schema;

/// First failing location in a reply, e.g. `$.kpiAnalyses[1].score`.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{path}: {reason}")]
pub struct SchemaViolation {
    pub path: String,
    pub reason: String,
}

/// Check `value` against an arbitrary schema, compiled for this call only.
pub fn validate(schema: &Value, value: &Value) -> Result<(), SchemaViolation> {
    let compiled = compile(schema)?;
    check(&compiled, value)
}

/// Check `value` against [`report_schema`], compiled once per process.
pub fn validate_report(value: &Value) -> Result<(), SchemaViolation> {
    static COMPILED: OnceLock<Result<JSONSchema, SchemaViolation>> = OnceLock::new();
    match COMPILED.get_or_init(|| compile(report_schema())) {
        Ok(compiled) => check(compiled, value),
        Err(e) => Err(e.clone()),
    }
}

// An uncompilable schema rejects everything.
fn compile(schema: &Value) -> Result<JSONSchema, SchemaViolation> {
    JSONSchema::compile(schema).map_err(|e| SchemaViolation {
        path: "$".to_string(),
        reason: format!("unusable schema: {e}"),
    })
}

fn check(compiled: &JSONSchema, value: &Value) -> Result<(), SchemaViolation> {
    let Err(mut errors) = compiled.validate(value) else {
        return Ok(());
    };
    match errors.next() {
        Some(e) => Err(SchemaViolation {
            path: dotted_path(&e.instance_path.to_string()),
            reason: e.to_string(),
        }),
        None => Ok(()),
    }
}

/// `/rows/1/n` → `$.rows[1].n`
fn dotted_path(pointer: &str) -> String {
    let mut path = String::from("$");
    for segment in pointer.split('/').filter(|s| !s.is_empty()) {
        let segment = segment.replace("~1", "/").replace("~0", "~");
        if segment.parse::<usize>().is_ok() {
            path.push('[');
            path.push_str(&segment);
            path.push(']');
        } else {
            path.push('.');
            path.push_str(&segment);
        }
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn integer_rejects_fractions() {
        let schema = json!({"type": "integer"});
        assert!(validate(&schema, &json!(3)).is_ok());
        let err = validate(&schema, &json!(3.5)).unwrap_err();
        assert_eq!(err.path, "$");
        assert!(err.reason.contains("integer"));
    }

    #[test]
    fn type_arrays_allow_any_listed_type() {
        let schema = json!({"type": ["string", "null"]});
        assert!(validate(&schema, &json!(null)).is_ok());
        assert!(validate(&schema, &json!("x")).is_ok());
        assert!(validate(&schema, &json!(1)).is_err());
    }

    #[test]
    fn reports_nested_paths() {
        let schema = json!({
            "type": "object",
            "required": ["rows"],
            "properties": {
                "rows": {"type": "array", "items": {"type": "object", "required": ["n"],
                    "properties": {"n": {"type": "integer", "maximum": 5}}}}
            }
        });
        let err = validate(&schema, &json!({"rows": [{"n": 1}, {"n": 9}]})).unwrap_err();
        assert_eq!(err.path, "$.rows[1].n");

        let err = validate(&schema, &json!({})).unwrap_err();
        assert_eq!(err.path, "$");
        assert!(err.reason.contains("rows"));
    }

    #[test]
    fn array_length_bounds() {
        let schema = json!({"type": "array", "minItems": 2, "maxItems": 2});
        assert!(validate(&schema, &json!([1, 2])).is_ok());
        assert!(validate(&schema, &json!([1])).is_err());
        assert!(validate(&schema, &json!([1, 2, 3])).is_err());
    }

    #[test]
    fn string_and_object_keywords_are_enforced() {
        let schema = json!({
            "type": "object",
            "additionalProperties": false,
            "properties": {"a": {"type": "string", "pattern": "^x", "minLength": 3}}
        });
        assert!(validate(&schema, &json!({"a": "xyz"})).is_ok());
        assert_eq!(validate(&schema, &json!({"a": "y"})).unwrap_err().path, "$.a");
        assert!(validate(&schema, &json!({"a": "xyz", "zzz": 1})).is_err());
    }

    #[test]
    fn local_refs_are_followed() {
        let schema = json!({
            "definitions": {"Count": {"type": "integer"}},
            "$ref": "#/definitions/Count"
        });
        assert!(validate(&schema, &json!(4)).is_ok());
        assert!(validate(&schema, &json!("not an integer")).is_err());
    }

    #[test]
    fn unusable_schema_rejects_everything() {
        let err = validate(&json!({"type": 12}), &json!(1)).unwrap_err();
        assert!(err.reason.starts_with("unusable schema"));
    }

    #[test]
    fn boolean_schema_accepts_anything() {
        assert!(validate(&json!(true), &json!({"a": [1, "b"]})).is_ok());
    }

    #[test]
    fn pointer_segments_become_dotted() {
        assert_eq!(dotted_path(""), "$");
        assert_eq!(dotted_path("/kpiAnalyses/1/score"), "$.kpiAnalyses[1].score");
        assert_eq!(dotted_path("/a~1b/c~0d"), "$.a/b.c~d");
    }
}
