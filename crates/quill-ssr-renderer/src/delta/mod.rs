//! The Quill delta document model.
//!
//! A delta is an ordered list of [`Operation`]s. Each carries either text or a
//! single-kind embed, plus a free-form attribute map. Inputs arrive either as a
//! bare operation array or wrapped in an `{"ops": [...]}` container.

mod types;

pub use types::{
    Attributes, Embed, INLINE_SPOILERS_TEXT, Insert, InsertError, Operation, RENDER_AS_BLOCK,
    is_truthy, value_text,
};

use quill_ssr_common::SsrError;
use serde::Deserialize;
use serde_json::Value;

/// A delta as received from a client.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum DeltaInput {
    Delta { ops: Vec<Operation> },
    Ops(Vec<Operation>),
}

impl DeltaInput {
    /// Parse a delta from JSON text.
    pub fn from_json(json: &str) -> Result<Self, SsrError> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// Interpret an already-parsed JSON value as a delta.
    ///
    /// Anything other than an operation array or an object with an `ops` array is
    /// rejected as [`SsrError::InvalidInput`].
    pub fn from_value(value: Value) -> Result<Self, SsrError> {
        match value {
            Value::Array(_) => parse_ops(value).map(DeltaInput::Ops),
            Value::Object(mut map) => match map.remove("ops") {
                Some(ops @ Value::Array(_)) => parse_ops(ops).map(|ops| DeltaInput::Delta { ops }),
                Some(other) => Err(SsrError::InvalidInput(format!(
                    "`ops` must be an array, found {}",
                    json_kind(&other)
                ))),
                None => Err(SsrError::InvalidInput(
                    "object has no `ops` field".to_owned(),
                )),
            },
            other => Err(SsrError::InvalidInput(format!(
                "expected an array or object, found {}",
                json_kind(&other)
            ))),
        }
    }

    pub fn ops(&self) -> &[Operation] {
        match self {
            DeltaInput::Delta { ops } | DeltaInput::Ops(ops) => ops,
        }
    }
}

impl From<Vec<Operation>> for DeltaInput {
    fn from(ops: Vec<Operation>) -> Self {
        DeltaInput::Ops(ops)
    }
}

fn parse_ops(value: Value) -> Result<Vec<Operation>, SsrError> {
    serde_json::from_value(value).map_err(|e| SsrError::InvalidInput(e.to_string()))
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
    use serde_json::json;

    #[test]
    fn test_bare_array_and_container_are_equivalent() {
        let bare = DeltaInput::from_json(r#"[{"insert": "hi\n"}]"#).unwrap();
        let wrapped = DeltaInput::from_json(r#"{"ops": [{"insert": "hi\n"}]}"#).unwrap();
        assert_eq!(bare.ops(), wrapped.ops());
        assert_eq!(bare.ops().len(), 1);
    }

    #[test]
    fn test_empty_delta() {
        let input = DeltaInput::from_value(json!([])).unwrap();
        assert!(input.ops().is_empty());
    }

    #[test]
    fn test_wrong_shapes_are_invalid_input() {
        for value in [
            json!("text"),
            json!(12),
            json!({"insert": "x"}),
            json!({"ops": "x"}),
            json!([{"attributes": {}}]),
        ] {
            let err = DeltaInput::from_value(value.clone()).unwrap_err();
            assert!(
                matches!(err, SsrError::InvalidInput(_)),
                "{value} gave {err:?}"
            );
        }
    }

    #[test]
    fn test_malformed_json_is_serde_error() {
        let err = DeltaInput::from_json("[{").unwrap_err();
        assert!(matches!(err, SsrError::Serde(_)));
    }

    #[test]
    fn test_untagged_deserialize() {
        let input: DeltaInput = serde_json::from_value(json!({"ops": [{"insert": "a"}]})).unwrap();
        assert!(matches!(input, DeltaInput::Delta { .. }));
    }
}
