//! Tag spec grammar: one JSON object per invocation.
//!
//! The grammar is deliberately strict. Target-condition expressions use
//! a similar `key=value` shape but belong to a different grammar and
//! must never be accepted here.

use serde_json::{Map, Value};

use crate::error::{StageError, StageResult};

/// Validated mapping parsed from the user-supplied `--tags` string.
///
/// Key order from the source text is preserved through to rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct TagSpec {
    entries: Map<String, Value>,
}

impl TagSpec {
    /// Parse a raw tag string. The top-level JSON value must be an
    /// object; arrays, scalars, bare identifiers, and assignment-style
    /// input (`key='value'`) are all rejected. The error carries the
    /// raw input verbatim.
    pub fn parse(raw: &str) -> StageResult<Self> {
        let invalid = || StageError::TagFormat {
            raw: raw.to_string(),
        };

        let value: Value = serde_json::from_str(raw.trim()).map_err(|_| invalid())?;
        match value {
            Value::Object(entries) => Ok(Self { entries }),
            _ => Err(invalid()),
        }
    }

    pub fn entries(&self) -> &Map<String, Value> {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Canonical compact JSON rendering, keys in source order.
    pub fn render(&self) -> String {
        Value::Object(self.entries.clone()).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_a_flat_json_object() {
        let spec = TagSpec::parse(r#"{"environment":"dev","building":"9"}"#).unwrap();
        assert_eq!(spec.entries()["environment"], json!("dev"));
        assert_eq!(spec.entries()["building"], json!("9"));
    }

    #[test]
    fn parse_then_render_preserves_the_source() {
        let raw = r#"{"environment":"dev","building":"9"}"#;
        let spec = TagSpec::parse(raw).unwrap();
        assert_eq!(spec.render(), raw);
    }

    #[test]
    fn accepts_non_string_scalar_values() {
        let spec = TagSpec::parse(r#"{"floor": 9, "active": true}"#).unwrap();
        assert_eq!(spec.entries()["floor"], json!(9));
        assert_eq!(spec.entries()["active"], json!(true));
    }

    #[test]
    fn tolerates_surrounding_whitespace() {
        let spec = TagSpec::parse("  {\"a\":\"b\"}\n").unwrap();
        assert_eq!(spec.entries()["a"], json!("b"));
    }

    #[test]
    fn rejects_a_bare_identifier() {
        let err = TagSpec::parse("dev").unwrap_err();
        assert_eq!(err.to_string(), "Failed to add tag: 'dev' to device");
    }

    #[test]
    fn rejects_assignment_style_input() {
        let raw = "tags.environment='dev'";
        let err = TagSpec::parse(raw).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Failed to add tag: 'tags.environment='dev'' to device"
        );
    }

    #[test]
    fn rejects_a_json_array() {
        let err = TagSpec::parse(r#"["environment","dev"]"#).unwrap_err();
        assert!(matches!(err, StageError::TagFormat { .. }));
    }

    #[test]
    fn rejects_a_json_scalar() {
        for raw in [r#""dev""#, "42", "true", "null"] {
            let err = TagSpec::parse(raw).unwrap_err();
            assert!(matches!(err, StageError::TagFormat { .. }), "input: {raw}");
        }
    }

    #[test]
    fn rejects_malformed_json() {
        let err = TagSpec::parse("{\"environment\":").unwrap_err();
        assert!(matches!(err, StageError::TagFormat { .. }));
    }

    #[test]
    fn error_carries_the_unmodified_input() {
        let raw = "invalid_tag";
        let err = TagSpec::parse(raw).unwrap_err();
        match err {
            StageError::TagFormat { raw: carried } => assert_eq!(carried, raw),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
