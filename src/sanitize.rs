//! Removal of an extraneous key from a generated OpenAPI document.
//!
//! The generator emits `"ref":"<name>"` pairs that the documentation
//! renderer rejects. Two modes are offered:
//!
//! - [`SanitizeMode::Textual`] works on the raw text and leaves every byte
//!   outside the removed spans untouched. It does not parse JSON, so a string
//!   value that itself contains `"ref":"…"` would be stripped too.
//! - [`SanitizeMode::Structural`] parses the document with `serde_json`,
//!   deletes the key from every object, and re-serializes it with the
//!   original key order. Re-serialization is not byte-preserving beyond
//!   whitespace: string escapes are normalized (`\u00e9` becomes `é`, `\/`
//!   becomes `/`) and numbers are rewritten in serde_json's form (`1E2`
//!   becomes `100.0`).
//!
//! In textual mode a pair is removed in one of two shapes:
//!
//! ```text
//! {"ref":"abc","name":"x"}   leading: pair plus optional trailing comma
//! {"name":"x","ref":"abc"}   trailing: preceding comma plus pair
//! ```
//!
//! The leading pass runs first and only fires when the pair opens its
//! object; the trailing pass then removes whatever is left.

use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default name of the key stripped from generated documents.
pub const DEFAULT_FIELD: &str = "ref";

/// How the document is rewritten.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum SanitizeMode {
    /// Regular-expression removal on the raw text.
    #[default]
    Textual,
    /// Parse, remove the key at every object level, re-serialize.
    Structural,
}

impl std::fmt::Display for SanitizeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SanitizeMode::Textual => write!(f, "textual"),
            SanitizeMode::Structural => write!(f, "structural"),
        }
    }
}

/// Result of one sanitize run over a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sanitized {
    pub text: String,
    /// Pairs removed as the first key of their object.
    pub leading: usize,
    /// Pairs removed together with their preceding comma.
    pub trailing: usize,
}

impl Sanitized {
    pub fn removed(&self) -> usize {
        self.leading + self.trailing
    }
}

/// Compiled removal patterns for one key name.
#[derive(Debug, Clone)]
pub struct Sanitizer {
    field: String,
    leading: Regex,
    trailing: Regex,
}

impl Sanitizer {
    pub fn new(field: &str) -> Result<Self> {
        if field.is_empty() {
            anyhow::bail!("field name must not be empty");
        }
        // Value: a non-empty double-quoted string without inner quotes.
        let pair = format!(r#""{}"\s*:\s*"[^"]+""#, regex::escape(field));
        let leading = Regex::new(&format!(r"{}(?:\s*,)?", pair))
            .with_context(|| format!("Failed to compile pattern for field '{}'", field))?;
        let trailing = Regex::new(&format!(r",\s*{}", pair))
            .with_context(|| format!("Failed to compile pattern for field '{}'", field))?;

        Ok(Self {
            field: field.to_string(),
            leading,
            trailing,
        })
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn sanitize(&self, text: &str, mode: SanitizeMode) -> Result<Sanitized> {
        match mode {
            SanitizeMode::Textual => Ok(self.strip_text(text)),
            SanitizeMode::Structural => self.strip_structural(text),
        }
    }

    /// Textual removal: leading pass, then trailing pass.
    pub fn strip_text(&self, text: &str) -> Sanitized {
        let (after_leading, leading) = self.strip_leading(text);
        let (text, trailing) = self.strip_trailing(&after_leading);
        Sanitized {
            text,
            leading,
            trailing,
        }
    }

    fn strip_leading(&self, text: &str) -> (String, usize) {
        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        let mut removed = 0;

        for m in self.leading.find_iter(text) {
            out.push_str(&text[last..m.start()]);
            // A pair after a comma belongs to the trailing pass. Checking the
            // output rather than the input lets `{"ref":"a","ref":"b"}` drop
            // both pairs: once the first is gone the second opens the object.
            if out.trim_end().ends_with(',') {
                out.push_str(m.as_str());
            } else {
                removed += 1;
            }
            last = m.end();
        }
        out.push_str(&text[last..]);

        (out, removed)
    }

    fn strip_trailing(&self, text: &str) -> (String, usize) {
        let removed = self.trailing.find_iter(text).count();
        if removed == 0 {
            return (text.to_string(), 0);
        }
        (self.trailing.replace_all(text, "").into_owned(), removed)
    }

    /// Tree removal. Fails on text that is not valid JSON.
    ///
    /// Output is pretty-printed when the input spans several lines, compact
    /// otherwise, and keeps a trailing newline if the input had one. Removals
    /// are reported as `leading` since position is meaningless here.
    pub fn strip_structural(&self, text: &str) -> Result<Sanitized> {
        let mut value: Value =
            serde_json::from_str(text).with_context(|| "Failed to parse document as JSON")?;

        let removed = self.strip_value(&mut value);
        if removed == 0 {
            return Ok(Sanitized {
                text: text.to_string(),
                leading: 0,
                trailing: 0,
            });
        }

        let mut out = if text.trim_end().contains('\n') {
            serde_json::to_string_pretty(&value)?
        } else {
            serde_json::to_string(&value)?
        };
        if text.ends_with('\n') {
            out.push('\n');
        }

        Ok(Sanitized {
            text: out,
            leading: removed,
            trailing: 0,
        })
    }

    /// Remove the key from `value` and every nested object. Returns the
    /// number of keys removed.
    pub fn strip_value(&self, value: &mut Value) -> usize {
        match value {
            Value::Object(map) => {
                let mut removed = usize::from(map.shift_remove(&self.field).is_some());
                for child in map.values_mut() {
                    removed += self.strip_value(child);
                }
                removed
            }
            Value::Array(items) => items.iter_mut().map(|v| self.strip_value(v)).sum(),
            _ => 0,
        }
    }
}

/// Textual removal of the default `ref` field.
pub fn strip_ref_fields(text: &str) -> Result<String> {
    Ok(Sanitizer::new(DEFAULT_FIELD)?.strip_text(text).text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strip(text: &str) -> String {
        strip_ref_fields(text).unwrap()
    }

    #[test]
    fn test_no_ref_is_noop() {
        let text = r#"{"openapi":"3.1.0","info":{"title":"Ari CRM","version":"1.0"}}"#;
        assert_eq!(strip(text), text);
    }

    #[test]
    fn test_ref_first_key() {
        assert_eq!(strip(r#"{"ref":"abc","name":"x"}"#), r#"{"name":"x"}"#);
    }

    #[test]
    fn test_ref_non_first_key() {
        assert_eq!(strip(r#"{"name":"x","ref":"abc"}"#), r#"{"name":"x"}"#);
    }

    #[test]
    fn test_ref_only_key() {
        assert_eq!(strip(r#"{"ref":"abc"}"#), "{}");
    }

    #[test]
    fn test_ref_middle_key() {
        assert_eq!(strip(r#"{"a":1,"ref":"x","b":2}"#), r#"{"a":1,"b":2}"#);
    }

    #[test]
    fn test_repeated_ref_keys() {
        assert_eq!(strip(r#"{"ref":"a","ref":"b"}"#), "{}");
        assert_eq!(strip(r#"{"a":1,"ref":"b","ref":"c"}"#), r#"{"a":1}"#);
    }

    #[test]
    fn test_nested_objects() {
        let text = r#"{"components":{"schemas":{"Contact":{"ref":"Contact","type":"object","properties":{"id":{"type":"integer","ref":"id"}}}}}}"#;
        let expected = r#"{"components":{"schemas":{"Contact":{"type":"object","properties":{"id":{"type":"integer"}}}}}}"#;
        assert_eq!(strip(text), expected);
    }

    #[test]
    fn test_objects_in_array() {
        let text = r#"[{"ref":"a","n":1},{"n":2,"ref":"b"},{"ref":"c"}]"#;
        assert_eq!(strip(text), r#"[{"n":1},{"n":2},{}]"#);
    }

    #[test]
    fn test_similar_keys_survive() {
        let text = r##"{"refName":"abc","prefix":"abc","xref":"abc","$ref":"#/components/schemas/Contact"}"##;
        assert_eq!(strip(text), text);
    }

    #[test]
    fn test_empty_value_survives() {
        let text = r#"{"ref":"","name":"x"}"#;
        assert_eq!(strip(text), text);
    }

    #[test]
    fn test_non_string_value_survives() {
        let text = r#"{"ref":1,"name":"x"}"#;
        assert_eq!(strip(text), text);
    }

    #[test]
    fn test_pretty_printed() {
        let text = "{\n  \"ref\": \"abc\",\n  \"name\": \"x\"\n}";
        assert_eq!(strip(text), "{\n  \n  \"name\": \"x\"\n}");

        let text = "{\n  \"name\": \"x\",\n  \"ref\": \"abc\"\n}";
        assert_eq!(strip(text), "{\n  \"name\": \"x\"\n}");
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            r#"{"ref":"abc","name":"x"}"#,
            r#"{"name":"x","ref":"abc"}"#,
            r#"{"ref":"a","ref":"b"}"#,
            r#"[{"ref":"a","n":{"ref":"b","m":{"k":1,"ref":"c"}}}]"#,
        ];
        for input in inputs {
            let once = strip(input);
            assert_eq!(strip(&once), once, "not idempotent for {}", input);
        }
    }

    #[test]
    fn test_counts() {
        let sanitizer = Sanitizer::new("ref").unwrap();
        let result = sanitizer.strip_text(r#"[{"ref":"a","n":1},{"n":2,"ref":"b"},{"ref":"c"}]"#);
        assert_eq!(result.leading, 2);
        assert_eq!(result.trailing, 1);
        assert_eq!(result.removed(), 3);
    }

    #[test]
    fn test_custom_field_is_escaped() {
        let sanitizer = Sanitizer::new("x.id").unwrap();
        let text = r#"{"x.id":"1","xzid":"2"}"#;
        assert_eq!(sanitizer.strip_text(text).text, r#"{"xzid":"2"}"#);
    }

    #[test]
    fn test_empty_field_rejected() {
        assert!(Sanitizer::new("").is_err());
    }

    #[test]
    fn test_structural_removes_nested_and_keeps_order() {
        let sanitizer = Sanitizer::new("ref").unwrap();
        let text = r#"{"z":1,"ref":"top","a":{"ref":"inner","m":[{"ref":"deep","k":true}]}}"#;
        let result = sanitizer.strip_structural(text).unwrap();
        assert_eq!(result.text, r#"{"z":1,"a":{"m":[{"k":true}]}}"#);
        assert_eq!(result.removed(), 3);
    }

    #[test]
    fn test_structural_ignores_ref_inside_strings() {
        let sanitizer = Sanitizer::new("ref").unwrap();
        let text = r#"{"description":"use \"ref\":\"x\", here","ref":"y"}"#;
        let result = sanitizer.strip_structural(text).unwrap();
        assert_eq!(
            result.text,
            r#"{"description":"use \"ref\":\"x\", here"}"#
        );
    }

    #[test]
    fn test_structural_removes_non_string_values() {
        let sanitizer = Sanitizer::new("ref").unwrap();
        let result = sanitizer
            .strip_structural(r#"{"ref":{"nested":1},"a":1}"#)
            .unwrap();
        assert_eq!(result.text, r#"{"a":1}"#);
    }

    #[test]
    fn test_structural_pretty_and_newline_preserved() {
        let sanitizer = Sanitizer::new("ref").unwrap();
        let text = "{\n  \"ref\": \"x\",\n  \"a\": 1\n}\n";
        let result = sanitizer.strip_structural(text).unwrap();
        assert_eq!(result.text, "{\n  \"a\": 1\n}\n");
    }

    #[test]
    fn test_structural_untouched_when_clean() {
        let sanitizer = Sanitizer::new("ref").unwrap();
        let text = "{ \"a\" : 1 }";
        let result = sanitizer.strip_structural(text).unwrap();
        assert_eq!(result.text, text);
        assert_eq!(result.removed(), 0);
    }

    #[test]
    fn test_structural_rejects_invalid_json() {
        let sanitizer = Sanitizer::new("ref").unwrap();
        assert!(sanitizer.strip_structural(r#"{"ref":"x","#).is_err());
    }

    #[test]
    fn test_mode_display() {
        assert_eq!(SanitizeMode::Textual.to_string(), "textual");
        assert_eq!(SanitizeMode::Structural.to_string(), "structural");
    }

    #[test]
    fn test_structural_normalizes_escapes_and_numbers() {
        let sanitizer = Sanitizer::new("ref").unwrap();
        let text = r#"{"ref":"x","name":"caf\u00e9","path":"a\/b","n":1E2}"#;
        let result = sanitizer.strip_structural(text).unwrap();
        assert_eq!(result.text, r#"{"name":"café","path":"a/b","n":100.0}"#);
    }
}
