//! Wire ⇄ editable conversion for Aura parameter values
//!
//! Decoding percent-decodes once and pretty-prints JSON with 4-space
//! indentation. Anything that is not JSON is shown as-is.
//!
//! Encoding minifies JSON (no whitespace between tokens), or compacts
//! plain text, then percent-encodes the result.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use serde_json::Value;

/// Indentation used for pretty-printed JSON
const INDENT: &[u8] = b"    ";

/// Bytes escaped on the wire: everything but ASCII alphanumerics, `_`,
/// `.`, `-` and `/`. `~` is escaped.
const WIRE_ESCAPE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'_')
    .remove(b'.')
    .remove(b'-')
    .remove(b'/');

/// The human-facing form of a parameter value
///
/// Both variants are expected outcomes of parsing, so a failed JSON parse
/// is a `Plain` value and not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum EditableValue {
    /// Text that parsed as a JSON document
    Json(Value),
    /// Anything else, kept verbatim
    Plain(String),
}

impl EditableValue {
    /// Classify text as JSON or plain
    pub fn parse(text: &str) -> Self {
        match serde_json::from_str::<Value>(text) {
            Ok(value) => Self::Json(value),
            Err(_) => Self::Plain(text.to_string()),
        }
    }

    pub fn is_json(&self) -> bool {
        matches!(self, Self::Json(_))
    }

    /// Multi-line form shown in the editor
    pub fn to_pretty(&self) -> String {
        match self {
            Self::Json(value) => pretty_json(value),
            Self::Plain(text) => text.clone(),
        }
    }

    /// Canonical form placed back on the wire (before percent-encoding)
    ///
    /// Plain text loses every `\n` and every ASCII space, including ones
    /// that were meaningful. Tabs and carriage returns are kept. Callers
    /// relying on whitespace inside non-JSON values will see it stripped.
    pub fn to_compact(&self) -> String {
        match self {
            Self::Json(value) => value.to_string(),
            Self::Plain(text) => text.chars().filter(|c| !matches!(c, '\n' | ' ')).collect(),
        }
    }
}

fn pretty_json(value: &Value) -> String {
    let mut out = Vec::new();
    let mut ser = Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(INDENT));
    if value.serialize(&mut ser).is_err() {
        return value.to_string();
    }
    String::from_utf8(out).unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}

/// Percent-decode a wire value once
///
/// Malformed escapes pass through literally and `+` stays a `+`.
/// Byte sequences that are not UTF-8 are replaced lossily.
pub fn percent_decode(wire: &str) -> String {
    percent_decode_str(wire).decode_utf8_lossy().into_owned()
}

/// Percent-encode text for the wire, escaping [`WIRE_ESCAPE`]
pub fn percent_encode(text: &str) -> String {
    utf8_percent_encode(text, WIRE_ESCAPE).to_string()
}

/// Editable text for an already percent-decoded value
pub fn to_editable(decoded: &str) -> String {
    EditableValue::parse(decoded).to_pretty()
}

/// Wire value → editable text
pub fn decode(wire: &str) -> String {
    to_editable(&percent_decode(wire))
}

/// Editable text → wire value
pub fn encode(text: &str) -> String {
    percent_encode(&EditableValue::parse(text).to_compact())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_pretty_prints_json() {
        assert_eq!(decode("%7B%22a%22%3A1%7D"), "{\n    \"a\": 1\n}");
    }

    #[test]
    fn test_encode_minifies_pretty_json() {
        let pretty = "{\n    \"a\": 1\n}";
        assert_eq!(EditableValue::parse(pretty).to_compact(), r#"{"a":1}"#);
        assert_eq!(encode(pretty), "%7B%22a%22%3A1%7D");
    }

    #[test]
    fn test_json_round_trip_is_structural() {
        let values = [
            json!({"actions": [{"id": "1;a", "descriptor": "serviceComponent://ui.force", "params": {"recordId": "001xx", "n": null}}]}),
            json!([1, 2.5, "three", true, {"nested": {"deep": []}}]),
            json!("just a string"),
            json!(42),
            json!({"unicode": "héllo wörld ✓", "spaces": "a b  c", "newline": "x\ny"}),
        ];

        for value in values {
            let pretty = EditableValue::Json(value.clone()).to_pretty();
            let wire = encode(&pretty);
            let back: Value = serde_json::from_str(&decode(&wire)).expect("decoded text is JSON");
            assert_eq!(back, value);
        }
    }

    #[test]
    fn test_integers_beyond_64_bits_survive() {
        let wire = "%7B%22n%22%3A123456789012345678901234567890%2C%22f%22%3A0.1000000000000000055511151231257827%7D";
        let pretty = decode(wire);
        assert!(pretty.contains("123456789012345678901234567890"));

        let original: Value = serde_json::from_str(&percent_decode(wire)).unwrap();
        let back: Value = serde_json::from_str(&percent_decode(&encode(&pretty))).unwrap();
        assert_eq!(back, original);
        assert_eq!(encode(&pretty), wire);
    }

    #[test]
    fn test_pretty_keeps_key_order() {
        let text = decode("%7B%22z%22%3A1%2C%22a%22%3A2%7D");
        assert!(text.find("\"z\"").unwrap() < text.find("\"a\"").unwrap());
    }

    #[test]
    fn test_plain_text_without_whitespace_round_trips() {
        for wire in ["hello_world", "abc%2Bdef", "%2Fs%2Fhome", "plain-text.value", "%7Bnot_json"] {
            let expected = percent_encode(&percent_decode(wire));
            assert_eq!(encode(&decode(wire)), expected);
        }
        assert_eq!(encode(&decode("hello_world")), "hello_world");
        assert_eq!(encode(&decode("abc%2Bdef")), "abc%2Bdef");
    }

    #[test]
    fn test_plain_text_spaces_and_newlines_are_stripped() {
        let editable = EditableValue::parse("a b\nc");
        assert!(!editable.is_json());
        assert_eq!(editable.to_compact(), "abc");
        assert_eq!(encode("a b\nc"), "abc");
    }

    #[test]
    fn test_plain_compaction_keeps_other_whitespace() {
        assert_eq!(EditableValue::parse("a\tb\r\nc d").to_compact(), "a\tb\rcd");
        assert_eq!(encode("a\tb"), "a%09b");
    }

    #[test]
    fn test_percent_decode_is_lenient() {
        assert_eq!(percent_decode("100%"), "100%");
        assert_eq!(percent_decode("%zz%41"), "%zzA");
        assert_eq!(percent_decode("a+b"), "a+b");
        assert_eq!(percent_decode("%C3%A9"), "é");
    }

    #[test]
    fn test_percent_encode_escapes_reserved() {
        assert_eq!(percent_encode("a b&c=d"), "a%20b%26c%3Dd");
        assert_eq!(percent_encode("/s/page"), "/s/page");
        assert_eq!(percent_encode("é"), "%C3%A9");
        assert_eq!(percent_encode("a-b_c.d~e"), "a-b_c.d%7Ee");
        assert_eq!(percent_encode("a+b:c"), "a%2Bb%3Ac");
    }

    #[test]
    fn test_invalid_json_is_plain() {
        let value = EditableValue::parse("{\"a\": ");
        assert_eq!(value, EditableValue::Plain("{\"a\": ".to_string()));
        assert_eq!(value.to_pretty(), "{\"a\": ");
    }
}
