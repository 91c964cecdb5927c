//! Index label text codec
//!
//! All index labels of a sequence are stored in one header field. Each label
//! is percent-escaped byte by byte (UTF-8) so that only the unreserved set
//! `A-Z a-z 0-9 - _ . ~` appears literally, then the labels are joined with a
//! single space. A space inside a label therefore always shows up as `%20`.
//!
//! An empty label is written as the lone token `%`, which can never be produced
//! by escaping a non-empty label. This keeps `[]` and `[""]` apart.

use crate::error::{Result, SeqError};
use crate::frame::IndexLabel;
use crate::types::IndexType;
use std::borrow::Borrow;

/// Separator between escaped labels
pub const SEPARATOR: char = ' ';

const EMPTY_LABEL: &str = "%";

const HEX: &[u8; 16] = b"0123456789ABCDEF";

fn is_unreserved(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.' | b'~')
}

/// Escape one label
pub fn escape(label: &str) -> String {
    if label.is_empty() {
        return EMPTY_LABEL.to_string();
    }
    let mut out = String::with_capacity(label.len());
    for &byte in label.as_bytes() {
        if is_unreserved(byte) {
            out.push(byte as char);
        } else {
            out.push('%');
            out.push(HEX[(byte >> 4) as usize] as char);
            out.push(HEX[(byte & 0x0F) as usize] as char);
        }
    }
    out
}

fn hex_value(digit: u8) -> Option<u8> {
    match digit {
        b'0'..=b'9' => Some(digit - b'0'),
        b'a'..=b'f' => Some(digit - b'a' + 10),
        b'A'..=b'F' => Some(digit - b'A' + 10),
        _ => None,
    }
}

/// Undo [`escape`] for one token
pub fn unescape(token: &str) -> Result<String> {
    if token == EMPTY_LABEL {
        return Ok(String::new());
    }
    if token.is_empty() {
        return Err(SeqError::Format(format!(
            "empty token; empty labels are written as {:?}",
            EMPTY_LABEL
        )));
    }
    let bytes = token.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut pos = 0;
    while pos < bytes.len() {
        if bytes[pos] == b'%' {
            let high = bytes.get(pos + 1).copied().and_then(hex_value);
            let low = bytes.get(pos + 2).copied().and_then(hex_value);
            match (high, low) {
                (Some(high), Some(low)) => out.push(high << 4 | low),
                _ => {
                    return Err(SeqError::Format(format!(
                        "bad escape at byte {} of {:?}",
                        pos, token
                    )))
                }
            }
            pos += 3;
        } else {
            out.push(bytes[pos]);
            pos += 1;
        }
    }
    String::from_utf8(out)
        .map_err(|_| SeqError::Format(format!("{:?} does not unescape to UTF-8", token)))
}

/// Encode an ordered label list into one field value
pub fn encode<S: AsRef<str>>(labels: &[S]) -> String {
    labels
        .iter()
        .map(|label| escape(label.as_ref()))
        .collect::<Vec<_>>()
        .join(&SEPARATOR.to_string())
}

/// Decode a field value produced by [`encode`]
pub fn decode(text: &str) -> Result<Vec<String>> {
    if text.is_empty() {
        return Ok(Vec::new());
    }
    text.split(SEPARATOR).map(unescape).collect()
}

/// Encode typed labels; mixed lists are tagged as text
pub fn encode_labels<L: Borrow<IndexLabel>>(labels: &[L]) -> (IndexType, String) {
    let labels: Vec<&IndexLabel> = labels.iter().map(Borrow::borrow).collect();
    let index_type = IndexLabel::common_type(labels.iter().copied());
    let texts: Vec<String> = labels.iter().map(|label| label.to_string()).collect();
    (index_type, encode(&texts))
}

/// Decode a field value into typed labels
pub fn decode_labels(text: &str, index_type: IndexType) -> Result<Vec<IndexLabel>> {
    let texts = decode(text)?;
    match index_type {
        IndexType::Text => Ok(texts.into_iter().map(IndexLabel::Text).collect()),
        IndexType::Numeric => texts
            .into_iter()
            .map(|text| {
                text.trim()
                    .parse::<f64>()
                    .map(IndexLabel::Numeric)
                    .map_err(|_| SeqError::Format(format!("{:?} is not a numeric index", text)))
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_plain_labels_stay_readable() {
        assert_eq!(encode(&["0", "10", "25.5"]), "0 10 25.5");
        assert_eq!(encode(&["-1.5", "a_b~c"]), "-1.5 a_b~c");
    }

    #[test]
    fn test_reserved_characters_escaped() {
        assert_eq!(escape("a b"), "a%20b");
        assert_eq!(escape("100%"), "100%25");
        assert_eq!(escape("x\ny"), "x%0Ay");
        assert_eq!(escape("t=1:2"), "t%3D1%3A2");
        assert_eq!(escape("µ"), "%C2%B5");
    }

    #[test]
    fn test_separator_inside_labels() {
        let labels = vec!["first frame".to_string(), " ".to_string(), "%20".to_string()];
        let encoded = encode(&labels);
        assert_eq!(encoded.split(SEPARATOR).count(), 3);
        assert_eq!(decode(&encoded).unwrap(), labels);
    }

    #[test]
    fn test_empty_labels() {
        assert_eq!(encode::<&str>(&[]), "");
        assert_eq!(encode(&[""]), "%");
        assert_eq!(decode("").unwrap(), Vec::<String>::new());
        assert_eq!(decode("%").unwrap(), vec![String::new()]);
        assert_eq!(decode(&encode(&["", "a", ""])).unwrap(), vec!["", "a", ""]);
    }

    #[test]
    fn test_decode_accepts_lowercase_hex() {
        assert_eq!(decode("a%2fb").unwrap(), vec!["a/b"]);
    }

    #[test]
    fn test_malformed_escapes() {
        for bad in ["%2", "abc%", "%G0", "a%%b", "%FF", "a  b", " a", "a ", " "] {
            assert!(
                matches!(decode(bad), Err(SeqError::Format(_))),
                "{:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_typed_labels() {
        let labels = vec![
            IndexLabel::Numeric(0.0),
            IndexLabel::Numeric(10.0),
            IndexLabel::Numeric(25.5),
        ];
        let (index_type, text) = encode_labels(&labels);
        assert_eq!(index_type, IndexType::Numeric);
        assert_eq!(text, "0 10 25.5");
        assert_eq!(decode_labels(&text, index_type).unwrap(), labels);

        let mixed = vec![IndexLabel::Numeric(1.0), IndexLabel::from("pre op")];
        let (index_type, text) = encode_labels(&mixed);
        assert_eq!(index_type, IndexType::Text);
        assert_eq!(
            decode_labels(&text, index_type).unwrap(),
            vec![IndexLabel::from("1"), IndexLabel::from("pre op")]
        );
    }

    #[test]
    fn test_numeric_decode_rejects_text() {
        assert!(matches!(
            decode_labels("1 two", IndexType::Numeric),
            Err(SeqError::Format(_))
        ));
    }

    proptest! {
        #[test]
        fn prop_decode_inverts_encode(labels in prop::collection::vec(".*", 0..8)) {
            prop_assert_eq!(decode(&encode(&labels)).unwrap(), labels);
        }

        #[test]
        fn prop_numeric_labels_round_trip(values in prop::collection::vec(-1.0e12f64..1.0e12, 1..8)) {
            let labels: Vec<IndexLabel> = values.into_iter().map(IndexLabel::Numeric).collect();
            let (index_type, text) = encode_labels(&labels);
            prop_assert_eq!(decode_labels(&text, index_type).unwrap(), labels);
        }
    }
}
