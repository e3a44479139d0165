//! # Canonical Serialization — JCS Byte Production
//!
//! This module defines [`CanonicalBytes`], the sole construction path for bytes
//! used in digest computation and proof signing across trustkit.
//!
//! ## Security Invariant
//!
//! The inner buffer is private. Any function that hashes or signs a document
//! accepts `&CanonicalBytes`, and the only way to produce one is through the
//! RFC 8785 (JSON Canonicalization Scheme) pipeline below. Signing a document
//! through one serialization path and verifying it through another is
//! therefore impossible to express.
//!
//! ## Canonical Form
//!
//! - Object keys are sorted at every nesting level.
//! - Arrays keep their element order.
//! - Separators are compact; no insignificant whitespace is emitted.
//! - Numbers use the ECMAScript shortest round-trip form.
//!
//! Canonicalization is idempotent: parsing canonical output and
//! canonicalizing it again yields the identical byte sequence.

use serde::Serialize;
use serde_json::Value;

use crate::error::DigestError;

/// Bytes produced exclusively by JCS canonicalization.
///
/// # Invariants
///
/// - The only constructors are [`CanonicalBytes::new()`],
///   [`CanonicalBytes::from_value()`] and [`CanonicalBytes::parse()`].
/// - The content is valid UTF-8 JSON with sorted keys and compact separators.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(String);

impl CanonicalBytes {
    /// Canonicalize any serializable value.
    ///
    /// # Errors
    ///
    /// Returns [`DigestError::InvalidDocument`] if the value cannot be
    /// represented as a JSON document (e.g. a map with non-string keys).
    pub fn new(obj: &impl Serialize) -> Result<Self, DigestError> {
        let value =
            serde_json::to_value(obj).map_err(|e| DigestError::InvalidDocument(e.to_string()))?;
        Self::from_value(&value)
    }

    /// Canonicalize an already-parsed JSON value.
    pub fn from_value(value: &Value) -> Result<Self, DigestError> {
        serde_jcs::to_string(value)
            .map(Self)
            .map_err(|e| DigestError::EncodingFailed(e.to_string()))
    }

    /// Parse JSON text and canonicalize it.
    ///
    /// # Errors
    ///
    /// Returns [`DigestError::InvalidDocument`] if `text` is not valid JSON.
    pub fn parse(text: &str) -> Result<Self, DigestError> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| DigestError::InvalidDocument(e.to_string()))?;
        Self::from_value(&value)
    }

    /// Access the canonical bytes for digest computation or signing.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// The canonical form as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume and return the canonical string.
    pub fn into_string(self) -> String {
        self.0
    }

    /// Returns the length of the canonical byte sequence.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the canonical byte sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl std::fmt::Display for CanonicalBytes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn json_value() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(|n| serde_json::json!(n)),
            "[a-zA-Z0-9_ \u{e9}]{0,20}".prop_map(Value::String),
        ];
        leaf.prop_recursive(4, 64, 8, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
                prop::collection::btree_map("[a-z]{1,8}", inner, 0..6)
                    .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        })
    }

    proptest! {
        #[test]
        fn canonicalization_is_idempotent(value in json_value()) {
            let once = CanonicalBytes::from_value(&value).unwrap();
            let twice = CanonicalBytes::parse(once.as_str()).unwrap();
            prop_assert_eq!(once.as_bytes(), twice.as_bytes());
        }

        #[test]
        fn canonical_output_is_valid_json(value in json_value()) {
            let cb = CanonicalBytes::from_value(&value).unwrap();
            let parsed: Result<Value, _> = serde_json::from_slice(cb.as_bytes());
            prop_assert!(parsed.is_ok());
        }

        #[test]
        fn key_order_does_not_matter(
            keys in prop::collection::btree_set("[a-z]{1,8}", 2..8)
        ) {
            let forward: String = keys
                .iter()
                .enumerate()
                .map(|(i, k)| format!("\"{k}\":{i}"))
                .collect::<Vec<_>>()
                .join(",");
            let backward: String = keys
                .iter()
                .enumerate()
                .rev()
                .map(|(i, k)| format!("\"{k}\":{i}"))
                .collect::<Vec<_>>()
                .join(",");
            let a = CanonicalBytes::parse(&format!("{{{forward}}}")).unwrap();
            let b = CanonicalBytes::parse(&format!("{{{backward}}}")).unwrap();
            prop_assert_eq!(a, b);
        }
    }
}
