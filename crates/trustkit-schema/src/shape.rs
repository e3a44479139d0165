//! # Shape validation
//!
//! A compact, SHACL-inspired constraint document:
//!
//! ```json
//! {
//!   "targetClass": "UniversityDegreeCredential",
//!   "property": [
//!     { "path": "degree.name", "datatype": "string", "minCount": 1,
//!       "minLength": 3, "pattern": "^[A-Z]" },
//!     { "path": "graduated", "datatype": "dateTime", "maxCount": 1 }
//!   ]
//! }
//! ```
//!
//! `path` is a dot-separated member path inside `credentialSubject`. An array
//! value contributes one value per element; cardinality is counted over
//! those values. `targetClass` (string or array) must appear in the
//! credential's `type`.
//!
//! Supported datatypes: `string`, `number`, `integer`, `boolean`,
//! `dateTime`, `anyURI`, each optionally prefixed `xsd:`. Unrecognised
//! datatypes and keywords are ignored.

use chrono::DateTime;
use serde_json::Value;

use trustkit_vc::VerifiableCredential;

use crate::json_schema::pattern_compiles;
use crate::outcome::{missing_types, pointer_token, ValidationCode, ValidationError, ValidationOutcome};
use crate::registry::{SchemaFormat, SchemaValidator};
use crate::SUBJECT_PATH;

/// Validator for shape documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShapeValidator;

impl ShapeValidator {
    pub fn new() -> Self {
        Self
    }
}

impl SchemaValidator for ShapeValidator {
    fn format(&self) -> SchemaFormat {
        SchemaFormat::Shape
    }

    fn validate(&self, credential: &VerifiableCredential, schema: &Value) -> ValidationOutcome {
        let Some(shape) = schema.as_object() else {
            return ValidationOutcome::single(ValidationError::new(
                "#",
                ValidationCode::SchemaInvalid,
                "shape must be an object",
            ));
        };

        let targets: Vec<&str> = match shape.get("targetClass") {
            Some(Value::String(s)) => vec![s.as_str()],
            Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        };
        let mut errors = missing_types(credential, &targets);

        let properties = match shape.get("property") {
            None => return ValidationOutcome::from_errors(errors),
            Some(Value::Array(props)) => props,
            Some(_) => {
                errors.push(ValidationError::new(
                    "#/property",
                    ValidationCode::SchemaInvalid,
                    "property must be an array of property shapes",
                ));
                return ValidationOutcome::from_errors(errors);
            }
        };

        let subject = &credential.credential_subject;
        if !subject.is_object() {
            errors.push(ValidationError::new(
                SUBJECT_PATH,
                ValidationCode::InvalidSubject,
                "credentialSubject must be an object",
            ));
            return ValidationOutcome::from_errors(errors);
        }

        for (i, property) in properties.iter().enumerate() {
            check_property(subject, property, i, &mut errors);
        }
        ValidationOutcome::from_errors(errors)
    }
}

fn check_property(subject: &Value, property: &Value, position: usize, errors: &mut Vec<ValidationError>) {
    let Some(path) = property.get("path").and_then(Value::as_str).filter(|p| !p.is_empty()) else {
        errors.push(ValidationError::new(
            format!("#/property/{position}/path"),
            ValidationCode::SchemaInvalid,
            "property shape needs a non-empty path",
        ));
        return;
    };
    let pointer = subject_pointer(path);
    let values = resolve(subject, path);

    let min_count = property.get("minCount").and_then(Value::as_u64);
    let max_count = property.get("maxCount").and_then(Value::as_u64);
    let count = values.len() as u64;
    if let Some(min) = min_count {
        if count < min {
            let code = if count == 0 {
                ValidationCode::RequiredFieldMissing
            } else {
                ValidationCode::Cardinality
            };
            errors.push(ValidationError::new(
                &pointer,
                code,
                format!("{path} needs at least {min} value(s), found {count}"),
            ));
        }
    }
    if let Some(max) = max_count {
        if count > max {
            errors.push(ValidationError::new(
                &pointer,
                ValidationCode::Cardinality,
                format!("{path} allows at most {max} value(s), found {count}"),
            ));
        }
    }

    // Compile the pattern once per property, not once per value.
    let pattern = match property.get("pattern").and_then(Value::as_str) {
        Some(p) if !pattern_compiles(p) => {
            errors.push(ValidationError::new(
                format!("#/property/{position}/pattern"),
                ValidationCode::InvalidPattern,
                format!("pattern {p:?} is not a valid regular expression"),
            ));
            None
        }
        Some(p) => jsonschema::validator_for(&serde_json::json!({ "pattern": p })).ok(),
        None => None,
    };
    let datatype = property.get("datatype").and_then(Value::as_str);
    let min_length = property.get("minLength").and_then(Value::as_u64);
    let max_length = property.get("maxLength").and_then(Value::as_u64);
    let allowed = property.get("in").and_then(Value::as_array);

    for value in values {
        if let Some(dt) = datatype {
            if let Some(false) = conforms(value, dt) {
                errors.push(ValidationError::new(
                    &pointer,
                    ValidationCode::InvalidDatatype,
                    format!("{value} is not a valid {dt}"),
                ));
                continue;
            }
        }
        if let Some(allowed) = allowed {
            if !allowed.contains(value) {
                errors.push(ValidationError::new(
                    &pointer,
                    ValidationCode::EnumMismatch,
                    format!("{value} is not one of the allowed values"),
                ));
            }
        }
        let Some(text) = value.as_str() else {
            continue;
        };
        let length = text.chars().count() as u64;
        if let Some(min) = min_length.filter(|min| length < *min) {
            errors.push(ValidationError::new(
                &pointer,
                ValidationCode::MinLength,
                format!("{text:?} is shorter than {min} characters"),
            ));
        }
        if let Some(max) = max_length.filter(|max| length > *max) {
            errors.push(ValidationError::new(
                &pointer,
                ValidationCode::MaxLength,
                format!("{text:?} is longer than {max} characters"),
            ));
        }
        if let Some(validator) = &pattern {
            if !validator.is_valid(value) {
                errors.push(ValidationError::new(
                    &pointer,
                    ValidationCode::PatternMismatch,
                    format!("{text:?} does not match the declared pattern"),
                ));
            }
        }
    }
}

/// `Some(conforms)` for known datatypes, `None` for unknown ones.
fn conforms(value: &Value, datatype: &str) -> Option<bool> {
    let datatype = datatype.strip_prefix("xsd:").unwrap_or(datatype);
    let ok = match datatype {
        "string" => value.is_string(),
        "number" | "decimal" | "double" => value.is_number(),
        "integer" => {
            value.is_i64()
                || value.is_u64()
                || value.as_f64().map(|f| f.fract() == 0.0).unwrap_or(false)
        }
        "boolean" => value.is_boolean(),
        "dateTime" => value
            .as_str()
            .map(|s| DateTime::parse_from_rfc3339(s).is_ok())
            .unwrap_or(false),
        "anyURI" => value
            .as_str()
            .map(|s| url::Url::parse(s).is_ok())
            .unwrap_or(false),
        _ => return None,
    };
    Some(ok)
}

/// Values at a dot path; arrays fan out, `null` counts as absent.
fn resolve<'a>(subject: &'a Value, path: &str) -> Vec<&'a Value> {
    let mut current = vec![subject];
    for segment in path.split('.') {
        current = current
            .into_iter()
            .filter_map(|v| v.get(segment))
            .flat_map(|v| match v {
                Value::Array(items) => items.iter().collect(),
                other => vec![other],
            })
            .filter(|v| !v.is_null())
            .collect();
    }
    current
}

fn subject_pointer(path: &str) -> String {
    path.split('.').fold(SUBJECT_PATH.to_string(), |mut acc, segment| {
        acc.push('/');
        acc.push_str(&pointer_token(segment));
        acc
    })
}
