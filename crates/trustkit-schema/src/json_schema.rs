//! # JSON Schema validation
//!
//! Validates `credentialSubject` against a Draft 2020-12 JSON Schema. The
//! schema's `required`, `type`, `format`, `minLength`, `maxLength`,
//! `pattern` and `enum` keywords map to dedicated [`ValidationCode`]s; every
//! other failing keyword is reported as `constraint_violation`.
//!
//! One non-standard root keyword is honoured: `credentialType`, a string or
//! array of strings the credential's `type` must contain. JSON Schema
//! itself ignores unknown keywords, so schemas carrying it stay portable.
//!
//! ## Broken patterns
//!
//! Before compiling, every `pattern` and `patternProperties` key is tried
//! on its own. A pattern that does not compile is reported as
//! `invalid_pattern` (path `#/<schema pointer>`) and removed, so the rest of
//! the schema still applies.

use jsonschema::error::ValidationErrorKind;
use serde_json::{json, Map, Value};

use trustkit_vc::VerifiableCredential;

use crate::outcome::{missing_types, pointer_token, ValidationCode, ValidationError, ValidationOutcome};
use crate::registry::{SchemaFormat, SchemaValidator};
use crate::SUBJECT_PATH;

/// Keywords whose values are data, not subschemas.
const DATA_KEYWORDS: &[&str] = &["enum", "const", "default", "examples"];

/// Draft 2020-12 JSON Schema validator for credential subjects.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSchemaValidator;

impl JsonSchemaValidator {
    pub fn new() -> Self {
        Self
    }
}

impl SchemaValidator for JsonSchemaValidator {
    fn format(&self) -> SchemaFormat {
        SchemaFormat::JsonSchema
    }

    fn validate(&self, credential: &VerifiableCredential, schema: &Value) -> ValidationOutcome {
        if !schema.is_object() && !schema.is_boolean() {
            return ValidationOutcome::single(ValidationError::new(
                "#",
                ValidationCode::SchemaInvalid,
                "schema must be an object or a boolean",
            ));
        }

        let required = declared_types(schema.get("credentialType"));
        let mut errors = missing_types(credential, &required);

        let mut schema = schema.clone();
        strip_invalid_patterns(&mut schema, "#", &mut errors);

        let validator = match jsonschema::options()
            .with_draft(jsonschema::Draft::Draft202012)
            .should_validate_formats(true)
            .build(&schema)
        {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, "credential schema failed to compile");
                errors.push(ValidationError::new("#", ValidationCode::SchemaInvalid, e.to_string()));
                return ValidationOutcome::from_errors(errors);
            }
        };

        errors.extend(validator.iter_errors(&credential.credential_subject).map(|err| {
            let mut path = format!("{SUBJECT_PATH}{}", err.instance_path);
            if let ValidationErrorKind::Required { property } = &err.kind {
                if let Some(name) = property.as_str() {
                    path.push('/');
                    path.push_str(&pointer_token(name));
                }
            }
            ValidationError::new(path, code_for(&err.kind), err.to_string())
        }));
        ValidationOutcome::from_errors(errors)
    }
}

fn code_for(kind: &ValidationErrorKind) -> ValidationCode {
    match kind {
        ValidationErrorKind::Required { .. } => ValidationCode::RequiredFieldMissing,
        ValidationErrorKind::Type { .. } | ValidationErrorKind::Format { .. } => {
            ValidationCode::InvalidDatatype
        }
        ValidationErrorKind::MinLength { .. } => ValidationCode::MinLength,
        ValidationErrorKind::MaxLength { .. } => ValidationCode::MaxLength,
        ValidationErrorKind::Pattern { .. } => ValidationCode::PatternMismatch,
        ValidationErrorKind::Enum { .. } | ValidationErrorKind::Constant { .. } => {
            ValidationCode::EnumMismatch
        }
        _ => ValidationCode::ConstraintViolation,
    }
}

fn declared_types(value: Option<&Value>) -> Vec<&str> {
    match value {
        Some(Value::String(s)) => vec![s.as_str()],
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    }
}

pub(crate) fn pattern_compiles(pattern: &str) -> bool {
    jsonschema::validator_for(&json!({ "type": "string", "pattern": pattern })).is_ok()
}

fn strip_invalid_patterns(schema: &mut Value, pointer: &str, errors: &mut Vec<ValidationError>) {
    match schema {
        Value::Object(obj) => {
            strip_pattern_keyword(obj, pointer, errors);
            strip_pattern_properties(obj, pointer, errors);
            for (key, child) in obj.iter_mut() {
                if DATA_KEYWORDS.contains(&key.as_str()) {
                    continue;
                }
                let child_pointer = format!("{pointer}/{}", pointer_token(key));
                strip_invalid_patterns(child, &child_pointer, errors);
            }
        }
        Value::Array(items) => {
            for (i, child) in items.iter_mut().enumerate() {
                strip_invalid_patterns(child, &format!("{pointer}/{i}"), errors);
            }
        }
        _ => {}
    }
}

fn strip_pattern_keyword(obj: &mut Map<String, Value>, pointer: &str, errors: &mut Vec<ValidationError>) {
    let Some(Value::String(pattern)) = obj.get("pattern") else {
        return;
    };
    if pattern_compiles(pattern) {
        return;
    }
    errors.push(ValidationError::new(
        format!("{pointer}/pattern"),
        ValidationCode::InvalidPattern,
        format!("pattern {pattern:?} is not a valid regular expression"),
    ));
    obj.remove("pattern");
}

fn strip_pattern_properties(
    obj: &mut Map<String, Value>,
    pointer: &str,
    errors: &mut Vec<ValidationError>,
) {
    let Some(Value::Object(props)) = obj.get_mut("patternProperties") else {
        return;
    };
    let broken: Vec<String> = props.keys().filter(|p| !pattern_compiles(p)).cloned().collect();
    for pattern in broken {
        errors.push(ValidationError::new(
            format!("{pointer}/patternProperties/{}", pointer_token(&pattern)),
            ValidationCode::InvalidPattern,
            format!("pattern {pattern:?} is not a valid regular expression"),
        ));
        props.remove(&pattern);
    }
}
