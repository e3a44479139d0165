//! Validator dispatch by schema format.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use trustkit_vc::VerifiableCredential;

use crate::json_schema::JsonSchemaValidator;
use crate::outcome::{ValidationCode, ValidationError, ValidationOutcome};
use crate::shape::ShapeValidator;

/// The language a schema document is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SchemaFormat {
    JsonSchema,
    Shape,
}

impl SchemaFormat {
    /// Guess the format of a schema document: a document with a
    /// `targetClass` or `property` member is a shape, anything else is
    /// JSON Schema.
    pub fn detect(schema: &Value) -> Self {
        match schema.as_object() {
            Some(obj) if obj.contains_key("targetClass") || obj.contains_key("property") => {
                Self::Shape
            }
            _ => Self::JsonSchema,
        }
    }
}

impl std::fmt::Display for SchemaFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::JsonSchema => f.write_str("json-schema"),
            Self::Shape => f.write_str("shape"),
        }
    }
}

/// Validates a credential's subject against a schema document of one
/// format. Implementations report every problem through the outcome and
/// never panic on malformed schemas.
pub trait SchemaValidator: Send + Sync {
    fn format(&self) -> SchemaFormat;

    fn validate(&self, credential: &VerifiableCredential, schema: &Value) -> ValidationOutcome;
}

/// Format-keyed set of validators.
#[derive(Clone, Default)]
pub struct SchemaValidatorRegistry {
    validators: HashMap<SchemaFormat, Arc<dyn SchemaValidator>>,
}

impl std::fmt::Debug for SchemaValidatorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut formats: Vec<_> = self.validators.keys().map(ToString::to_string).collect();
        formats.sort();
        f.debug_struct("SchemaValidatorRegistry")
            .field("formats", &formats)
            .finish()
    }
}

impl SchemaValidatorRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the built-in JSON Schema and shape validators.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(JsonSchemaValidator));
        registry.register(Arc::new(ShapeValidator));
        registry
    }

    /// Install a validator under its own format, replacing any previous
    /// one for that format.
    pub fn register(&mut self, validator: Arc<dyn SchemaValidator>) {
        self.validators.insert(validator.format(), validator);
    }

    pub fn supports(&self, format: SchemaFormat) -> bool {
        self.validators.contains_key(&format)
    }

    /// Validate against a schema of the given format.
    pub fn validate(
        &self,
        credential: &VerifiableCredential,
        schema: &Value,
        format: SchemaFormat,
    ) -> ValidationOutcome {
        let Some(validator) = self.validators.get(&format) else {
            return ValidationOutcome::single(ValidationError::new(
                "#",
                ValidationCode::UnsupportedSchemaFormat,
                format!("no validator registered for {format}"),
            ));
        };
        let outcome = validator.validate(credential, schema);
        if !outcome.is_valid() {
            tracing::debug!(%format, errors = outcome.errors.len(), "schema validation failed");
        }
        outcome
    }

    /// Validate, detecting the format from the schema document.
    pub fn validate_detected(&self, credential: &VerifiableCredential, schema: &Value) -> ValidationOutcome {
        self.validate(credential, schema, SchemaFormat::detect(schema))
    }
}
