//! Validation results.

use serde::{Deserialize, Serialize};

/// Stable machine-readable classification of a violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationCode {
    /// The credential does not carry the type the schema targets.
    CredentialTypeMissing,
    /// A required subject field is absent.
    RequiredFieldMissing,
    /// A value has the wrong JSON type or fails a datatype/format check.
    InvalidDatatype,
    MinLength,
    MaxLength,
    PatternMismatch,
    EnumMismatch,
    /// Too many or too few values for a property.
    Cardinality,
    /// The schema declares a regular expression that does not compile.
    InvalidPattern,
    /// The schema document itself is unusable.
    SchemaInvalid,
    /// `credentialSubject` is not an object.
    InvalidSubject,
    /// Any other declared constraint failed.
    ConstraintViolation,
    /// No validator is registered for the requested format.
    UnsupportedSchemaFormat,
}

impl ValidationCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CredentialTypeMissing => "credential_type_missing",
            Self::RequiredFieldMissing => "required_field_missing",
            Self::InvalidDatatype => "invalid_datatype",
            Self::MinLength => "min_length",
            Self::MaxLength => "max_length",
            Self::PatternMismatch => "pattern_mismatch",
            Self::EnumMismatch => "enum_mismatch",
            Self::Cardinality => "cardinality",
            Self::InvalidPattern => "invalid_pattern",
            Self::SchemaInvalid => "schema_invalid",
            Self::InvalidSubject => "invalid_subject",
            Self::ConstraintViolation => "constraint_violation",
            Self::UnsupportedSchemaFormat => "unsupported_schema_format",
        }
    }
}

impl std::fmt::Display for ValidationCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// JSON pointer into the credential (`/credentialSubject/name`).
    pub path: String,
    pub message: String,
    pub code: ValidationCode,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, code: ValidationCode, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            code,
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}]: {}", self.path, self.code, self.message)
    }
}

/// Result of validating one credential. `valid` is true iff `errors` is
/// empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
}

impl ValidationOutcome {
    pub fn valid() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
        }
    }

    pub fn from_errors(errors: Vec<ValidationError>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }

    pub fn single(error: ValidationError) -> Self {
        Self::from_errors(vec![error])
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// True if any error carries `code`.
    pub fn has_code(&self, code: ValidationCode) -> bool {
        self.errors.iter().any(|e| e.code == code)
    }
}

/// One `credential_type_missing` error per required type the credential
/// does not declare.
pub(crate) fn missing_types(
    credential: &trustkit_vc::VerifiableCredential,
    required: &[&str],
) -> Vec<ValidationError> {
    required
        .iter()
        .filter(|ty| !credential.has_type(ty))
        .map(|ty| {
            ValidationError::new(
                "/type",
                ValidationCode::CredentialTypeMissing,
                format!("credential is not of type {ty}"),
            )
        })
        .collect()
}

/// Escape one JSON-pointer reference token.
pub(crate) fn pointer_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}
