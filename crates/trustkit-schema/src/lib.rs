//! # trustkit-schema — Credential Subject Validation
//!
//! Structural validation of a credential's `credentialSubject` against a
//! schema document. Two formats ship here:
//!
//! - **JSON Schema** (Draft 2020-12) via [`JsonSchemaValidator`].
//! - **Shapes**, a SHACL-like property-constraint document, via
//!   [`ShapeValidator`].
//!
//! Validators never return `Err`. Every violation, including a broken
//! schema document, becomes one [`ValidationError`] in a
//! [`ValidationOutcome`], each carrying a stable [`ValidationCode`].
//! Constraint keywords a validator does not understand are ignored.

pub mod json_schema;
pub mod outcome;
pub mod registry;
pub mod shape;

pub use json_schema::JsonSchemaValidator;
pub use outcome::{ValidationCode, ValidationError, ValidationOutcome};
pub use registry::{SchemaFormat, SchemaValidator, SchemaValidatorRegistry};
pub use shape::ShapeValidator;

/// JSON-pointer path of the subject claims inside a credential.
pub const SUBJECT_PATH: &str = "/credentialSubject";
