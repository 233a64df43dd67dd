//! Type Guards
//!
//! Call sites check values through the two-operation [`Validator`] contract
//! instead of a particular validation library:
//!
//! - [`is`] answers yes/no and never fails
//! - [`assure`] returns a checker that yields the parsed value or the
//!   validator's own error
//!
//! Two validators ship with the crate: [`SerdeValidator`] (shape checks via
//! serde) and [`JsonSchemaValidator`] (JSON Schema via `jsonschema`).

use std::marker::PhantomData;

use jsonschema::JSONSchema;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::error::CodegenError;

/// Anything that can check a JSON value
pub trait Validator {
    type Output;
    type Error;

    /// Strict check: the validated value, or why it failed
    fn parse(&self, value: &Value) -> Result<Self::Output, Self::Error>;

    /// Lenient check. Must not panic.
    fn safe_parse(&self, value: &Value) -> bool;
}

/// True when `validator` accepts `value`
pub fn is<V: Validator + ?Sized>(value: &Value, validator: &V) -> bool {
    validator.safe_parse(value)
}

/// A checker that runs `validator.parse` on each value it is given
pub fn assure<'v, V: Validator + ?Sized>(
    validator: &'v V,
) -> impl Fn(&Value) -> Result<V::Output, V::Error> + 'v {
    move |value| validator.parse(value)
}

/// Why a value was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", .messages.join("; "))]
pub struct ValidationFailure {
    pub messages: Vec<String>,
}

impl ValidationFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self { messages: vec![message.into()] }
    }
}

impl From<ValidationFailure> for CodegenError {
    fn from(failure: ValidationFailure) -> Self {
        CodegenError::Validation(failure.to_string())
    }
}

// =============================================================================
// Serde Validator
// =============================================================================

/// Accepts values that deserialize into `T`
pub struct SerdeValidator<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> SerdeValidator<T> {
    pub fn new() -> Self {
        Self { _marker: PhantomData }
    }
}

impl<T> Default for SerdeValidator<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: DeserializeOwned> Validator for SerdeValidator<T> {
    type Output = T;
    type Error = ValidationFailure;

    fn parse(&self, value: &Value) -> Result<T, ValidationFailure> {
        T::deserialize(value).map_err(|e| ValidationFailure::new(e.to_string()))
    }

    fn safe_parse(&self, value: &Value) -> bool {
        T::deserialize(value).is_ok()
    }
}

/// Minimal shape every lexicon document has
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DocumentHeader {
    pub id: String,
}

/// Marker field distinguishing lexicon documents from other JSON files
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LexiconMarker {
    pub lexicon: u64,
}

// =============================================================================
// JSON Schema Validator
// =============================================================================

/// Accepts values matching a compiled JSON Schema
pub struct JsonSchemaValidator {
    compiled: JSONSchema,
}

impl JsonSchemaValidator {
    pub fn compile(schema: &Value) -> Result<Self, CodegenError> {
        JSONSchema::compile(schema)
            .map(|compiled| Self { compiled })
            .map_err(|e| CodegenError::InvalidFormat(format!("meta-schema: {}", e)))
    }
}

impl Validator for JsonSchemaValidator {
    type Output = Value;
    type Error = ValidationFailure;

    fn parse(&self, value: &Value) -> Result<Value, ValidationFailure> {
        match self.compiled.validate(value) {
            Ok(()) => Ok(value.clone()),
            Err(errors) => Err(ValidationFailure {
                messages: errors.map(|e| e.to_string()).collect(),
            }),
        }
    }

    fn safe_parse(&self, value: &Value) -> bool {
        self.compiled.is_valid(value)
    }
}
