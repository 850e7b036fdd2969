//! Storefront error taxonomy.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;
use validator::ValidationErrors;

use crate::store::StoreError;

/// Field name → human-readable messages, ordered by field for stable output.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::default();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn get(&self, field: &str) -> Option<&[String]> { self.0.get(field).map(Vec::as_slice) }
    pub fn contains(&self, field: &str) -> bool { self.0.contains_key(field) }
    pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

impl From<ValidationErrors> for FieldErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields = Self::default();
        for (field, errs) in errors.field_errors() {
            for err in errs {
                let message = err.message.as_ref().map(|m| m.to_string()).unwrap_or_else(|| format!("{field} is invalid"));
                fields.add(field, message);
            }
        }
        fields
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first { f.write_str("; ")?; }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

#[derive(Error, Debug)]
pub enum StorefrontError {
    /// Also covers records owned by another cart; callers cannot tell the two apart.
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    #[error("Cart is empty")]
    EmptyCart,

    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl From<StoreError> for StorefrontError {
    fn from(err: StoreError) -> Self { StorefrontError::Persistence(err.to_string()) }
}

impl From<sqlx::Error> for StorefrontError {
    fn from(err: sqlx::Error) -> Self { StoreError::from(err).into() }
}

impl From<ValidationErrors> for StorefrontError {
    fn from(errors: ValidationErrors) -> Self { StorefrontError::Validation(errors.into()) }
}

pub type Result<T> = std::result::Result<T, StorefrontError>;
