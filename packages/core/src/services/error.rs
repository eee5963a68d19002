//! Service Layer Error Types
//!
//! Registry and promotion errors are fatal to the one operation that raised
//! them: they signal a configuration or migration mistake, not malformed
//! document content. Document problems travel as a `ValidationReport` instead.

use crate::models::{NodePath, ValidationReport};
use crate::operations::TransformError;
use thiserror::Error;

/// Schema registration and lookup errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A different, incompatible schema already holds this name
    #[error("Type '{name}' is already registered with an incompatible schema: {reason}")]
    DuplicateType { name: String, reason: String },

    /// No schema registered under this name (lookups are case-sensitive)
    #[error("Unknown node type: {name}")]
    UnknownType { name: String },

    /// Name does not follow the capitalized-word convention
    #[error("Invalid type name '{name}': expected [A-Z][A-Za-z0-9]*")]
    InvalidTypeName { name: String },

    /// Schema failed its structural self-check
    #[error("Invalid schema for '{name}': {reason}")]
    InvalidSchema { name: String, reason: String },
}

impl RegistryError {
    pub fn duplicate_type(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DuplicateType {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn unknown_type(name: impl Into<String>) -> Self {
        Self::UnknownType { name: name.into() }
    }

    pub fn invalid_schema(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSchema {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Promotion / demotion errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PromotionError {
    /// Source and destination both hold a value, and the values differ
    #[error(
        "Promotion conflict on {type_name} at {path}: data key '{data_key}' and field '{field}' hold different values"
    )]
    Conflict {
        type_name: String,
        data_key: String,
        field: String,
        path: NodePath,
    },

    /// Target field is not declared by the type's schema
    #[error("Type '{type_name}' does not declare field '{field}'")]
    UndeclaredField { type_name: String, field: String },

    /// Promotion names a type the registry does not know
    #[error("Unknown node type: {type_name}")]
    UnknownType { type_name: String },

    /// A version step in a migration chain has no registered promotion
    #[error("No promotion registered for {type_name} from version {from_version} to {to_version}")]
    MissingStep {
        type_name: String,
        from_version: u32,
        to_version: u32,
    },

    #[error("Transform failed: {0}")]
    Transform(#[from] TransformError),
}

impl PromotionError {
    pub fn conflict(
        type_name: impl Into<String>,
        data_key: impl Into<String>,
        field: impl Into<String>,
        path: NodePath,
    ) -> Self {
        Self::Conflict {
            type_name: type_name.into(),
            data_key: data_key.into(),
            field: field.into(),
            path,
        }
    }
}

/// Top-level error for engine entry points
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Validation(#[from] ValidationReport),

    #[error("Promotion error: {0}")]
    Promotion(#[from] PromotionError),

    #[error("Transform error: {0}")]
    Transform(#[from] TransformError),

    /// Input is not JSON, or not a JSON object at the root
    #[error("Ingest error: {0}")]
    Ingest(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl EngineError {
    pub fn ingest(msg: impl Into<String>) -> Self {
        Self::Ingest(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// The violation report, if this is a validation failure
    pub fn report(&self) -> Option<&ValidationReport> {
        match self {
            Self::Validation(report) => Some(report),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
