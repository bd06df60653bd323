//! Error types for the metadata tool.
//!
//! Uses the dual-error pattern: `MetadataError` for library consumers
//! with detailed error context, and specific payload types (such as
//! [`ValidationError`]) for errors that carry structured data.

use std::fmt;

use thiserror::Error;

/// Main error type for the metadata tool library.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// Invalid UUID format.
    #[error("Invalid UUID: '{0}'. Expected e.g. 2fbd3b1e-5c3a-4c0b-9c2f-0e6d0b1f9a11")]
    InvalidUuid(String),

    /// Invalid date format.
    #[error("Invalid date format: '{0}'. Expected YYYY-MM-DD (e.g., 2025-01-01)")]
    InvalidDate(String),

    /// Configuration file could not be parsed.
    #[error("Failed to parse config {path}: {message}")]
    ConfigParse { path: String, message: String },

    /// Code list data could not be parsed.
    #[error("Failed to parse code lists: {0}")]
    CodeListParse(String),

    /// HVD thesaurus could not be parsed.
    #[error("Failed to parse HVD thesaurus: {0}")]
    RdfParse(String),

    /// YAML (de)serialization error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// XML parsing failed.
    #[error("XML parsing failed: {0}")]
    XmlParse(#[from] roxmltree::Error),

    /// XML writing failed.
    #[error("XML serialization failed: {0}")]
    XmlWrite(String),

    /// Missing required XML element.
    #[error("Missing required XML element: {element} in {context}")]
    MissingElement { element: String, context: String },

    /// One or more configuration rules were violated.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A code list lookup failed while generating an entity.
    #[error("No {kind} found for '{key}' (entity {entity_id})")]
    Lookup {
        entity_id: String,
        kind: &'static str,
        key: String,
    },

    /// A generation step ran out of order.
    #[error("Entity {entity_id}: cannot move from stage {from} to {to}")]
    StageOrder {
        entity_id: String,
        from: &'static str,
        to: &'static str,
    },

    /// Some entities of a batch could not be generated.
    #[error("{failed} of {total} entities failed")]
    BatchFailed { failed: usize, total: usize },

    /// Requested HVD category does not exist in the thesaurus.
    #[error("HVD category not found: {0}")]
    HvdCategoryNotFound(String),

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// All retry attempts exhausted.
    #[error("Request failed after {attempts} attempts: {message}")]
    RetriesExhausted { attempts: u32, message: String },

    /// The catalogue answered with an OWS exception report.
    #[error("Catalogue returned an exception ({code}): {message}")]
    CatalogueException { code: String, message: String },

    /// Invalid URL.
    #[error("Invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for metadata tool operations.
pub type Result<T> = std::result::Result<T, MetadataError>;

/// A single broken configuration rule, attributed to an entity and field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Position of the entity in the configuration list.
    pub index: usize,

    /// Entity ID as written in the configuration (may be empty).
    pub entity_id: String,

    /// Configuration field name (e.g., "accessPoint").
    pub field: String,

    /// Human readable description.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let id = if self.entity_id.is_empty() {
            "<no id>"
        } else {
            self.entity_id.as_str()
        };
        write!(
            f,
            "entity {} ({id}): {}: {}",
            self.index, self.field, self.message
        )
    }
}

/// Aggregate of every violation found in a configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationError {
    pub violations: Vec<Violation>,
}

impl ValidationError {
    /// Create an empty error collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a violation.
    pub fn push(
        &mut self,
        index: usize,
        entity_id: &str,
        field: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.violations.push(Violation {
            index,
            entity_id: entity_id.to_string(),
            field: field.into(),
            message: message.into(),
        });
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// `Ok(())` when nothing was collected, otherwise `Err(self)`.
    pub fn into_result(self) -> std::result::Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "configuration is invalid ({} violation{}):",
            self.violations.len(),
            if self.violations.len() == 1 { "" } else { "s" }
        )?;
        for violation in &self.violations {
            write!(f, "\n  - {violation}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}
