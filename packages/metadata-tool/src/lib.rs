//! Metadata tool - Generate ISO 19119 service metadata and ISO 19110 feature
//! catalogues from layered configuration, and harvest CSW catalogues.
//!
//! # Example
//!
//! ```
//! use metadata_tool::config;
//!
//! // Entity identifiers are UUIDs, dates are YYYY-MM-DD
//! assert!(config::validate_uuid("2fbd3b1e-5c3a-4c0b-9c2f-0e6d0b1f9a11").is_ok());
//! assert!(config::validate_date("2025-01-01").is_ok());
//! ```
//!
//! # Architecture
//!
//! - [`config`]: Configuration constants and validation
//! - [`error`]: Error types and Result alias
//! - [`model`]: Layered service and feature catalogue configuration
//! - [`codelist`]: Embedded code lists (protocols, licenses, themes, ...)
//! - [`hvd`]: High-value dataset category thesaurus
//! - [`iso`]: In-memory ISO 19119/19110 documents and their XML rendering
//! - [`generator`]: Staged per-entity generation and the batch driver
//! - [`csw`]: CSW 2.0.2 client and paged harvesting
//! - [`flatten`]: Flattening of harvested ISO 19139 records
//! - [`http`]: HTTP client with retries
//! - [`xml`]: XML reading and writing utilities
//! - [`cli`]: Command-line interface

pub mod cli;
pub mod codelist;
pub mod config;
pub mod csw;
pub mod error;
pub mod flatten;
pub mod generator;
pub mod http;
pub mod hvd;
pub mod iso;
pub mod model;
pub mod xml;

// Re-export commonly used items
pub use config::{validate_date, validate_uuid};
pub use error::{MetadataError, Result, ValidationError, Violation};
pub use flatten::{flatten, FlatRecord, InspireVariant};
pub use generator::{EntityOutcome, FeatureCatalogueGenerator, ServiceGenerator, Stage};
pub use model::{FeatureCataloguesConfig, ServicesConfig};
