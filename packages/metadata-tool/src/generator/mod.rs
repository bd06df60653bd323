//! Metadata generation: staged per-entity pipeline and batch driver.
//!
//! Every entity moves through a fixed sequence of stages:
//!
//! ```text
//! Pending → GeneralInfoSet → IdentificationInfoSet → DistributionInfoSet
//!         → DataQualityInfoSet → Serialized → Written
//! ```
//!
//! Feature catalogues have no distribution or data quality sections and are
//! ready for serialization after `IdentificationInfoSet`.
//!
//! In batch mode a failing entity is reported in its [`EntityOutcome`] and
//! the remaining entities are still generated.

mod feature_catalogue;
mod service;

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{MetadataError, Result};
use crate::iso::{FeatureCatalogue, ServiceMetadata};
use crate::model::MetadataEntity;

pub use feature_catalogue::FeatureCatalogueGenerator;
pub use service::{apply_title_suffix, ServiceGenerator};

/// Progress of a single entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Pending,
    GeneralInfoSet,
    IdentificationInfoSet,
    DistributionInfoSet,
    DataQualityInfoSet,
    Serialized,
    Written,
}

impl Stage {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::GeneralInfoSet => "general info set",
            Self::IdentificationInfoSet => "identification info set",
            Self::DistributionInfoSet => "distribution info set",
            Self::DataQualityInfoSet => "data quality info set",
            Self::Serialized => "serialized",
            Self::Written => "written",
        }
    }

    /// The stage that follows this one.
    #[must_use]
    pub fn next(&self) -> Option<Self> {
        match self {
            Self::Pending => Some(Self::GeneralInfoSet),
            Self::GeneralInfoSet => Some(Self::IdentificationInfoSet),
            Self::IdentificationInfoSet => Some(Self::DistributionInfoSet),
            Self::DistributionInfoSet => Some(Self::DataQualityInfoSet),
            Self::DataQualityInfoSet => Some(Self::Serialized),
            Self::Serialized => Some(Self::Written),
            Self::Written => None,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A document that can be rendered to XML.
pub trait Document: Default {
    /// Stage after which every section of the document is populated.
    const POPULATED: Stage;

    fn to_xml(&self) -> Result<Vec<u8>>;
}

impl Document for ServiceMetadata {
    const POPULATED: Stage = Stage::DataQualityInfoSet;

    fn to_xml(&self) -> Result<Vec<u8>> {
        ServiceMetadata::to_xml(self)
    }
}

impl Document for FeatureCatalogue {
    const POPULATED: Stage = Stage::IdentificationInfoSet;

    fn to_xml(&self) -> Result<Vec<u8>> {
        FeatureCatalogue::to_xml(self)
    }
}

/// One entity's document on its way to disk.
#[derive(Debug, Clone)]
pub struct GeneratedEntry<D> {
    pub id: String,
    pub document: D,
    stage: Stage,
    output: Vec<u8>,
}

impl<D: Document> GeneratedEntry<D> {
    /// A pending entry with an empty document.
    #[must_use]
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            document: D::default(),
            stage: Stage::Pending,
            output: Vec::new(),
        }
    }

    #[must_use]
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Serialized XML; empty until [`serialize`](Self::serialize) ran.
    #[must_use]
    pub fn output(&self) -> &[u8] {
        &self.output
    }

    /// Output file name, `{id}.xml`.
    #[must_use]
    pub fn filename(&self) -> String {
        format!("{}.xml", self.id)
    }

    fn stage_error(&self, to: Stage) -> MetadataError {
        MetadataError::StageOrder {
            entity_id: self.id.clone(),
            from: self.stage.as_str(),
            to: to.as_str(),
        }
    }

    /// Record that the next populate step finished.
    pub fn advance(&mut self, to: Stage) -> Result<()> {
        if to > D::POPULATED || self.stage.next() != Some(to) {
            return Err(self.stage_error(to));
        }
        tracing::debug!(id = %self.id, stage = %to, "Stage complete");
        self.stage = to;
        Ok(())
    }

    /// Render the document. Only allowed once, after every section is set.
    pub fn serialize(&mut self) -> Result<()> {
        if self.stage != D::POPULATED {
            return Err(self.stage_error(Stage::Serialized));
        }
        self.output = self.document.to_xml()?;
        self.stage = Stage::Serialized;
        Ok(())
    }

    /// Write `{id}.xml` into `output_dir`, creating the directory if needed.
    ///
    /// An existing file with the same name is overwritten.
    pub fn write(&mut self, output_dir: &Path) -> Result<PathBuf> {
        if self.stage != Stage::Serialized {
            return Err(self.stage_error(Stage::Written));
        }
        fs::create_dir_all(output_dir)?;
        let path = output_dir.join(self.filename());
        fs::write(&path, &self.output)?;
        self.stage = Stage::Written;
        tracing::info!(id = %self.id, path = %path.display(), "Wrote metadata");
        Ok(path)
    }
}

/// Result of generating one entity in a batch.
#[derive(Debug)]
pub struct EntityOutcome {
    pub id: String,
    /// Path of the written file, or the error that stopped this entity.
    pub result: Result<PathBuf>,
}

impl EntityOutcome {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Build, serialize and write every entity in order.
///
/// Entities are processed one at a time. A failure is captured in that
/// entity's outcome and does not stop the batch.
pub fn generate_batch<E, D, F>(entities: &[E], output_dir: &Path, mut build: F) -> Vec<EntityOutcome>
where
    E: MetadataEntity,
    D: Document,
    F: FnMut(&E) -> Result<GeneratedEntry<D>>,
{
    entities
        .iter()
        .map(|entity| {
            let result = build(entity).and_then(|mut entry| {
                entry.serialize()?;
                entry.write(output_dir)
            });
            if let Err(e) = &result {
                tracing::warn!(id = entity.id(), error = %e, "Skipping entity");
            }
            EntityOutcome {
                id: entity.id().to_string(),
                result,
            }
        })
        .collect()
}
