//! ISO 19110 feature catalogue generation.

use std::path::Path;

use super::{generate_batch, EntityOutcome, GeneratedEntry, Stage};
use crate::error::Result;
use crate::iso::{self, CatalogueInfo, Contact, FeatureCatalogue, Multiplicity};
use crate::model::{FeatureCataloguesConfig, ResolvedFeatureCatalogue};

/// Builds ISO 19110 feature catalogues.
#[derive(Debug, Default, Clone, Copy)]
pub struct FeatureCatalogueGenerator;

impl FeatureCatalogueGenerator {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Generate, serialize and write every feature catalogue of `config`.
    pub fn generate_all(
        &self,
        config: &FeatureCataloguesConfig,
        output_dir: &Path,
    ) -> Vec<EntityOutcome> {
        generate_batch(&config.feature_catalogues, output_dir, |catalogue| {
            self.generate(&config.resolved(catalogue))
        })
    }

    /// Populate catalogue info and feature types.
    pub fn generate(
        &self,
        catalogue: &ResolvedFeatureCatalogue<'_>,
    ) -> Result<GeneratedEntry<FeatureCatalogue>> {
        let mut entry: GeneratedEntry<FeatureCatalogue> = GeneratedEntry::new(catalogue.id);
        entry.document.uuid = catalogue.id.to_string();

        entry.document.info = Some(CatalogueInfo {
            name: catalogue.title.to_string(),
            scope: catalogue.scope.to_string(),
            version_number: catalogue.version.to_string(),
            version_date: catalogue.revision_date.to_string(),
            producer: Contact {
                organisation_name: catalogue.contact_organisation_name.to_string(),
                email: catalogue.contact_email.to_string(),
                url: catalogue.contact_url.to_string(),
                role: "publisher",
            },
        });
        entry.advance(Stage::GeneralInfoSet)?;

        entry.document.feature_types = catalogue
            .feature_types
            .iter()
            .map(|feature_type| iso::FeatureType {
                type_name: feature_type.name.trim().to_string(),
                definition: feature_type.definition.clone(),
                attributes: feature_type
                    .attributes
                    .iter()
                    .map(|attribute| iso::FeatureAttribute {
                        member_name: attribute.name.trim().to_string(),
                        definition: attribute.definition.clone(),
                        cardinality: attribute
                            .cardinality
                            .as_deref()
                            .map_or(Multiplicity { lower: 1, upper: Some(1) }, Multiplicity::parse),
                        value_type: attribute.value_type.clone(),
                        length: attribute.length,
                        listed_values: attribute
                            .values
                            .iter()
                            .map(|value| iso::ListedValue {
                                label: value.label.clone(),
                                code: value.code.clone(),
                                definition: value.definition.clone(),
                            })
                            .collect(),
                    })
                    .collect(),
            })
            .collect();
        entry.advance(Stage::IdentificationInfoSet)?;

        Ok(entry)
    }
}
