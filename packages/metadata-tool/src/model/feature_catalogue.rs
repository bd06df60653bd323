//! Feature catalogue configuration (ISO 19110).

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::service::{check_date, check_id, require};
use super::types::Globals;
use super::{load_config, resolve, MetadataEntity};
use crate::error::{MetadataError, Result, ValidationError};

/// A value of an enumerated attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListedValue {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
}

/// An attribute of a feature type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureAttribute {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
    /// Value type (e.g., "CharacterString", "Integer").
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub value_type: Option<String>,
    /// Cardinality in `lower..upper` notation; defaults to `1`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cardinality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<ListedValue>,
}

/// A feature type with its attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureType {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
    #[serde(default)]
    pub attributes: Vec<FeatureAttribute>,
}

/// One feature catalogue that produces an ISO 19110 record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureCatalogueConfig {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_organisation_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default)]
    pub feature_types: Vec<FeatureType>,
}

impl MetadataEntity for FeatureCatalogueConfig {
    fn id(&self) -> &str {
        &self.id
    }
}

/// A feature catalogue configuration file: `{globals, featureCatalogues}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureCataloguesConfig {
    #[serde(default)]
    pub globals: Globals,

    #[serde(default)]
    pub feature_catalogues: Vec<FeatureCatalogueConfig>,
}

/// A feature catalogue after resolution against the globals.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedFeatureCatalogue<'a> {
    pub id: &'a str,
    pub title: &'a str,
    pub creation_date: &'a str,
    pub revision_date: &'a str,
    pub contact_organisation_name: &'a str,
    pub contact_email: &'a str,
    pub contact_url: &'a str,
    /// Falls back to the revision date.
    pub version: &'a str,
    /// Falls back to the title.
    pub scope: &'a str,
    pub feature_types: &'a [FeatureType],
}

impl<'a> ResolvedFeatureCatalogue<'a> {
    #[must_use]
    pub fn new(catalogue: &'a FeatureCatalogueConfig, globals: &'a Globals) -> Self {
        let global = &globals.fields;
        let title = resolve(catalogue.title.as_deref(), global.title.as_deref(), "");
        let revision_date = resolve(
            catalogue.revision_date.as_deref(),
            global.revision_date.as_deref(),
            "",
        );

        Self {
            id: catalogue.id.trim(),
            title,
            creation_date: resolve(
                catalogue.creation_date.as_deref(),
                global.creation_date.as_deref(),
                "",
            ),
            revision_date,
            contact_organisation_name: resolve(
                catalogue.contact_organisation_name.as_deref(),
                global.contact_organisation_name.as_deref(),
                "",
            ),
            contact_email: resolve(
                catalogue.contact_email.as_deref(),
                global.contact_email.as_deref(),
                "",
            ),
            contact_url: resolve(
                catalogue.contact_url.as_deref(),
                global.contact_url.as_deref(),
                "",
            ),
            version: catalogue.version.as_deref().unwrap_or(revision_date),
            scope: catalogue.scope.as_deref().unwrap_or(title),
            feature_types: &catalogue.feature_types,
        }
    }
}

impl FeatureCataloguesConfig {
    /// Load a feature catalogue configuration from YAML or JSON.
    pub fn load(path: &Path) -> Result<Self> {
        load_config(path)
    }

    #[must_use]
    pub fn resolved<'a>(
        &'a self,
        catalogue: &'a FeatureCatalogueConfig,
    ) -> ResolvedFeatureCatalogue<'a> {
        ResolvedFeatureCatalogue::new(catalogue, &self.globals)
    }

    /// Collect every rule violation across all feature catalogues.
    #[must_use]
    pub fn violations(&self) -> ValidationError {
        let mut errors = ValidationError::new();
        let mut seen = HashMap::new();

        for (index, catalogue) in self.feature_catalogues.iter().enumerate() {
            let resolved = self.resolved(catalogue);
            let id = resolved.id;

            check_id(&mut errors, &mut seen, index, id);
            require(&mut errors, index, id, "title", resolved.title);
            check_date(&mut errors, index, id, "creationDate", resolved.creation_date);
            check_date(&mut errors, index, id, "revisionDate", resolved.revision_date);
            require(
                &mut errors,
                index,
                id,
                "contactOrganisationName",
                resolved.contact_organisation_name,
            );

            if catalogue.feature_types.is_empty() {
                errors.push(
                    index,
                    id,
                    "featureTypes",
                    "at least one feature type is required",
                );
            }
            for (type_index, feature_type) in catalogue.feature_types.iter().enumerate() {
                if feature_type.name.trim().is_empty() {
                    errors.push(
                        index,
                        id,
                        format!("featureTypes[{type_index}].name"),
                        "feature type name is required",
                    );
                }
                for (attr_index, attribute) in feature_type.attributes.iter().enumerate() {
                    if attribute.name.trim().is_empty() {
                        errors.push(
                            index,
                            id,
                            format!("featureTypes[{type_index}].attributes[{attr_index}].name"),
                            "attribute name is required",
                        );
                    }
                }
            }
        }

        errors
    }

    /// Validate the configuration, reporting every violation at once.
    pub fn validate(&self) -> Result<()> {
        self.violations().into_result().map_err(MetadataError::from)
    }
}
