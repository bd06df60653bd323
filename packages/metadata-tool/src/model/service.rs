//! Service configuration: entities, initialization and validation.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::types::{
    BoundingBox, Globals, InspireDatasetType, InspireType, Overridable, Protocol, Thumbnail,
};
use super::{load_config, resolve, MetadataEntity};
use crate::config::{validate_date, validate_uuid};
use crate::error::{MetadataError, Result, ValidationError};

/// One service that produces an ISO 19119 record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceConfig {
    /// Metadata identifier (UUID).
    #[serde(default)]
    pub id: String,

    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub protocol: Option<Protocol>,

    /// Endpoint URL of the service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_point: Option<String>,

    /// Explicit INSPIRE classification; inferred by
    /// [`ServicesConfig::initialize`] when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inspire_type: Option<InspireType>,

    #[serde(flatten)]
    pub overrides: Overridable,
}

impl MetadataEntity for ServiceConfig {
    fn id(&self) -> &str {
        &self.id
    }
}

/// A service configuration file: `{globals, services}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServicesConfig {
    #[serde(default)]
    pub globals: Globals,

    #[serde(default)]
    pub services: Vec<ServiceConfig>,
}

/// Every field of a service after resolution against the globals.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedService<'a> {
    pub id: &'a str,
    pub protocol: Option<Protocol>,
    pub access_point: &'a str,
    pub inspire_type: Option<InspireType>,
    pub inspire_dataset_type: Option<InspireDatasetType>,
    /// Title set on the service itself; used verbatim.
    pub title_override: Option<&'a str>,
    /// Global title; gets the protocol suffix appended.
    pub global_title: &'a str,
    pub creation_date: &'a str,
    pub revision_date: &'a str,
    pub abstract_text: &'a str,
    pub keywords: &'a [String],
    pub contact_organisation_name: &'a str,
    pub contact_email: &'a str,
    pub contact_url: &'a str,
    pub license_url: &'a str,
    pub bounding_box: Option<BoundingBox>,
    pub thumbnails: &'a [Thumbnail],
    pub availability: Option<f64>,
    pub performance: Option<f64>,
    pub capacity: Option<f64>,
    pub inspire_themes: &'a [String],
    pub hvd_categories: &'a [String],
    pub dataset_metadata_ids: &'a [String],
    pub reference_system: Option<&'a str>,
}

impl<'a> ResolvedService<'a> {
    /// Resolve every overridable field of `service` against `globals`.
    #[must_use]
    pub fn new(service: &'a ServiceConfig, globals: &'a Globals) -> Self {
        let own = &service.overrides;
        let global = &globals.fields;

        Self {
            id: service.id.trim(),
            protocol: service.protocol,
            access_point: service.access_point.as_deref().unwrap_or("").trim(),
            inspire_type: service.inspire_type,
            inspire_dataset_type: globals.inspire_dataset_type,
            title_override: own.title.as_deref(),
            global_title: global.title.as_deref().unwrap_or(""),
            creation_date: resolve(own.creation_date.as_deref(), global.creation_date.as_deref(), ""),
            revision_date: resolve(own.revision_date.as_deref(), global.revision_date.as_deref(), ""),
            abstract_text: resolve(own.abstract_text.as_deref(), global.abstract_text.as_deref(), ""),
            keywords: resolve(own.keywords.as_deref(), global.keywords.as_deref(), &[]),
            contact_organisation_name: resolve(
                own.contact_organisation_name.as_deref(),
                global.contact_organisation_name.as_deref(),
                "",
            ),
            contact_email: resolve(own.contact_email.as_deref(), global.contact_email.as_deref(), ""),
            contact_url: resolve(own.contact_url.as_deref(), global.contact_url.as_deref(), ""),
            license_url: resolve(own.license_url.as_deref(), global.license_url.as_deref(), ""),
            bounding_box: resolve(own.bounding_box.map(Some), global.bounding_box.map(Some), None),
            thumbnails: resolve(own.thumbnails.as_deref(), global.thumbnails.as_deref(), &[]),
            availability: resolve(own.availability.map(Some), global.availability.map(Some), None),
            performance: resolve(own.performance.map(Some), global.performance.map(Some), None),
            capacity: resolve(own.capacity.map(Some), global.capacity.map(Some), None),
            inspire_themes: resolve(own.inspire_themes.as_deref(), global.inspire_themes.as_deref(), &[]),
            hvd_categories: resolve(own.hvd_categories.as_deref(), global.hvd_categories.as_deref(), &[]),
            dataset_metadata_ids: resolve(
                own.dataset_metadata_ids.as_deref(),
                global.dataset_metadata_ids.as_deref(),
                &[],
            ),
            reference_system: resolve(
                own.reference_system.as_deref().map(Some),
                global.reference_system.as_deref().map(Some),
                None,
            ),
        }
    }

    /// Whether the service falls under INSPIRE.
    #[must_use]
    pub fn is_inspire(&self) -> bool {
        self.inspire_type.is_some()
    }

    /// The resolved title before any protocol suffix is applied.
    #[must_use]
    pub fn base_title(&self) -> &'a str {
        self.title_override.unwrap_or(self.global_title)
    }
}

impl ServicesConfig {
    /// Load a service configuration from YAML or JSON.
    pub fn load(path: &Path) -> Result<Self> {
        load_config(path)
    }

    /// Infer the INSPIRE classification of every service that has none.
    ///
    /// Does nothing unless the globals carry an `inspireDatasetType`. An
    /// explicit `inspireType` on a service is never replaced.
    pub fn initialize(&mut self) {
        let Some(dataset_type) = self.globals.inspire_dataset_type else {
            return;
        };

        for service in &mut self.services {
            if service.inspire_type.is_some() {
                continue;
            }
            if let Some(protocol) = service.protocol {
                let inferred = InspireType::infer(dataset_type, protocol);
                tracing::debug!(
                    id = %service.id,
                    inspire_type = inferred.as_str(),
                    "Inferred INSPIRE type"
                );
                service.inspire_type = Some(inferred);
            }
        }
    }

    /// Resolved view of one service.
    #[must_use]
    pub fn resolved<'a>(&'a self, service: &'a ServiceConfig) -> ResolvedService<'a> {
        ResolvedService::new(service, &self.globals)
    }

    /// Whether any service resolves to at least one HVD category.
    #[must_use]
    pub fn needs_hvd(&self) -> bool {
        self.services
            .iter()
            .any(|service| !self.resolved(service).hvd_categories.is_empty())
    }

    /// Collect every rule violation across all services.
    #[must_use]
    pub fn violations(&self) -> ValidationError {
        let mut errors = ValidationError::new();
        let mut seen: HashMap<String, usize> = HashMap::new();

        for (index, service) in self.services.iter().enumerate() {
            let resolved = self.resolved(service);
            let id = resolved.id;

            check_id(&mut errors, &mut seen, index, id);

            if service.protocol.is_none() {
                errors.push(index, id, "type", "type is required");
            }
            require(&mut errors, index, id, "accessPoint", resolved.access_point);
            require(&mut errors, index, id, "title", resolved.base_title());
            check_date(&mut errors, index, id, "creationDate", resolved.creation_date);
            check_date(&mut errors, index, id, "revisionDate", resolved.revision_date);
            require(&mut errors, index, id, "abstract", resolved.abstract_text);
            if resolved.keywords.iter().all(|k| k.trim().is_empty()) {
                errors.push(index, id, "keywords", "at least one keyword is required");
            }
            require(
                &mut errors,
                index,
                id,
                "contactOrganisationName",
                resolved.contact_organisation_name,
            );
            require(&mut errors, index, id, "contactEmail", resolved.contact_email);
            require(&mut errors, index, id, "contactUrl", resolved.contact_url);
            require(&mut errors, index, id, "licenseUrl", resolved.license_url);

            check_inspire(&mut errors, index, &resolved);
        }

        errors
    }

    /// Validate the configuration, reporting every violation at once.
    ///
    /// Call after [`initialize`](Self::initialize) so inferred INSPIRE types
    /// take part in the theme rules.
    pub fn validate(&self) -> Result<()> {
        self.violations().into_result().map_err(MetadataError::from)
    }
}

/// Identifier presence, format and uniqueness.
pub(super) fn check_id(
    errors: &mut ValidationError,
    seen: &mut HashMap<String, usize>,
    index: usize,
    id: &str,
) {
    if id.is_empty() {
        errors.push(index, id, "id", "id is required");
        return;
    }
    if validate_uuid(id).is_err() {
        errors.push(index, id, "id", format!("id '{id}' is not a valid UUID"));
    }
    let key = id.to_lowercase();
    if let Some(first) = seen.get(&key).copied() {
        errors.push(
            index,
            id,
            "id",
            format!("duplicate id '{id}' (entities {first} and {index})"),
        );
    } else {
        seen.insert(key, index);
    }
}

pub(super) fn require(
    errors: &mut ValidationError,
    index: usize,
    id: &str,
    field: &str,
    value: &str,
) {
    if value.trim().is_empty() {
        errors.push(index, id, field, format!("{field} is required"));
    }
}

pub(super) fn check_date(
    errors: &mut ValidationError,
    index: usize,
    id: &str,
    field: &str,
    value: &str,
) {
    if value.trim().is_empty() {
        errors.push(index, id, field, format!("{field} is required"));
    } else if validate_date(value.trim()).is_err() {
        errors.push(
            index,
            id,
            field,
            format!("{field} '{value}' is not a valid YYYY-MM-DD date"),
        );
    }
}

/// Theme rules that tie INSPIRE classification and themes together.
fn check_inspire(errors: &mut ValidationError, index: usize, resolved: &ResolvedService<'_>) {
    let id = resolved.id;
    let themes = resolved
        .inspire_themes
        .iter()
        .filter(|t| !t.trim().is_empty())
        .count();

    if resolved.inspire_dataset_type == Some(InspireDatasetType::Harmonised) {
        if themes != 1 {
            errors.push(
                index,
                id,
                "inspireThemes",
                format!("HARMONISED dataset type requires exactly one INSPIRE theme, found {themes}"),
            );
        }
    } else if let Some(inspire_type) = resolved.inspire_type {
        if themes == 0 {
            errors.push(
                index,
                id,
                "inspireThemes",
                format!(
                    "inspireType '{}' requires at least one INSPIRE theme",
                    inspire_type.as_str()
                ),
            );
        }
    }

    if themes > 0 && resolved.inspire_type.is_none() {
        errors.push(
            index,
            id,
            "inspireType",
            "INSPIRE themes require an inspireType",
        );
    }
}
