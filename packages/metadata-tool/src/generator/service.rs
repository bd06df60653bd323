//! ISO 19119 service metadata generation.

use std::path::Path;

use super::{generate_batch, EntityOutcome, GeneratedEntry, Stage};
use crate::codelist::{CodeList, ProtocolDetails, ServiceTypeDetails};
use crate::config::{
    operates_on_url, ACCESS_POINT_HREF, HVD_MARKER_HREF, HVD_MARKER_KEYWORD, HVD_THESAURUS,
    INSPIRE_NO_LIMITATIONS_HREF, INSPIRE_NO_LIMITATIONS_LABEL, INSPIRE_SERVICE_TYPE_BASE,
    INSPIRE_THEMES_THESAURUS, INTEROPERABILITY_REGULATION, INVOCABLE_GUIDANCE,
    METADATA_LANGUAGE, NETWORK_SERVICES_REGULATION, QOS_CRITERIA_BASE, SDS_CATEGORY_THESAURUS,
    SERVICE_STANDARD_NAME, SERVICE_STANDARD_VERSION, SERVICE_TAXONOMY_THESAURUS, UOM_PERCENT,
    UOM_SECOND, UOM_UNITY, USE_LIMITATION, SpecificationCitation, ThesaurusCitation,
};
use crate::error::{MetadataError, Result};
use crate::hvd::HvdRepository;
use crate::iso::{
    BrowseGraphic, Citation, Constraints, Contact, DataQuality, DateType, Distribution,
    GeneralInfo, KeywordBlock, OnlineResource, Operation, OperatesOn, QualityReport,
    ServiceIdentification, ServiceMetadata, Text, Thesaurus,
};
use crate::model::{InspireType, Protocol, ResolvedService, ServicesConfig};

/// Append the protocol suffix to a title unless it already ends with it.
///
/// # Examples
/// ```
/// use metadata_tool::generator::apply_title_suffix;
///
/// assert_eq!(apply_title_suffix("NWB Wegen", "WMS"), "NWB Wegen WMS");
/// assert_eq!(apply_title_suffix("NWB Wegen wms", "WMS"), "NWB Wegen wms");
/// ```
#[must_use]
pub fn apply_title_suffix(title: &str, suffix: &str) -> String {
    let title = title.trim();
    if suffix.is_empty() || title.to_lowercase().ends_with(&suffix.to_lowercase()) {
        title.to_string()
    } else {
        format!("{title} {suffix}")
    }
}

/// Lookup results shared by the identification, distribution and data
/// quality steps of one service.
struct ServiceContext<'c> {
    protocol: &'c ProtocolDetails,
    service_type: &'c ServiceTypeDetails,
    title: String,
}

impl ServiceContext<'_> {
    /// INSPIRE spatial data service type; interoperable and invocable
    /// services are "other".
    fn inspire_service_type(&self, inspire_type: Option<InspireType>) -> &str {
        match inspire_type {
            Some(InspireType::Interoperable | InspireType::Invocable) => "other",
            _ => &self.service_type.inspire_service_type,
        }
    }
}

/// Builds ISO 19119 records from resolved service configurations.
pub struct ServiceGenerator<'a> {
    codelist: &'a CodeList,
    hvd: Option<&'a HvdRepository>,
}

impl<'a> ServiceGenerator<'a> {
    /// `hvd` may be `None` when no service has HVD categories.
    #[must_use]
    pub fn new(codelist: &'a CodeList, hvd: Option<&'a HvdRepository>) -> Self {
        Self { codelist, hvd }
    }

    /// Generate, serialize and write every service of `config`.
    pub fn generate_all(&self, config: &ServicesConfig, output_dir: &Path) -> Vec<EntityOutcome> {
        generate_batch(&config.services, output_dir, |service| {
            self.generate(&config.resolved(service))
        })
    }

    /// Populate every section of one service record.
    pub fn generate(&self, service: &ResolvedService<'_>) -> Result<GeneratedEntry<ServiceMetadata>> {
        let mut entry: GeneratedEntry<ServiceMetadata> = GeneratedEntry::new(service.id);
        let context = self.context(service)?;

        entry.document.general = Some(self.general_info(service)?);
        entry.advance(Stage::GeneralInfoSet)?;

        entry.document.identification = Some(self.identification(service, &context)?);
        entry.advance(Stage::IdentificationInfoSet)?;

        entry.document.distribution = Some(distribution(service, &context));
        entry.advance(Stage::DistributionInfoSet)?;

        entry.document.data_quality = data_quality(service, &context);
        entry.advance(Stage::DataQualityInfoSet)?;

        Ok(entry)
    }

    fn lookup_error(service: &ResolvedService<'_>, kind: &'static str, key: &str) -> MetadataError {
        MetadataError::Lookup {
            entity_id: service.id.to_string(),
            kind,
            key: key.to_string(),
        }
    }

    fn context(&self, service: &ResolvedService<'_>) -> Result<ServiceContext<'a>> {
        let key = service.protocol.map(|p| p.as_str()).unwrap_or_default();
        let protocol = self
            .codelist
            .protocol(key)
            .ok_or_else(|| Self::lookup_error(service, "protocol", key))?;
        let service_type = self
            .codelist
            .service_type(&protocol.service_type)
            .ok_or_else(|| Self::lookup_error(service, "service type", &protocol.service_type))?;

        let title = match service.title_override {
            Some(title) => title.trim().to_string(),
            None => apply_title_suffix(service.global_title, &protocol.title_suffix),
        };

        Ok(ServiceContext {
            protocol,
            service_type,
            title,
        })
    }

    fn general_info(&self, service: &ResolvedService<'_>) -> Result<GeneralInfo> {
        let reference_system = service.reference_system.and_then(|key| {
            let found = self.codelist.reference_system(key);
            if found.is_none() {
                tracing::warn!(id = service.id, key, "Unknown reference system, omitting");
            }
            found.map(|rs| Text::anchor(rs.uri.clone(), rs.label.clone()))
        });

        Ok(GeneralInfo {
            file_identifier: service.id.to_string(),
            language: METADATA_LANGUAGE.to_string(),
            character_set: "utf8",
            hierarchy_level: "service",
            contact: contact(service),
            date_stamp: service.revision_date.to_string(),
            standard_name: SERVICE_STANDARD_NAME.to_string(),
            standard_version: SERVICE_STANDARD_VERSION.to_string(),
            reference_system,
        })
    }

    fn identification(
        &self,
        service: &ResolvedService<'_>,
        context: &ServiceContext<'_>,
    ) -> Result<ServiceIdentification> {
        let citation = Citation {
            title: Text::plain(context.title.clone()),
            dates: vec![
                (service.creation_date.to_string(), DateType::Creation),
                (service.revision_date.to_string(), DateType::Revision),
            ],
        };

        let thumbnails = service
            .thumbnails
            .iter()
            .map(|t| BrowseGraphic {
                file: t.file.clone(),
                description: t.description.clone(),
                filetype: t.filetype.clone(),
            })
            .collect();

        let operates_on = service
            .dataset_metadata_ids
            .iter()
            .map(|id| id.trim())
            .filter(|id| !id.is_empty())
            .map(|id| OperatesOn {
                uuidref: id.to_string(),
                href: operates_on_url(id),
            })
            .collect::<Vec<_>>();

        Ok(ServiceIdentification {
            citation,
            abstract_text: service.abstract_text.to_string(),
            point_of_contact: contact(service),
            thumbnails,
            keyword_blocks: self.keyword_blocks(service, context)?,
            constraints: self.constraints(service)?,
            service_type: context.inspire_service_type(service.inspire_type).to_string(),
            service_type_version: context.protocol.version.clone(),
            extent: service.bounding_box,
            coupling_type: if operates_on.is_empty() { "loose" } else { "tight" },
            operation: Operation {
                name: operation_name(service.protocol).to_string(),
                connect_point: service.access_point.to_string(),
            },
            operates_on,
        })
    }

    fn keyword_blocks(
        &self,
        service: &ResolvedService<'_>,
        context: &ServiceContext<'_>,
    ) -> Result<Vec<KeywordBlock>> {
        let mut blocks = Vec::new();

        let free: Vec<Text> = service
            .keywords
            .iter()
            .map(|k| k.trim())
            .filter(|k| !k.is_empty())
            .map(Text::plain)
            .collect();
        if !free.is_empty() {
            blocks.push(KeywordBlock {
                keywords: free,
                keyword_type: None,
                thesaurus: None,
            });
        }

        blocks.push(KeywordBlock {
            keywords: vec![Text::plain(context.protocol.sds_category.clone())],
            keyword_type: None,
            thesaurus: Some(thesaurus(&SERVICE_TAXONOMY_THESAURUS)),
        });

        let themes = service
            .inspire_themes
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .map(|key| {
                self.codelist
                    .inspire_theme(key)
                    .map(|theme| Text::anchor(theme.uri.clone(), theme.label_dutch.clone()))
                    .ok_or_else(|| Self::lookup_error(service, "INSPIRE theme", key))
            })
            .collect::<Result<Vec<_>>>()?;
        if !themes.is_empty() {
            blocks.push(KeywordBlock {
                keywords: themes,
                keyword_type: Some("theme"),
                thesaurus: Some(thesaurus(&INSPIRE_THEMES_THESAURUS)),
            });
        }

        if let Some(inspire_type @ (InspireType::Interoperable | InspireType::Invocable)) =
            service.inspire_type
        {
            let key = inspire_type.as_str();
            let category = self
                .codelist
                .sds_category(key)
                .ok_or_else(|| Self::lookup_error(service, "SDS category", key))?;
            blocks.push(KeywordBlock {
                keywords: vec![Text::anchor(category.uri.clone(), category.label.clone())],
                keyword_type: None,
                thesaurus: Some(thesaurus(&SDS_CATEGORY_THESAURUS)),
            });
        }

        let requested: Vec<&str> = service
            .hvd_categories
            .iter()
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .collect();
        if !requested.is_empty() {
            let repository = self
                .hvd
                .ok_or_else(|| Self::lookup_error(service, "HVD thesaurus", requested[0]))?;
            let mut keywords = vec![Text::anchor(HVD_MARKER_HREF, HVD_MARKER_KEYWORD)];
            keywords.extend(
                repository
                    .filtered_categories(&requested)
                    .map_err(|e| match e {
                        MetadataError::HvdCategoryNotFound(key) => {
                            Self::lookup_error(service, "HVD category", &key)
                        }
                        other => other,
                    })?
                    .into_iter()
                    .map(|category| Text::anchor(category.uri(), category.label_dutch)),
            );
            blocks.push(KeywordBlock {
                keywords,
                keyword_type: None,
                thesaurus: Some(thesaurus(&HVD_THESAURUS)),
            });
        }

        Ok(blocks)
    }

    fn constraints(&self, service: &ResolvedService<'_>) -> Result<Constraints> {
        let license = self
            .codelist
            .license(service.license_url)
            .ok_or_else(|| Self::lookup_error(service, "license", service.license_url))?;

        let mut other_constraints = vec![Text::anchor(service.license_url, license.label.clone())];
        if service.is_inspire() {
            other_constraints.push(Text::anchor(
                INSPIRE_NO_LIMITATIONS_HREF,
                INSPIRE_NO_LIMITATIONS_LABEL,
            ));
        }

        Ok(Constraints {
            use_limitation: USE_LIMITATION.to_string(),
            other_constraints,
        })
    }
}

fn contact(service: &ResolvedService<'_>) -> Contact {
    Contact {
        organisation_name: service.contact_organisation_name.to_string(),
        email: service.contact_email.to_string(),
        url: service.contact_url.to_string(),
        role: "pointOfContact",
    }
}

fn thesaurus(citation: &ThesaurusCitation) -> Thesaurus {
    Thesaurus {
        title: Text::anchor(citation.href, citation.title),
        date: citation.date.to_string(),
    }
}

fn operation_name(protocol: Option<Protocol>) -> &'static str {
    match protocol {
        Some(Protocol::Wms | Protocol::Wfs) => "GetCapabilities",
        Some(Protocol::Atom) => "Download",
        Some(Protocol::Oaf | Protocol::Oat) | None => "GetLandingPage",
    }
}

fn distribution(service: &ResolvedService<'_>, context: &ServiceContext<'_>) -> Distribution {
    let application_profile = service.inspire_type.map(|inspire_type| {
        let service_type = context.inspire_service_type(Some(inspire_type));
        Text::anchor(format!("{INSPIRE_SERVICE_TYPE_BASE}{service_type}"), service_type)
    });

    Distribution {
        online_resources: vec![OnlineResource {
            linkage: service.access_point.to_string(),
            protocol: Text::anchor(
                context.protocol.uri.clone(),
                context.protocol.label.clone(),
            ),
            application_profile,
            name: context.title.clone(),
            description: Text::anchor(ACCESS_POINT_HREF, "accessPoint"),
        }],
    }
}

fn conformance(specification: &SpecificationCitation, explanation: &str) -> QualityReport {
    QualityReport::Conformance {
        specification: Citation::published(
            Text::anchor(specification.href, specification.title),
            specification.date,
        ),
        explanation: explanation.to_string(),
        pass: true,
    }
}

fn quality_of_service(criterion: &str, description: &str, unit: &str, value: f64) -> QualityReport {
    QualityReport::Quantitative {
        measure: Text::anchor(format!("{QOS_CRITERIA_BASE}{criterion}"), criterion),
        description: description.to_string(),
        unit_href: unit.to_string(),
        value,
    }
}

/// Conformance and quality of service reports; `None` for non-INSPIRE services.
fn data_quality(service: &ResolvedService<'_>, context: &ServiceContext<'_>) -> Option<DataQuality> {
    let reports = match service.inspire_type? {
        InspireType::Network => {
            let guidance = &context.service_type.technical_guidance;
            vec![
                conformance(
                    &NETWORK_SERVICES_REGULATION,
                    "De service is conform de INSPIRE verordening netwerkdiensten",
                ),
                QualityReport::Conformance {
                    specification: Citation::published(
                        Text::anchor(guidance.href.clone(), guidance.title.clone()),
                        guidance.date.clone(),
                    ),
                    explanation: "De service is conform de technische richtlijn".to_string(),
                    pass: true,
                },
            ]
        }
        InspireType::Interoperable => {
            let mut reports = vec![
                conformance(
                    &INTEROPERABILITY_REGULATION,
                    "De service is conform de INSPIRE verordening interoperabiliteit",
                ),
                conformance(
                    &INVOCABLE_GUIDANCE,
                    "De service voldoet aan de eisen voor een interoperabele spatial data service",
                ),
            ];
            let measured = [
                ("availability", "Beschikbaarheid in procenten", UOM_PERCENT, service.availability),
                ("performance", "Responstijd in seconden", UOM_SECOND, service.performance),
                ("capacity", "Aantal gelijktijdige verzoeken", UOM_UNITY, service.capacity),
            ];
            reports.extend(measured.into_iter().filter_map(|(criterion, description, unit, value)| {
                value.map(|v| quality_of_service(criterion, description, unit, v))
            }));
            reports
        }
        InspireType::Invocable => vec![conformance(
            &INVOCABLE_GUIDANCE,
            "De service voldoet aan de eisen voor een invocable spatial data service",
        )],
    };

    Some(DataQuality {
        level: "service",
        reports,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BoundingBox, Globals, InspireDatasetType, ServiceConfig};

    fn config() -> ServicesConfig {
        let yaml = r"
globals:
  title: NWB Wegen
  creationDate: '2024-01-01'
  revisionDate: '2024-06-01'
  abstract: Wegen in Nederland
  keywords: [wegen]
  contactOrganisationName: Rijkswaterstaat
  contactEmail: info@rws.nl
  contactUrl: https://www.rijkswaterstaat.nl
  licenseUrl: http://creativecommons.org/publicdomain/zero/1.0/deed.nl
services:
  - id: 2fbd3b1e-5c3a-4c0b-9c2f-0e6d0b1f9a11
    type: wms
    accessPoint: https://service.pdok.nl/rws/nwbwegen/wms/v1_0
";
        serde_yaml_ng::from_str(yaml).unwrap()
    }

    fn generate(config: &ServicesConfig) -> Result<GeneratedEntry<ServiceMetadata>> {
        let codelist = CodeList::embedded().unwrap();
        ServiceGenerator::new(&codelist, None).generate(&config.resolved(&config.services[0]))
    }

    #[test]
    fn test_title_suffix() {
        assert_eq!(apply_title_suffix("NWB Wegen", "WMS"), "NWB Wegen WMS");
        assert_eq!(apply_title_suffix("NWB Wegen WMS", "WMS"), "NWB Wegen WMS");
        assert_eq!(
            apply_title_suffix("NWB Wegen", "OGC API (Vector) Tiles"),
            "NWB Wegen OGC API (Vector) Tiles"
        );
    }

    #[test]
    fn test_generate_reaches_data_quality_stage() {
        let entry = generate(&config()).unwrap();
        assert_eq!(entry.stage(), Stage::DataQualityInfoSet);

        let identification = entry.document.identification.unwrap();
        assert_eq!(identification.citation.title.value, "NWB Wegen WMS");
        assert_eq!(identification.service_type, "view");
        assert_eq!(identification.coupling_type, "loose");
        // Not INSPIRE: no data quality, only the license statement
        assert!(entry.document.data_quality.is_none());
        assert_eq!(identification.constraints.other_constraints.len(), 1);
    }

    #[test]
    fn test_title_override_is_verbatim() {
        let mut config = config();
        config.services[0].overrides.title = Some("Eigen titel".to_string());
        let entry = generate(&config).unwrap();
        assert_eq!(
            entry.document.identification.unwrap().citation.title.value,
            "Eigen titel"
        );
    }

    #[test]
    fn test_unknown_license_is_lookup_error() {
        let mut config = config();
        config.globals.fields.license_url = Some("https://example.com/license".to_string());
        let err = generate(&config).unwrap_err();
        assert_eq!(
            err.to_string(),
            "No license found for 'https://example.com/license' (entity 2fbd3b1e-5c3a-4c0b-9c2f-0e6d0b1f9a11)"
        );
    }

    #[test]
    fn test_hvd_without_thesaurus_is_lookup_error() {
        let mut config = config();
        config.globals.fields.hvd_categories = Some(vec!["c_ac64a52d".to_string()]);
        let err = generate(&config).unwrap_err();
        assert!(matches!(err, MetadataError::Lookup { kind: "HVD thesaurus", .. }));
    }

    #[test]
    fn test_interoperable_quality_reports_only_resolved_values() {
        let mut config = ServicesConfig {
            globals: Globals {
                inspire_dataset_type: Some(InspireDatasetType::Harmonised),
                ..config().globals
            },
            services: vec![ServiceConfig {
                protocol: Some(Protocol::Oaf),
                ..config().services[0].clone()
            }],
        };
        config.globals.fields.inspire_themes = Some(vec!["tn".to_string()]);
        config.globals.fields.availability = Some(99.0);
        config.globals.fields.capacity = Some(20.0);
        config.globals.fields.bounding_box = Some(BoundingBox {
            min_x: 3.2,
            max_x: 7.2,
            min_y: 50.7,
            max_y: 53.6,
        });
        config.initialize();

        let entry = generate(&config).unwrap();
        let reports = entry.document.data_quality.unwrap().reports;
        let quantitative = reports
            .iter()
            .filter(|r| matches!(r, QualityReport::Quantitative { .. }))
            .count();
        assert_eq!(reports.len(), 4);
        assert_eq!(quantitative, 2);
    }
}
