//! ISO 19119 service metadata record.

use super::common::{
    write_extent, BrowseGraphic, Citation, Constraints, Contact, DataQuality, KeywordBlock,
    OnlineResource, Text,
};
use super::SERVICE_NAMESPACES;
use crate::error::{MetadataError, Result};
use crate::model::BoundingBox;
use crate::xml::XmlWriter;

/// Metadata about the record itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneralInfo {
    pub file_identifier: String,
    pub language: String,
    pub character_set: &'static str,
    pub hierarchy_level: &'static str,
    pub contact: Contact,
    pub date_stamp: String,
    pub standard_name: String,
    pub standard_version: String,
    /// Coordinate reference system as code anchor.
    pub reference_system: Option<Text>,
}

/// Operation offered by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    pub name: String,
    pub connect_point: String,
}

/// Link to the metadata of a dataset the service operates on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatesOn {
    pub uuidref: String,
    pub href: String,
}

/// Service identification (`srv:SV_ServiceIdentification`).
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceIdentification {
    pub citation: Citation,
    pub abstract_text: String,
    pub point_of_contact: Contact,
    pub thumbnails: Vec<BrowseGraphic>,
    pub keyword_blocks: Vec<KeywordBlock>,
    pub constraints: Constraints,
    /// INSPIRE spatial data service type ("view", "download", "other").
    pub service_type: String,
    pub service_type_version: String,
    pub extent: Option<BoundingBox>,
    /// `SV_CouplingType` value.
    pub coupling_type: &'static str,
    pub operation: Operation,
    pub operates_on: Vec<OperatesOn>,
}

/// Distribution section with the service endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Distribution {
    pub online_resources: Vec<OnlineResource>,
}

/// An ISO 19119 service metadata document.
///
/// Sections are filled one at a time; a document can only be serialized
/// once general info, identification and distribution are set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServiceMetadata {
    pub general: Option<GeneralInfo>,
    pub identification: Option<ServiceIdentification>,
    pub distribution: Option<Distribution>,
    pub data_quality: Option<DataQuality>,
}

fn missing(element: &str) -> MetadataError {
    MetadataError::MissingElement {
        element: element.to_string(),
        context: "gmd:MD_Metadata".to_string(),
    }
}

impl ServiceMetadata {
    /// Render as indented ISO 19139 XML.
    pub fn to_xml(&self) -> Result<Vec<u8>> {
        let general = self.general.as_ref().ok_or_else(|| missing("general info"))?;
        let identification = self
            .identification
            .as_ref()
            .ok_or_else(|| missing("gmd:identificationInfo"))?;
        let distribution = self
            .distribution
            .as_ref()
            .ok_or_else(|| missing("gmd:distributionInfo"))?;

        let mut w = XmlWriter::new()?;
        w.element("gmd:MD_Metadata", SERVICE_NAMESPACES, |w| {
            write_general(w, general)?;
            write_identification(w, identification)?;
            write_distribution(w, distribution)?;
            if let Some(data_quality) = &self.data_quality {
                data_quality.write(w)?;
            }
            Ok(())
        })?;
        Ok(w.finish())
    }
}

fn write_general(w: &mut XmlWriter, general: &GeneralInfo) -> Result<()> {
    w.character_string("gmd:fileIdentifier", &general.file_identifier)?;
    w.code_value("gmd:language", "gmd:LanguageCode", &general.language)?;
    w.code_value(
        "gmd:characterSet",
        "gmd:MD_CharacterSetCode",
        general.character_set,
    )?;
    w.code_value("gmd:hierarchyLevel", "gmd:MD_ScopeCode", general.hierarchy_level)?;
    w.character_string("gmd:hierarchyLevelName", general.hierarchy_level)?;
    general.contact.write(w, "gmd:contact")?;
    w.date("gmd:dateStamp", &general.date_stamp)?;
    w.character_string("gmd:metadataStandardName", &general.standard_name)?;
    w.character_string("gmd:metadataStandardVersion", &general.standard_version)?;
    if let Some(reference_system) = &general.reference_system {
        w.element("gmd:referenceSystemInfo", &[], |w| {
            w.element("gmd:MD_ReferenceSystem", &[], |w| {
                w.element("gmd:referenceSystemIdentifier", &[], |w| {
                    w.element("gmd:RS_Identifier", &[], |w| {
                        reference_system.write(w, "gmd:code")
                    })
                })
            })
        })?;
    }
    Ok(())
}

fn write_identification(w: &mut XmlWriter, id: &ServiceIdentification) -> Result<()> {
    w.element("gmd:identificationInfo", &[], |w| {
        w.element("srv:SV_ServiceIdentification", &[], |w| {
            id.citation.write(w, "gmd:citation")?;
            w.character_string("gmd:abstract", &id.abstract_text)?;
            id.point_of_contact.write(w, "gmd:pointOfContact")?;
            for thumbnail in &id.thumbnails {
                thumbnail.write(w)?;
            }
            for block in &id.keyword_blocks {
                block.write(w)?;
            }
            id.constraints.write(w)?;

            w.element("srv:serviceType", &[], |w| {
                w.text_element("gco:LocalName", &[], &id.service_type)
            })?;
            w.character_string("srv:serviceTypeVersion", &id.service_type_version)?;
            if let Some(bbox) = &id.extent {
                write_extent(w, "srv:extent", bbox)?;
            }
            w.code_value("srv:couplingType", "srv:SV_CouplingType", id.coupling_type)?;

            w.element("srv:containsOperations", &[], |w| {
                w.element("srv:SV_OperationMetadata", &[], |w| {
                    w.character_string("srv:operationName", &id.operation.name)?;
                    w.code_value("srv:DCP", "srv:DCPList", "WebServices")?;
                    w.element("srv:connectPoint", &[], |w| {
                        w.element("gmd:CI_OnlineResource", &[], |w| {
                            w.element("gmd:linkage", &[], |w| {
                                w.text_element("gmd:URL", &[], &id.operation.connect_point)
                            })
                        })
                    })
                })
            })?;

            for operates_on in &id.operates_on {
                w.empty(
                    "srv:operatesOn",
                    &[
                        ("uuidref", operates_on.uuidref.as_str()),
                        ("xlink:href", operates_on.href.as_str()),
                    ],
                )?;
            }
            Ok(())
        })
    })
}

fn write_distribution(w: &mut XmlWriter, distribution: &Distribution) -> Result<()> {
    w.element("gmd:distributionInfo", &[], |w| {
        w.element("gmd:MD_Distribution", &[], |w| {
            w.element("gmd:transferOptions", &[], |w| {
                w.element("gmd:MD_DigitalTransferOptions", &[], |w| {
                    for resource in &distribution.online_resources {
                        resource.write(w)?;
                    }
                    Ok(())
                })
            })
        })
    })
}
