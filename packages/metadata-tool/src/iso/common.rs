//! ISO 19139 building blocks shared by service and feature catalogue records.
//!
//! Each record renders itself as the content of an ISO property element; the
//! caller picks the property name.

use crate::error::Result;
use crate::model::BoundingBox;
use crate::xml::XmlWriter;

/// Free text that may carry a reference (`gmx:Anchor`) or not (`gco:CharacterString`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Text {
    pub value: String,
    pub href: Option<String>,
}

impl Text {
    #[must_use]
    pub fn plain(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            href: None,
        }
    }

    #[must_use]
    pub fn anchor(href: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            href: Some(href.into()),
        }
    }

    pub fn write(&self, w: &mut XmlWriter, property: &str) -> Result<()> {
        w.free_text(property, &self.value, self.href.as_deref())
    }
}

/// `CI_DateTypeCode` values used in citations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateType {
    Creation,
    Publication,
    Revision,
}

impl DateType {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Creation => "creation",
            Self::Publication => "publication",
            Self::Revision => "revision",
        }
    }
}

/// A dated reference to a document (`CI_Citation`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Citation {
    pub title: Text,
    pub dates: Vec<(String, DateType)>,
}

impl Citation {
    /// Citation of a published document with a single publication date.
    #[must_use]
    pub fn published(title: Text, date: impl Into<String>) -> Self {
        Self {
            title,
            dates: vec![(date.into(), DateType::Publication)],
        }
    }

    pub fn write(&self, w: &mut XmlWriter, property: &str) -> Result<()> {
        w.element(property, &[], |w| {
            w.element("gmd:CI_Citation", &[], |w| {
                self.title.write(w, "gmd:title")?;
                for (date, date_type) in &self.dates {
                    write_ci_date(w, date, *date_type)?;
                }
                Ok(())
            })
        })
    }
}

fn write_ci_date(w: &mut XmlWriter, date: &str, date_type: DateType) -> Result<()> {
    w.element("gmd:date", &[], |w| {
        w.element("gmd:CI_Date", &[], |w| {
            w.date("gmd:date", date)?;
            w.code_value("gmd:dateType", "gmd:CI_DateTypeCode", date_type.as_str())
        })
    })
}

/// A responsible party (`CI_ResponsibleParty`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contact {
    pub organisation_name: String,
    pub email: String,
    pub url: String,
    /// `CI_RoleCode` value (e.g., "pointOfContact").
    pub role: &'static str,
}

impl Contact {
    pub fn write(&self, w: &mut XmlWriter, property: &str) -> Result<()> {
        w.element(property, &[], |w| {
            w.element("gmd:CI_ResponsibleParty", &[], |w| {
                w.character_string("gmd:organisationName", &self.organisation_name)?;
                w.element("gmd:contactInfo", &[], |w| {
                    w.element("gmd:CI_Contact", &[], |w| {
                        w.element("gmd:address", &[], |w| {
                            w.element("gmd:CI_Address", &[], |w| {
                                w.character_string("gmd:electronicMailAddress", &self.email)
                            })
                        })?;
                        if !self.url.is_empty() {
                            w.element("gmd:onlineResource", &[], |w| {
                                w.element("gmd:CI_OnlineResource", &[], |w| {
                                    w.element("gmd:linkage", &[], |w| {
                                        w.text_element("gmd:URL", &[], &self.url)
                                    })
                                })
                            })?;
                        }
                        Ok(())
                    })
                })?;
                w.code_value("gmd:role", "gmd:CI_RoleCode", self.role)
            })
        })
    }
}

/// A thesaurus reference for a keyword block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thesaurus {
    pub title: Text,
    pub date: String,
}

/// A block of keywords (`MD_Keywords`), optionally bound to a thesaurus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordBlock {
    pub keywords: Vec<Text>,
    /// `MD_KeywordTypeCode` value.
    pub keyword_type: Option<&'static str>,
    pub thesaurus: Option<Thesaurus>,
}

impl KeywordBlock {
    pub fn write(&self, w: &mut XmlWriter) -> Result<()> {
        w.element("gmd:descriptiveKeywords", &[], |w| {
            w.element("gmd:MD_Keywords", &[], |w| {
                for keyword in &self.keywords {
                    keyword.write(w, "gmd:keyword")?;
                }
                if let Some(keyword_type) = self.keyword_type {
                    w.code_value("gmd:type", "gmd:MD_KeywordTypeCode", keyword_type)?;
                }
                if let Some(thesaurus) = &self.thesaurus {
                    Citation::published(thesaurus.title.clone(), thesaurus.date.clone())
                        .write(w, "gmd:thesaurusName")?;
                }
                Ok(())
            })
        })
    }
}

/// Use limitation plus legal constraints of a resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraints {
    pub use_limitation: String,
    /// Statements rendered as `gmd:otherConstraints`, in order.
    pub other_constraints: Vec<Text>,
}

impl Constraints {
    pub fn write(&self, w: &mut XmlWriter) -> Result<()> {
        w.element("gmd:resourceConstraints", &[], |w| {
            w.element("gmd:MD_Constraints", &[], |w| {
                w.character_string("gmd:useLimitation", &self.use_limitation)
            })
        })?;
        w.element("gmd:resourceConstraints", &[], |w| {
            w.element("gmd:MD_LegalConstraints", &[], |w| {
                w.code_value(
                    "gmd:accessConstraints",
                    "gmd:MD_RestrictionCode",
                    "otherRestrictions",
                )?;
                for statement in &self.other_constraints {
                    statement.write(w, "gmd:otherConstraints")?;
                }
                Ok(())
            })
        })
    }
}

/// Browse graphic (`MD_BrowseGraphic`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowseGraphic {
    pub file: String,
    pub description: Option<String>,
    pub filetype: Option<String>,
}

impl BrowseGraphic {
    pub fn write(&self, w: &mut XmlWriter) -> Result<()> {
        w.element("gmd:graphicOverview", &[], |w| {
            w.element("gmd:MD_BrowseGraphic", &[], |w| {
                w.character_string("gmd:fileName", &self.file)?;
                if let Some(description) = &self.description {
                    w.character_string("gmd:fileDescription", description)?;
                }
                if let Some(filetype) = &self.filetype {
                    w.character_string("gmd:fileType", filetype)?;
                }
                Ok(())
            })
        })
    }
}

/// Geographic extent as `EX_Extent` with a single bounding box.
pub fn write_extent(w: &mut XmlWriter, property: &str, bbox: &BoundingBox) -> Result<()> {
    w.element(property, &[], |w| {
        w.element("gmd:EX_Extent", &[], |w| {
            w.element("gmd:geographicElement", &[], |w| {
                w.element("gmd:EX_GeographicBoundingBox", &[], |w| {
                    w.decimal("gmd:westBoundLongitude", bbox.min_x)?;
                    w.decimal("gmd:eastBoundLongitude", bbox.max_x)?;
                    w.decimal("gmd:southBoundLatitude", bbox.min_y)?;
                    w.decimal("gmd:northBoundLatitude", bbox.max_y)
                })
            })
        })
    })
}

/// A distribution endpoint (`CI_OnlineResource`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnlineResource {
    pub linkage: String,
    pub protocol: Text,
    pub application_profile: Option<Text>,
    pub name: String,
    pub description: Text,
}

impl OnlineResource {
    pub fn write(&self, w: &mut XmlWriter) -> Result<()> {
        w.element("gmd:onLine", &[], |w| {
            w.element("gmd:CI_OnlineResource", &[], |w| {
                w.element("gmd:linkage", &[], |w| {
                    w.text_element("gmd:URL", &[], &self.linkage)
                })?;
                self.protocol.write(w, "gmd:protocol")?;
                if let Some(profile) = &self.application_profile {
                    profile.write(w, "gmd:applicationProfile")?;
                }
                w.character_string("gmd:name", &self.name)?;
                self.description.write(w, "gmd:description")
            })
        })
    }
}

/// A data quality report.
#[derive(Debug, Clone, PartialEq)]
pub enum QualityReport {
    /// Conformance to a specification (`DQ_DomainConsistency`).
    Conformance {
        specification: Citation,
        explanation: String,
        pass: bool,
    },
    /// A measured quality of service value (`DQ_ConceptualConsistency`).
    Quantitative {
        measure: Text,
        description: String,
        unit_href: String,
        value: f64,
    },
}

impl QualityReport {
    pub fn write(&self, w: &mut XmlWriter) -> Result<()> {
        w.element("gmd:report", &[], |w| match self {
            Self::Conformance {
                specification,
                explanation,
                pass,
            } => w.element("gmd:DQ_DomainConsistency", &[], |w| {
                w.element("gmd:result", &[], |w| {
                    w.element("gmd:DQ_ConformanceResult", &[], |w| {
                        specification.write(w, "gmd:specification")?;
                        w.character_string("gmd:explanation", explanation)?;
                        w.boolean("gmd:pass", *pass)
                    })
                })
            }),
            Self::Quantitative {
                measure,
                description,
                unit_href,
                value,
            } => w.element("gmd:DQ_ConceptualConsistency", &[], |w| {
                measure.write(w, "gmd:nameOfMeasure")?;
                w.character_string("gmd:measureDescription", description)?;
                w.element("gmd:result", &[], |w| {
                    w.element("gmd:DQ_QuantitativeResult", &[], |w| {
                        w.empty("gmd:valueUnit", &[("xlink:href", unit_href.as_str())])?;
                        w.element("gmd:value", &[], |w| {
                            w.text_element("gco:Record", &[], &value.to_string())
                        })
                    })
                })
            }),
        })
    }
}

/// Data quality section (`DQ_DataQuality`).
#[derive(Debug, Clone, PartialEq)]
pub struct DataQuality {
    /// `MD_ScopeCode` value (e.g., "service").
    pub level: &'static str,
    pub reports: Vec<QualityReport>,
}

impl DataQuality {
    pub fn write(&self, w: &mut XmlWriter) -> Result<()> {
        w.element("gmd:dataQualityInfo", &[], |w| {
            w.element("gmd:DQ_DataQuality", &[], |w| {
                w.element("gmd:scope", &[], |w| {
                    w.element("gmd:DQ_Scope", &[], |w| {
                        w.code_value("gmd:level", "gmd:MD_ScopeCode", self.level)?;
                        w.element("gmd:levelDescription", &[], |w| {
                            w.element("gmd:MD_ScopeDescription", &[], |w| {
                                w.character_string("gmd:other", self.level)
                            })
                        })
                    })
                })?;
                for report in &self.reports {
                    report.write(w)?;
                }
                Ok(())
            })
        })
    }
}
