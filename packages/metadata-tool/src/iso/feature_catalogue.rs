//! ISO 19110 feature catalogue record.

use super::common::Contact;
use super::FEATURE_CATALOGUE_NAMESPACES;
use crate::error::{MetadataError, Result};
use crate::xml::XmlWriter;

/// Catalogue-level information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogueInfo {
    pub name: String,
    pub scope: String,
    pub version_number: String,
    pub version_date: String,
    pub producer: Contact,
}

/// Multiplicity of an attribute; `upper == None` means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Multiplicity {
    pub lower: u32,
    pub upper: Option<u32>,
}

impl Multiplicity {
    /// Parse `n`, `n..m` or `n..*`; anything unparsable is `1..1`.
    ///
    /// # Examples
    /// ```
    /// use metadata_tool::iso::Multiplicity;
    ///
    /// assert_eq!(Multiplicity::parse("0..*"), Multiplicity { lower: 0, upper: None });
    /// assert_eq!(Multiplicity::parse("1"), Multiplicity { lower: 1, upper: Some(1) });
    /// ```
    #[must_use]
    pub fn parse(text: &str) -> Self {
        const ONE: Multiplicity = Multiplicity {
            lower: 1,
            upper: Some(1),
        };

        let text = text.trim();
        let (lower, upper) = text.split_once("..").unwrap_or((text, text));
        let Ok(lower) = lower.trim().parse() else {
            return ONE;
        };
        let upper = match upper.trim() {
            "*" | "n" => None,
            value => match value.parse() {
                Ok(upper) => Some(upper),
                Err(_) => return ONE,
            },
        };
        Self { lower, upper }
    }
}

/// Enumerated value of an attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedValue {
    pub label: String,
    pub code: Option<String>,
    pub definition: Option<String>,
}

/// Attribute of a feature type (`FC_FeatureAttribute`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureAttribute {
    pub member_name: String,
    pub definition: Option<String>,
    pub cardinality: Multiplicity,
    pub value_type: Option<String>,
    pub length: Option<u32>,
    pub listed_values: Vec<ListedValue>,
}

/// A feature type (`FC_FeatureType`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureType {
    pub type_name: String,
    pub definition: Option<String>,
    pub attributes: Vec<FeatureAttribute>,
}

/// An ISO 19110 feature catalogue document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureCatalogue {
    pub uuid: String,
    pub info: Option<CatalogueInfo>,
    pub feature_types: Vec<FeatureType>,
}

impl FeatureCatalogue {
    /// Render as indented ISO 19139 XML.
    pub fn to_xml(&self) -> Result<Vec<u8>> {
        let info = self
            .info
            .as_ref()
            .ok_or_else(|| MetadataError::MissingElement {
                element: "catalogue info".to_string(),
                context: "gfc:FC_FeatureCatalogue".to_string(),
            })?;

        let mut attrs: Vec<(&str, &str)> = FEATURE_CATALOGUE_NAMESPACES.to_vec();
        attrs.push(("uuid", self.uuid.as_str()));

        let mut w = XmlWriter::new()?;
        w.element("gfc:FC_FeatureCatalogue", &attrs, |w| {
            w.character_string("gmx:name", &info.name)?;
            w.character_string("gmx:scope", &info.scope)?;
            w.character_string("gmx:versionNumber", &info.version_number)?;
            w.date("gmx:versionDate", &info.version_date)?;
            info.producer.write(w, "gfc:producer")?;
            for feature_type in &self.feature_types {
                write_feature_type(w, feature_type)?;
            }
            Ok(())
        })?;
        Ok(w.finish())
    }
}

fn write_feature_type(w: &mut XmlWriter, feature_type: &FeatureType) -> Result<()> {
    w.element("gfc:featureType", &[], |w| {
        w.element("gfc:FC_FeatureType", &[], |w| {
            w.element("gfc:typeName", &[], |w| {
                w.text_element("gco:LocalName", &[], &feature_type.type_name)
            })?;
            if let Some(definition) = &feature_type.definition {
                w.character_string("gfc:definition", definition)?;
            }
            w.boolean("gfc:isAbstract", false)?;
            for attribute in &feature_type.attributes {
                write_attribute(w, attribute)?;
            }
            Ok(())
        })
    })
}

fn write_attribute(w: &mut XmlWriter, attribute: &FeatureAttribute) -> Result<()> {
    w.element("gfc:carrierOfCharacteristics", &[], |w| {
        w.element("gfc:FC_FeatureAttribute", &[], |w| {
            w.element("gfc:memberName", &[], |w| {
                w.text_element("gco:LocalName", &[], &attribute.member_name)
            })?;
            if let Some(definition) = &attribute.definition {
                w.character_string("gfc:definition", definition)?;
            }
            write_multiplicity(w, attribute.cardinality)?;
            if let Some(length) = attribute.length {
                w.element("gfc:constrainedBy", &[], |w| {
                    w.element("gfc:FC_Constraint", &[], |w| {
                        w.character_string("gfc:description", &format!("Lengte: {length}"))
                    })
                })?;
            }
            if let Some(value_type) = &attribute.value_type {
                w.element("gfc:valueType", &[], |w| {
                    w.element("gco:TypeName", &[], |w| {
                        w.character_string("gco:aName", value_type)
                    })
                })?;
            }
            for value in &attribute.listed_values {
                w.element("gfc:listedValue", &[], |w| {
                    w.element("gfc:FC_ListedValue", &[], |w| {
                        w.character_string("gfc:label", &value.label)?;
                        if let Some(code) = &value.code {
                            w.character_string("gfc:code", code)?;
                        }
                        if let Some(definition) = &value.definition {
                            w.character_string("gfc:definition", definition)?;
                        }
                        Ok(())
                    })
                })?;
            }
            Ok(())
        })
    })
}

fn write_multiplicity(w: &mut XmlWriter, multiplicity: Multiplicity) -> Result<()> {
    w.element("gfc:cardinality", &[], |w| {
        w.element("gco:Multiplicity", &[], |w| {
            w.element("gco:range", &[], |w| {
                w.element("gco:MultiplicityRange", &[], |w| {
                    w.element("gco:lower", &[], |w| {
                        w.text_element("gco:Integer", &[], &multiplicity.lower.to_string())
                    })?;
                    w.element("gco:upper", &[], |w| match multiplicity.upper {
                        Some(upper) => {
                            w.text_element("gco:UnlimitedInteger", &[], &upper.to_string())
                        }
                        None => w.empty(
                            "gco:UnlimitedInteger",
                            &[("isInfinite", "true"), ("xsi:nil", "true")],
                        ),
                    })
                })
            })
        })
    })
}
