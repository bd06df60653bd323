//! Static code lists: protocols, INSPIRE service types, licenses, INSPIRE
//! themes, spatial data service categories and reference systems.
//!
//! The data ships embedded in the binary (`data/codelists.json`) and can be
//! replaced by a file with the same layout. All lookups are case-insensitive
//! and return `None` for unknown keys; callers decide whether a miss is fatal.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::error::{MetadataError, Result};

/// Code list data compiled into the binary.
const EMBEDDED_CODELISTS: &str = include_str!("../../data/codelists.json");

/// Details of a service protocol (`wms`, `wfs`, `atom`, `oaf`, `oat`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolDetails {
    pub key: String,
    /// Protocol URI used as `gmx:Anchor` reference.
    pub uri: String,
    /// Protocol label (e.g., "OGC:WMS").
    pub label: String,
    /// Protocol version advertised as `srv:serviceTypeVersion`.
    pub version: String,
    /// Release date of the protocol version.
    pub release_date: String,
    /// Suffix appended to global titles (e.g., "WMS").
    pub title_suffix: String,
    /// Service type key (`view` or `download`).
    pub service_type: String,
    /// ISO 19119 service taxonomy keyword (e.g., "infoMapAccessService").
    pub sds_category: String,
}

/// A citation of a specification document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub title: String,
    pub href: String,
    pub date: String,
}

/// INSPIRE classification of a service type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceTypeDetails {
    pub key: String,
    /// INSPIRE spatial data service type (e.g., "view").
    pub inspire_service_type: String,
    /// Technical guidance the service type conforms to.
    pub technical_guidance: Citation,
}

/// Display information for a data license.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct License {
    /// Regex the license URL must match.
    pub pattern: String,
    /// Text of the legal constraint statement.
    pub label: String,
    pub description: String,
}

/// An INSPIRE theme with its labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspireTheme {
    pub code: String,
    pub uri: String,
    pub label_dutch: String,
    pub label_english: String,
}

/// INSPIRE spatial data service category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SdsCategory {
    pub key: String,
    pub uri: String,
    pub label: String,
}

/// Coordinate reference system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceSystem {
    pub key: String,
    pub uri: String,
    pub label: String,
}

/// On-disk layout of the code list data.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CodeListFile {
    protocols: Vec<ProtocolDetails>,
    service_types: Vec<ServiceTypeDetails>,
    licenses: Vec<License>,
    inspire_themes: Vec<InspireTheme>,
    sds_categories: Vec<SdsCategory>,
    reference_systems: Vec<ReferenceSystem>,
}

/// Immutable, indexed code lists.
#[derive(Debug)]
pub struct CodeList {
    protocols: HashMap<String, ProtocolDetails>,
    service_types: HashMap<String, ServiceTypeDetails>,
    /// Declared order matters: the first matching pattern wins.
    licenses: Vec<(Regex, License)>,
    /// Indexed by both theme code and theme URI.
    inspire_themes: HashMap<String, InspireTheme>,
    sds_categories: HashMap<String, SdsCategory>,
    reference_systems: HashMap<String, ReferenceSystem>,
}

/// Normalize a lookup key.
fn normalize(key: &str) -> String {
    key.trim().to_lowercase()
}

impl CodeList {
    /// Load the code lists compiled into the binary.
    pub fn embedded() -> Result<Self> {
        Self::from_json(EMBEDDED_CODELISTS)
    }

    /// Load code lists from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Parse and index code list JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let file: CodeListFile =
            serde_json::from_str(json).map_err(|e| MetadataError::CodeListParse(e.to_string()))?;

        let licenses = file
            .licenses
            .into_iter()
            .map(|license| {
                RegexBuilder::new(&license.pattern)
                    .case_insensitive(true)
                    .build()
                    .map(|regex| (regex, license.clone()))
                    .map_err(|e| {
                        MetadataError::CodeListParse(format!(
                            "invalid license pattern '{}': {e}",
                            license.pattern
                        ))
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut inspire_themes = HashMap::new();
        for theme in file.inspire_themes {
            inspire_themes.insert(normalize(&theme.uri), theme.clone());
            inspire_themes.insert(normalize(&theme.code), theme);
        }

        Ok(Self {
            protocols: index(file.protocols, |p| &p.key),
            service_types: index(file.service_types, |s| &s.key),
            licenses,
            inspire_themes,
            sds_categories: index(file.sds_categories, |c| &c.key),
            reference_systems: index(file.reference_systems, |r| &r.key),
        })
    }

    /// Protocol details by protocol key (e.g., "wms").
    pub fn protocol(&self, key: &str) -> Option<&ProtocolDetails> {
        self.protocols.get(&normalize(key))
    }

    /// INSPIRE service type details by service type key (e.g., "view").
    pub fn service_type(&self, key: &str) -> Option<&ServiceTypeDetails> {
        self.service_types.get(&normalize(key))
    }

    /// First license whose pattern matches the license URL.
    pub fn license(&self, url: &str) -> Option<&License> {
        let url = url.trim();
        self.licenses
            .iter()
            .find(|(regex, _)| regex.is_match(url))
            .map(|(_, license)| license)
    }

    /// INSPIRE theme by code ("tn") or URI.
    pub fn inspire_theme(&self, key: &str) -> Option<&InspireTheme> {
        self.inspire_themes.get(&normalize(key))
    }

    /// Spatial data service category by key (e.g., "invocable").
    pub fn sds_category(&self, key: &str) -> Option<&SdsCategory> {
        self.sds_categories.get(&normalize(key))
    }

    /// Reference system by key (e.g., "EPSG:28992").
    pub fn reference_system(&self, key: &str) -> Option<&ReferenceSystem> {
        self.reference_systems.get(&normalize(key))
    }

    /// All known protocol keys, sorted.
    pub fn protocol_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.protocols.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}

fn index<T, F>(items: Vec<T>, key: F) -> HashMap<String, T>
where
    F: Fn(&T) -> &String,
{
    items
        .into_iter()
        .map(|item| (normalize(key(&item)), item))
        .collect()
}
