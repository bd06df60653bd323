//! Shared configuration types: globals, enums and small value records.

use serde::{Deserialize, Serialize};

/// Service protocol of a service entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Wms,
    Wfs,
    Atom,
    /// OGC API Features.
    Oaf,
    /// OGC API (Vector) Tiles.
    Oat,
}

impl Protocol {
    /// Code list key of the protocol.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wms => "wms",
            Self::Wfs => "wfs",
            Self::Atom => "atom",
            Self::Oaf => "oaf",
            Self::Oat => "oat",
        }
    }

    /// OGC API protocols are spatial data services rather than network services.
    #[must_use]
    pub fn is_ogc_api(&self) -> bool {
        matches!(self, Self::Oaf | Self::Oat)
    }
}

/// INSPIRE status of the datasets a configuration describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InspireDatasetType {
    #[serde(rename = "HARMONISED")]
    Harmonised,
    #[serde(rename = "AS_IS")]
    AsIs,
}

impl InspireDatasetType {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Harmonised => "HARMONISED",
            Self::AsIs => "AS_IS",
        }
    }
}

/// INSPIRE classification of a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InspireType {
    /// Network service (view or download).
    Network,
    /// Interoperable spatial data service.
    Interoperable,
    /// Invocable spatial data service.
    Invocable,
}

impl InspireType {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Interoperable => "interoperable",
            Self::Invocable => "invocable",
        }
    }

    /// Infer the service classification from the dataset type and protocol.
    ///
    /// | protocol         | HARMONISED    | AS_IS     |
    /// |------------------|---------------|-----------|
    /// | wms, wfs, atom   | network       | network   |
    /// | oaf, oat         | interoperable | invocable |
    ///
    /// # Examples
    /// ```
    /// use metadata_tool::model::{InspireDatasetType, InspireType, Protocol};
    ///
    /// assert_eq!(
    ///     InspireType::infer(InspireDatasetType::AsIs, Protocol::Oaf),
    ///     InspireType::Invocable
    /// );
    /// ```
    #[must_use]
    pub fn infer(dataset_type: InspireDatasetType, protocol: Protocol) -> Self {
        match (protocol.is_ogc_api(), dataset_type) {
            (false, _) => Self::Network,
            (true, InspireDatasetType::Harmonised) => Self::Interoperable,
            (true, InspireDatasetType::AsIs) => Self::Invocable,
        }
    }
}

/// Geographic bounding box in WGS 84 degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

/// Browse graphic of a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thumbnail {
    /// URL of the image.
    pub file: String,
    #[serde(default)]
    pub description: Option<String>,
    /// MIME type or extension (e.g., "png").
    #[serde(default)]
    pub filetype: Option<String>,
}

/// Fields that can be set globally and overridden per entity.
///
/// Every field is optional; resolution is done by [`super::resolve`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Overridable {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision_date: Option<String>,
    #[serde(default, rename = "abstract", skip_serializing_if = "Option::is_none")]
    pub abstract_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_organisation_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<BoundingBox>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnails: Option<Vec<Thumbnail>>,
    /// Availability in percent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability: Option<f64>,
    /// Response time in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performance: Option<f64>,
    /// Simultaneous requests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<f64>,
    /// INSPIRE theme codes (e.g., "tn") or URIs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inspire_themes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hvd_categories: Option<Vec<String>>,
    /// Metadata identifiers of the datasets a service operates on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset_metadata_ids: Option<Vec<String>>,
    /// Reference system key (e.g., "EPSG:28992").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_system: Option<String>,
}

/// Global defaults shared by every entity of a configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Globals {
    #[serde(flatten)]
    pub fields: Overridable,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inspire_dataset_type: Option<InspireDatasetType>,
}
