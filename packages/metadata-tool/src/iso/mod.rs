//! In-memory ISO 19119 / ISO 19110 documents and their XML rendering.
//!
//! Documents are plain nested records. Rendering is explicit (one function
//! per section) so element order, namespace declarations and attribute
//! order are fixed.

mod common;
mod feature_catalogue;
mod service;

pub use common::{
    BrowseGraphic, Citation, Constraints, Contact, DataQuality, DateType, KeywordBlock,
    OnlineResource, QualityReport, Text, Thesaurus,
};
pub use feature_catalogue::{
    CatalogueInfo, FeatureAttribute, FeatureCatalogue, FeatureType, ListedValue, Multiplicity,
};
pub use service::{
    Distribution, GeneralInfo, Operation, OperatesOn, ServiceIdentification, ServiceMetadata,
};

pub const NS_GMD: &str = "http://www.isotc211.org/2005/gmd";
pub const NS_GCO: &str = "http://www.isotc211.org/2005/gco";
pub const NS_GMX: &str = "http://www.isotc211.org/2005/gmx";
pub const NS_SRV: &str = "http://www.isotc211.org/2005/srv";
pub const NS_GFC: &str = "http://www.isotc211.org/2005/gfc";
pub const NS_XLINK: &str = "http://www.w3.org/1999/xlink";
pub const NS_GML: &str = "http://www.opengis.net/gml/3.2";
pub const NS_XSI: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// Root attributes of a service record, in output order.
pub const SERVICE_NAMESPACES: &[(&str, &str)] = &[
    ("xmlns:gmd", NS_GMD),
    ("xmlns:gco", NS_GCO),
    ("xmlns:gmx", NS_GMX),
    ("xmlns:srv", NS_SRV),
    ("xmlns:xlink", NS_XLINK),
    ("xmlns:gml", NS_GML),
    ("xmlns:xsi", NS_XSI),
    (
        "xsi:schemaLocation",
        "http://www.isotc211.org/2005/srv http://schemas.opengis.net/iso/19139/20060504/srv/srv.xsd",
    ),
];

/// Root attributes of a feature catalogue, in output order.
pub const FEATURE_CATALOGUE_NAMESPACES: &[(&str, &str)] = &[
    ("xmlns:gfc", NS_GFC),
    ("xmlns:gmd", NS_GMD),
    ("xmlns:gco", NS_GCO),
    ("xmlns:gmx", NS_GMX),
    ("xmlns:xlink", NS_XLINK),
    ("xmlns:xsi", NS_XSI),
    (
        "xsi:schemaLocation",
        "http://www.isotc211.org/2005/gfc http://schemas.opengis.net/iso/19139/20070417/gfc/gfc.xsd",
    ),
];
