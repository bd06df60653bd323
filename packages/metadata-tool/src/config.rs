//! Configuration constants and validation functions for the metadata tool.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::{MetadataError, Result};

/// Default CSW endpoint of the Nationaal Georegister.
pub const DEFAULT_CSW_ENDPOINT: &str = "https://nationaalgeoregister.nl/geonetwork/srv/dut/csw";

/// HTTP timeout in seconds, applied to every outbound call.
pub const HTTP_TIMEOUT_SECS: u64 = 20;

/// Number of records requested per GetRecords page.
pub const CSW_PAGE_SIZE: u32 = 50;

/// Source of the EU high-value dataset category thesaurus.
pub const HVD_THESAURUS_URL: &str = "https://publications.europa.eu/resource/distribution/high-value-dataset-category/rdf/skos_core/high-value-dataset-category.rdf";

/// Default location of the cached HVD thesaurus.
pub const DEFAULT_HVD_CACHE_PATH: &str = "cache/high-value-dataset-category.rdf";

/// Metadata language (ISO 639-2/B).
pub const METADATA_LANGUAGE: &str = "dut";

/// Prefix used for ISO 19139 code list references.
pub const ISO_CODELIST_BASE: &str =
    "https://standards.iso.org/iso/19139/resources/gmxCodelists.xml";

/// Metadata standard for service records.
pub const SERVICE_STANDARD_NAME: &str = "ISO 19119";

/// Metadata standard version for service records.
pub const SERVICE_STANDARD_VERSION: &str =
    "Nederlands metadata profiel op ISO 19119 voor services 2.1.0";

/// Base URL used for `srv:operatesOn` references to dataset records.
pub const OPERATES_ON_BASE_URL: &str = "https://nationaalgeoregister.nl/geonetwork/srv/dut/csw?service=CSW&version=2.0.2&request=GetRecordById&outputschema=http://www.isotc211.org/2005/gmd&elementsetname=full&id=";

/// A thesaurus citation attached to a keyword block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThesaurusCitation {
    pub title: &'static str,
    pub href: &'static str,
    pub date: &'static str,
}

/// INSPIRE themes thesaurus (GEMET).
pub const INSPIRE_THEMES_THESAURUS: ThesaurusCitation = ThesaurusCitation {
    title: "GEMET - INSPIRE themes, version 1.0",
    href: "http://www.eionet.europa.eu/gemet/inspire_themes",
    date: "2008-06-01",
};

/// EU high-value dataset categories thesaurus.
pub const HVD_THESAURUS: ThesaurusCitation = ThesaurusCitation {
    title: "High-value dataset categories",
    href: "http://data.europa.eu/bna/asd487ae75",
    date: "2023-09-27",
};

/// ISO 19119 service taxonomy used for the service classification keyword.
pub const SERVICE_TAXONOMY_THESAURUS: ThesaurusCitation = ThesaurusCitation {
    title: "ISO - 19119 geographic services taxonomy",
    href: "https://www.iso.org/standard/39890.html",
    date: "2010-01-19",
};

/// INSPIRE spatial data service category code list.
pub const SDS_CATEGORY_THESAURUS: ThesaurusCitation = ThesaurusCitation {
    title: "Classificatie van spatial data services",
    href: "http://inspire.ec.europa.eu/metadata-codelist/Category",
    date: "2014-12-11",
};

/// Keyword that marks a record as carrying high-value dataset categories.
pub const HVD_MARKER_KEYWORD: &str = "HVD";

/// Regulation backing the high-value dataset marker keyword.
pub const HVD_MARKER_HREF: &str = "http://data.europa.eu/eli/reg_impl/2023/138/oj";

/// URI prefix of every high-value dataset category.
pub const HVD_CATEGORY_URI_PREFIX: &str = "http://data.europa.eu/bna/";

/// A conformance specification citation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecificationCitation {
    pub title: &'static str,
    pub href: &'static str,
    pub date: &'static str,
}

/// Interoperability regulation; its presence marks harmonised data.
pub const INTEROPERABILITY_REGULATION: SpecificationCitation = SpecificationCitation {
    title: "VERORDENING (EU) Nr. 1089/2010 VAN DE COMMISSIE van 23 november 2010 ter uitvoering van Richtlijn 2007/2/EG van het Europees Parlement en de Raad betreffende de interoperabiliteit van verzamelingen ruimtelijke gegevens en van diensten met betrekking tot ruimtelijke gegevens",
    href: "http://data.europa.eu/eli/reg/2010/1089",
    date: "2010-12-08",
};

/// Network services regulation.
pub const NETWORK_SERVICES_REGULATION: SpecificationCitation = SpecificationCitation {
    title: "VERORDENING (EG) Nr. 976/2009 VAN DE COMMISSIE van 19 oktober 2009 tot uitvoering van Richtlijn 2007/2/EG van het Europees Parlement en de Raad wat betreft de netwerkdiensten",
    href: "http://data.europa.eu/eli/reg/2009/976",
    date: "2009-10-20",
};

/// Technical guidance for invocable spatial data services.
pub const INVOCABLE_GUIDANCE: SpecificationCitation = SpecificationCitation {
    title: "INSPIRE Technical Guidance for implementing Spatial Data Services and services allowing spatial data services to be invoked",
    href: "https://inspire.ec.europa.eu/id/document/tg/sds",
    date: "2016-05-04",
};

/// Marker searched for in specification titles when flattening records.
pub const INTEROPERABILITY_REGULATION_MARKER: &str = "VERORDENING (EU) Nr. 1089/2010";

/// Fixed use limitation statement emitted for every record.
pub const USE_LIMITATION: &str = "Geen gebruiksbeperkingen";

/// INSPIRE "no limitations on public access" statement.
pub const INSPIRE_NO_LIMITATIONS_LABEL: &str = "Geen beperkingen";

/// INSPIRE "no limitations on public access" code list value.
pub const INSPIRE_NO_LIMITATIONS_HREF: &str =
    "http://inspire.ec.europa.eu/metadata-codelist/LimitationsOnPublicAccess/noLimitations";

/// INSPIRE spatial data service type code list base.
pub const INSPIRE_SERVICE_TYPE_BASE: &str =
    "http://inspire.ec.europa.eu/metadata-codelist/SpatialDataServiceType/";

/// INSPIRE on-line description code for access points.
pub const ACCESS_POINT_HREF: &str =
    "http://inspire.ec.europa.eu/metadata-codelist/OnLineDescriptionCode/accessPoint";

/// INSPIRE quality of service criteria code list base.
pub const QOS_CRITERIA_BASE: &str =
    "http://inspire.ec.europa.eu/metadata-codelist/QualityOfServiceCriteria/";

/// Unit of availability measurements.
pub const UOM_PERCENT: &str = "http://www.opengis.net/def/uom/UCUM/0/%25";

/// Unit of performance (response time) measurements.
pub const UOM_SECOND: &str = "http://www.opengis.net/def/uom/SI/second";

/// Unit of capacity measurements (requests).
pub const UOM_UNITY: &str = "http://www.opengis.net/def/uom/OGC/1.0/unity";

/// UUID pattern (hyphenated form only, case-insensitive).
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static UUID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$")
        .expect("valid regex")
});

/// Date pattern: YYYY-MM-DD.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static DATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid regex"));

/// Validate an entity identifier.
///
/// Identifiers end up as file names and catalogue identifiers, so only the
/// hyphenated UUID form is accepted.
///
/// # Examples
/// ```
/// use metadata_tool::config::validate_uuid;
///
/// assert!(validate_uuid("2fbd3b1e-5c3a-4c0b-9c2f-0e6d0b1f9a11").is_ok());
/// assert!(validate_uuid("not-a-uuid").is_err());
/// ```
pub fn validate_uuid(id: &str) -> Result<()> {
    if UUID_PATTERN.is_match(id) && uuid::Uuid::parse_str(id).is_ok() {
        Ok(())
    } else {
        Err(MetadataError::InvalidUuid(id.to_string()))
    }
}

/// Validate date format (YYYY-MM-DD) and that it is a real calendar date.
///
/// # Examples
/// ```
/// use metadata_tool::config::validate_date;
///
/// assert!(validate_date("2025-01-01").is_ok());
/// assert!(validate_date("invalid").is_err());
/// assert!(validate_date("2025-13-01").is_err()); // Invalid month
/// ```
pub fn validate_date(date_str: &str) -> Result<()> {
    if !DATE_PATTERN.is_match(date_str) {
        return Err(MetadataError::InvalidDate(date_str.to_string()));
    }

    chrono::NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .map_err(|_| MetadataError::InvalidDate(date_str.to_string()))?;

    Ok(())
}

/// Build the ISO 19139 code list reference for a code list name.
///
/// # Examples
/// ```
/// use metadata_tool::config::iso_codelist;
///
/// assert!(iso_codelist("CI_DateTypeCode").ends_with("#CI_DateTypeCode"));
/// ```
pub fn iso_codelist(name: &str) -> String {
    format!("{ISO_CODELIST_BASE}#{name}")
}

/// Build the `srv:operatesOn` reference for a dataset metadata record.
pub fn operates_on_url(dataset_metadata_id: &str) -> String {
    format!("{OPERATES_ON_BASE_URL}{dataset_metadata_id}")
}
