//! Flattening of harvested ISO 19139 records into [`FlatRecord`]s.
//!
//! Extraction is structural: values are found by element path, never by
//! position. Themes and HVD categories are only taken from keyword blocks
//! whose thesaurus is the fixed INSPIRE themes or HVD citation; similar
//! looking keywords under other thesauri are ignored.

mod inspire;

use roxmltree::{Document, Node};
use serde::Serialize;
use url::Url;

use crate::config::{
    ThesaurusCitation, HVD_CATEGORY_URI_PREFIX, HVD_THESAURUS, INSPIRE_THEMES_THESAURUS,
};
use crate::error::{MetadataError, Result};
use crate::model::BoundingBox;
use crate::xml::{
    anchor_href, character_string, find_by_path, find_child, find_children, find_descendants,
    get_attribute, get_text, text_at,
};

pub use inspire::{inspire_variant, InspireVariant};

/// Host that qualifies an anchor as a license reference.
const LICENSE_HOST: &str = "creativecommons.org";

/// An HVD category referenced by a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HvdCategoryRef {
    pub id: String,
    pub label: String,
}

/// A distribution endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Endpoint {
    pub url: String,
    pub protocol: Option<String>,
    pub description: Option<String>,
}

/// Simplified view of a harvested metadata record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlatRecord {
    pub metadata_id: String,
    /// Resource identifier of the described dataset, if any.
    pub resource_id: Option<String>,
    pub hierarchy_level: Option<String>,
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub organisation_name: Option<String>,
    pub contact_email: Option<String>,
    pub contact_url: Option<String>,
    /// Keywords from blocks without a thesaurus.
    pub keywords: Vec<String>,
    pub license_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub bounding_box: Option<BoundingBox>,
    pub inspire_variant: Option<InspireVariant>,
    /// INSPIRE theme codes (e.g., "tn").
    pub inspire_themes: Vec<String>,
    pub hvd_categories: Vec<HvdCategoryRef>,
    /// INSPIRE spatial data service type, for service records.
    pub service_type: Option<String>,
    /// Metadata identifiers of coupled datasets.
    pub operates_on: Vec<String>,
    pub endpoints: Vec<Endpoint>,
}

/// Parse `xml` and flatten the first `gmd:MD_Metadata` in it.
///
/// Accepts a bare record as well as a `csw:GetRecordByIdResponse` wrapper.
pub fn flatten(xml: &str) -> Result<FlatRecord> {
    let doc = Document::parse(xml)?;
    flatten_document(&doc)
}

/// Flatten an already parsed document.
pub fn flatten_document(doc: &Document<'_>) -> Result<FlatRecord> {
    let root = doc.root_element();
    let metadata = find_descendants(root, "MD_Metadata")
        .next()
        .ok_or_else(|| MetadataError::MissingElement {
            element: "gmd:MD_Metadata".to_string(),
            context: root.tag_name().name().to_string(),
        })?;

    let metadata_id = text_at(metadata, "fileIdentifier").ok_or_else(|| {
        MetadataError::MissingElement {
            element: "gmd:fileIdentifier".to_string(),
            context: "gmd:MD_Metadata".to_string(),
        }
    })?;

    let identification = find_by_path(metadata, "identificationInfo/*");
    let ident_text = |path: &str| identification.and_then(|node| text_at(node, path));

    let contact = identification
        .and_then(|node| find_by_path(node, "pointOfContact/CI_ResponsibleParty"))
        .or_else(|| find_by_path(metadata, "contact/CI_ResponsibleParty"));
    let contact_text = |path: &str| contact.and_then(|node| text_at(node, path));

    let keyword_blocks: Vec<Node<'_, '_>> = identification
        .map(|node| find_descendants(node, "MD_Keywords").collect())
        .unwrap_or_default();

    let record = FlatRecord {
        resource_id: ident_text("citation/CI_Citation/identifier/*/code"),
        hierarchy_level: find_by_path(metadata, "hierarchyLevel/MD_ScopeCode")
            .and_then(|node| get_attribute(node, "codeListValue"))
            .map(str::to_string),
        title: ident_text("citation/CI_Citation/title").unwrap_or_default(),
        abstract_text: ident_text("abstract").unwrap_or_default(),
        organisation_name: contact_text("organisationName"),
        contact_email: contact_text("contactInfo/CI_Contact/address/CI_Address/electronicMailAddress"),
        contact_url: contact
            .and_then(|node| {
                find_by_path(node, "contactInfo/CI_Contact/onlineResource/CI_OnlineResource/linkage/URL")
            })
            .map(get_text)
            .filter(|url| !url.is_empty()),
        keywords: free_keywords(&keyword_blocks),
        license_url: license_url(metadata),
        thumbnail_url: ident_text("graphicOverview/MD_BrowseGraphic/fileName"),
        bounding_box: identification.and_then(bounding_box),
        inspire_variant: inspire_variant(metadata),
        inspire_themes: inspire_themes(&keyword_blocks),
        hvd_categories: hvd_categories(&keyword_blocks),
        service_type: identification
            .and_then(|node| find_by_path(node, "serviceType/LocalName"))
            .map(get_text)
            .filter(|t| !t.is_empty()),
        operates_on: identification.map(operates_on).unwrap_or_default(),
        endpoints: endpoints(metadata),
        metadata_id,
    };

    tracing::debug!(id = %record.metadata_id, "Flattened record");
    Ok(record)
}

/// Whether a keyword block's thesaurus is `citation`, by title or anchor.
fn has_thesaurus(block: Node<'_, '_>, citation: &ThesaurusCitation) -> bool {
    let Some(title) = find_by_path(block, "thesaurusName/CI_Citation/title") else {
        return false;
    };
    character_string(title).is_some_and(|t| t == citation.title)
        || anchor_href(title).is_some_and(|href| href.trim_end_matches('/') == citation.href)
}

fn keyword_nodes<'a, 'input>(block: Node<'a, 'input>) -> impl Iterator<Item = Node<'a, 'input>> {
    find_children(block, "keyword")
}

fn free_keywords(blocks: &[Node<'_, '_>]) -> Vec<String> {
    blocks
        .iter()
        .filter(|block| find_child(**block, "thesaurusName").is_none())
        .flat_map(|block| keyword_nodes(*block).filter_map(character_string))
        .collect()
}

/// Last path segment of a URI.
fn last_segment(uri: &str) -> &str {
    uri.trim_end_matches('/').rsplit('/').next().unwrap_or(uri)
}

fn inspire_themes(blocks: &[Node<'_, '_>]) -> Vec<String> {
    let mut themes = Vec::new();
    for block in blocks.iter().filter(|b| has_thesaurus(**b, &INSPIRE_THEMES_THESAURUS)) {
        for keyword in keyword_nodes(*block) {
            let theme = anchor_href(keyword)
                .map(|href| last_segment(href).to_string())
                .or_else(|| character_string(keyword));
            if let Some(theme) = theme {
                if !themes.contains(&theme) {
                    themes.push(theme);
                }
            }
        }
    }
    themes
}

fn hvd_categories(blocks: &[Node<'_, '_>]) -> Vec<HvdCategoryRef> {
    blocks
        .iter()
        .filter(|block| has_thesaurus(**block, &HVD_THESAURUS))
        .flat_map(|block| keyword_nodes(*block))
        .filter_map(|keyword| {
            let href = anchor_href(keyword)?;
            if !href.starts_with(HVD_CATEGORY_URI_PREFIX) {
                return None;
            }
            Some(HvdCategoryRef {
                id: last_segment(href).to_string(),
                label: character_string(keyword).unwrap_or_default(),
            })
        })
        .collect()
}

fn license_url(metadata: Node<'_, '_>) -> Option<String> {
    find_descendants(metadata, "otherConstraints")
        .filter_map(anchor_href)
        .find(|href| is_license_host(href))
        .map(str::to_string)
}

fn is_license_host(href: &str) -> bool {
    Url::parse(href)
        .ok()
        .and_then(|url| url.host_str().map(str::to_ascii_lowercase))
        .is_some_and(|host| {
            host == LICENSE_HOST || host.ends_with(&format!(".{LICENSE_HOST}"))
        })
}

fn decimal(node: Node<'_, '_>, tag: &str) -> Option<f64> {
    find_child(node, tag)
        .and_then(|n| find_child(n, "Decimal"))
        .and_then(|n| get_text(n).parse().ok())
}

fn bounding_box(identification: Node<'_, '_>) -> Option<BoundingBox> {
    let bbox = find_descendants(identification, "EX_GeographicBoundingBox").next()?;
    Some(BoundingBox {
        min_x: decimal(bbox, "westBoundLongitude")?,
        max_x: decimal(bbox, "eastBoundLongitude")?,
        min_y: decimal(bbox, "southBoundLatitude")?,
        max_y: decimal(bbox, "northBoundLatitude")?,
    })
}

fn operates_on(identification: Node<'_, '_>) -> Vec<String> {
    find_children(identification, "operatesOn")
        .filter_map(|node| {
            get_attribute(node, "uuidref")
                .or_else(|| get_attribute(node, "href"))
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        })
        .collect()
}

fn endpoints(metadata: Node<'_, '_>) -> Vec<Endpoint> {
    find_descendants(metadata, "distributionInfo")
        .flat_map(|info| find_descendants(info, "CI_OnlineResource"))
        .filter_map(|resource| {
            let url = find_by_path(resource, "linkage/URL").map(get_text)?;
            if url.is_empty() {
                return None;
            }
            Some(Endpoint {
                url,
                protocol: text_at(resource, "protocol"),
                description: text_at(resource, "description"),
            })
        })
        .collect()
}
