//! High-value dataset (HVD) category thesaurus.
//!
//! The EU publishes the HVD categories as a SKOS thesaurus in RDF/XML. Each
//! category is a `Description` (or `Concept`) node:
//!
//! ```xml
//! <rdf:Description rdf:about="http://data.europa.eu/bna/c_b151a0ba">
//!   <rdf:type rdf:resource="http://www.w3.org/2004/02/skos/core#Concept"/>
//!   <skos:broader rdf:resource="http://data.europa.eu/bna/c_b79e35eb"/>
//!   <skos:prefLabel xml:lang="nl">Spoorwegen</skos:prefLabel>
//!   <skos:prefLabel xml:lang="en">Railways</skos:prefLabel>
//!   <dc:identifier>c_b151a0ba</dc:identifier>
//!   <euvoc:order>2</euvoc:order>
//! </rdf:Description>
//! ```
//!
//! The thesaurus is cached on disk. A cached copy is trusted as-is; use
//! [`HvdRepository::refresh`] to download it again.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use roxmltree::{Document, Node};
use serde::Serialize;

use crate::error::{MetadataError, Result};
use crate::http::{create_client, download_text};
use crate::xml::{element_children, get_attribute, get_tag_name, get_text, has_tag};

/// A single high-value dataset category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HvdCategory {
    /// Category identifier (e.g., "c_ac64a52d").
    pub id: String,

    /// Identifier of the broader category, `None` for roots.
    pub parent_id: Option<String>,

    /// Display order among siblings.
    pub order: u32,

    pub label_dutch: String,

    pub label_english: String,
}

impl HvdCategory {
    /// Full category URI.
    #[must_use]
    pub fn uri(&self) -> String {
        format!("{}{}", crate::config::HVD_CATEGORY_URI_PREFIX, self.id)
    }
}

/// In-memory category forest.
#[derive(Debug, Clone, Default)]
pub struct HvdRepository {
    /// Sorted by (order, id).
    categories: Vec<HvdCategory>,
    index: HashMap<String, usize>,
}

impl HvdRepository {
    /// Build a repository from already parsed categories.
    #[must_use]
    pub fn new(mut categories: Vec<HvdCategory>) -> Self {
        categories.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.id.cmp(&b.id)));
        let index = categories
            .iter()
            .enumerate()
            .map(|(i, category)| (category.id.clone(), i))
            .collect();
        Self { categories, index }
    }

    /// Parse the thesaurus from RDF/XML.
    pub fn from_rdf(xml: &str) -> Result<Self> {
        let doc = Document::parse(xml).map_err(|e| MetadataError::RdfParse(e.to_string()))?;
        let categories: Vec<HvdCategory> = doc
            .descendants()
            .filter(|n| has_tag(*n, "Description") || has_tag(*n, "Concept"))
            .filter_map(parse_category)
            .collect();

        if categories.is_empty() {
            return Err(MetadataError::RdfParse(
                "no HVD categories found in thesaurus".to_string(),
            ));
        }

        tracing::debug!(count = categories.len(), "Parsed HVD categories");
        Ok(Self::new(categories))
    }

    /// Load the thesaurus from the cache, downloading it first when the
    /// cache file does not exist.
    pub fn load(cache_path: &Path, source_url: &str) -> Result<Self> {
        if cache_path.exists() {
            tracing::debug!(path = %cache_path.display(), "Using cached HVD thesaurus");
            let xml = fs::read_to_string(cache_path)?;
            return Self::from_rdf(&xml);
        }
        Self::refresh(cache_path, source_url)
    }

    /// Download the thesaurus and overwrite the cache.
    pub fn refresh(cache_path: &Path, source_url: &str) -> Result<Self> {
        tracing::info!(url = source_url, "Downloading HVD thesaurus");
        let client = create_client()?;
        let xml = download_text(&client, source_url)?;

        // Parse before caching so a broken download never replaces a good cache.
        let repository = Self::from_rdf(&xml)?;

        if let Some(parent) = cache_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(cache_path, &xml)?;
        Ok(repository)
    }

    /// All categories, ordered by display order.
    #[must_use]
    pub fn categories(&self) -> &[HvdCategory] {
        &self.categories
    }

    /// Category by identifier.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&HvdCategory> {
        self.index.get(id.trim()).map(|&i| &self.categories[i])
    }

    /// The requested categories together with all of their ancestors.
    ///
    /// Every requested category contributes its path from the root; paths
    /// are merged in request order without duplicates, so ancestors always
    /// precede their descendants.
    ///
    /// # Errors
    /// `HvdCategoryNotFound` when a requested identifier is unknown.
    pub fn filtered_categories<S: AsRef<str>>(&self, ids: &[S]) -> Result<Vec<HvdCategory>> {
        let mut result = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();

        for id in ids {
            let id = id.as_ref().trim();
            let category = self
                .get(id)
                .ok_or_else(|| MetadataError::HvdCategoryNotFound(id.to_string()))?;

            let mut path = vec![category];
            let mut visited: HashSet<&str> = HashSet::from([category.id.as_str()]);
            let mut parent_id = category.parent_id.as_deref();

            while let Some(pid) = parent_id {
                if !visited.insert(pid) {
                    tracing::warn!(category = pid, "Cycle in HVD thesaurus, stopping walk");
                    break;
                }
                let Some(parent) = self.get(pid) else {
                    tracing::warn!(category = pid, "Broader HVD category missing from thesaurus");
                    break;
                };
                path.push(parent);
                parent_id = parent.parent_id.as_deref();
            }

            for category in path.into_iter().rev() {
                if seen.insert(category.id.as_str()) {
                    result.push(category.clone());
                }
            }
        }

        Ok(result)
    }
}

/// Last path segment of a URI.
fn uri_id(uri: &str) -> &str {
    uri.trim_end_matches('/').rsplit('/').next().unwrap_or(uri)
}

fn parse_category(node: Node<'_, '_>) -> Option<HvdCategory> {
    // rdf:Description nodes must declare themselves a skos:Concept.
    if get_tag_name(node) == "Description" {
        let is_concept = element_children(node).any(|child| {
            has_tag(child, "type")
                && get_attribute(child, "resource").is_some_and(|r| r.ends_with("#Concept"))
        });
        if !is_concept {
            return None;
        }
    }

    let id = element_children(node)
        .find(|child| has_tag(*child, "identifier"))
        .map(get_text)
        .filter(|text| !text.is_empty())
        .or_else(|| get_attribute(node, "about").map(|about| uri_id(about).to_string()))?;

    let parent_id = element_children(node)
        .find(|child| has_tag(*child, "broader"))
        .and_then(|child| get_attribute(child, "resource"))
        .map(|resource| uri_id(resource).to_string());

    let order = element_children(node)
        .find(|child| has_tag(*child, "order"))
        .and_then(|child| get_text(child).parse().ok())
        .unwrap_or(0);

    let label = |lang: &str| {
        element_children(node)
            .find(|child| has_tag(*child, "prefLabel") && get_attribute(*child, "lang") == Some(lang))
            .map(get_text)
            .unwrap_or_default()
    };

    Some(HvdCategory {
        label_dutch: label("nl"),
        label_english: label("en"),
        id,
        parent_id,
        order,
    })
}
