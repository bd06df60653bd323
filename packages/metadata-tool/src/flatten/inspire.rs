//! INSPIRE variant detection from domain consistency reports.

use roxmltree::Node;
use serde::Serialize;

use crate::config::INTEROPERABILITY_REGULATION_MARKER;
use crate::xml::{find_by_path, find_descendants, get_text, text_at};

/// INSPIRE conformance of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InspireVariant {
    #[serde(rename = "harmonised")]
    Harmonised,
    #[serde(rename = "as-is")]
    AsIs,
}

/// One `gmd:DQ_ConformanceResult`.
struct Conformance {
    title: String,
    /// `None` for an unevaluated (nil) result.
    pass: Option<bool>,
}

fn conformance_results(metadata: Node<'_, '_>) -> Vec<Conformance> {
    find_descendants(metadata, "DQ_DomainConsistency")
        .flat_map(|report| find_descendants(report, "DQ_ConformanceResult"))
        .map(|result| Conformance {
            title: text_at(result, "specification/CI_Citation/title").unwrap_or_default(),
            pass: find_by_path(result, "pass/Boolean").and_then(|b| match get_text(b).as_str() {
                "true" | "1" => Some(true),
                "false" | "0" => Some(false),
                _ => None,
            }),
        })
        .collect()
}

/// Classify a record as harmonised, as-is or not INSPIRE.
///
/// A record is harmonised when it cites the interoperability regulation and
/// no INSPIRE report fails, and as-is when it cites the regulation but some
/// INSPIRE report fails.
pub fn inspire_variant(metadata: Node<'_, '_>) -> Option<InspireVariant> {
    let results = conformance_results(metadata);

    let cites_regulation = results
        .iter()
        .any(|r| r.title.contains(INTEROPERABILITY_REGULATION_MARKER));
    if !cites_regulation {
        return None;
    }

    let inspire_failure = results
        .iter()
        .any(|r| r.title.starts_with("INSPIRE") && r.pass == Some(false));

    Some(if inspire_failure {
        InspireVariant::AsIs
    } else {
        InspireVariant::Harmonised
    })
}
