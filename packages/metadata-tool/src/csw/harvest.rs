//! Paged harvesting of summary records and full-record retrieval.

use roxmltree::{Document, Node};
use serde::Serialize;

use super::client::CatalogueClient;
use super::query::RecordsQuery;
use crate::config::CSW_PAGE_SIZE;
use crate::error::{MetadataError, Result};
use crate::flatten::{flatten, FlatRecord};
use crate::xml::{find_child, find_descendants, get_attribute, get_tag_name, get_text, has_tag};

/// A summary record from a GetRecords response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryRecord {
    pub identifier: String,
    pub title: String,
    /// `dc:type` (e.g., "service", "dataset").
    pub record_type: Option<String>,
}

/// One page of a GetRecords response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryPage {
    pub records: Vec<SummaryRecord>,
    pub matched: Option<u32>,
    /// Start position of the next page; `None` when the catalogue is exhausted.
    pub next_record: Option<u32>,
}

/// Outcome of fetching and flattening one record.
#[derive(Debug)]
pub struct RecordOutcome {
    pub identifier: String,
    pub result: Result<FlatRecord>,
}

/// Turn an OWS exception report into an error.
fn check_exception(root: Node<'_, '_>) -> Result<()> {
    if get_tag_name(root) != "ExceptionReport" {
        return Ok(());
    }
    let exception = find_child(root, "Exception");
    let code = exception
        .and_then(|e| get_attribute(e, "exceptionCode"))
        .unwrap_or("unknown")
        .to_string();
    let message = exception
        .and_then(|e| find_child(e, "ExceptionText"))
        .map(get_text)
        .unwrap_or_default();
    Err(MetadataError::CatalogueException { code, message })
}

/// Parse a GetRecords response.
pub fn parse_summary_page(xml: &str) -> Result<SummaryPage> {
    let doc = Document::parse(xml)?;
    let root = doc.root_element();
    check_exception(root)?;

    let results = find_descendants(root, "SearchResults")
        .next()
        .ok_or_else(|| MetadataError::MissingElement {
            element: "csw:SearchResults".to_string(),
            context: get_tag_name(root).to_string(),
        })?;

    let number = |name: &str| get_attribute(results, name).and_then(|v| v.trim().parse::<u32>().ok());

    let records: Vec<SummaryRecord> = results
        .children()
        .filter(|n| has_tag(*n, "SummaryRecord") || has_tag(*n, "BriefRecord") || has_tag(*n, "Record"))
        .filter_map(|record| {
            let text = |tag: &str| find_child(record, tag).map(get_text).filter(|t| !t.is_empty());
            let identifier = text("identifier")?;
            Some(SummaryRecord {
                title: text("title").unwrap_or_default(),
                record_type: text("type"),
                identifier,
            })
        })
        .collect();

    let next_record = number("nextRecord").filter(|&n| n > 0 && !records.is_empty());

    Ok(SummaryPage {
        matched: number("numberOfRecordsMatched"),
        next_record,
        records,
    })
}

/// Fetch one page of summary records starting at `offset` (1-based).
pub fn fetch_summary_page<C: CatalogueClient + ?Sized>(
    client: &C,
    query: &RecordsQuery,
    offset: u32,
) -> Result<SummaryPage> {
    let xml = client.get_records(query, offset, CSW_PAGE_SIZE)?;
    parse_summary_page(&xml)
}

/// Fetch summary pages until the catalogue is exhausted or `limit` records
/// were collected.
///
/// Any page error aborts the harvest.
pub fn harvest_all<C: CatalogueClient + ?Sized>(
    client: &C,
    query: &RecordsQuery,
    limit: Option<usize>,
) -> Result<Vec<SummaryRecord>> {
    let mut records = Vec::new();
    let mut offset = Some(1);

    while let Some(start) = offset {
        if limit.is_some_and(|limit| records.len() >= limit) {
            break;
        }
        let page = fetch_summary_page(client, query, start)?;
        tracing::debug!(
            start,
            returned = page.records.len(),
            matched = ?page.matched,
            "Fetched summary page"
        );

        // Catalogues that keep pointing backwards would loop forever.
        offset = page.next_record.filter(|&next| next > start);
        records.extend(page.records);
    }

    if let Some(limit) = limit {
        records.truncate(limit);
    }
    Ok(records)
}

/// Fetch one full record.
pub fn fetch_full_record<C: CatalogueClient + ?Sized>(client: &C, id: &str) -> Result<String> {
    let xml = client.get_record_by_id(id)?;
    // Surface exception reports here instead of as a missing MD_Metadata later.
    let doc = Document::parse(&xml)?;
    check_exception(doc.root_element())?;
    Ok(xml)
}

/// Fetch and flatten every record; one failure does not hide the others.
pub fn fetch_and_flatten<C, S>(client: &C, ids: &[S]) -> Vec<RecordOutcome>
where
    C: CatalogueClient + ?Sized,
    S: AsRef<str>,
{
    ids.iter()
        .map(|id| {
            let id = id.as_ref();
            let result = fetch_full_record(client, id).and_then(|xml| flatten(&xml));
            if let Err(e) = &result {
                tracing::warn!(id, error = %e, "Failed to harvest record");
            }
            RecordOutcome {
                identifier: id.to_string(),
                result,
            }
        })
        .collect()
}
