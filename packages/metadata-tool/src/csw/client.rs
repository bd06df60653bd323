//! Catalogue transport: the [`CatalogueClient`] seam and its HTTP implementation.

use reqwest::blocking::Client;
use url::Url;

use super::query::{FilterLanguage, RecordsQuery};
use crate::error::{MetadataError, Result};
use crate::http::{create_client, download_text};

/// CSW version spoken by the client.
const CSW_VERSION: &str = "2.0.2";

/// Output schema for full records.
const ISO_OUTPUT_SCHEMA: &str = "http://www.isotc211.org/2005/gmd";

/// Output schema for summary records.
const CSW_OUTPUT_SCHEMA: &str = "http://www.opengis.net/cat/csw/2.0.2";

/// Operations the harvester needs from a catalogue. Both return the raw
/// response document.
pub trait CatalogueClient {
    /// One page of summary records, starting at the 1-based `start_position`.
    fn get_records(&self, query: &RecordsQuery, start_position: u32, max_records: u32)
        -> Result<String>;

    /// One full ISO 19139 record.
    fn get_record_by_id(&self, id: &str) -> Result<String>;
}

/// Blocking CSW 2.0.2 client using HTTP GET with KVP encoding.
#[derive(Debug, Clone)]
pub struct CswClient {
    http: Client,
    endpoint: Url,
    filter_language: FilterLanguage,
}

impl CswClient {
    /// Create a client for `endpoint`.
    pub fn new(endpoint: &str, filter_language: FilterLanguage) -> Result<Self> {
        let endpoint = Url::parse(endpoint).map_err(|source| MetadataError::InvalidUrl {
            url: endpoint.to_string(),
            source,
        })?;
        Ok(Self {
            http: create_client()?,
            endpoint,
            filter_language,
        })
    }

    fn request_url(&self, params: &[(&str, &str)]) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().extend_pairs(params);
        url
    }

    /// GetRecords request URL.
    #[must_use]
    pub fn get_records_url(&self, query: &RecordsQuery, start_position: u32, max_records: u32) -> Url {
        let start_position = start_position.to_string();
        let max_records = max_records.to_string();
        let mut params = vec![
            ("service", "CSW"),
            ("version", CSW_VERSION),
            ("request", "GetRecords"),
            ("typeNames", "csw:Record"),
            ("resultType", "results"),
            ("elementSetName", "summary"),
            ("outputSchema", CSW_OUTPUT_SCHEMA),
            ("startPosition", start_position.as_str()),
            ("maxRecords", max_records.as_str()),
        ];

        let constraint = query.render(self.filter_language);
        if let Some(constraint) = constraint.as_deref() {
            params.push(("constraintLanguage", self.filter_language.as_kvp()));
            params.push(("constraint_language_version", "1.1.0"));
            params.push(("constraint", constraint));
        }

        self.request_url(&params)
    }

    /// GetRecordById request URL.
    #[must_use]
    pub fn get_record_by_id_url(&self, id: &str) -> Url {
        self.request_url(&[
            ("service", "CSW"),
            ("version", CSW_VERSION),
            ("request", "GetRecordById"),
            ("outputSchema", ISO_OUTPUT_SCHEMA),
            ("elementSetName", "full"),
            ("id", id),
        ])
    }
}

impl CatalogueClient for CswClient {
    fn get_records(
        &self,
        query: &RecordsQuery,
        start_position: u32,
        max_records: u32,
    ) -> Result<String> {
        let url = self.get_records_url(query, start_position, max_records);
        tracing::debug!(url = %url, "GetRecords");
        download_text(&self.http, url.as_str())
    }

    fn get_record_by_id(&self, id: &str) -> Result<String> {
        let url = self.get_record_by_id_url(id);
        tracing::debug!(url = %url, "GetRecordById");
        download_text(&self.http, url.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csw::RecordType;

    fn param(url: &Url, name: &str) -> Option<String> {
        url.query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }

    #[test]
    fn test_invalid_endpoint() {
        let err = CswClient::new("not a url", FilterLanguage::Cql).unwrap_err();
        assert!(matches!(err, MetadataError::InvalidUrl { .. }));
    }

    #[test]
    fn test_get_records_url_with_cql() {
        let client = CswClient::new("https://example.com/csw", FilterLanguage::Cql).unwrap();
        let query = RecordsQuery {
            record_type: Some(RecordType::Service),
            ..Default::default()
        };
        let url = client.get_records_url(&query, 51, 50);

        assert_eq!(param(&url, "request").as_deref(), Some("GetRecords"));
        assert_eq!(param(&url, "startPosition").as_deref(), Some("51"));
        assert_eq!(param(&url, "constraintLanguage").as_deref(), Some("CQL_TEXT"));
        assert_eq!(param(&url, "constraint").as_deref(), Some("type='service'"));
    }

    #[test]
    fn test_get_records_url_without_constraint() {
        let client = CswClient::new("https://example.com/csw", FilterLanguage::Filter).unwrap();
        let url = client.get_records_url(&RecordsQuery::default(), 1, 10);
        assert_eq!(param(&url, "constraint"), None);
        assert_eq!(param(&url, "maxRecords").as_deref(), Some("10"));
    }

    #[test]
    fn test_get_record_by_id_url_keeps_existing_query() {
        let client =
            CswClient::new("https://example.com/csw?lang=dut", FilterLanguage::Cql).unwrap();
        let url = client.get_record_by_id_url("abc");
        assert_eq!(param(&url, "lang").as_deref(), Some("dut"));
        assert_eq!(param(&url, "id").as_deref(), Some("abc"));
        assert_eq!(param(&url, "outputSchema").as_deref(), Some(ISO_OUTPUT_SCHEMA));
    }
}
