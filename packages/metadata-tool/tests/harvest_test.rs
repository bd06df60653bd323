//! Harvesting against a mock CSW endpoint.
//!
//! The catalogue client is blocking, so it runs on a blocking task while the
//! mock server is driven by the runtime.

use std::fs;
use std::path::Path;

use pretty_assertions::assert_eq;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use metadata_tool::csw::{
    fetch_and_flatten, harvest_all, CswClient, FilterLanguage, RecordType, RecordsQuery,
};
use metadata_tool::flatten::InspireVariant;
use metadata_tool::hvd::HvdRepository;
use metadata_tool::MetadataError;

fn load_fixture(name: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to load {}: {}", path.display(), e))
}

fn xml(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "application/xml")
}

async fn mount_catalogue(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/csw"))
        .and(query_param("request", "GetRecords"))
        .and(query_param("startPosition", "1"))
        .respond_with(xml(load_fixture("csw_summary_page1.xml")))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/csw"))
        .and(query_param("request", "GetRecords"))
        .and(query_param("startPosition", "3"))
        .respond_with(xml(load_fixture("csw_summary_page2.xml")))
        .mount(server)
        .await;

    for (id, fixture) in [
        ("a9fa7fff-6365-4885-950c-e9d9848359ee", "record_harmonised.xml"),
        ("0b9a1c2d-3e4f-4a5b-8c6d-7e8f9a0b1c2d", "record_as_is.xml"),
        ("deadbeef-0000-4000-8000-000000000000", "csw_exception.xml"),
    ] {
        Mock::given(method("GET"))
            .and(path("/csw"))
            .and(query_param("request", "GetRecordById"))
            .and(query_param("id", id))
            .respond_with(xml(load_fixture(fixture)))
            .mount(server)
            .await;
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_harvest_and_flatten_all_pages() {
    let server = MockServer::start().await;
    mount_catalogue(&server).await;
    let endpoint = format!("{}/csw", server.uri());

    let outcomes = tokio::task::spawn_blocking(move || {
        let client = CswClient::new(&endpoint, FilterLanguage::Cql)?;
        let summaries = harvest_all(&client, &RecordsQuery::default(), None)?;
        let ids: Vec<String> = summaries.into_iter().map(|s| s.identifier).collect();
        Ok::<_, MetadataError>(fetch_and_flatten(&client, &ids))
    })
    .await
    .unwrap()
    .unwrap();

    assert_eq!(outcomes.len(), 3);

    let harmonised = outcomes[0].result.as_ref().unwrap();
    assert_eq!(harmonised.inspire_variant, Some(InspireVariant::Harmonised));
    assert_eq!(harmonised.inspire_themes, vec!["tn"]);

    let as_is = outcomes[1].result.as_ref().unwrap();
    assert_eq!(as_is.inspire_variant, Some(InspireVariant::AsIs));

    // One failing record does not hide the others
    assert_eq!(outcomes[2].identifier, "deadbeef-0000-4000-8000-000000000000");
    assert!(matches!(
        &outcomes[2].result,
        Err(MetadataError::CatalogueException { code, .. }) if code == "InvalidParameterValue"
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_harvest_limit_stops_paging() {
    let server = MockServer::start().await;
    mount_catalogue(&server).await;
    let endpoint = format!("{}/csw", server.uri());

    let summaries = tokio::task::spawn_blocking(move || {
        let client = CswClient::new(&endpoint, FilterLanguage::Cql)?;
        harvest_all(&client, &RecordsQuery::default(), Some(2))
    })
    .await
    .unwrap()
    .unwrap();

    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[1].record_type.as_deref(), Some("service"));

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_constraint_is_sent_as_cql() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/csw"))
        .and(query_param("constraintLanguage", "CQL_TEXT"))
        .and(query_param("constraint", "type='service' AND OrganisationName='Beheer PDOK'"))
        .respond_with(xml(load_fixture("csw_summary_page2.xml")))
        .expect(1)
        .mount(&server)
        .await;
    let endpoint = format!("{}/csw", server.uri());

    let summaries = tokio::task::spawn_blocking(move || {
        let client = CswClient::new(&endpoint, FilterLanguage::Cql)?;
        let query = RecordsQuery {
            record_type: Some(RecordType::Service),
            organisation: Some("Beheer PDOK".to_string()),
            ..Default::default()
        };
        harvest_all(&client, &query, None)
    })
    .await
    .unwrap()
    .unwrap();

    assert_eq!(summaries.len(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_server_errors_abort_harvest_after_retries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;
    let endpoint = format!("{}/csw", server.uri());

    let result = tokio::task::spawn_blocking(move || {
        let client = CswClient::new(&endpoint, FilterLanguage::Filter)?;
        harvest_all(&client, &RecordsQuery::default(), None)
    })
    .await
    .unwrap();

    assert!(matches!(
        result,
        Err(MetadataError::RetriesExhausted { attempts: 3, .. })
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_hvd_refresh_writes_cache() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/hvd.rdf"))
        .respond_with(xml(load_fixture("hvd.rdf")))
        .mount(&server)
        .await;
    let source = format!("{}/hvd.rdf", server.uri());
    let dir = tempfile::tempdir().unwrap();
    let cache = dir.path().join("cache").join("hvd.rdf");

    let (repository, cache) = tokio::task::spawn_blocking(move || {
        let repository = HvdRepository::refresh(&cache, &source);
        (repository, cache)
    })
    .await
    .unwrap();

    assert_eq!(repository.unwrap().categories().len(), 4);
    assert!(cache.is_file());
    let cached = HvdRepository::from_rdf(&fs::read_to_string(&cache).unwrap()).unwrap();
    assert_eq!(
        cached.filtered_categories(&["c_f76b01e6"]).unwrap().len(),
        3
    );
}
