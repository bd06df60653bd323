//! End-to-end generation tests using the NWB Wegen fixture configuration.
//!
//! Documents are checked structurally by parsing the written XML.

use std::fs;
use std::path::{Path, PathBuf};

use pretty_assertions::assert_eq;
use roxmltree::{Document, Node};

use metadata_tool::codelist::CodeList;
use metadata_tool::generator::{FeatureCatalogueGenerator, ServiceGenerator};
use metadata_tool::hvd::HvdRepository;
use metadata_tool::model::{FeatureCataloguesConfig, InspireType, ServicesConfig};
use metadata_tool::xml::{
    anchor_href, character_string, find_by_path, find_child, find_children, find_descendants,
    get_attribute, get_text, text_at,
};
use metadata_tool::MetadataError;

const WMS_ID: &str = "0b9a1c2d-3e4f-4a5b-8c6d-7e8f9a0b1c2d";
const WFS_ID: &str = "1c2d3e4f-5a6b-4c7d-8e9f-0a1b2c3d4e5f";
const ATOM_ID: &str = "2d3e4f5a-6b7c-4d8e-9f0a-1b2c3d4e5f6a";
const OAF_ID: &str = "3e4f5a6b-7c8d-4e9f-8a1b-2c3d4e5f6a7b";
const OAT_ID: &str = "4f5a6b7c-8d9e-4f0a-9b2c-3d4e5f6a7b8c";

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn load_services() -> ServicesConfig {
    let mut config = ServicesConfig::load(&fixture("services.yaml")).expect("Failed to load services");
    config.initialize();
    config.validate().expect("Fixture configuration should be valid");
    config
}

fn hvd() -> HvdRepository {
    let rdf = fs::read_to_string(fixture("hvd.rdf")).expect("Failed to read HVD fixture");
    HvdRepository::from_rdf(&rdf).expect("Failed to parse HVD fixture")
}

/// Generate every service into `dir` and return the written files by ID.
fn generate_services(dir: &Path) -> Vec<(String, String)> {
    let config = load_services();
    let codelist = CodeList::embedded().expect("Embedded code lists should parse");
    let hvd = hvd();
    let outcomes = ServiceGenerator::new(&codelist, Some(&hvd)).generate_all(&config, dir);

    outcomes
        .into_iter()
        .map(|outcome| {
            let path = outcome
                .result
                .unwrap_or_else(|e| panic!("Generation of {} failed: {e}", outcome.id));
            let xml = fs::read_to_string(&path).expect("Failed to read output");
            (outcome.id, xml)
        })
        .collect()
}

fn output_for<'a>(outputs: &'a [(String, String)], id: &str) -> &'a str {
    outputs
        .iter()
        .find(|(output_id, _)| output_id == id)
        .map(|(_, xml)| xml.as_str())
        .unwrap_or_else(|| panic!("No output for {id}"))
}

fn identification<'a, 'input>(doc: &'a Document<'input>) -> Node<'a, 'input> {
    find_by_path(doc.root_element(), "identificationInfo/SV_ServiceIdentification")
        .expect("Missing SV_ServiceIdentification")
}

fn title(doc: &Document<'_>) -> String {
    text_at(identification(doc), "citation/CI_Citation/title").unwrap_or_default()
}

fn service_type(doc: &Document<'_>) -> String {
    find_by_path(identification(doc), "serviceType/LocalName")
        .map(get_text)
        .unwrap_or_default()
}

fn operation_name(doc: &Document<'_>) -> String {
    text_at(
        identification(doc),
        "containsOperations/SV_OperationMetadata/operationName",
    )
    .unwrap_or_default()
}

fn conformance_titles(doc: &Document<'_>) -> Vec<String> {
    find_descendants(doc.root_element(), "DQ_ConformanceResult")
        .filter_map(|result| text_at(result, "specification/CI_Citation/title"))
        .collect()
}

/// Keyword anchors of the block whose thesaurus title equals `thesaurus`.
fn thesaurus_keywords(doc: &Document<'_>, thesaurus: &str) -> Vec<String> {
    find_descendants(doc.root_element(), "MD_Keywords")
        .filter(|block| {
            text_at(*block, "thesaurusName/CI_Citation/title").as_deref() == Some(thesaurus)
        })
        .flat_map(|block| find_children(block, "keyword"))
        .filter_map(|keyword| anchor_href(keyword).map(str::to_string))
        .collect()
}

#[test]
fn test_initialize_infers_inspire_types() {
    let config = load_services();
    let types: Vec<_> = config.services.iter().map(|s| s.inspire_type).collect();
    assert_eq!(
        types,
        vec![
            Some(InspireType::Network),
            Some(InspireType::Network),
            Some(InspireType::Network),
            Some(InspireType::Interoperable),
            // Explicit value is kept
            Some(InspireType::Invocable),
        ]
    );
}

#[test]
fn test_every_service_is_written_as_uuid_file() {
    let dir = tempfile::tempdir().unwrap();
    let outputs = generate_services(dir.path());
    assert_eq!(outputs.len(), 5);

    for id in [WMS_ID, WFS_ID, ATOM_ID, OAF_ID, OAT_ID] {
        assert!(dir.path().join(format!("{id}.xml")).is_file(), "missing {id}.xml");
    }
}

#[test]
fn test_wms_network_service() {
    let dir = tempfile::tempdir().unwrap();
    let outputs = generate_services(dir.path());
    let doc = Document::parse(output_for(&outputs, WMS_ID)).unwrap();
    let root = doc.root_element();

    assert_eq!(root.tag_name().name(), "MD_Metadata");
    assert_eq!(text_at(root, "fileIdentifier").as_deref(), Some(WMS_ID));
    assert_eq!(
        find_by_path(root, "hierarchyLevel/MD_ScopeCode").and_then(|n| get_attribute(n, "codeListValue")),
        Some("service")
    );
    assert_eq!(find_by_path(root, "dateStamp/Date").map(get_text).as_deref(), Some("2024-06-01"));
    assert_eq!(
        find_by_path(root, "referenceSystemInfo/MD_ReferenceSystem/referenceSystemIdentifier/RS_Identifier/code")
            .and_then(anchor_href),
        Some("http://www.opengis.net/def/crs/EPSG/0/28992")
    );

    assert_eq!(title(&doc), "NWB Wegen WMS");
    assert_eq!(service_type(&doc), "view");
    assert_eq!(operation_name(&doc), "GetCapabilities");

    let ident = identification(&doc);
    assert_eq!(
        find_by_path(ident, "couplingType/SV_CouplingType").and_then(|n| get_attribute(n, "codeListValue")),
        Some("tight")
    );
    let operates_on = find_child(ident, "operatesOn").expect("Missing operatesOn");
    assert_eq!(
        get_attribute(operates_on, "uuidref"),
        Some("a9fa7fff-6365-4885-950c-e9d9848359ee")
    );

    assert_eq!(
        thesaurus_keywords(&doc, "GEMET - INSPIRE themes, version 1.0"),
        vec!["http://inspire.ec.europa.eu/theme/tn"]
    );

    let titles = conformance_titles(&doc);
    assert_eq!(titles.len(), 2);
    assert!(titles[0].contains("976/2009"));
    assert!(titles[1].contains("View Services"));
    assert_eq!(find_descendants(root, "DQ_ConceptualConsistency").count(), 0);
}

#[test]
fn test_wfs_carries_hvd_categories_ancestors_first() {
    let dir = tempfile::tempdir().unwrap();
    let outputs = generate_services(dir.path());
    let doc = Document::parse(output_for(&outputs, WFS_ID)).unwrap();

    assert_eq!(title(&doc), "NWB Wegen WFS");
    assert_eq!(service_type(&doc), "download");
    assert_eq!(
        thesaurus_keywords(&doc, "High-value dataset categories"),
        vec![
            "http://data.europa.eu/eli/reg_impl/2023/138/oj",
            "http://data.europa.eu/bna/c_b79e35eb",
            "http://data.europa.eu/bna/c_b151a0ba",
            "http://data.europa.eu/bna/c_f76b01e6",
        ]
    );
}

#[test]
fn test_atom_download_service() {
    let dir = tempfile::tempdir().unwrap();
    let outputs = generate_services(dir.path());
    let doc = Document::parse(output_for(&outputs, ATOM_ID)).unwrap();

    assert_eq!(title(&doc), "NWB Wegen ATOM");
    assert_eq!(service_type(&doc), "download");
    assert_eq!(operation_name(&doc), "Download");
    assert!(thesaurus_keywords(&doc, "High-value dataset categories").is_empty());
}

#[test]
fn test_oaf_interoperable_service() {
    let dir = tempfile::tempdir().unwrap();
    let outputs = generate_services(dir.path());
    let doc = Document::parse(output_for(&outputs, OAF_ID)).unwrap();
    let root = doc.root_element();

    assert_eq!(title(&doc), "NWB Wegen OGC API Features");
    assert_eq!(service_type(&doc), "other");
    assert_eq!(operation_name(&doc), "GetLandingPage");
    assert_eq!(
        thesaurus_keywords(&doc, "Classificatie van spatial data services"),
        vec!["http://inspire.ec.europa.eu/metadata-codelist/Category/interoperable"]
    );

    let titles = conformance_titles(&doc);
    assert!(titles[0].starts_with("VERORDENING (EU) Nr. 1089/2010"));

    // Only the configured quality of service values are reported
    let measures: Vec<String> = find_descendants(root, "DQ_ConceptualConsistency")
        .filter_map(|report| text_at(report, "nameOfMeasure"))
        .collect();
    assert_eq!(measures, vec!["availability", "performance"]);
    let values: Vec<String> = find_descendants(root, "Record").map(get_text).collect();
    assert_eq!(values, vec!["99.5", "0.5"]);

    let profile = find_descendants(root, "applicationProfile")
        .next()
        .and_then(character_string);
    assert_eq!(profile.as_deref(), Some("other"));
}

#[test]
fn test_oat_invocable_service_keeps_title_override() {
    let dir = tempfile::tempdir().unwrap();
    let outputs = generate_services(dir.path());
    let doc = Document::parse(output_for(&outputs, OAT_ID)).unwrap();

    assert_eq!(title(&doc), "NWB Wegen vector tiles");
    assert_eq!(
        thesaurus_keywords(&doc, "Classificatie van spatial data services"),
        vec!["http://inspire.ec.europa.eu/metadata-codelist/Category/invocable"]
    );
    let titles = conformance_titles(&doc);
    assert_eq!(titles.len(), 1);
    assert!(titles[0].starts_with("INSPIRE Technical Guidance"));
}

#[test]
fn test_generation_is_idempotent() {
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();

    let a = generate_services(first.path());
    let b = generate_services(second.path());
    assert_eq!(a, b);
}

#[test]
fn test_batch_continues_after_failing_entity() {
    let mut config = load_services();
    config.services[1].overrides.license_url = Some("https://example.com/eigen-licentie".to_string());

    let codelist = CodeList::embedded().unwrap();
    let hvd = hvd();
    let dir = tempfile::tempdir().unwrap();
    let outcomes = ServiceGenerator::new(&codelist, Some(&hvd)).generate_all(&config, dir.path());

    assert_eq!(outcomes.len(), 5);
    let failed: Vec<&str> = outcomes
        .iter()
        .filter(|o| !o.is_success())
        .map(|o| o.id.as_str())
        .collect();
    assert_eq!(failed, vec![WFS_ID]);
    assert!(matches!(
        &outcomes[1].result,
        Err(MetadataError::Lookup { kind: "license", .. })
    ));
    assert!(!dir.path().join(format!("{WFS_ID}.xml")).exists());
    assert!(dir.path().join(format!("{OAT_ID}.xml")).exists());
}

#[test]
fn test_unknown_hvd_category_names_entity() {
    let mut config = load_services();
    config.services[1].overrides.hvd_categories = Some(vec!["c_unknown".to_string()]);

    let codelist = CodeList::embedded().unwrap();
    let hvd = hvd();
    let dir = tempfile::tempdir().unwrap();
    let outcomes = ServiceGenerator::new(&codelist, Some(&hvd)).generate_all(&config, dir.path());

    let err = outcomes[1].result.as_ref().unwrap_err();
    assert!(matches!(
        err,
        MetadataError::Lookup { entity_id, kind: "HVD category", key }
            if entity_id == WFS_ID && key == "c_unknown"
    ));
    assert!(err.to_string().contains(WFS_ID));
    assert_eq!(outcomes.iter().filter(|o| o.is_success()).count(), 4);
}

#[test]
fn test_missing_hvd_thesaurus_fails_only_hvd_services() {
    let config = load_services();
    let codelist = CodeList::embedded().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let outcomes = ServiceGenerator::new(&codelist, None).generate_all(&config, dir.path());

    let failed: Vec<&str> = outcomes
        .iter()
        .filter(|o| !o.is_success())
        .map(|o| o.id.as_str())
        .collect();
    assert_eq!(failed, vec![WFS_ID]);
    assert!(matches!(
        &outcomes[1].result,
        Err(MetadataError::Lookup { kind: "HVD thesaurus", .. })
    ));
}

#[test]
fn test_invalid_configuration_reports_every_violation() {
    let mut config = ServicesConfig::load(&fixture("invalid_services.yaml")).unwrap();
    config.initialize();
    let violations = config.violations();
    let messages: Vec<String> = violations.violations.iter().map(ToString::to_string).collect();
    let all = messages.join("\n");

    assert!(all.contains("exactly one INSPIRE theme"), "{all}");
    assert!(all.contains("duplicate id"), "{all}");
    assert!(all.contains("(entities 0 and 1)"), "{all}");
    assert!(all.contains("accessPoint is required"), "{all}");
    assert!(all.contains("'not-a-uuid' is not a valid UUID"), "{all}");
    assert!(all.contains("revisionDate '2024-13-01'"), "{all}");
    assert!(matches!(config.validate(), Err(MetadataError::Validation(_))));
}

#[test]
fn test_feature_catalogues() {
    let config = FeatureCataloguesConfig::load(&fixture("feature_catalogues.yaml")).unwrap();
    config.validate().unwrap();

    let dir = tempfile::tempdir().unwrap();
    let outcomes = FeatureCatalogueGenerator::new().generate_all(&config, dir.path());
    assert!(outcomes.iter().all(|o| o.is_success()));

    let path = dir.path().join("5d8c1b2a-3e4f-4a6b-8c9d-0e1f2a3b4c5d.xml");
    let xml = fs::read_to_string(path).unwrap();
    let doc = Document::parse(&xml).unwrap();
    let root = doc.root_element();

    assert_eq!(root.tag_name().name(), "FC_FeatureCatalogue");
    assert_eq!(get_attribute(root, "uuid"), Some("5d8c1b2a-3e4f-4a6b-8c9d-0e1f2a3b4c5d"));
    assert_eq!(text_at(root, "versionNumber").as_deref(), Some("2.1"));

    let type_names: Vec<String> = find_descendants(root, "FC_FeatureType")
        .filter_map(|ft| find_by_path(ft, "typeName/LocalName").map(get_text))
        .collect();
    assert_eq!(type_names, vec!["wegvakken", "hectopunten"]);

    let codes: Vec<String> = find_descendants(root, "FC_ListedValue")
        .filter_map(|value| text_at(value, "code"))
        .collect();
    assert_eq!(codes, vec!["R", "P", "G"]);
    assert!(xml.contains("Lengte: 80"));

    // Version falls back to the revision date
    let path = dir.path().join("6e9d2c3b-4f5a-4b7c-9d0e-1f2a3b4c5d6e.xml");
    let xml = fs::read_to_string(path).unwrap();
    let doc = Document::parse(&xml).unwrap();
    assert_eq!(text_at(doc.root_element(), "versionNumber").as_deref(), Some("2024-06-01"));
}
