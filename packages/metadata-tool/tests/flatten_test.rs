//! Flattening of harvested records and of records generated by this crate.

use std::fs;
use std::path::{Path, PathBuf};

use pretty_assertions::assert_eq;

use metadata_tool::codelist::CodeList;
use metadata_tool::flatten::{flatten, Endpoint, HvdCategoryRef, InspireVariant};
use metadata_tool::generator::ServiceGenerator;
use metadata_tool::hvd::HvdRepository;
use metadata_tool::model::{BoundingBox, ServicesConfig};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn load_fixture(name: &str) -> String {
    let path = fixture(name);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to load {}: {}", path.display(), e))
}

#[test]
fn test_flatten_harmonised_dataset() {
    let record = flatten(&load_fixture("record_harmonised.xml")).unwrap();

    assert_eq!(record.metadata_id, "a9fa7fff-6365-4885-950c-e9d9848359ee");
    assert_eq!(record.resource_id.as_deref(), Some("NWB_WEGEN"));
    assert_eq!(record.hierarchy_level.as_deref(), Some("dataset"));
    assert_eq!(record.title, "Nationaal Wegenbestand - Wegen");
    assert!(record.abstract_text.starts_with("Alle wegen"));
    assert_eq!(record.organisation_name.as_deref(), Some("Rijkswaterstaat WVL"));
    assert_eq!(record.contact_email.as_deref(), Some("servicedesk-data@rws.nl"));
    assert_eq!(record.contact_url.as_deref(), Some("https://www.rijkswaterstaat.nl"));
    assert_eq!(record.keywords, vec!["wegen", "infrastructuur"]);
    assert_eq!(
        record.license_url.as_deref(),
        Some("http://creativecommons.org/publicdomain/zero/1.0/deed.nl")
    );
    assert_eq!(
        record.thumbnail_url.as_deref(),
        Some("https://www.nationaalgeoregister.nl/thumbnails/nwb.png")
    );
    assert_eq!(
        record.bounding_box,
        Some(BoundingBox {
            min_x: 3.2,
            max_x: 7.22,
            min_y: 50.75,
            max_y: 53.7,
        })
    );
    assert_eq!(record.inspire_variant, Some(InspireVariant::Harmonised));
    assert_eq!(record.inspire_themes, vec!["tn"]);
    assert_eq!(record.service_type, None);
    assert!(record.operates_on.is_empty());
}

#[test]
fn test_hvd_categories_only_from_hvd_thesaurus() {
    let record = flatten(&load_fixture("record_harmonised.xml")).unwrap();

    // The marker keyword and the category under a local thesaurus are skipped
    assert_eq!(
        record.hvd_categories,
        vec![
            HvdCategoryRef {
                id: "c_b79e35eb".to_string(),
                label: "Mobiliteit".to_string(),
            },
            HvdCategoryRef {
                id: "c_f76b01e6".to_string(),
                label: "Wegen".to_string(),
            },
        ]
    );
}

#[test]
fn test_endpoints() {
    let record = flatten(&load_fixture("record_harmonised.xml")).unwrap();
    assert_eq!(
        record.endpoints,
        vec![
            Endpoint {
                url: "https://service.pdok.nl/rws/nwbwegen/wms/v1_0".to_string(),
                protocol: Some("OGC:WMS".to_string()),
                description: Some("Wegvakken".to_string()),
            },
            Endpoint {
                url: "https://service.pdok.nl/rws/nwbwegen/atom/index.xml".to_string(),
                protocol: Some("INSPIRE Atom".to_string()),
                description: None,
            },
        ]
    );
}

#[test]
fn test_flatten_as_is_service() {
    let record = flatten(&load_fixture("record_as_is.xml")).unwrap();

    assert_eq!(record.hierarchy_level.as_deref(), Some("service"));
    assert_eq!(record.inspire_variant, Some(InspireVariant::AsIs));
    assert_eq!(record.service_type.as_deref(), Some("view"));
    // Contact falls back to the metadata contact
    assert_eq!(record.organisation_name.as_deref(), Some("Beheer PDOK"));
    assert_eq!(record.contact_email.as_deref(), Some("beheerpdok@kadaster.nl"));
    assert_eq!(record.contact_url, None);
    assert_eq!(
        record.license_url.as_deref(),
        Some("https://creativecommons.org/licenses/by/4.0/deed.nl")
    );
    // Theme without anchor keeps its label
    assert_eq!(record.inspire_themes, vec!["Vervoersnetwerken"]);
    assert_eq!(
        record.operates_on,
        vec![
            "a9fa7fff-6365-4885-950c-e9d9848359ee",
            "https://nationaalgeoregister.nl/geonetwork/srv/dut/csw?id=other",
        ]
    );
    assert_eq!(record.bounding_box, None);
}

#[test]
fn test_flattened_record_json_field_names() {
    let record = flatten(&load_fixture("record_as_is.xml")).unwrap();
    let json = serde_json::to_value(&record).unwrap();

    assert_eq!(json["inspire_variant"], "as-is");
    assert_eq!(json["abstract"], "Weergave van het Nationaal Wegenbestand.");
    assert!(json["hvd_categories"].as_array().unwrap().is_empty());
}

#[test]
fn test_flatten_generated_records() {
    let mut config = ServicesConfig::load(&fixture("services.yaml")).unwrap();
    config.initialize();
    let codelist = CodeList::embedded().unwrap();
    let hvd = HvdRepository::from_rdf(&load_fixture("hvd.rdf")).unwrap();
    let generator = ServiceGenerator::new(&codelist, Some(&hvd));

    let mut wfs = generator
        .generate(&config.resolved(&config.services[1]))
        .unwrap();
    wfs.serialize().unwrap();
    let record = flatten(std::str::from_utf8(wfs.output()).unwrap()).unwrap();

    assert_eq!(record.metadata_id, "1c2d3e4f-5a6b-4c7d-8e9f-0a1b2c3d4e5f");
    assert_eq!(record.title, "NWB Wegen WFS");
    assert_eq!(record.keywords, vec!["wegen", "infrastructuur"]);
    assert_eq!(record.inspire_themes, vec!["tn"]);
    let hvd_ids: Vec<&str> = record.hvd_categories.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(hvd_ids, vec!["c_b79e35eb", "c_b151a0ba", "c_f76b01e6"]);
    assert_eq!(record.operates_on, vec!["a9fa7fff-6365-4885-950c-e9d9848359ee"]);
    // Network services do not cite the interoperability regulation
    assert_eq!(record.inspire_variant, None);

    let mut oaf = generator
        .generate(&config.resolved(&config.services[3]))
        .unwrap();
    oaf.serialize().unwrap();
    let record = flatten(std::str::from_utf8(oaf.output()).unwrap()).unwrap();
    assert_eq!(record.inspire_variant, Some(InspireVariant::Harmonised));
    assert_eq!(record.service_type.as_deref(), Some("other"));
}
