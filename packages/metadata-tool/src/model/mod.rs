//! Layered configuration model.
//!
//! A configuration holds global defaults and an ordered list of entities
//! (services or feature catalogues). Every overridable field resolves the
//! same way, see [`resolve`]:
//!
//! 1. the entity's own value,
//! 2. else the global value,
//! 3. else a documented fallback.
//!
//! Entities never point back at the globals; the resolved view of an entity
//! is built from `(&entity, &globals)` when it is needed.

mod feature_catalogue;
mod service;
mod types;

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;

use crate::error::{MetadataError, Result};

pub use feature_catalogue::{
    FeatureAttribute, FeatureCatalogueConfig, FeatureCataloguesConfig, FeatureType, ListedValue,
    ResolvedFeatureCatalogue,
};
pub use service::{ResolvedService, ServiceConfig, ServicesConfig};
pub use types::{
    BoundingBox, Globals, InspireDatasetType, InspireType, Overridable, Protocol, Thumbnail,
};

/// Something that produces exactly one metadata document.
pub trait MetadataEntity {
    /// Identifier of the entity, also the output file stem.
    fn id(&self) -> &str;
}

/// Resolve an overridable field: entity value, else global value, else `fallback`.
///
/// # Examples
/// ```
/// use metadata_tool::model::resolve;
///
/// assert_eq!(resolve(Some("a"), Some("b"), ""), "a");
/// assert_eq!(resolve(None, Some("b"), ""), "b");
/// assert_eq!(resolve::<&str>(None, None, ""), "");
/// ```
pub fn resolve<T>(entity: Option<T>, global: Option<T>, fallback: T) -> T {
    entity.or(global).unwrap_or(fallback)
}

/// Read a YAML or JSON configuration file.
///
/// Files ending in `.json` are parsed as JSON; everything else as YAML (which
/// also accepts JSON content).
pub fn load_config<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let parsed = if is_json {
        serde_json::from_str(&content).map_err(|e| e.to_string())
    } else {
        serde_yaml_ng::from_str(&content).map_err(|e| e.to_string())
    };

    parsed.map_err(|message| MetadataError::ConfigParse {
        path: path.display().to_string(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_order() {
        assert_eq!(resolve(Some(1), Some(2), 3), 1);
        assert_eq!(resolve(None, Some(2), 3), 2);
        assert_eq!(resolve(None, None, 3), 3);
    }

    #[test]
    fn test_resolve_optional_fallback() {
        let unset: Option<f64> = resolve(None, None, None);
        assert!(unset.is_none());
        assert_eq!(resolve(None, Some(Some(99.0)), None), Some(99.0));
    }

    #[test]
    fn test_load_config_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.yaml");
        fs::write(&path, "globals: [unclosed").unwrap();

        let err = load_config::<ServicesConfig>(&path).unwrap_err();
        assert!(matches!(err, MetadataError::ConfigParse { .. }));
        assert!(err.to_string().contains("broken.yaml"));
    }

    #[test]
    fn test_load_config_json_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("services.json");
        fs::write(&path, r#"{"globals": {"title": "T"}, "services": []}"#).unwrap();

        let config: ServicesConfig = load_config(&path).unwrap();
        assert_eq!(config.globals.fields.title.as_deref(), Some("T"));
        assert!(config.services.is_empty());
    }
}
