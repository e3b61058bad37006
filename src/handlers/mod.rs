// Handler modules
pub mod provision;
pub mod resize;

pub use provision::{ProvisionOptions, handle_provision};
pub use resize::{ResizeOptions, handle_resize};

use crate::catalog::{CatalogApiError, HttpCatalogProvider};
use crate::config::types::RemoteConfig;
use crate::error::{ProvisionError, Result};
use crate::resolver::Overrides;
use colored::Colorize;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// Read a JSON file that must hold an object
pub fn read_json_object(path: &Path, field: &str) -> Result<Map<String, Value>> {
    let content = fs::read_to_string(path)?;
    match serde_json::from_str::<Value>(&content)? {
        Value::Object(map) => Ok(map),
        other => Err(ProvisionError::invalid(field, format!("expected a JSON object, got {}", other))),
    }
}

/// `-O` assignments layered over an optional JSON payload
pub fn load_overrides(assignments: &[String], payload: Option<&Path>) -> Result<Overrides> {
    let overrides = Overrides::parse_assignments(assignments)?;
    match payload {
        Some(path) => Ok(overrides.layered_over(read_json_object(path, "payload")?)),
        None => Ok(overrides),
    }
}

pub fn catalog_provider(remote: &RemoteConfig) -> Result<HttpCatalogProvider> {
    HttpCatalogProvider::from_config(remote).map_err(|source: CatalogApiError| {
        ProvisionError::RemoteUnavailable {
            category: "catalog".to_string(),
            source,
        }
    })
}

/// Print JSON to stdout, or write it to a file
pub fn emit_json(json: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(path, format!("{}\n", json))?;
            eprintln!("{} {}", "✅ Written to".green(), path.display().to_string().cyan());
        }
        None => println!("{}", json),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_assignments_win_over_payload() {
        let mut payload = tempfile::NamedTempFile::new().unwrap();
        write!(
            payload,
            r#"{{"rootVolume": {{"size": 20, "name": "root"}}, "customKey": 1}}"#
        )
        .unwrap();
        let overrides = load_overrides(&["rootVolume.size=40".to_string()], Some(payload.path())).unwrap();
        assert_eq!(overrides.get_path("rootVolume.size"), Some(&json!("40")));
        assert_eq!(overrides.get_path("rootVolume.name"), Some(&json!("root")));
        assert_eq!(overrides.get_path("customKey"), Some(&json!(1)));
    }

    #[test]
    fn test_payload_must_be_an_object() {
        let mut payload = tempfile::NamedTempFile::new().unwrap();
        write!(payload, "[1, 2]").unwrap();
        let err = load_overrides(&[], Some(payload.path())).unwrap_err();
        assert!(matches!(err, ProvisionError::InvalidValue { ref field, .. } if field == "payload"));
    }

    #[test]
    fn test_emit_json_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        emit_json("{}", Some(&path)).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "{}\n");
    }
}
