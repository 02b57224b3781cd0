// # Microkernel config file update
//
// Merges the discovered endpoint into the YAML mapping that the services
// started after network bring-up read at startup (`/tmp/mk_conf.yaml` on
// the microkernel).
//
// Writes go to a temporary sibling file which is then renamed over the
// existing one, so readers never observe a half-written file.

use anyhow::{Context, Result};
use serde_yaml::{Mapping, Value};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Key holding the provisioning endpoint URL
pub const MK_URI_KEY: &str = "mk_uri";

/// Set `mk_uri` in the YAML mapping stored at `path`, creating the file if absent
pub async fn persist_mk_uri(path: &Path, uri: &str) -> Result<()> {
    let mut mapping = load_mapping(path).await?;
    mapping.insert(
        Value::String(MK_URI_KEY.to_string()),
        Value::String(uri.to_string()),
    );

    let yaml = serde_yaml::to_string(&Value::Mapping(mapping))
        .context("Failed to serialize config")?;

    let temp = temp_path(path);
    fs::write(&temp, yaml)
        .await
        .with_context(|| format!("Failed to write {}", temp.display()))?;
    fs::rename(&temp, path)
        .await
        .with_context(|| format!("Failed to move {} into place", temp.display()))?;

    debug!("Wrote {}={} to {}", MK_URI_KEY, uri, path.display());
    Ok(())
}

async fn load_mapping(path: &Path) -> Result<Mapping> {
    if !fs::try_exists(path).await.unwrap_or(false) {
        debug!("Config file {} does not exist, creating it", path.display());
        return Ok(Mapping::new());
    }

    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    match serde_yaml::from_str::<Value>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?
    {
        Value::Mapping(mapping) => Ok(mapping),
        // an empty document parses as null
        Value::Null => Ok(Mapping::new()),
        other => anyhow::bail!(
            "{} must contain a YAML mapping, found {}",
            path.display(),
            type_name(&other)
        ),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_yaml(path: &Path) -> Value {
        serde_yaml::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mk_conf.yaml");

        persist_mk_uri(&path, "http://10.0.0.5:8026").await.unwrap();

        assert_eq!(read_yaml(&path)[MK_URI_KEY], "http://10.0.0.5:8026");
    }

    #[tokio::test]
    async fn keeps_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mk_conf.yaml");
        std::fs::write(
            &path,
            "---\nmk_uri: http://old:8026\nmk_register_path: /razor/api/node/register\nmk_checkin_interval: 60\n",
        )
        .unwrap();

        persist_mk_uri(&path, "http://10.0.0.5:8026").await.unwrap();

        let value = read_yaml(&path);
        assert_eq!(value[MK_URI_KEY], "http://10.0.0.5:8026");
        assert_eq!(value["mk_register_path"], "/razor/api/node/register");
        assert_eq!(value["mk_checkin_interval"], 60);
        assert!(!temp_path(&path).exists());
    }

    #[tokio::test]
    async fn written_file_is_yaml_not_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mk_conf.yaml");

        persist_mk_uri(&path, "http://10.0.0.5:8026").await.unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("mk_uri:"), "{}", text);
        assert!(serde_json::from_str::<serde_json::Value>(&text).is_err());
    }

    #[tokio::test]
    async fn empty_file_becomes_a_mapping() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mk_conf.yaml");
        std::fs::write(&path, "").unwrap();

        persist_mk_uri(&path, "http://10.0.0.5:8026").await.unwrap();

        assert_eq!(read_yaml(&path)[MK_URI_KEY], "http://10.0.0.5:8026");
    }

    #[tokio::test]
    async fn rejects_non_mapping_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mk_conf.yaml");
        std::fs::write(&path, "- 1\n- 2\n").unwrap();

        let err = persist_mk_uri(&path, "http://10.0.0.5:8026").await.unwrap_err();
        assert!(err.to_string().contains("YAML mapping"));
    }
}
