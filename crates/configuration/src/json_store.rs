//! Flat JSON settings files.
//!
//! A settings file is a single JSON object of string keys to JSON values. Reading never
//! fails: a missing or corrupt file behaves like an empty one.

use crate::error::ConfigError;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

/// A flat key → value mapping, as stored on disk.
pub type SettingMap = Map<String, Value>;

/// Name of the per-user settings directory.
pub const SETTINGS_DIR_NAME: &str = ".ctabench";

/// Resolves the settings directory.
///
/// A `.ctabench` directory in the working directory wins; otherwise the one in the
/// user's home directory is used.
pub fn get_settings_dir() -> PathBuf {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    resolve_settings_dir(&cwd, dirs::home_dir())
}

fn resolve_settings_dir(cwd: &Path, home: Option<PathBuf>) -> PathBuf {
    let local = cwd.join(SETTINGS_DIR_NAME);
    if local.is_dir() {
        return local;
    }
    match home {
        Some(home) => home.join(SETTINGS_DIR_NAME),
        None => local,
    }
}

/// Full path of a file inside the settings directory.
pub fn get_file_path(filename: &str) -> PathBuf {
    get_settings_dir().join(filename)
}

/// Loads a flat settings mapping.
pub fn load_json(path: &Path) -> SettingMap {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "Settings file not found, using empty settings");
            return SettingMap::new();
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Unreadable settings file, using empty settings");
            return SettingMap::new();
        }
    };

    match serde_json::from_str::<Value>(&content) {
        Ok(Value::Object(map)) => map,
        Ok(other) => {
            tracing::warn!(
                path = %path.display(),
                kind = json_kind(&other),
                "Settings file is not a JSON object, using empty settings"
            );
            SettingMap::new()
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Malformed settings file, using empty settings");
            SettingMap::new()
        }
    }
}

/// Writes a flat settings mapping as pretty JSON, creating parent directories.
pub fn save_json(path: &Path, data: &SettingMap) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let text = serde_json::to_string_pretty(data)?;
    fs::write(path, text)?;
    Ok(())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn working_directory_settings_win_over_home() {
        let cwd = tempfile::tempdir().unwrap();
        let home = tempfile::tempdir().unwrap();
        let home_dir = Some(home.path().to_path_buf());

        assert_eq!(
            resolve_settings_dir(cwd.path(), home_dir.clone()),
            home.path().join(SETTINGS_DIR_NAME)
        );
        assert_eq!(resolve_settings_dir(cwd.path(), None), cwd.path().join(SETTINGS_DIR_NAME));

        fs::create_dir(cwd.path().join(SETTINGS_DIR_NAME)).unwrap();
        assert_eq!(
            resolve_settings_dir(cwd.path(), home_dir),
            cwd.path().join(SETTINGS_DIR_NAME)
        );
    }

    #[test]
    fn file_path_lives_in_the_settings_dir() {
        let path = get_file_path("cta_backtester_setting.json");
        assert_eq!(path.file_name().unwrap(), "cta_backtester_setting.json");
        assert!(path.parent().unwrap().ends_with(SETTINGS_DIR_NAME));
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_json(&dir.path().join("absent.json")).is_empty());
    }

    #[test]
    fn malformed_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ \"risk_free\": ").unwrap();
        assert!(load_json(&path).is_empty());
    }

    #[test]
    fn non_object_document_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("list.json");
        fs::write(&path, "[1, 2, 3]").unwrap();
        assert!(load_json(&path).is_empty());
    }

    #[test]
    fn saved_settings_load_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("cta_backtester_setting.json");
        let value = json!({ "class_name": "DoubleMaStrategy", "capital": 1000000, "half_life": 60.0 });
        let data = value.as_object().unwrap().clone();

        save_json(&path, &data).unwrap();
        assert_eq!(load_json(&path), data);
    }
}
