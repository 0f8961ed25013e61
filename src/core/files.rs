//! File system helpers for loading inputs and writing artifacts.

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use serde::de::DeserializeOwned;

use crate::{error::ReportError, models::Play, models::ReportConfig, Result, OUTPUT_DIR_ENV_VAR};

/// Fallback directory when neither a flag nor the env var names one:
/// `~/Documents/playbook-exports`, or `./playbook-exports` without a home.
pub fn default_output_dir() -> PathBuf {
    let base = dirs::document_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."));
    base.join("playbook-exports")
}

/// Output directory from the explicit option, then `PLAYBOOK_EXPORT_DIR`,
/// then [`default_output_dir`].
pub fn resolve_output_dir(output_dir: Option<PathBuf>) -> PathBuf {
    output_dir
        .or_else(|| {
            std::env::var(OUTPUT_DIR_ENV_VAR)
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from)
        })
        .unwrap_or_else(default_output_dir)
}

/// Write bytes to a file, creating parent directories as needed.
pub fn write_bytes(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut f = fs::File::create(path)?;
    f.write_all(contents)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

/// Load a JSON array of plays.
pub fn load_plays(path: &Path) -> Result<Vec<Play>> {
    read_json(path)
}

/// Load a report configuration; missing fields take their defaults.
pub fn load_config(path: &Path) -> Result<ReportConfig> {
    read_json(path)
}

/// Load a configuration when a path is given, otherwise use the defaults.
pub fn load_config_or_default(path: Option<&Path>) -> Result<ReportConfig> {
    match path {
        Some(p) => load_config(p),
        None => Ok(ReportConfig::default()),
    }
}

/// Read capture images referenced as `INDEX=PATH` pairs.
///
/// Returns one slot per play; slots without a readable file stay `None` so the
/// layout falls back to a placeholder.
pub fn load_captures(specs: &[String], play_count: usize) -> Result<Vec<Option<Vec<u8>>>> {
    let mut captures = vec![None; play_count];
    for spec in specs {
        let (index, path) = spec.split_once('=').ok_or_else(|| ReportError::InvalidConfig {
            message: format!("capture '{}' must look like INDEX=PATH", spec),
        })?;
        let index: usize = index.trim().parse().map_err(|_| ReportError::InvalidConfig {
            message: format!("capture index '{}' is not a number", index),
        })?;
        if index >= play_count {
            log::warn!("capture index {} out of range ({} plays), ignored", index, play_count);
            continue;
        }
        match fs::read(path.trim()) {
            Ok(bytes) => captures[index] = Some(bytes),
            Err(e) => log::warn!("could not read capture {}: {}", path, e),
        }
    }
    Ok(captures)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_write_bytes_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("out.txt");
        write_bytes(&path, b"hello").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"hello");
    }

    #[test]
    fn test_load_config_partial_json_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"format":"workbook","includeStatistics":false}"#).unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.format, crate::models::OutputFormat::Workbook);
        assert!(!config.content.include_statistics);
        assert!(config.content.include_metadata);
        assert_eq!(config.template_id, "playbook");
    }

    #[test]
    fn test_load_plays_invalid_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("plays.json");
        fs::write(&path, "not json").unwrap();
        match load_plays(&path) {
            Err(ReportError::Json(_)) => (),
            other => panic!("Expected Json error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_captures() {
        let dir = tempdir().unwrap();
        let image = dir.path().join("d0.png");
        fs::write(&image, [1u8, 2, 3]).unwrap();

        let specs = vec![
            format!("0={}", image.display()),
            format!("1={}", dir.path().join("missing.png").display()),
            format!("9={}", image.display()),
        ];
        let captures = load_captures(&specs, 2).unwrap();
        assert_eq!(captures.len(), 2);
        assert_eq!(captures[0].as_deref(), Some(&[1u8, 2, 3][..]));
        assert!(captures[1].is_none());
    }

    #[test]
    fn test_load_captures_rejects_malformed_spec() {
        assert!(load_captures(&["no-separator".to_string()], 1).is_err());
        assert!(load_captures(&["x=/tmp/a.png".to_string()], 1).is_err());
    }

    #[test]
    fn test_resolve_output_dir_prefers_option() {
        std::env::set_var(OUTPUT_DIR_ENV_VAR, "/tmp/from-env");
        let dir = resolve_output_dir(Some(PathBuf::from("/tmp/explicit")));
        assert_eq!(dir, PathBuf::from("/tmp/explicit"));
        assert_eq!(resolve_output_dir(None), PathBuf::from("/tmp/from-env"));

        std::env::remove_var(OUTPUT_DIR_ENV_VAR);
        assert_eq!(resolve_output_dir(None), default_output_dir());
    }

    #[test]
    fn test_default_output_dir_name() {
        assert!(default_output_dir().ends_with("playbook-exports"));
    }
}
