use crate::editor::EditPlacement;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub edit_placement: EditPlacement,
    pub confirm_delete: bool,
    pub tick_rate_ms: u64,
    pub log_level: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            edit_placement: EditPlacement::Keep,
            confirm_delete: true,
            tick_rate_ms: 200,
            log_level: None,
        }
    }
}

/// Reads `explicit` if given, otherwise the per-user config file. Only the
/// per-user file is allowed to be missing.
pub fn load(explicit: Option<&Path>) -> Result<Config> {
    match explicit {
        Some(path) => read(path),
        None => {
            let path = default_config_path()?;
            if path.exists() {
                read(&path)
            } else {
                Ok(Config::default())
            }
        }
    }
}

pub fn parse(raw: &str) -> Result<Config> {
    if raw.trim().is_empty() {
        return Ok(Config::default());
    }
    let config: Config = serde_yaml::from_str(raw).context("parsing config file")?;
    Ok(config)
}

fn read(path: &Path) -> Result<Config> {
    let data = fs::read_to_string(path).with_context(|| format!("reading {:?}", path))?;
    parse(&data).with_context(|| format!("loading {:?}", path))
}

fn default_config_path() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("", "", "taskboard").context("locating config directory")?;
    Ok(dirs.config_dir().join("config.yml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_file_means_defaults() {
        assert_eq!(parse("").unwrap(), Config::default());
        assert_eq!(parse("\n  \n").unwrap(), Config::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = parse("edit_placement: todo\nlog_level: debug\n").unwrap();
        assert_eq!(config.edit_placement, EditPlacement::Todo);
        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert!(config.confirm_delete);
        assert_eq!(config.tick_rate_ms, 200);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(parse("wip_limit: 3\n").is_err());
        assert!(parse("edit_placement: sideways\n").is_err());
    }

    #[test]
    fn explicit_path_is_read() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "confirm_delete: false").unwrap();
        let config = load(Some(file.path())).unwrap();
        assert!(!config.confirm_delete);
    }

    #[test]
    fn explicit_missing_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load(Some(&dir.path().join("nope.yml"))).is_err());
    }
}
