use anyhow::{Context, Result};
use chrono::Local;
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_LEVEL_ENV: &str = "TASKBOARD_LOG_LEVEL";
const DEFAULT_LEVEL: &str = "warn";

/// Keeps the background writer alive; drop it last so buffered lines flush.
pub struct LogHandle {
    pub path: PathBuf,
    _guard: WorkerGuard,
}

/// The TUI owns stdout, so everything goes to a timestamped file.
pub fn init_logging(level: &str) -> Result<LogHandle> {
    let log_dir = log_directory()?;
    fs::create_dir_all(&log_dir).with_context(|| format!("creating {:?}", log_dir))?;
    let path = log_file_path(&log_dir);
    let file = fs::File::create(&path).with_context(|| format!("creating {:?}", path))?;
    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(EnvFilter::new(format!("{level},taskboard={level}")))
        .with(file_layer)
        .try_init()
        .context("installing tracing subscriber")?;

    tracing::info!(level, "logging initialized, file {}", path.display());
    Ok(LogHandle {
        path,
        _guard: guard,
    })
}

/// Flag beats environment beats config file.
pub fn resolve_level(flag: Option<&str>, config: Option<&str>) -> &'static str {
    let env = std::env::var(LOG_LEVEL_ENV).ok();
    let level = [flag, env.as_deref(), config]
        .into_iter()
        .flatten()
        .find_map(normalize_log_level)
        .unwrap_or(DEFAULT_LEVEL);
    level
}

fn normalize_log_level(raw: &str) -> Option<&'static str> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "trace" => Some("trace"),
        "debug" => Some("debug"),
        "info" => Some("info"),
        "warn" | "warning" => Some("warn"),
        "error" => Some("error"),
        "off" => Some("off"),
        _ => None,
    }
}

fn log_directory() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("", "", "taskboard").context("locating data directory")?;
    Ok(dirs.data_local_dir().join("logs"))
}

fn log_file_path(log_dir: &Path) -> PathBuf {
    let timestamp = Local::now().format("%Y-%m-%d_%H-%M-%S");
    log_dir.join(format!("taskboard-{}.log", timestamp))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_file_name_is_timestamped() {
        let path = log_file_path(Path::new("/tmp/taskboard-logs"));
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("taskboard-"));
        assert!(name.ends_with(".log"));
    }

    #[test]
    fn levels_normalize() {
        assert_eq!(normalize_log_level("TRACE"), Some("trace"));
        assert_eq!(normalize_log_level(" warning "), Some("warn"));
        assert_eq!(normalize_log_level("loud"), None);
    }

    #[test]
    fn flag_wins_over_config() {
        assert_eq!(resolve_level(Some("debug"), Some("error")), "debug");
    }

    #[test]
    fn invalid_flag_falls_through() {
        if std::env::var(LOG_LEVEL_ENV).is_ok() {
            return;
        }
        assert_eq!(resolve_level(Some("loud"), Some("info")), "info");
        assert_eq!(resolve_level(None, None), DEFAULT_LEVEL);
    }
}
