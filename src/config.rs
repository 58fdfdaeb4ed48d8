//! Runtime configuration, loaded from a TOML file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::organize::SeasonStyle;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    /// Intake directory scanned for freshly downloaded entries
    pub download_dir: PathBuf,

    /// Destination root for movies
    pub movie_dir: PathBuf,

    /// Catch-all destination for entries whose show or season can't be
    /// resolved
    pub unsorted_dir: PathBuf,

    /// TV library roots, searched in order
    #[serde(default)]
    pub tv_dirs: Vec<PathBuf>,

    /// Naming style used when creating season folders
    #[serde(default)]
    pub season_style: SeasonStyle,

    #[serde(default)]
    pub log: LogSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LogSettings {
    /// Directory the log file lives in
    #[serde(default = "default_log_dir")]
    pub dir: PathBuf,

    /// Log file name, appended to across runs
    #[serde(default = "default_log_file")]
    pub file: String,

    /// Log level filter: "info", "debug" or "trace"
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            dir: default_log_dir(),
            file: default_log_file(),
            level: default_log_level(),
        }
    }
}

fn default_log_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_log_file() -> String {
    "reshelve.log".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Default configuration file location under the user config directory.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("reshelve")
        .join("config.toml")
}

/// Load and validate configuration from a TOML file.
pub fn load(path: &Path) -> Result<Settings> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let settings: Settings = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate(&settings)?;

    Ok(settings)
}

/// Validate configuration. The download, movie and unsorted roots must
/// exist before any processing starts; missing TV roots are only warned
/// about and get skipped during resolution.
fn validate(settings: &Settings) -> Result<()> {
    for (key, dir) in [
        ("download_dir", &settings.download_dir),
        ("movie_dir", &settings.movie_dir),
        ("unsorted_dir", &settings.unsorted_dir),
    ] {
        if !dir.is_dir() {
            anyhow::bail!("{} {:?} doesn't exist or is not a directory", key, dir);
        }
    }

    for dir in &settings.tv_dirs {
        if !dir.is_dir() {
            tracing::warn!("TV root does not exist: {:?}", dir);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_parse_full_config() {
        let settings: Settings = toml::from_str(
            r#"
            download_dir = "/data/downloads"
            movie_dir = "/data/movies"
            unsorted_dir = "/data/unsorted"
            tv_dirs = ["/data/tv", "/data/kids-tv"]
            season_style = "worded"

            [log]
            dir = "/var/log/reshelve"
            file = "run.log"
            level = "debug"
            "#,
        )
        .unwrap();

        assert_eq!(settings.tv_dirs.len(), 2);
        assert_eq!(settings.season_style, SeasonStyle::Worded);
        assert_eq!(settings.log.file, "run.log");
        assert_eq!(settings.log.level, "debug");
    }

    #[test]
    fn test_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            download_dir = "/data/downloads"
            movie_dir = "/data/movies"
            unsorted_dir = "/data/unsorted"
            "#,
        )
        .unwrap();

        assert!(settings.tv_dirs.is_empty());
        assert_eq!(settings.season_style, SeasonStyle::Dotted);
        assert_eq!(settings.log.file, "reshelve.log");
        assert_eq!(settings.log.level, "info");
    }

    #[test]
    fn test_load_validates_required_dirs() {
        let root = TempDir::new().unwrap();
        for dir in ["downloads", "movies", "unsorted"] {
            fs::create_dir(root.path().join(dir)).unwrap();
        }

        let config_path = root.path().join("config.toml");
        fs::write(
            &config_path,
            format!(
                "download_dir = {:?}\nmovie_dir = {:?}\nunsorted_dir = {:?}\n",
                root.path().join("downloads"),
                root.path().join("movies"),
                root.path().join("unsorted"),
            ),
        )
        .unwrap();

        assert!(load(&config_path).is_ok());
    }

    #[test]
    fn test_load_rejects_missing_dirs() {
        let root = TempDir::new().unwrap();
        let config_path = root.path().join("config.toml");
        fs::write(
            &config_path,
            "download_dir = \"/no/such/dir\"\nmovie_dir = \"/no\"\nunsorted_dir = \"/no\"\n",
        )
        .unwrap();

        let err = load(&config_path).unwrap_err();
        assert!(err.to_string().contains("download_dir"));
    }
}
