// Optional JSON settings for the window shell and the session.
//
// Every field has a default, so a partial file (or no file at all) works.
// A broken file is logged and ignored rather than aborting startup.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use crate::error::Error;
use crate::magnifier::MagnifierSettings;
use crate::stroke::{DEFAULT_MAGNETIC_THRESHOLD, SnapSettings};

/// Looked up in the working directory when no path is given on the command line.
pub const DEFAULT_CONFIG_FILE: &str = "lasso-annotator.json";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub window_width: usize,
    pub window_height: usize,
    pub target_fps: usize,
    /// Magnetic snap on at startup.
    pub magnetic_snap: bool,
    pub magnetic_threshold: u32,
    /// Pin the blob generator for reproducible sessions.
    pub seed: Option<u32>,
    pub magnifier_size: usize,
    pub magnifier_zoom: f32,
    pub magnifier_lift: i32,
}

impl Default for Settings {
    fn default() -> Self {
        let magnifier = MagnifierSettings::default();
        Self {
            window_width: 1024,
            window_height: 768,
            target_fps: 60,
            magnetic_snap: true,
            magnetic_threshold: DEFAULT_MAGNETIC_THRESHOLD,
            seed: None,
            magnifier_size: magnifier.size,
            magnifier_zoom: magnifier.zoom,
            magnifier_lift: magnifier.lift,
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self, Error> {
        serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))
    }

    /// Read `path`; fall back to defaults (with a log line) if it is missing
    /// or unusable.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            info!("No config file at {:?}, using defaults", path);
            return Self::default();
        }
        let loaded = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("read {}: {e}", path.display())))
            .and_then(|json| Self::from_json(&json));
        match loaded {
            Ok(settings) => {
                info!("Loaded config from {:?}", path);
                settings
            }
            Err(e) => {
                warn!("{e}; using defaults");
                Self::default()
            }
        }
    }

    /// First CLI argument, else the default file name.
    pub fn path_from_args(mut args: impl Iterator<Item = String>) -> PathBuf {
        args.nth(1)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
    }

    pub fn snap(&self) -> SnapSettings {
        SnapSettings { enabled: self.magnetic_snap, threshold: self.magnetic_threshold }
    }

    pub fn magnifier(&self) -> MagnifierSettings {
        MagnifierSettings {
            size: self.magnifier_size,
            zoom: self.magnifier_zoom,
            lift: self.magnifier_lift,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_gives_defaults() {
        assert_eq!(Settings::from_json("{}").unwrap(), Settings::default());
    }

    #[test]
    fn partial_file_overrides_only_given_fields() {
        let s = Settings::from_json(r#"{ "magnetic_threshold": 35, "seed": 7 }"#).unwrap();
        assert_eq!(s.magnetic_threshold, 35);
        assert_eq!(s.seed, Some(7));
        assert_eq!(s.window_width, 1024);
        assert!(s.snap().enabled);
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let err = Settings::from_json("{ nope").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().starts_with("Config error"));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let path = Path::new("definitely/not/here/lasso-annotator.json");
        assert_eq!(Settings::load_or_default(path), Settings::default());
    }

    #[test]
    fn malformed_file_on_disk_falls_back_to_defaults() {
        let path = std::env::temp_dir().join(format!("lasso-annotator-broken-{}.json", std::process::id()));
        std::fs::write(&path, "{ \"window_width\": 800, ").unwrap();
        let loaded = Settings::load_or_default(&path);
        std::fs::remove_file(&path).unwrap();
        assert_eq!(loaded, Settings::default());
    }

    #[test]
    fn valid_file_on_disk_is_loaded() {
        let path = std::env::temp_dir().join(format!("lasso-annotator-valid-{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "window_width": 800, "magnetic_snap": false }"#).unwrap();
        let loaded = Settings::load_or_default(&path);
        std::fs::remove_file(&path).unwrap();
        assert_eq!(loaded.window_width, 800);
        assert!(!loaded.magnetic_snap);
        assert_eq!(loaded.window_height, Settings::default().window_height);
    }

    #[test]
    fn path_comes_from_first_argument() {
        let args = ["bin", "custom.json"].map(String::from).into_iter();
        assert_eq!(Settings::path_from_args(args), PathBuf::from("custom.json"));
        let none = ["bin"].map(String::from).into_iter();
        assert_eq!(Settings::path_from_args(none), PathBuf::from(DEFAULT_CONFIG_FILE));
    }
}
