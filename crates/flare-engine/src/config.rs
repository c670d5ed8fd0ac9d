//! Host configuration.
//!
//! Selects which exported emitter to run and how the headless loop paces it.
//! Configuration is loaded from and saved to a TOML file.

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Configuration file name.
const CONFIG_FILE: &str = "flare.toml";

/// Host configuration parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // === Export Selection ===
    /// Editor export to load
    pub project_file: PathBuf,
    /// Project ID within the export
    pub project_id: String,
    /// Emitter ID within the project
    pub emitter_id: String,
    /// Directory alpha-map paths are resolved against (None = no alpha maps)
    pub alpha_map_dir: Option<PathBuf>,

    // === Simulation ===
    /// RNG seed (None = random)
    pub seed: Option<u64>,
    /// Emitter position, overriding the one stored in the export
    pub emitter_position: Option<Vec3>,

    // === Loop ===
    /// Simulation steps per second
    pub frame_rate: u32,
    /// Frames to run before shutting down
    pub frames: u32,
    /// Pace frames against the wall clock instead of stepping as fast as possible
    pub realtime: bool,

    // === Diagnostics ===
    /// Log a pool report every N frames
    pub report_every: u32,
    /// Write the baked color gradient here on startup
    pub gradient_preview: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            project_file: PathBuf::from("project.json"),
            project_id: String::from("default"),
            emitter_id: String::from("default"),
            alpha_map_dir: None,

            seed: None,
            emitter_position: None,

            frame_rate: 60,
            frames: 600,
            realtime: false,

            report_every: 60,
            gradient_preview: None,
        }
    }
}

impl EngineConfig {
    /// Load configuration from a specific path.
    /// Returns default config if file doesn't exist or is invalid.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            info!("Config file not found, using defaults");
            return Self::default();
        }

        match fs::File::open(path) {
            Ok(mut file) => {
                let mut contents = String::new();
                if let Err(e) = file.read_to_string(&mut contents) {
                    warn!("Failed to read config file: {e}");
                    return Self::default();
                }

                match toml::from_str(&contents) {
                    Ok(config) => {
                        info!("Loaded config from {}", path.display());
                        config
                    },
                    Err(e) => {
                        warn!("Failed to parse config file: {e}");
                        Self::default()
                    },
                }
            },
            Err(e) => {
                warn!("Failed to open config file: {e}");
                Self::default()
            },
        }
    }

    /// Save configuration to a specific path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        let mut file = fs::File::create(path)?;
        file.write_all(contents.as_bytes())?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Configuration file in the working directory.
    pub fn default_path() -> PathBuf {
        PathBuf::from(CONFIG_FILE)
    }

    /// Clamp values to sensible ranges.
    pub fn validate(&mut self) {
        self.frame_rate = self.frame_rate.clamp(1, 1000);
        self.report_every = self.report_every.max(1);
    }

    /// Fixed simulation step in seconds.
    #[must_use]
    pub fn step(&self) -> f32 {
        1.0 / self.frame_rate.max(1) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.frame_rate, 60);
        assert_eq!(config.report_every, 60);
        assert!(!config.realtime);
        assert!(config.seed.is_none());
    }

    #[test]
    fn test_config_validation() {
        let mut config = EngineConfig::default();
        config.frame_rate = 0;
        config.report_every = 0;

        config.validate();

        assert_eq!(config.frame_rate, 1);
        assert_eq!(config.report_every, 1);
        assert!((config.step() - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_config_save_load() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("nested").join("flare.toml");

        let mut config = EngineConfig::default();
        config.project_id = String::from("demo");
        config.seed = Some(12345);
        config.emitter_position = Some(Vec3::new(1.0, 2.0, 3.0));
        config.realtime = true;

        config.save_to(&config_path).expect("Failed to save config");

        let loaded = EngineConfig::load_from(&config_path);
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_config_load_missing_file() {
        let config = EngineConfig::load_from("/nonexistent/path/flare.toml");
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_config_load_invalid_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("flare.toml");
        fs::write(&config_path, "frame_rate = \"fast\"").expect("write config");

        assert_eq!(EngineConfig::load_from(&config_path), EngineConfig::default());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: EngineConfig =
            toml::from_str("emitter_id = \"sparks\"\nframes = 10").expect("valid toml");
        assert_eq!(config.emitter_id, "sparks");
        assert_eq!(config.frames, 10);
        assert_eq!(config.frame_rate, 60);
    }
}
