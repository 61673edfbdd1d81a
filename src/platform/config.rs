// ipsift - platform/config.rs
//
// Config directory resolution and config.toml loading with startup
// validation. Invalid values never abort a run: they produce warnings and
// fall back to defaults.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::core::model::ExtractMode;
use crate::util::constants;
use crate::util::error::ConfigError;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Resolved platform paths for ipsift configuration.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/ipsift/ or %APPDATA%\ipsift\config\)
    pub config_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to current directory if platform dirs cannot be determined.
    pub fn resolve() -> Self {
        match ProjectDirs::from("", "", constants::APP_ID) {
            Some(proj_dirs) => {
                let config_dir = proj_dirs.config_dir().to_path_buf();
                tracing::debug!(config = %config_dir.display(), "Platform paths resolved");
                Self { config_dir }
            }
            None => {
                tracing::warn!("Could not determine platform directories, using current directory");
                Self {
                    config_dir: PathBuf::from("."),
                }
            }
        }
    }

    /// Default location of config.toml.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(constants::CONFIG_FILE_NAME)
    }
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored so a newer config file still loads.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// `[extract]` section.
    pub extract: ExtractSection,
    /// `[logging]` section.
    pub logging: LoggingSection,
}

/// `[extract]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct ExtractSection {
    /// Output mode name: "ipportremark", "ipspace" or "iponly".
    pub mode: Option<String>,
    /// Port paired with bare addresses.
    pub default_port: Option<i64>,
    /// Default output file stem.
    pub output: Option<String>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
}

/// Validated application configuration derived from `config.toml`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Quick-mode output shape when the CLI does not name one.
    pub mode: ExtractMode,
    /// Default port for quick mode.
    pub default_port: u16,
    /// Output stem overriding the per-mode default.
    pub output_stem: Option<String>,
    /// Logging level string (for init before tracing is available).
    pub log_level: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            mode: ExtractMode::default(),
            default_port: constants::DEFAULT_PORT,
            output_stem: None,
            log_level: None,
        }
    }
}

fn out_of_range(field: &str, value: impl ToString, expected: &str) -> String {
    let err = ConfigError::ValueOutOfRange {
        field: field.to_string(),
        value: value.to_string(),
        expected: expected.to_string(),
    };
    format!("{err}. Using default.")
}

/// Validate a parsed config, accumulating one warning per rejected value.
pub fn validate(raw: RawConfig) -> (AppConfig, Vec<String>) {
    let mut config = AppConfig::default();
    let mut warnings = Vec::new();

    if let Some(ref mode) = raw.extract.mode {
        match ExtractMode::from_name(mode) {
            Some(m) => config.mode = m,
            None => warnings.push(out_of_range(
                "[extract] mode",
                mode,
                "ipportremark, ipspace or iponly",
            )),
        }
    }

    if let Some(port) = raw.extract.default_port {
        match u16::try_from(port) {
            Ok(p) if u32::from(p) >= constants::PORT_MIN => config.default_port = p,
            _ => warnings.push(out_of_range(
                "[extract] default_port",
                port,
                &format!("{}-{}", constants::PORT_MIN, constants::PORT_MAX),
            )),
        }
    }

    if let Some(ref output) = raw.extract.output {
        if output.trim().is_empty() {
            warnings.push(out_of_range("[extract] output", "", "a non-empty file name"));
        } else {
            config.output_stem = Some(output.trim().to_string());
        }
    }

    if let Some(ref level) = raw.logging.level {
        let valid = ["error", "warn", "info", "debug", "trace"];
        if valid.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level.to_lowercase());
        } else {
            warnings.push(out_of_range(
                "[logging] level",
                level,
                "error, warn, info, debug or trace",
            ));
        }
    }

    (config, warnings)
}

/// Load and validate the config file at `config_path`.
///
/// Returns `AppConfig` with validated values and a list of non-fatal warnings.
/// A missing file yields defaults with no warnings (first run). An unreadable
/// or unparseable file yields defaults and a warning describing the problem.
///
/// Runs before logging is initialised (the file may set the level), so
/// callers report the warnings once logging is up.
pub fn load_config(config_path: &Path) -> (AppConfig, Vec<String>) {
    if !config_path.exists() {
        return (AppConfig::default(), Vec::new());
    }

    let content = match std::fs::read_to_string(config_path) {
        Ok(c) => c,
        Err(source) => {
            let err = ConfigError::Io {
                path: config_path.to_path_buf(),
                source,
            };
            return (AppConfig::default(), vec![format!("{err}. Using defaults.")]);
        }
    };

    let raw: RawConfig = match toml::from_str(&content) {
        Ok(r) => r,
        Err(source) => {
            let err = ConfigError::TomlParse {
                path: config_path.to_path_buf(),
                source,
            };
            return (AppConfig::default(), vec![format!("{err}. Using defaults.")]);
        }
    };

    validate(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load_str(content: &str) -> (AppConfig, Vec<String>) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(constants::CONFIG_FILE_NAME);
        std::fs::write(&path, content).unwrap();
        load_config(&path)
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let (config, warnings) = load_config(&dir.path().join("absent.toml"));
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.default_port, 443);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_valid_values_applied() {
        let (config, warnings) = load_str(
            "[extract]\nmode = \"iponly\"\ndefault_port = 8080\noutput = \"nodes\"\n\
             [logging]\nlevel = \"DEBUG\"\n",
        );
        assert!(warnings.is_empty(), "{warnings:?}");
        assert_eq!(config.mode, ExtractMode::IpOnly);
        assert_eq!(config.default_port, 8080);
        assert_eq!(config.output_stem.as_deref(), Some("nodes"));
        assert_eq!(config.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_invalid_values_warn_and_fall_back() {
        let (config, warnings) = load_str(
            "[extract]\nmode = \"fancy\"\ndefault_port = 70000\n[logging]\nlevel = \"loud\"\n",
        );
        assert_eq!(warnings.len(), 3);
        assert_eq!(config, AppConfig::default());
        assert!(warnings[1].contains("default_port"));
    }

    #[test]
    fn test_zero_port_rejected() {
        let (config, warnings) = load_str("[extract]\ndefault_port = 0\n");
        assert_eq!(warnings.len(), 1);
        assert_eq!(config.default_port, constants::DEFAULT_PORT);
    }

    #[test]
    fn test_unparseable_file_warns() {
        let (config, warnings) = load_str("[extract\nmode = ");
        assert_eq!(config, AppConfig::default());
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("parse"));
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let (_, warnings) = load_str("[extract]\nfuture_key = 1\n[other]\nx = 2\n");
        assert!(warnings.is_empty());
    }
}
