//! Configuration management for lexgen
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (lexgen.toml)
//! - Environment variables (LEXGEN__*)
//!
//! ## Example config file (lexgen.toml):
//! ```toml
//! [input]
//! dir = "./lexicons"
//! skip_prefixes = ["node_modules/"]
//!
//! [output]
//! dir = "./src/lexicon"
//! check = false
//!
//! [validation]
//! meta_schema = "./lexicon.schema.json"
//! ```
//!
//! The output style is fixed and deliberately absent from this file.

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LexgenConfig {
    /// Where documents are read from
    #[serde(default)]
    pub input: InputConfig,

    /// Where artifacts are written
    #[serde(default)]
    pub output: OutputConfig,

    /// Extra document checks
    #[serde(default)]
    pub validation: ValidationConfig,
}

/// Input configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Directory containing lexicon JSON files
    #[serde(default = "default_input_dir")]
    pub dir: PathBuf,

    /// Relative path prefixes to skip while walking
    #[serde(default = "default_skip_prefixes")]
    pub skip_prefixes: Vec<String>,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory generated files are written to
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,

    /// Compare against existing files instead of writing
    #[serde(default)]
    pub check: bool,
}

/// Validation configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// JSON Schema every document must satisfy
    #[serde(default)]
    pub meta_schema: Option<PathBuf>,
}

// Default value functions
fn default_input_dir() -> PathBuf {
    PathBuf::from("lexicons")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("src/lexicon")
}

fn default_skip_prefixes() -> Vec<String> {
    vec![
        "node_modules/".to_string(),
        ".git/".to_string(),
        "target/".to_string(),
    ]
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            dir: default_input_dir(),
            skip_prefixes: default_skip_prefixes(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            check: false,
        }
    }
}

impl LexgenConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, adding a specific file on top of the defaults
    pub fn load_from(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = ["lexgen.toml", ".lexgen.toml", "config/lexgen.toml"];
        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // XDG config directory
        if let Some(dirs) = directories::ProjectDirs::from("dev", "lexicon", "lexgen") {
            let xdg_config = dirs.config_dir().join("lexgen.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // LEXGEN__OUTPUT__DIR=... etc.
        builder = builder.add_source(
            Environment::with_prefix("LEXGEN")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LexgenConfig::default();
        assert_eq!(config.input.dir, PathBuf::from("lexicons"));
        assert!(!config.output.check);
        assert!(config.validation.meta_schema.is_none());
    }

    #[test]
    fn test_serialize_config() {
        let config = LexgenConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[input]"));
        assert!(toml_str.contains("[output]"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(
            &path,
            "[input]\ndir = \"schemas\"\n\n[output]\ndir = \"gen\"\ncheck = true\n",
        )
        .unwrap();

        let config = LexgenConfig::load_from(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(config.input.dir, PathBuf::from("schemas"));
        assert_eq!(config.output.dir, PathBuf::from("gen"));
        assert!(config.output.check);
        // Unset keys keep their defaults
        assert_eq!(config.input.skip_prefixes, default_skip_prefixes());
    }
}
