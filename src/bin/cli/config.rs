use dsgraph::storage::TraversalStrategy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Defaults for `generate` read from the `[generate]` table. Flags on the
/// command line take precedence over every field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateDefaults {
    pub bias: Option<i64>,
    pub tests: Option<usize>,
    pub strategy: Option<TraversalStrategy>,
    pub output_suffix: Option<String>,
}

#[derive(Debug, Default)]
pub struct CliConfig {
    path: Option<PathBuf>,
    generate: GenerateDefaults,
}

impl CliConfig {
    /// Loads `explicit`, or the default location when absent. A missing
    /// default file yields an empty configuration; a missing explicit file
    /// is an error.
    pub fn load(explicit: Option<PathBuf>) -> Result<Self, ConfigError> {
        let required = explicit.is_some();
        let path = explicit.or_else(default_config_path);
        let data = match path.as_ref() {
            Some(config_path) if config_path.exists() => read_file(config_path)?,
            Some(config_path) if required => {
                return Err(ConfigError::Missing {
                    path: config_path.clone(),
                })
            }
            _ => RawConfig::default(),
        };
        let generate = convert_generate(&data.generate)?;
        Ok(Self { path, generate })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn generate(&self) -> &GenerateDefaults {
        &self.generate
    }
}

fn read_file(path: &Path) -> Result<RawConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn parse(contents: &str) -> Result<RawConfig, toml::de::Error> {
    toml::from_str(contents)
}

fn convert_generate(raw: &RawGenerate) -> Result<GenerateDefaults, ConfigError> {
    let strategy = match raw.strategy.as_deref() {
        Some(value) => Some(value.parse::<TraversalStrategy>().map_err(|_| {
            ConfigError::InvalidStrategy {
                value: value.to_string(),
            }
        })?),
        None => None,
    };
    Ok(GenerateDefaults {
        bias: raw.bias,
        tests: raw.tests,
        strategy,
        output_suffix: raw.output_suffix.clone(),
    })
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct RawConfig {
    #[serde(default)]
    generate: RawGenerate,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
struct RawGenerate {
    bias: Option<i64>,
    tests: Option<usize>,
    strategy: Option<String>,
    output_suffix: Option<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("CLI config {path} does not exist")]
    Missing { path: PathBuf },
    #[error("failed to read CLI config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse CLI config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("generate.strategy value '{value}' is invalid (expected bottom-up, top-down or unordered)")]
    InvalidStrategy { value: String },
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|base| base.join("dsgraph").join("config.toml"))
}
