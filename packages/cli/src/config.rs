use lessondoc_validator::ValidationOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_NAME: &str = "lessondoc.config.json";

/// Output format produced by `lessondoc render`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EmitTarget {
    Html,
    Markdown,
}

impl EmitTarget {
    pub fn extension(self) -> &'static str {
        match self {
            EmitTarget::Html => "html",
            EmitTarget::Markdown => "md",
        }
    }
}

/// Lessondoc configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Directory containing `.json` content files
    #[serde(default = "default_src_dir")]
    pub src_dir: String,

    #[serde(default = "default_out_dir")]
    pub out_dir: String,

    /// Formats to emit
    #[serde(default = "default_emit")]
    pub emit: Vec<EmitTarget>,

    #[serde(default)]
    pub validation: ValidationOptions,

    /// Indent HTML output
    #[serde(default)]
    pub pretty: bool,
}

fn default_src_dir() -> String {
    "content".to_string()
}

fn default_out_dir() -> String {
    "dist".to_string()
}

fn default_emit() -> Vec<EmitTarget> {
    vec![EmitTarget::Html]
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &str) -> anyhow::Result<Self> {
        let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            tracing::debug!("Loaded {}", config_path.display());
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn get_src_dir(&self, cwd: &str) -> PathBuf {
        Path::new(cwd).join(&self.src_dir)
    }

    pub fn get_out_dir(&self, cwd: &str) -> PathBuf {
        Path::new(cwd).join(&self.out_dir)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            src_dir: default_src_dir(),
            out_dir: default_out_dir(),
            emit: default_emit(),
            validation: ValidationOptions::default(),
            pretty: false,
        }
    }
}
