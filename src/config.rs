//! Configuration for the QA front end.
//!
//! Configuration sources (highest priority first):
//! 1. Command-line flags and their environment variables
//!    (SEMQA_HOST, SEMQA_PORT, SEMQA_ENDPOINT, SEMQA_FEEDBACK_FILE)
//! 2. Config file (.semqa/config.yaml)
//! 3. Defaults
//!
//! Config file discovery:
//! - Searches current directory and parents for .semqa/config.yaml
//! - Falls back to ~/.semqa/config.yaml
//! - Relative paths in the config file are resolved against the directory
//!   that contains .semqa/

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::adapters::HttpBackendConfig;
use crate::core::{MAX_RESULTS, MIN_RESULTS};

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 54321;
pub const DEFAULT_ENDPOINT: &str = "/doc_chunker";
pub const DEFAULT_FEEDBACK_FILE: &str = "/tmp/feedback.tsv";
pub const DEFAULT_N_OF_RESULTS: u32 = 5;

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub backend: BackendSection,
    #[serde(default)]
    pub feedback: FeedbackSection,
    #[serde(default)]
    pub display: DisplaySection,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BackendSection {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub endpoint: Option<String>,
    /// Results requested per query (hint to the backend)
    pub n_of_results: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedbackSection {
    /// Feedback log path (relative to the project root)
    pub file: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DisplaySection {
    /// Maximum chunks printed per document
    pub max_chunks: Option<usize>,
}

/// Resolved configuration
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub backend: HttpBackendConfig,
    pub feedback_file: PathBuf,
    pub n_of_results: u32,
    pub max_chunks: Option<usize>,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            backend: HttpBackendConfig {
                host: DEFAULT_HOST.to_string(),
                port: DEFAULT_PORT,
                endpoint: DEFAULT_ENDPOINT.to_string(),
            },
            feedback_file: PathBuf::from(DEFAULT_FEEDBACK_FILE),
            n_of_results: DEFAULT_N_OF_RESULTS,
            max_chunks: None,
            config_file: None,
        }
    }
}

/// Values supplied on the command line (or via their env vars)
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub endpoint: Option<String>,
    pub feedback_file: Option<PathBuf>,
    pub n_of_results: Option<u32>,
    pub max_chunks: Option<usize>,
}

impl ResolvedConfig {
    /// Apply command-line overrides on top of this configuration
    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        if let Some(host) = overrides.host {
            self.backend.host = host;
        }
        if let Some(port) = overrides.port {
            self.backend.port = port;
        }
        if let Some(endpoint) = overrides.endpoint {
            self.backend.endpoint = endpoint;
        }
        if let Some(path) = overrides.feedback_file {
            self.feedback_file = path;
        }
        if let Some(n) = overrides.n_of_results {
            self.n_of_results = n.clamp(MIN_RESULTS, MAX_RESULTS);
        }
        if overrides.max_chunks.is_some() {
            self.max_chunks = overrides.max_chunks;
        }
        self
    }
}

/// Find config file by searching current directory and parents, then home
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".semqa").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    let home_config = dirs::home_dir()?.join(".semqa").join("config.yaml");
    home_config.exists().then_some(home_config)
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to the config file's project root
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}

/// Merge a parsed config file over the defaults
fn resolve_config(config_path: &Path, file: ConfigFile) -> ResolvedConfig {
    let defaults = ResolvedConfig::default();

    // Base directory is the parent of .semqa/ (i.e., grandparent of config.yaml)
    let base_dir = config_path
        .parent()
        .and_then(|p| p.parent())
        .unwrap_or(Path::new("."));

    let backend = HttpBackendConfig {
        host: file.backend.host.unwrap_or(defaults.backend.host),
        port: file.backend.port.unwrap_or(defaults.backend.port),
        endpoint: file.backend.endpoint.unwrap_or(defaults.backend.endpoint),
    };

    let feedback_file = file
        .feedback
        .file
        .map(|f| resolve_path(base_dir, &f))
        .unwrap_or(defaults.feedback_file);

    let n_of_results = file
        .backend
        .n_of_results
        .map(|n| n.clamp(MIN_RESULTS, MAX_RESULTS))
        .unwrap_or(defaults.n_of_results);

    ResolvedConfig {
        backend,
        feedback_file,
        n_of_results,
        max_chunks: file.display.max_chunks,
        config_file: Some(config_path.to_path_buf()),
    }
}

/// Load configuration from the config file (if any) and defaults
fn load_config() -> Result<ResolvedConfig> {
    match find_config_file() {
        Some(path) => {
            let file = load_config_file(&path)?;
            Ok(resolve_config(&path, file))
        }
        None => Ok(ResolvedConfig::default()),
    }
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| format!("{:#}", e)));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}
