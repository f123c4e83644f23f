use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

const DEFAULT_MODEL: &str = "llama3";
const DEFAULT_OLLAMA_URL: &str = "http://127.0.0.1:11434";
const DEFAULT_CONFIG_PATH: &str = "config/logscope.toml";
const DEFAULT_REGION: &str = "us-west-2";
const DEFAULT_PROFILE: &str = "default";
const DEFAULT_MAX_STEPS: usize = 8;
const DEFAULT_GROUP_LIMIT: usize = 10;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub model: String,
    pub ollama_url: String,
    pub system_prompt: Option<String>,
    /// Log-store gateway base URL. Bootstrap fails without one.
    pub endpoint: Option<String>,
    pub region: String,
    pub profile: String,
    pub max_steps: usize,
    pub group_limit: usize,
    pub tool_server: ToolServerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ToolServerConfig {
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub env: HashMap<String, String>,
    #[serde(default)]
    pub workdir: Option<String>,
}

impl Default for ToolServerConfig {
    fn default() -> Self {
        Self {
            command: "uvx".to_string(),
            args: vec!["awslabs.cloudwatch-logs-mcp-server@latest".to_string()],
            env: HashMap::new(),
            workdir: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config from {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config from {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Deserialize, Default)]
struct RawConfig {
    model: Option<String>,
    ollama_url: Option<String>,
    system_prompt: Option<String>,
    endpoint: Option<String>,
    region: Option<String>,
    profile: Option<String>,
    max_steps: Option<usize>,
    group_limit: Option<usize>,
    tool_server: Option<ToolServerConfig>,
}

impl AppConfig {
    /// Load from an explicit path, or from the default path when present,
    /// or fall back to built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            return read_config(path);
        }
        let default_path = Path::new(DEFAULT_CONFIG_PATH);
        match read_config(default_path) {
            Ok(config) => Ok(config),
            Err(ConfigError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                info!("configuration file not found; using defaults");
                Ok(Self::default())
            }
            Err(other) => Err(other),
        }
    }

    pub fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            ollama_url: DEFAULT_OLLAMA_URL.to_string(),
            system_prompt: None,
            endpoint: None,
            region: DEFAULT_REGION.to_string(),
            profile: DEFAULT_PROFILE.to_string(),
            max_steps: DEFAULT_MAX_STEPS,
            group_limit: DEFAULT_GROUP_LIMIT,
            tool_server: ToolServerConfig::default(),
        }
    }
}

fn read_config(path: &Path) -> Result<AppConfig, ConfigError> {
    debug!(path = %path.display(), "reading configuration file");
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed: RawConfig = toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(AppConfig {
        model: parsed.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        ollama_url: parsed
            .ollama_url
            .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string()),
        system_prompt: parsed.system_prompt,
        endpoint: parsed.endpoint,
        region: parsed.region.unwrap_or_else(|| DEFAULT_REGION.to_string()),
        profile: parsed
            .profile
            .unwrap_or_else(|| DEFAULT_PROFILE.to_string()),
        max_steps: parsed.max_steps.unwrap_or(DEFAULT_MAX_STEPS),
        group_limit: parsed.group_limit.unwrap_or(DEFAULT_GROUP_LIMIT),
        tool_server: parsed.tool_server.unwrap_or_default(),
    })
}
