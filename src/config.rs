//! Configuration file handling for zhuge-server.
//!
//! Loads settings from `~/.config/zhuge-server/config.toml` or a custom path,
//! then applies environment overrides. API keys are only ever read from the
//! environment (a `.env` file is loaded first by the binary).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::llm::{
    ProviderSettings, DASHSCOPE_API_KEY_ENV, DASHSCOPE_DEFAULT_MODEL, DASHSCOPE_ENDPOINT,
    OPENROUTER_API_KEY_ENV, OPENROUTER_DEFAULT_MODEL, OPENROUTER_ENDPOINT,
};
use crate::video::{
    VIDEO_API_BASE_URL, VIDEO_API_KEY_ENV, VIDEO_DEFAULT_MODEL, DEFAULT_MAX_POLL_ATTEMPTS,
    DEFAULT_POLL_INTERVAL,
};

/// Configuration file structure for zhuge-server.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub video: VideoConfig,
    /// Credentials, never read from or written to the file.
    #[serde(skip)]
    pub keys: ApiKeys,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
    #[serde(default = "default_knowledge_dir")]
    pub knowledge_dir: PathBuf,
    #[serde(default = "default_battle_cache_dir")]
    pub battle_cache_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
            knowledge_dir: default_knowledge_dir(),
            battle_cache_dir: default_battle_cache_dir(),
        }
    }
}

/// Which text-generation backend an adapter slot uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Dashscope,
    Openrouter,
}

impl ProviderKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "dashscope" | "alibaba" | "bailian" => Some(ProviderKind::Dashscope),
            "openrouter" => Some(ProviderKind::Openrouter),
            _ => None,
        }
    }

    pub fn other(&self) -> Self {
        match self {
            ProviderKind::Dashscope => ProviderKind::Openrouter,
            ProviderKind::Openrouter => ProviderKind::Dashscope,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_primary")]
    pub primary: ProviderKind,
    #[serde(default = "default_backup")]
    pub backup: ProviderKind,
    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_dashscope")]
    pub dashscope: EndpointConfig,
    #[serde(default = "default_openrouter")]
    pub openrouter: EndpointConfig,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            primary: default_primary(),
            backup: default_backup(),
            timeout_secs: default_llm_timeout_secs(),
            dashscope: default_dashscope(),
            openrouter: default_openrouter(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    pub endpoint: String,
    pub model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoConfig {
    #[serde(default = "default_video_base_url")]
    pub base_url: String,
    #[serde(default = "default_video_model")]
    pub model: String,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_max_poll_attempts")]
    pub max_poll_attempts: u32,
    /// Stop polling after this many consecutive status errors. Off when unset.
    #[serde(default)]
    pub error_streak_limit: Option<u32>,
    #[serde(default = "default_llm_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            base_url: default_video_base_url(),
            model: default_video_model(),
            poll_interval_secs: default_poll_interval_secs(),
            max_poll_attempts: default_max_poll_attempts(),
            error_streak_limit: None,
            request_timeout_secs: default_llm_timeout_secs(),
        }
    }
}

/// API keys gathered from the environment.
#[derive(Debug, Clone, Default)]
pub struct ApiKeys {
    pub dashscope: Option<String>,
    pub openrouter: Option<String>,
    pub video: Option<String>,
}

impl ApiKeys {
    pub fn from_env() -> Self {
        Self {
            dashscope: non_empty_env(DASHSCOPE_API_KEY_ENV),
            openrouter: non_empty_env(OPENROUTER_API_KEY_ENV),
            video: non_empty_env(VIDEO_API_KEY_ENV),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("static")
}

fn default_knowledge_dir() -> PathBuf {
    PathBuf::from("knowledge_base")
}

fn default_battle_cache_dir() -> PathBuf {
    PathBuf::from("generated_content/battles")
}

fn default_primary() -> ProviderKind {
    ProviderKind::Dashscope
}

fn default_backup() -> ProviderKind {
    ProviderKind::Openrouter
}

fn default_llm_timeout_secs() -> u64 {
    30
}

fn default_dashscope() -> EndpointConfig {
    EndpointConfig {
        endpoint: DASHSCOPE_ENDPOINT.to_string(),
        model: DASHSCOPE_DEFAULT_MODEL.to_string(),
    }
}

fn default_openrouter() -> EndpointConfig {
    EndpointConfig {
        endpoint: OPENROUTER_ENDPOINT.to_string(),
        model: OPENROUTER_DEFAULT_MODEL.to_string(),
    }
}

fn default_video_base_url() -> String {
    VIDEO_API_BASE_URL.to_string()
}

fn default_video_model() -> String {
    VIDEO_DEFAULT_MODEL.to_string()
}

fn default_poll_interval_secs() -> u64 {
    DEFAULT_POLL_INTERVAL.as_secs()
}

fn default_max_poll_attempts() -> u32 {
    DEFAULT_MAX_POLL_ATTEMPTS
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    /// Load configuration from a file path.
    /// Returns default config if the file doesn't exist.
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.map(PathBuf::from).unwrap_or_else(default_path);

        if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::IoError {
                path: path.clone(),
                source: e,
            })?;
            Self::from_toml_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.clone(),
                source: e,
            })
        } else {
            Ok(Config::default())
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Apply environment overrides and read API keys.
    pub fn apply_env(&mut self) {
        self.apply_overrides(non_empty_env);
        self.keys = ApiKeys::from_env();
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(provider) = lookup("MODEL_PROVIDER") {
            match ProviderKind::parse(&provider) {
                Some(kind) => {
                    self.llm.primary = kind;
                    self.llm.backup = kind.other();
                }
                None => log::warn!("Ignoring unknown MODEL_PROVIDER '{}'", provider),
            }
        }
        if let Some(model) = lookup("ALIBABA_MODEL") {
            self.llm.dashscope.model = model;
        }
        if let Some(endpoint) = lookup("ALIBABA_BAILIAN_ENDPOINT") {
            self.llm.dashscope.endpoint = endpoint;
        }
        if let Some(model) = lookup("OPENROUTER_MODEL") {
            self.llm.openrouter.model = model;
        }
        if let Some(host) = lookup("ZHUGE_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("ZHUGE_PORT") {
            match port.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => log::warn!("Ignoring invalid ZHUGE_PORT '{}'", port),
            }
        }
    }

    /// Adapter settings for one provider kind.
    pub fn provider_settings(&self, kind: ProviderKind) -> ProviderSettings {
        let (endpoint, api_key) = match kind {
            ProviderKind::Dashscope => (&self.llm.dashscope, self.keys.dashscope.clone()),
            ProviderKind::Openrouter => (&self.llm.openrouter, self.keys.openrouter.clone()),
        };
        ProviderSettings {
            api_key,
            endpoint: endpoint.endpoint.clone(),
            model: endpoint.model.clone(),
            timeout: Duration::from_secs(self.llm.timeout_secs.max(1)),
        }
    }

    /// Human-readable summary with credentials redacted.
    pub fn summary(&self) -> String {
        let present = |key: &Option<String>| if key.is_some() { "set" } else { "missing" };
        format!(
            "listen {}:{} | llm primary={:?} backup={:?} (dashscope key {}, openrouter key {}) | video model={} key {} poll {}s x{}",
            self.server.host,
            self.server.port,
            self.llm.primary,
            self.llm.backup,
            present(&self.keys.dashscope),
            present(&self.keys.openrouter),
            self.video.model,
            present(&self.keys.video),
            self.video.poll_interval_secs,
            self.video.max_poll_attempts,
        )
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{}': {source}", .path.display())]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{}': {source}", .path.display())]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Get the default config file path.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("zhuge-server").join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("zhuge-server.toml"))
}

/// Commented default configuration written by `config init`.
pub const DEFAULT_CONFIG_TOML: &str = r#"# zhuge-server configuration
# API keys are read from the environment (or a .env file):
#   ALIBABA_BAILIAN_API_KEY, OPENROUTER_API_KEY, ZHIPUAI_API_KEY

[server]
host = "0.0.0.0"
port = 8000
static_dir = "static"
knowledge_dir = "knowledge_base"
battle_cache_dir = "generated_content/battles"

[llm]
# dashscope | openrouter (MODEL_PROVIDER overrides the primary)
primary = "dashscope"
backup = "openrouter"
timeout_secs = 30

[llm.dashscope]
endpoint = "https://dashscope.aliyuncs.com/api/v1/services/aigc/text-generation/generation"
model = "qwen-max"

[llm.openrouter]
endpoint = "https://openrouter.ai/api/v1/chat/completions"
model = "mistralai/mistral-7b-instruct"

[video]
base_url = "https://open.bigmodel.cn/api/paas/v4"
model = "cogvideox-flash"
poll_interval_secs = 5
max_poll_attempts = 60
# error_streak_limit = 10
request_timeout_secs = 30
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.llm.primary, ProviderKind::Dashscope);
        assert_eq!(config.llm.backup, ProviderKind::Openrouter);
        assert_eq!(config.video.poll_interval_secs, 5);
        assert_eq!(config.video.max_poll_attempts, 60);
        assert!(config.video.error_streak_limit.is_none());
    }

    #[test]
    fn test_default_toml_parses_to_defaults() {
        let config = Config::from_toml_str(DEFAULT_CONFIG_TOML).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.llm.dashscope.model, "qwen-max");
        assert_eq!(config.video.model, "cogvideox-flash");
        assert_eq!(config.video.max_poll_attempts, 60);
    }

    #[test]
    fn test_partial_file() {
        let config = Config::from_toml_str(
            r#"
            [llm]
            primary = "openrouter"

            [video]
            error_streak_limit = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.llm.primary, ProviderKind::Openrouter);
        assert_eq!(config.llm.backup, ProviderKind::Openrouter);
        assert_eq!(config.video.error_streak_limit, Some(5));
        assert_eq!(config.server.port, 8000);
    }

    #[test]
    fn test_load_missing_file_returns_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config.server.port, 8000);
    }

    #[test]
    fn test_load_invalid_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[server\nport = ").unwrap();
        let result = Config::load(Some(&path));
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn test_model_provider_override_swaps_backup() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("MODEL_PROVIDER", "openrouter"),
            ("OPENROUTER_MODEL", "qwen/qwen-2-7b"),
            ("ZHUGE_PORT", "9000"),
        ]);
        let mut config = Config::default();
        config.apply_overrides(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(config.llm.primary, ProviderKind::Openrouter);
        assert_eq!(config.llm.backup, ProviderKind::Dashscope);
        assert_eq!(config.llm.openrouter.model, "qwen/qwen-2-7b");
        assert_eq!(config.server.port, 9000);
    }

    #[test]
    fn test_provider_settings_clamps_zero_timeout() {
        let mut config = Config::default();
        config.llm.timeout_secs = 0;
        let settings = config.provider_settings(ProviderKind::Dashscope);
        assert_eq!(settings.timeout, Duration::from_secs(1));
    }

    #[test]
    fn test_unknown_provider_is_ignored() {
        let mut config = Config::default();
        config.apply_overrides(|name| (name == "MODEL_PROVIDER").then(|| "gpt".to_string()));
        assert_eq!(config.llm.primary, ProviderKind::Dashscope);
    }

    #[test]
    fn test_summary_redacts_keys() {
        let mut config = Config::default();
        config.keys.dashscope = Some("sk-secret".to_string());
        let summary = config.summary();
        assert!(summary.contains("dashscope key set"));
        assert!(summary.contains("openrouter key missing"));
        assert!(!summary.contains("sk-secret"));
    }

    #[test]
    fn test_provider_settings() {
        let mut config = Config::default();
        config.keys.openrouter = Some("or-key".to_string());
        let settings = config.provider_settings(ProviderKind::Openrouter);
        assert_eq!(settings.api_key.as_deref(), Some("or-key"));
        assert_eq!(settings.model, OPENROUTER_DEFAULT_MODEL);
        assert_eq!(settings.timeout, Duration::from_secs(30));
    }
}
