//! Gateway configuration
//!
//! Loaded from HCL (or JSON, detected by a leading `{`), then overridden by
//! environment variables. Read-only once the services are built.

use crate::error::{GatewayError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::path::PathBuf;
use std::time::Duration;

/// A string wrapper that redacts its value in Debug, Display and serialized
/// output. Used for backend API keys.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SecretString(String);

impl SecretString {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Access the secret value (only for request headers)
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for SecretString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl std::fmt::Display for SecretString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SecretString {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Serialize for SecretString {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str("[REDACTED]")
    }
}

impl<'de> Deserialize<'de> for SecretString {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self)
    }
}

/// Main gateway configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Routing threshold and backend endpoints
    #[serde(default)]
    pub routing: RoutingConfig,

    /// Content inspector configuration
    #[serde(default)]
    pub inspector: InspectorConfig,

    /// Compliance audit log configuration
    #[serde(default)]
    pub audit: AuditConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Maximum prompt size in bytes
    pub max_request_size: usize,

    /// Enable the CORS layer
    pub enable_cors: bool,

    /// Allowed origins; `*` allows any
    pub cors_origins: Vec<String>,

    /// Default log level when neither `RUST_LOG` nor `--verbose` is given
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            max_request_size: 1024 * 1024,
            enable_cors: true,
            cors_origins: vec!["*".to_string()],
            log_level: "info".to_string(),
        }
    }
}

/// Routing decision configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Score at or above which requests are kept sovereign
    pub threshold: f64,

    /// Remote backend
    pub cloud: CloudBackendConfig,

    /// Local backend
    pub sovereign: SovereignBackendConfig,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            threshold: 0.3,
            cloud: CloudBackendConfig::default(),
            sovereign: SovereignBackendConfig::default(),
        }
    }
}

/// OpenAI-compatible cloud backend
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudBackendConfig {
    pub base_url: String,
    pub api_key: Option<SecretString>,
    pub model: String,
    pub timeout_secs: u64,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl CloudBackendConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.as_ref().is_some_and(|k| !k.is_empty())
    }
}

impl Default for CloudBackendConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: None,
            model: "gpt-4o".to_string(),
            timeout_secs: 30,
            max_tokens: 1000,
            temperature: 0.7,
        }
    }
}

/// Ollama-compatible local backend
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SovereignBackendConfig {
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl SovereignBackendConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for SovereignBackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://ollama:11434".to_string(),
            model: "llama3".to_string(),
            timeout_secs: 60,
        }
    }
}

/// Content inspector configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InspectorConfig {
    /// Enforce identifier check digits when assigning confidence
    pub strict_checksums: bool,

    /// Keywords appended to the built-in sensitive-topic list
    pub extra_keywords: Vec<String>,
}

/// Audit log configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Append-only JSONL file
    pub log_file: PathBuf,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            log_file: PathBuf::from("sovereign_audit.log"),
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| GatewayError::Config(format!("Invalid value for {}: {} ({})", key, value, e)))
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "true" | "1" | "yes")
}

impl GatewayConfig {
    /// Parse configuration from an HCL string (or JSON).
    pub fn from_hcl(content: &str) -> Result<Self> {
        if content.trim_start().starts_with('{') {
            return serde_json::from_str(content)
                .map_err(|e| GatewayError::Config(format!("Failed to parse JSON config: {}", e)));
        }
        hcl::from_str(content)
            .map_err(|e| GatewayError::Config(format!("Failed to parse HCL config: {}", e)))
    }

    /// Apply environment overrides from the process environment
    pub fn apply_process_env(&mut self) -> Result<()> {
        self.apply_env_overrides(|key| std::env::var(key).ok())
    }

    /// Apply environment overrides through a lookup function.
    ///
    /// Unset variables leave the loaded value in place; unparseable numbers
    /// are a configuration error.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let routing = &mut self.routing;
        if let Some(v) = lookup("OPENAI_API_KEY") {
            routing.cloud.api_key = Some(SecretString::new(v));
        }
        if let Some(v) = lookup("OPENAI_BASE_URL") {
            routing.cloud.base_url = v;
        }
        if let Some(v) = lookup("OPENAI_MODEL") {
            routing.cloud.model = v;
        }
        if let Some(v) = lookup("OPENAI_TIMEOUT") {
            routing.cloud.timeout_secs = parse_env("OPENAI_TIMEOUT", &v)?;
        }
        if let Some(v) = lookup("OPENAI_MAX_TOKENS") {
            routing.cloud.max_tokens = parse_env("OPENAI_MAX_TOKENS", &v)?;
        }
        if let Some(v) = lookup("OLLAMA_BASE_URL") {
            routing.sovereign.base_url = v;
        }
        if let Some(v) = lookup("OLLAMA_MODEL") {
            routing.sovereign.model = v;
        }
        if let Some(v) = lookup("OLLAMA_TIMEOUT") {
            routing.sovereign.timeout_secs = parse_env("OLLAMA_TIMEOUT", &v)?;
        }
        if let Some(v) = lookup("PII_THRESHOLD") {
            routing.threshold = parse_env("PII_THRESHOLD", &v)?;
        }

        let server = &mut self.server;
        if let Some(v) = lookup("GATEWAY_HOST") {
            server.host = v;
        }
        if let Some(v) = lookup("GATEWAY_PORT") {
            server.port = parse_env("GATEWAY_PORT", &v)?;
        }
        if let Some(v) = lookup("GATEWAY_LOG_LEVEL") {
            server.log_level = v.to_lowercase();
        }
        if let Some(v) = lookup("MAX_REQUEST_SIZE") {
            server.max_request_size = parse_env("MAX_REQUEST_SIZE", &v)?;
        }
        if let Some(v) = lookup("ENABLE_CORS") {
            server.enable_cors = parse_flag(&v);
        }
        if let Some(v) = lookup("CORS_ORIGINS") {
            server.cors_origins = v
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect();
        }

        if let Some(v) = lookup("AUDIT_LOG_FILE") {
            self.audit.log_file = PathBuf::from(v);
        }

        Ok(())
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        let threshold = self.routing.threshold;
        if !threshold.is_finite() || !(0.0..=1.0).contains(&threshold) {
            return Err(GatewayError::Config(format!(
                "Routing threshold must be between 0.0 and 1.0, got {}",
                threshold
            )));
        }
        if self.server.max_request_size == 0 {
            return Err(GatewayError::Config(
                "max_request_size must be greater than zero".to_string(),
            ));
        }
        if self.routing.cloud.timeout_secs == 0 || self.routing.sovereign.timeout_secs == 0 {
            return Err(GatewayError::Config(
                "Backend timeouts must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
