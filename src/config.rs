use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use url::Url;
use zeroize::Zeroize;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_TIMEOUT_SECS: u64 = 20;
const MAX_TIMEOUT_SECS: u64 = 120;

/// Environment variables consulted for the credential, in order.
pub const API_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

#[derive(Debug, Deserialize, Default)]
struct FoodshareConfigFile {
    classifier: Option<ClassifierConfigFile>,
}

#[derive(Debug, Deserialize, Default)]
struct ClassifierConfigFile {
    model: Option<String>,
    endpoint: Option<String>,
    timeout_secs: Option<u64>,
}

/// Credential for the classification service.
///
/// Wiped from memory on drop and never printed by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Returns `None` for blank values: an empty credential is the same as none.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let mut raw = raw.into();
        let trimmed = raw.trim().to_string();
        raw.zeroize();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

impl Drop for ApiKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    pub api_key: Option<ApiKey>,
    pub model: String,
    pub endpoint: String,
    pub timeout: Duration,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ClassifierConfig {
    /// Load once at process start: optional file named by `FOODSHARE_CONFIG`,
    /// then environment overrides, then validation.
    ///
    /// A missing credential is not an error; the client runs degraded.
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("FOODSHARE_CONFIG").ok();
        let file_cfg = match config_path.as_deref() {
            Some(path) if !path.trim().is_empty() => Some(read_config_file(Path::new(path))?),
            _ => None,
        };
        let mut cfg = Self::from_file(file_cfg.unwrap_or_default());
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Same as `load` but with an explicit file and no environment lookups
    /// other than the credential.
    pub fn from_path(path: &Path) -> Result<Self> {
        let mut cfg = Self::from_file(read_config_file(path)?);
        cfg.api_key = api_key_from_env();
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: FoodshareConfigFile) -> Self {
        let classifier = file.classifier.unwrap_or_default();
        Self {
            api_key: None,
            model: classifier
                .model
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            endpoint: classifier
                .endpoint
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            timeout: Duration::from_secs(classifier.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
        }
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(model) = std::env::var("FOODSHARE_MODEL") {
            if !model.trim().is_empty() {
                self.model = model.trim().to_string();
            }
        }
        if let Ok(endpoint) = std::env::var("FOODSHARE_ENDPOINT") {
            if !endpoint.trim().is_empty() {
                self.endpoint = endpoint.trim().to_string();
            }
        }
        if let Ok(timeout) = std::env::var("FOODSHARE_TIMEOUT_SECS") {
            let seconds: u64 = timeout.trim().parse().map_err(|_| {
                anyhow!("FOODSHARE_TIMEOUT_SECS must be an integer number of seconds")
            })?;
            self.timeout = Duration::from_secs(seconds);
        }
        self.api_key = api_key_from_env();
        Ok(())
    }

    fn validate(&mut self) -> Result<()> {
        let model = self.model.trim();
        if model.is_empty() {
            return Err(anyhow!("classifier model must not be empty"));
        }
        if model.contains('/') {
            return Err(anyhow!("classifier model '{}' must not contain '/'", model));
        }
        self.model = model.to_string();

        let endpoint = Url::parse(&self.endpoint)
            .with_context(|| format!("invalid classifier endpoint '{}'", self.endpoint))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(anyhow!(
                "unsupported endpoint scheme '{}'; expected http(s)",
                endpoint.scheme()
            ));
        }
        self.endpoint = self.endpoint.trim_end_matches('/').to_string();

        let secs = self.timeout.as_secs();
        if secs == 0 || secs > MAX_TIMEOUT_SECS {
            return Err(anyhow!(
                "classifier timeout must be between 1 and {} seconds",
                MAX_TIMEOUT_SECS
            ));
        }
        Ok(())
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }
}

fn api_key_from_env() -> Option<ApiKey> {
    API_KEY_VARS
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find_map(|value| ApiKey::new(value))
}

fn read_config_file(path: &Path) -> Result<FoodshareConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let is_toml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
    let cfg = if is_toml {
        toml::from_str(&raw).map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?
    } else {
        serde_json::from_str(&raw)
            .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?
    };
    Ok(cfg)
}
