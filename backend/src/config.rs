use serde::{Deserialize, Serialize};
use shared::FallbackPolicy;
use shared::validation::DEFAULT_MAX_UPLOAD_BYTES;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Largest upload the server will accept, whatever the configuration says.
pub const MAX_UPLOAD_CEILING: usize = 100 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub upload: UploadConfig,
    pub classifier: ClassifierConfig,
    pub resolver: ResolverConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
    pub frontend_dir: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8081,
            frontend_dir: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    pub max_bytes: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierBackend {
    #[default]
    Remote,
    Torch,
}

impl FromStr for ClassifierBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "remote" => Ok(Self::Remote),
            "torch" => Ok(Self::Torch),
            other => Err(ConfigError::Invalid(format!(
                "unknown classifier backend '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub backend: ClassifierBackend,
    pub remote: RemoteConfig,
    pub torch: TorchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub endpoint: String,
    pub model_id: String,
    #[serde(skip_serializing)]
    pub token: Option<String>,
    pub timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api-inference.huggingface.co/models".to_string(),
            model_id: "Xenova/maize-disease-detection".to_string(),
            token: None,
            timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TorchConfig {
    pub model_path: String,
    pub labels_path: String,
}

impl Default for TorchConfig {
    fn default() -> Self {
        Self {
            model_path: "models/maize_classifier.pt".to_string(),
            labels_path: "models/labels.txt".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    pub fallback: FallbackPolicy,
}

impl AppConfig {
    /// Loads `APP_CONFIG` (or `config/app.yaml` next to the workspace root),
    /// then applies environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let path = match std::env::var("APP_CONFIG") {
            Ok(path) => PathBuf::from(path),
            Err(_) => default_config_path(),
        };

        let mut config = if path.exists() {
            log::info!("Loading configuration from {}", path.display());
            Self::from_path(&path)?
        } else {
            log::warn!(
                "Config file {} not found, using defaults",
                path.display()
            );
            Self::default()
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let config_str = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&config_str)
    }

    pub fn from_yaml_str(config_str: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(config_str)?)
    }

    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("PORT '{}' is not a port", port)))?;
        }
        if let Some(dir) = lookup("FRONTEND_DIR") {
            self.server.frontend_dir = Some(dir);
        }
        if let Some(max_bytes) = lookup("MAX_UPLOAD_BYTES") {
            self.upload.max_bytes = max_bytes.parse().map_err(|_| {
                ConfigError::Invalid(format!("MAX_UPLOAD_BYTES '{}' is not a number", max_bytes))
            })?;
        }
        if let Some(backend) = lookup("CLASSIFIER_BACKEND") {
            self.classifier.backend = backend.parse()?;
        }
        if let Some(endpoint) = lookup("INFERENCE_ENDPOINT") {
            self.classifier.remote.endpoint = endpoint;
        }
        if let Some(model_id) = lookup("INFERENCE_MODEL") {
            self.classifier.remote.model_id = model_id;
        }
        if let Some(token) = lookup("INFERENCE_TOKEN").filter(|t| !t.trim().is_empty()) {
            self.classifier.remote.token = Some(token);
        }
        if let Some(policy) = lookup("FALLBACK_POLICY") {
            self.resolver.fallback = policy.trim().parse().map_err(|_| {
                ConfigError::Invalid(format!("unknown fallback policy '{}'", policy))
            })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.upload.max_bytes == 0 {
            return Err(ConfigError::Invalid(
                "upload.max_bytes must be greater than zero".into(),
            ));
        }
        if self.upload.max_bytes > MAX_UPLOAD_CEILING {
            return Err(ConfigError::Invalid(format!(
                "upload.max_bytes {} exceeds the ceiling of {} bytes",
                self.upload.max_bytes, MAX_UPLOAD_CEILING
            )));
        }
        if self.classifier.backend == ClassifierBackend::Remote {
            url::Url::parse(&self.classifier.remote.endpoint).map_err(|e| {
                ConfigError::Invalid(format!(
                    "classifier.remote.endpoint '{}': {}",
                    self.classifier.remote.endpoint, e
                ))
            })?;
            if self.classifier.remote.model_id.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "classifier.remote.model_id must not be empty".into(),
                ));
            }
        }
        Ok(())
    }
}

fn default_config_path() -> PathBuf {
    match std::env::var("CARGO_MANIFEST_DIR") {
        Ok(manifest_dir) => PathBuf::from(format!("{}/../config/app.yaml", manifest_dir)),
        Err(_) => PathBuf::from("config/app.yaml"),
    }
}
