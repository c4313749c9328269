use anyhow::{Context as _, anyhow};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_CLASSIFIER_URL: &str = "https://classify.roboflow.com";
pub const DEFAULT_CLASSIFIER_MODEL_ID: &str = "identify-plant-zvd1y/1";
pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.7;
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq)]
pub struct ClassifierConfig {
    pub base_url: String,
    pub model_id: String,
    pub api_key: String,
    /// Top predictions below this score are reported as unidentified
    pub min_confidence: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiseaseServiceConfig {
    pub url: String,
    pub api_key: Option<String>,
}

/// Everything the service needs, read once at start-up
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub port: u16,
    pub classifier: ClassifierConfig,
    pub disease: DiseaseServiceConfig,
    pub knowledge_base_path: Option<PathBuf>,
    pub upstream_timeout: Duration,
}

impl ServiceConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let require = |key: &str| {
            get(key).ok_or_else(|| anyhow!("{} environment variable must be set", key))
        };

        let port = match get("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("PORT must be a port number, got '{}'", raw))?,
            None => DEFAULT_PORT,
        };

        let min_confidence = match get("CLASSIFIER_MIN_CONFIDENCE") {
            Some(raw) => raw.parse::<f64>().with_context(|| {
                format!("CLASSIFIER_MIN_CONFIDENCE must be a number, got '{}'", raw)
            })?,
            None => DEFAULT_MIN_CONFIDENCE,
        };

        let timeout_secs = match get("UPSTREAM_TIMEOUT_SECS") {
            Some(raw) => raw.parse::<u64>().with_context(|| {
                format!("UPSTREAM_TIMEOUT_SECS must be whole seconds, got '{}'", raw)
            })?,
            None => DEFAULT_UPSTREAM_TIMEOUT_SECS,
        };
        if timeout_secs == 0 {
            return Err(anyhow!("UPSTREAM_TIMEOUT_SECS must be greater than zero"));
        }

        Ok(Self {
            port,
            classifier: ClassifierConfig {
                base_url: get("CLASSIFIER_URL")
                    .unwrap_or_else(|| DEFAULT_CLASSIFIER_URL.to_string())
                    .trim_end_matches('/')
                    .to_string(),
                model_id: get("CLASSIFIER_MODEL_ID")
                    .unwrap_or_else(|| DEFAULT_CLASSIFIER_MODEL_ID.to_string()),
                api_key: require("ROBOFLOW_API_KEY")?,
                min_confidence,
            },
            disease: DiseaseServiceConfig {
                url: require("DISEASE_SERVICE_URL")?,
                api_key: get("DISEASE_SERVICE_API_KEY"),
            },
            knowledge_base_path: get("KNOWLEDGE_BASE_PATH").map(PathBuf::from),
            upstream_timeout: Duration::from_secs(timeout_secs),
        })
    }
}
