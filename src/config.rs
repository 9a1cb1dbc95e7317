use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    error::{Error, Result},
    vectorizer::{analyzer::Analyzer, evaluate::scoring::DEFAULT_TOP_K, tfidf::TFIDFOptions},
};

/// Configuration for the whole recommender.
///
/// Every section is optional in the YAML file; missing sections and fields
/// take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub data: DataConfig,
    pub model: ModelConfig,
    pub search: SearchConfig,
    pub analytics: AnalyticsConfig,
    /// options used by `fit` when building a new artifact
    pub fit: TFIDFOptions,
    pub analyzer: Analyzer,
    pub contact: ContactConfig,
}

/// Job catalog source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub path: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/job_postings.csv"),
        }
    }
}

/// Fitted vectorizer artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub path: PathBuf,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/tfidf_vectorizer.cbor"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Number of recommendations per query
    pub top_k: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { top_k: DEFAULT_TOP_K }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Categories shown in the chart
    pub top_categories: usize,
    /// Width in characters of the longest bar
    pub bar_width: usize,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            top_categories: 10,
            bar_width: 40,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactConfig {
    pub email: String,
    pub address: String,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            email: "ABC@example.com".to_string(),
            address: "NextHikes IT Solutions, Gurugram, India".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&contents)
    }

    /// Load configuration from `path` if it exists, otherwise use defaults.
    /// A file that exists but cannot be read or parsed is still an error.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        match Self::load(path.as_ref()) {
            Err(Error::Io { source, .. }) if source.kind() == ErrorKind::NotFound => {
                debug!(path = %path.as_ref().display(), "no config file, using defaults");
                Ok(Self::default())
            }
            other => other,
        }
    }

    pub fn from_yaml(contents: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Counts and widths must be positive
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("search.top_k", self.search.top_k),
            ("analytics.top_categories", self.analytics.top_categories),
            ("analytics.bar_width", self.analytics.bar_width),
        ];
        if let Some((field, _)) = positive.iter().find(|(_, value)| *value == 0) {
            return Err(Error::InvalidOptions(format!("{field} must be at least 1")));
        }
        self.fit.validate()
    }
}
