use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for veil
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub sampler: SamplerConfig,

    #[serde(default)]
    pub redaction: RedactionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplerConfig {
    /// Number of items kept in the test set
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Directory holding one artifact per retained item
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    #[serde(default = "default_max_artifact_bytes")]
    pub max_artifact_bytes: u64,

    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,

    #[serde(default = "default_file_extension")]
    pub file_extension: String,

    /// Pause after each item, in milliseconds
    #[serde(default)]
    pub latency_ms: u64,

    /// Run the extra replacement trial for the last item
    #[serde(default = "default_true")]
    pub finalize_trial: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedactionConfig {
    #[serde(default = "default_placeholder")]
    pub placeholder: String,

    /// Language hint passed to the phrase detector
    #[serde(default = "default_language")]
    pub language: String,

    #[serde(default = "default_text_file")]
    pub text_file: String,

    #[serde(default = "default_schedule_file")]
    pub schedule_file: String,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            seed: default_seed(),
            output_dir: default_output_dir(),
            max_artifact_bytes: default_max_artifact_bytes(),
            file_prefix: default_file_prefix(),
            file_extension: default_file_extension(),
            latency_ms: 0,
            finalize_trial: true,
        }
    }
}

impl Default for RedactionConfig {
    fn default() -> Self {
        Self {
            placeholder: default_placeholder(),
            language: default_language(),
            text_file: default_text_file(),
            schedule_file: default_schedule_file(),
        }
    }
}

fn default_capacity() -> usize {
    5
}

fn default_seed() -> u64 {
    42
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("data/raw_audios")
}

fn default_max_artifact_bytes() -> u64 {
    25 * 1024 * 1024
}

fn default_file_prefix() -> String {
    "audio".to_string()
}

fn default_file_extension() -> String {
    "wav".to_string()
}

fn default_true() -> bool {
    true
}

fn default_placeholder() -> String {
    "<PII>".to_string()
}

fn default_language() -> String {
    "french".to_string()
}

fn default_text_file() -> String {
    "anonymized_text.txt".to_string()
}

fn default_schedule_file() -> String {
    "redaction_schedule.json".to_string()
}

impl Config {
    /// Load config from default location or create default if not found
    pub fn load() -> anyhow::Result<Self> {
        let path = Self::config_path();

        if path.exists() {
            Self::load_from(&path)
        } else {
            // Create default config file
            let config = Config::default();
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let content = toml::to_string_pretty(&config)?;
            std::fs::write(&path, content)?;
            Ok(config)
        }
    }

    /// Load config from an explicit file
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.sampler.capacity == 0 {
            anyhow::bail!("sampler.capacity must be greater than zero");
        }
        if self.sampler.file_prefix.is_empty() || self.sampler.file_extension.is_empty() {
            anyhow::bail!("sampler.file_prefix and sampler.file_extension must not be empty");
        }
        Ok(())
    }

    /// Get config file path
    pub fn config_path() -> PathBuf {
        if let Some(dirs) = directories::ProjectDirs::from("com", "veil", "veil") {
            dirs.config_dir().join("config.toml")
        } else {
            PathBuf::from("~/.veil/config.toml")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.sampler.capacity, 5);
        assert_eq!(config.sampler.seed, 42);
        assert_eq!(config.sampler.max_artifact_bytes, 25 * 1024 * 1024);
        assert!(config.sampler.finalize_trial);
        assert_eq!(config.redaction.placeholder, "<PII>");
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.sampler.capacity, config.sampler.capacity);
        assert_eq!(parsed.sampler.output_dir, config.sampler.output_dir);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let toml_str = r#"
[sampler]
capacity = 20
latency_ms = 250
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.sampler.capacity, 20);
        assert_eq!(config.sampler.latency_ms, 250);
        assert_eq!(config.sampler.seed, 42);
        assert_eq!(config.redaction.language, "french");
    }

    #[test]
    fn test_zero_capacity_fails_validation() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[sampler]\ncapacity = 0\n").unwrap();

        assert!(Config::load_from(&path).is_err());
    }
}
