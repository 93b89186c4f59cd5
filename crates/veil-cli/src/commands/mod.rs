pub mod inspect;
pub mod redact;
pub mod sample;

use std::path::PathBuf;

use veil_config::Config;
use veil_storage::StoreOptions;

/// Store layout from config, with an optional directory override
pub fn store_options(config: &Config, output: Option<PathBuf>) -> StoreOptions {
    StoreOptions {
        root: output.unwrap_or_else(|| config.sampler.output_dir.clone()),
        max_bytes: config.sampler.max_artifact_bytes,
        prefix: config.sampler.file_prefix.clone(),
        extension: config.sampler.file_extension.clone(),
    }
}
