use std::path::PathBuf;

use anyhow::Result;
use veil_config::Config;
use veil_storage::ArtifactStore;

use crate::commands::store_options;

pub fn handle(output: Option<PathBuf>, json: bool, config: &Config) -> Result<()> {
    let options = store_options(config, output);
    if !options.root.is_dir() {
        anyhow::bail!("Test set directory does not exist: {}", options.root.display());
    }

    let store = ArtifactStore::recover(options)?;
    let artifacts: Vec<_> = store.artifacts().collect();
    let report = store.reconcile()?;

    if json {
        let listing = serde_json::json!({
            "artifacts": artifacts,
            "reconciliation": report,
        });
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }

    println!("Test set: {}", store.root().display());
    println!("Total files in test set: {}", artifacts.len());
    for artifact in artifacts {
        println!(
            "  - {} ({} bytes, {})",
            store.file_name(artifact.ordinal),
            artifact.size_bytes,
            &artifact.content_hash[..12]
        );
    }

    if report.is_consistent() {
        println!("✓ Directory listing matches the test set");
    } else {
        for ordinal in &report.missing {
            println!("  ! missing: {}", store.file_name(*ordinal));
        }
        for ordinal in &report.orphaned {
            println!("  ! orphaned: {}", store.file_name(*ordinal));
        }
        for name in &report.stale_partials {
            println!("  ! interrupted write: {}", name);
        }
    }

    Ok(())
}
