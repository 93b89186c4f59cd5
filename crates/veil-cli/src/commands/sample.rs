use std::time::Duration;

use anyhow::Result;
use veil_config::Config;
use veil_core::ReservoirSelector;
use veil_engine::{SamplingOptions, SamplingPipeline};
use veil_sources::{SourceOptions, SourceRegistry};
use veil_storage::ArtifactStore;

use crate::cli::SampleArgs;
use crate::commands::store_options;

pub fn handle(args: SampleArgs, config: &Config) -> Result<()> {
    let capacity = args.capacity.unwrap_or(config.sampler.capacity);
    let seed = args.seed.unwrap_or(config.sampler.seed);

    let mut options = store_options(config, args.output);
    if let Some(max_bytes) = args.max_bytes {
        options.max_bytes = max_bytes;
    }

    let selector = ReservoirSelector::seeded(capacity, seed)?;
    let store = ArtifactStore::new(options)?;
    let sampling = SamplingOptions {
        latency: Duration::from_millis(args.latency_ms.unwrap_or(config.sampler.latency_ms)),
        finalize_trial: config.sampler.finalize_trial && !args.no_finalize,
    };

    let mut source = SourceRegistry::open(
        &args.source,
        SourceOptions {
            extension: args.extension,
            max_files: args.max_files,
        },
    )?;

    let mut pipeline = SamplingPipeline::new(selector, store, sampling)?;
    let summary = pipeline.run(&mut source)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("✓ Sampled {} item(s)", summary.items_seen);
    println!("  Run: {}", summary.run_id);
    println!("  Seed: {}", seed);
    println!(
        "  Decisions: {} filled, {} replaced, {} rejected",
        summary.decisions.filled, summary.decisions.replaced, summary.decisions.rejected
    );
    println!("\nTest set ({}/{}):", summary.retained.len(), summary.capacity);
    for artifact in &summary.retained {
        println!("  - {} ({} bytes)", artifact.path.display(), artifact.size_bytes);
    }

    Ok(())
}
