use anyhow::Result;
use veil_config::Config;
use veil_core::Transcript;
use veil_engine::{
    AudioRedactor, IntervalFileWriter, RedactionOptions, RedactionPipeline, StaticPhrases,
};
use veil_security::{PhraseDictionary, parse_detector_output};

use crate::cli::RedactArgs;

pub fn handle(args: RedactArgs, config: &Config) -> Result<()> {
    let transcript = Transcript::load(&args.transcript)?;

    let pipeline = RedactionPipeline::new(RedactionOptions {
        output_dir: args.output.clone(),
        placeholder: config.redaction.placeholder.clone(),
        language: config.redaction.language.clone(),
        text_file: config.redaction.text_file.clone(),
        schedule_file: config.redaction.schedule_file.clone(),
    });

    let writer = IntervalFileWriter::new(&args.output);
    let recording = args
        .recording
        .as_deref()
        .map(|path| (path, &writer as &dyn AudioRedactor));

    let output = match (&args.phrases, &args.detector_output) {
        (Some(path), _) => {
            let dictionary = PhraseDictionary::load(path)?;
            pipeline.run(&pipeline.redactor(&dictionary), &transcript, recording)?
        }
        (None, Some(raw)) => {
            let detector = StaticPhrases::new(parse_detector_output(raw));
            pipeline.detect_and_run(&detector, &transcript, recording)?
        }
        (None, None) => anyhow::bail!("either --phrases or --detector-output is required"),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&output.schedule)?);
        return Ok(());
    }

    println!("✓ Redacted {} token(s)", output.schedule.ordinals.len());
    println!("  Text: {}", output.text_path.display());
    println!("  Schedule: {}", output.schedule_path.display());
    if output.schedule.intervals.is_empty() {
        println!("\nNo audio intervals.");
    } else {
        println!("\nAudio intervals ({}):", output.schedule.intervals.len());
        for interval in &output.schedule.intervals {
            println!("  {:.2}s - {:.2}s", interval.start, interval.end);
        }
    }

    Ok(())
}
