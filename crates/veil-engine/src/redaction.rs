//! Transcript anonymization: detection, matching, text and audio outputs

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;
use veil_core::{RedactionInterval, Result, Transcript};
use veil_security::{PhraseDictionary, RedactionSchedule, Redactor};

/// Produces flagged phrases for a transcript (typically an LLM-backed service)
pub trait PhraseDetector {
    fn detect(&self, transcript: &Transcript, language: &str) -> Result<Vec<String>>;
}

/// Fixed phrase list, independent of the transcript
pub struct StaticPhrases {
    phrases: Vec<String>,
}

impl StaticPhrases {
    pub fn new(phrases: Vec<String>) -> Self {
        Self { phrases }
    }
}

impl PhraseDetector for StaticPhrases {
    fn detect(&self, _transcript: &Transcript, _language: &str) -> Result<Vec<String>> {
        Ok(self.phrases.clone())
    }
}

/// Applies redaction intervals to a recording (e.g. white-noise replacement)
pub trait AudioRedactor {
    fn redact_audio(&self, recording: &Path, intervals: &[RedactionInterval]) -> Result<()>;
}

#[derive(Debug, Serialize)]
struct AudioSchedule<'a> {
    recording: String,
    intervals: &'a [RedactionInterval],
}

/// Writes `<recording stem>.intervals.json` for an external audio tool
pub struct IntervalFileWriter {
    output_dir: PathBuf,
}

impl IntervalFileWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn path_for(&self, recording: &Path) -> PathBuf {
        let stem = recording
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("recording");
        self.output_dir.join(format!("{}.intervals.json", stem))
    }
}

impl AudioRedactor for IntervalFileWriter {
    fn redact_audio(&self, recording: &Path, intervals: &[RedactionInterval]) -> Result<()> {
        std::fs::create_dir_all(&self.output_dir)?;

        let schedule = AudioSchedule {
            recording: recording.display().to_string(),
            intervals,
        };
        let path = self.path_for(recording);
        std::fs::write(&path, serde_json::to_string_pretty(&schedule)?)?;

        info!(path = %path.display(), intervals = intervals.len(), "audio schedule written");
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct RedactionOptions {
    pub output_dir: PathBuf,
    pub placeholder: String,
    pub language: String,
    pub text_file: String,
    pub schedule_file: String,
}

/// Files written by one redaction run
#[derive(Debug, Clone)]
pub struct RedactionOutput {
    pub schedule: RedactionSchedule,
    pub text_path: PathBuf,
    pub schedule_path: PathBuf,
}

pub struct RedactionPipeline {
    options: RedactionOptions,
}

impl RedactionPipeline {
    pub fn new(options: RedactionOptions) -> Self {
        Self { options }
    }

    /// Build a redactor for a fixed dictionary, reusable across transcripts
    pub fn redactor(&self, dictionary: &PhraseDictionary) -> Redactor {
        Redactor::new(dictionary).with_placeholder(self.options.placeholder.clone())
    }

    /// Ask the detector for phrases, then redact with them
    pub fn detect_and_run(
        &self,
        detector: &dyn PhraseDetector,
        transcript: &Transcript,
        recording: Option<(&Path, &dyn AudioRedactor)>,
    ) -> Result<RedactionOutput> {
        let phrases = detector.detect(transcript, &self.options.language)?;
        let dictionary = PhraseDictionary::from_phrases(&phrases);
        info!(
            detected = phrases.len(),
            distinct = dictionary.len(),
            "flagged phrases detected"
        );

        self.run(&self.redactor(&dictionary), transcript, recording)
    }

    pub fn run(
        &self,
        redactor: &Redactor,
        transcript: &Transcript,
        recording: Option<(&Path, &dyn AudioRedactor)>,
    ) -> Result<RedactionOutput> {
        let schedule = redactor.redact(transcript)?;

        std::fs::create_dir_all(&self.options.output_dir)?;
        let text_path = self.options.output_dir.join(&self.options.text_file);
        std::fs::write(&text_path, &schedule.text)?;

        let schedule_path = self.options.output_dir.join(&self.options.schedule_file);
        std::fs::write(&schedule_path, serde_json::to_string_pretty(&schedule)?)?;

        if let Some((path, audio)) = recording {
            audio.redact_audio(path, &schedule.intervals)?;
        }

        info!(
            text = %text_path.display(),
            schedule = %schedule_path.display(),
            "redaction outputs written"
        );

        Ok(RedactionOutput {
            schedule,
            text_path,
            schedule_path,
        })
    }
}
