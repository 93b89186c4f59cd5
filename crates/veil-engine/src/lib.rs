//! Pipelines wiring sources, the reservoir, storage and redaction together

pub mod redaction;
pub mod sampling;

pub use redaction::{
    AudioRedactor, IntervalFileWriter, PhraseDetector, RedactionOptions, RedactionOutput,
    RedactionPipeline, StaticPhrases,
};
pub use sampling::{DecisionCounts, SampleSummary, SamplingOptions, SamplingPipeline};
