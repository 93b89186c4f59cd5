//! Transcript redaction engine

use serde::{Deserialize, Serialize};
use tracing::info;
use veil_core::{RedactionInterval, Result, Token, Transcript};

use crate::matcher::{MatchSpan, PiiMatcher};
use crate::merger::{contiguous_runs, merge_intervals};
use crate::phrase::PhraseDictionary;

pub const DEFAULT_PLACEHOLDER: &str = "<PII>";

/// Everything downstream text and audio writers need for one transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedactionSchedule {
    /// Flagged token ordinals, strictly increasing
    pub ordinals: Vec<usize>,
    /// Maximal runs of flagged ordinals
    pub runs: Vec<MatchSpan>,
    /// One time interval per run
    pub intervals: Vec<RedactionInterval>,
    /// Transcript text with each run replaced by the placeholder
    pub text: String,
}

impl RedactionSchedule {
    pub fn is_clean(&self) -> bool {
        self.ordinals.is_empty()
    }
}

/// Matches a phrase dictionary against transcripts.
/// The trie is built once and reused for every transcript.
pub struct Redactor {
    matcher: PiiMatcher,
    placeholder: String,
}

impl Redactor {
    pub fn new(dictionary: &PhraseDictionary) -> Self {
        Self {
            matcher: PiiMatcher::new(dictionary),
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
        }
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn matcher(&self) -> &PiiMatcher {
        &self.matcher
    }

    pub fn redact(&self, transcript: &Transcript) -> Result<RedactionSchedule> {
        let ordinals = self.matcher.match_transcript(transcript);
        let runs = contiguous_runs(&ordinals)?;
        let intervals = merge_intervals(&ordinals, transcript.tokens())?;
        let text = redact_text(transcript.tokens(), &ordinals, &self.placeholder);

        info!(
            tokens = transcript.len(),
            flagged = ordinals.len(),
            intervals = intervals.len(),
            "transcript redacted"
        );

        Ok(RedactionSchedule {
            ordinals,
            runs,
            intervals,
            text,
        })
    }
}

/// Join token words with spaces, collapsing each run of flagged tokens
/// into a single placeholder. `ordinals` must be sorted.
pub fn redact_text(tokens: &[Token], ordinals: &[usize], placeholder: &str) -> String {
    let mut words: Vec<&str> = Vec::with_capacity(tokens.len());
    let mut flagged = ordinals.iter().peekable();
    let mut in_run = false;

    for token in tokens {
        let is_flagged = flagged.next_if(|&&o| o == token.ordinal).is_some();
        if is_flagged {
            if !in_run {
                words.push(placeholder);
            }
        } else {
            words.push(token.word.trim());
        }
        in_run = is_flagged;
    }

    words.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transcript() -> Transcript {
        Transcript::from_json(
            r#"[
                {"word": "bonjour", "start": 0.0, "end": 0.8},
                {"word": "jean", "start": 1.0, "end": 1.5},
                {"word": "dupont", "start": 1.5, "end": 2.0},
                {"word": "habite", "start": 2.2, "end": 3.9},
                {"word": "paris", "start": 4.0, "end": 4.4}
            ]"#,
        )
        .unwrap()
    }

    #[test]
    fn test_full_schedule() {
        let redactor = Redactor::new(&PhraseDictionary::from_phrases(["jean dupont", "paris"]));

        let schedule = redactor.redact(&transcript()).unwrap();

        assert_eq!(schedule.ordinals, vec![1, 2, 4]);
        assert_eq!(
            schedule.runs,
            vec![MatchSpan { start: 1, end: 2 }, MatchSpan { start: 4, end: 4 }]
        );
        assert_eq!(
            schedule.intervals,
            vec![
                RedactionInterval {
                    start: 1.0,
                    end: 2.0
                },
                RedactionInterval {
                    start: 4.0,
                    end: 4.4
                },
            ]
        );
        assert_eq!(schedule.text, "bonjour <PII> habite <PII>");
    }

    #[test]
    fn test_no_pii() {
        let redactor = Redactor::new(&PhraseDictionary::new());

        let schedule = redactor.redact(&transcript()).unwrap();

        assert!(schedule.is_clean());
        assert!(schedule.intervals.is_empty());
        assert_eq!(schedule.text, "bonjour jean dupont habite paris");
    }

    #[test]
    fn test_custom_placeholder() {
        let redactor =
            Redactor::new(&PhraseDictionary::from_phrases(["bonjour"])).with_placeholder("[X]");

        let schedule = redactor.redact(&transcript()).unwrap();
        assert_eq!(schedule.text, "[X] jean dupont habite paris");
    }

    #[test]
    fn test_adjacent_runs_collapse_once() {
        let transcript = transcript();
        let text = redact_text(transcript.tokens(), &[0, 1, 2, 3, 4], "<PII>");
        assert_eq!(text, "<PII>");
    }

    #[test]
    fn test_schedule_serializes() {
        let redactor = Redactor::new(&PhraseDictionary::from_phrases(["paris"]));
        let schedule = redactor.redact(&transcript()).unwrap();

        let json = serde_json::to_value(&schedule).unwrap();
        assert_eq!(json["ordinals"], serde_json::json!([4]));
        assert_eq!(json["intervals"][0]["start"], serde_json::json!(4.0));
    }
}
