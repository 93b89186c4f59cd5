//! Tokenized transcript model

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::Result;

/// A single timed word as emitted by the transcription service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedWord {
    pub word: String,
    pub start: f64,
    pub end: f64,
}

/// A timed word with its position in the transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub word: String,
    pub start: f64,
    pub end: f64,
    pub ordinal: usize,
}

/// Ordered tokens with contiguous ordinals `0..n`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    tokens: Vec<Token>,
}

impl Transcript {
    pub fn from_words(words: Vec<TimedWord>) -> Self {
        let tokens = words
            .into_iter()
            .enumerate()
            .map(|(ordinal, w)| Token {
                word: w.word,
                start: w.start,
                end: w.end,
                ordinal,
            })
            .collect();

        Self { tokens }
    }

    /// Parse the `[{"word", "start", "end"}, ...]` transcription format
    pub fn from_json(json: &str) -> Result<Self> {
        let words: Vec<TimedWord> = serde_json::from_str(json)?;
        Ok(Self::from_words(words))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(|t| t.word.as_str())
    }
}

/// Time span (seconds) to blank out in the audio track
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RedactionInterval {
    pub start: f64,
    pub end: f64,
}

impl RedactionInterval {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordinals_are_contiguous() {
        let json = r#"[
            {"word": "bonjour", "start": 0.0, "end": 0.5},
            {"word": "jean", "start": 1.0, "end": 1.5},
            {"word": "dupont", "start": 1.5, "end": 2.0}
        ]"#;

        let transcript = Transcript::from_json(json).unwrap();

        assert_eq!(transcript.len(), 3);
        let ordinals: Vec<_> = transcript.tokens().iter().map(|t| t.ordinal).collect();
        assert_eq!(ordinals, vec![0, 1, 2]);
        assert_eq!(transcript.tokens()[2].word, "dupont");
    }

    #[test]
    fn test_invalid_json_is_serialization_error() {
        let err = Transcript::from_json("{not json").unwrap_err();
        assert!(matches!(err, crate::Error::Serialization(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transcript.json");
        std::fs::write(&path, r#"[{"word": "paris", "start": 4.0, "end": 4.4}]"#).unwrap();

        let transcript = Transcript::load(&path).unwrap();
        assert_eq!(transcript.words().collect::<Vec<_>>(), vec!["paris"]);
    }
}
