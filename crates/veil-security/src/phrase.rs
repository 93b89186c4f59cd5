//! Flagged phrase dictionary

use std::collections::BTreeSet;
use std::path::Path;

use veil_core::Result;

/// Normalized form used for matching: trimmed and lower-cased
pub fn normalize_word(word: &str) -> String {
    word.trim().to_lowercase()
}

/// Split a phrase into normalized words
pub fn normalize_phrase(phrase: &str) -> Vec<String> {
    phrase.split_whitespace().map(normalize_word).collect()
}

/// Parse the comma-separated chunk list returned by the phrase detector.
///
/// Surrounding whitespace and quote characters are stripped; empty chunks
/// are dropped.
pub fn parse_detector_output(raw: &str) -> Vec<String> {
    raw.split([',', '\n'])
        .map(|chunk| chunk.trim_matches(|c: char| c.is_whitespace() || c == '\'' || c == '"'))
        .filter(|chunk| !chunk.is_empty())
        .map(str::to_string)
        .collect()
}

/// Set of distinct normalized phrases
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhraseDictionary {
    phrases: BTreeSet<Vec<String>>,
}

impl PhraseDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_phrases<I, S>(phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut dictionary = Self::new();
        for phrase in phrases {
            dictionary.insert(phrase.as_ref());
        }
        dictionary
    }

    /// Load one phrase per line; blank lines and `#` comments are skipped
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_phrases(
            content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#')),
        ))
    }

    /// Returns false when the phrase is empty or already present
    pub fn insert(&mut self, phrase: &str) -> bool {
        let words = normalize_phrase(phrase);
        if words.is_empty() {
            return false;
        }
        self.phrases.insert(words)
    }

    pub fn phrases(&self) -> impl Iterator<Item = &[String]> {
        self.phrases.iter().map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }
}
