//! Multi-token phrase matching over a transcript
//!
//! A prefix tree is built once from the phrase dictionary. Matching starts
//! at every token position, including positions inside an earlier match,
//! and accepts the first terminal node reached on the way down. A short
//! phrase therefore wins over a longer one sharing its prefix.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use tracing::debug;
use veil_core::Transcript;

use crate::phrase::{PhraseDictionary, normalize_word};

/// Inclusive ordinal range covered by one matched phrase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSpan {
    pub start: usize,
    pub end: usize,
}

impl MatchSpan {
    pub fn ordinals(&self) -> std::ops::RangeInclusive<usize> {
        self.start..=self.end
    }
}

#[derive(Debug, Default)]
struct TrieNode {
    children: HashMap<String, usize>,
    terminal: bool,
}

/// Phrase matcher backed by an arena-allocated trie
#[derive(Debug)]
pub struct PiiMatcher {
    nodes: Vec<TrieNode>,
    phrase_count: usize,
}

impl PiiMatcher {
    pub fn new(dictionary: &PhraseDictionary) -> Self {
        let mut nodes = vec![TrieNode::default()];

        for phrase in dictionary.phrases() {
            let mut current = 0;
            for word in phrase {
                current = match nodes[current].children.get(word) {
                    Some(&next) => next,
                    None => {
                        let next = nodes.len();
                        nodes.push(TrieNode::default());
                        nodes[current].children.insert(word.clone(), next);
                        next
                    }
                };
            }
            nodes[current].terminal = true;
        }

        Self {
            nodes,
            phrase_count: dictionary.len(),
        }
    }

    pub fn phrase_count(&self) -> usize {
        self.phrase_count
    }

    pub fn is_empty(&self) -> bool {
        self.phrase_count == 0
    }

    /// One span per starting position that reaches a terminal node
    pub fn find_spans<S: AsRef<str>>(&self, words: &[S]) -> Vec<MatchSpan> {
        if self.is_empty() {
            return Vec::new();
        }

        let normalized: Vec<String> = words.iter().map(|w| normalize_word(w.as_ref())).collect();
        let mut spans = Vec::new();

        for start in 0..normalized.len() {
            let mut node = 0;
            for (end, word) in normalized.iter().enumerate().skip(start) {
                match self.nodes[node].children.get(word) {
                    Some(&next) => {
                        node = next;
                        if self.nodes[node].terminal {
                            spans.push(MatchSpan { start, end });
                            break;
                        }
                    }
                    None => break,
                }
            }
        }

        spans
    }

    /// Sorted, deduplicated ordinals covered by any match
    pub fn match_words<S: AsRef<str>>(&self, words: &[S]) -> Vec<usize> {
        let ordinals: BTreeSet<usize> = self
            .find_spans(words)
            .iter()
            .flat_map(MatchSpan::ordinals)
            .collect();

        ordinals.into_iter().collect()
    }

    pub fn match_transcript(&self, transcript: &Transcript) -> Vec<usize> {
        let words: Vec<&str> = transcript.words().collect();
        let ordinals = self.match_words(&words);
        debug!(
            tokens = words.len(),
            flagged = ordinals.len(),
            "matched flagged phrases"
        );
        ordinals
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher(phrases: &[&str]) -> PiiMatcher {
        PiiMatcher::new(&PhraseDictionary::from_phrases(phrases))
    }

    #[test]
    fn test_multi_token_and_single_token_phrases() {
        let matcher = matcher(&["jean dupont", "paris"]);
        let words = ["bonjour", "jean", "dupont", "habite", "paris"];

        assert_eq!(matcher.match_words(&words), vec![1, 2, 4]);
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let matcher = matcher(&["Jean Dupont"]);
        let words = ["JEAN", "dupont"];

        assert_eq!(matcher.match_words(&words), vec![0, 1]);
    }

    #[test]
    fn test_empty_dictionary_matches_nothing() {
        let matcher = matcher(&[]);
        let words = ["jean", "dupont"];

        assert!(matcher.is_empty());
        assert!(matcher.match_words(&words).is_empty());
    }

    #[test]
    fn test_partial_phrase_is_not_matched() {
        let matcher = matcher(&["jean dupont"]);
        let words = ["jean", "martin"];

        assert!(matcher.match_words(&words).is_empty());
    }

    #[test]
    fn test_shorter_phrase_preempts_longer_with_shared_prefix() {
        let matcher = matcher(&["jean", "jean dupont"]);
        let words = ["jean", "dupont"];

        assert_eq!(matcher.find_spans(&words), vec![MatchSpan { start: 0, end: 0 }]);
        assert_eq!(matcher.match_words(&words), vec![0]);
    }

    #[test]
    fn test_overlapping_matches_are_unioned() {
        let matcher = matcher(&["rue de la paix", "la paix"]);
        let words = ["rue", "de", "la", "paix"];

        let spans = matcher.find_spans(&words);
        assert_eq!(
            spans,
            vec![MatchSpan { start: 0, end: 3 }, MatchSpan { start: 2, end: 3 }]
        );
        assert_eq!(matcher.match_words(&words), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_repeated_phrase_matches_every_occurrence() {
        let matcher = matcher(&["paris"]);
        let words = ["paris", "et", "Paris"];

        assert_eq!(matcher.match_words(&words), vec![0, 2]);
    }

    #[test]
    fn test_match_transcript() {
        let json = r#"[
            {"word": "Jean", "start": 1.0, "end": 1.5},
            {"word": "Dupont", "start": 1.5, "end": 2.0}
        ]"#;
        let transcript = Transcript::from_json(json).unwrap();

        assert_eq!(matcher(&["jean dupont"]).match_transcript(&transcript), vec![0, 1]);
    }
}
