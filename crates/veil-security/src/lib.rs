//! PII matching and redaction for transcripts
//!
//! - [`phrase`]: flagged phrase dictionary and detector output parsing
//! - [`matcher`]: trie-based multi-token phrase matcher
//! - [`merger`]: flagged ordinals to time intervals
//! - [`redactor`]: combines the above into a redaction schedule

pub mod matcher;
pub mod merger;
pub mod phrase;
pub mod redactor;

pub use matcher::{MatchSpan, PiiMatcher};
pub use merger::{contiguous_runs, merge_intervals};
pub use phrase::{PhraseDictionary, normalize_phrase, normalize_word, parse_detector_output};
pub use redactor::{DEFAULT_PLACEHOLDER, RedactionSchedule, Redactor, redact_text};
