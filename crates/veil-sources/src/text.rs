use std::collections::VecDeque;

use veil_core::{Payload, Result};

use crate::handler::CorpusSource;

/// In-memory source, mostly for tests and dry runs
pub struct MemorySource {
    label: String,
    pending: VecDeque<Payload>,
}

impl MemorySource {
    pub fn new(label: impl Into<String>, payloads: Vec<Payload>) -> Self {
        Self {
            label: label.into(),
            pending: payloads.into(),
        }
    }

    /// One payload per string, labelled `text:<index>`
    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let payloads = texts
            .into_iter()
            .enumerate()
            .map(|(i, text)| {
                Payload::new(text.as_ref().as_bytes().to_vec()).with_origin(format!("text:{}", i))
            })
            .collect();

        Self::new("memory", payloads)
    }

    pub fn remaining(&self) -> usize {
        self.pending.len()
    }
}

impl CorpusSource for MemorySource {
    fn describe(&self) -> String {
        format!("memory:{}", self.label)
    }

    fn next_payload(&mut self) -> Option<Result<Payload>> {
        self.pending.pop_front().map(Ok)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_source_yields_in_order_once() {
        let mut source = MemorySource::from_texts(["one", "two"]);

        assert_eq!(source.next_payload().unwrap().unwrap().content, b"one");
        assert_eq!(source.remaining(), 1);
        assert_eq!(source.next_payload().unwrap().unwrap().content, b"two");
        assert!(source.next_payload().is_none());
        assert!(source.next_payload().is_none());
    }
}
