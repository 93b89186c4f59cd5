//! Stream item model

use serde::{Deserialize, Serialize};

/// Raw unit produced by a corpus source, before an ordinal is assigned
#[derive(Debug, Clone)]
pub struct Payload {
    pub content: Vec<u8>,
    /// Where the payload came from (file path, label), for logging only
    pub origin: Option<String>,
}

impl Payload {
    pub fn new(content: Vec<u8>) -> Self {
        Self {
            content,
            origin: None,
        }
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    pub fn byte_size(&self) -> u64 {
        self.content.len() as u64
    }
}

/// Opaque content unit identified by its position in the stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub ordinal: u64,
    pub size_bytes: u64,
}

impl Item {
    pub fn new(ordinal: u64, size_bytes: u64) -> Self {
        Self {
            ordinal,
            size_bytes,
        }
    }
}
