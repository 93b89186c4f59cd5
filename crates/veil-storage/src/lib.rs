//! Storage layer for veil
//!
//! This crate provides:
//! - The artifact store (one durable file per retained item)
//! - Reconciliation between owned artifacts and the directory listing

pub mod store;

pub use store::{ArtifactRef, ArtifactStore, DEFAULT_MAX_BYTES, Reconciliation, StoreOptions};
