//! Core domain models and logic for veil
//!
//! This crate contains:
//! - Domain models (Item, Payload, Token, Transcript, RedactionInterval)
//! - The error taxonomy shared by every veil crate
//! - Reservoir sampling (admit / replace / reject decisions)

pub mod error;
pub mod item;
pub mod reservoir;
pub mod transcript;

pub use error::{Error, Result};
pub use item::{Item, Payload};
pub use reservoir::{Decision, ReservoirSelector};
pub use transcript::{RedactionInterval, TimedWord, Token, Transcript};
