//! Mediaseek - hybrid search over timestamped transcript segments
//!
//! Finds the spans of transcribed speech that best match a free-text query by
//! blending literal keyword matching with embedding similarity, suppresses
//! near-duplicate hits from the same media file, and returns a ranked list of
//! time-coherent snippets.

pub mod cli;
pub mod config;
pub mod corpus;
pub mod embedding;
pub mod error;
pub mod eval;
pub mod retrieval;

pub use error::{MediaseekError, Result};
