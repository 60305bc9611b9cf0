//! Chat transcript library.
//!
//! Parses chat markup into document trees, groups messages into visual runs
//! and assembles them into an HTML transcript.

pub mod archive;
pub mod config;
pub mod error;
pub mod grouping;
pub mod markup;
pub mod model;
pub mod palette;
pub mod transcript;
pub mod validation;

pub use error::{Result, TranscriptError};

#[cfg(test)]
mod integration_tests;
