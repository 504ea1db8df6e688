//! Auricle End-to-End Test Infrastructure
//!
//! This crate hosts the integration suites:
//!
//! - Encoding: payload -> WAV file, checked with an independent decoder
//! - Validation: schema rejection and warnings through the CLI
//! - Sessions: upload, analysis, download and reset with stub analyzers
//! - Properties: encoder invariants under arbitrary input
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p auricle-tests
//! ```

pub mod determinism;
pub mod fixtures;
pub mod harness;

pub use determinism::{verify_determinism, DeterminismResult, DiffInfo};
