//! Auricle CLI library.
//!
//! This crate provides the pieces behind the `auricle` binary: image upload
//! checks, the analyzer boundary, the session state machine, configuration,
//! and the command implementations.

pub mod analyzer;
pub mod commands;
pub mod config;
pub mod logging;
pub mod session;
pub mod upload;
