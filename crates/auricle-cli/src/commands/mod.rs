//! CLI command implementations

pub mod analyze;
pub mod encode;
pub mod inspect;
pub mod json_output;
pub mod validate;

mod reporting;
