//! Core Module - Normalization, Prompting & Orchestration
//!
//! The decision logic of the pipeline: which data source to trust, how to
//! flatten it, which template to use and when to stop.

pub mod generator;
pub mod normalizer;
pub mod orchestrator;
pub mod prompt;

pub use generator::*;
pub use normalizer::*;
pub use orchestrator::*;
pub use prompt::*;
