//! Command implementations for the interlinear CLI
//!
//! Commands handle the CLI interface and delegate to interlinear-core
//! for the actual work.

pub mod generate;
