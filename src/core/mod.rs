//! Core utilities for the playbook export engine
//!
//! This module consolidates common utilities that are used across
//! the application:
//! - `files`: loading inputs and writing artifacts
//! - `filters`: play selection criteria

pub mod files;
pub mod filters;

// Re-export commonly used items for convenience
pub use files::{load_config, load_plays, resolve_output_dir, write_bytes};
pub use filters::{filter_plays, DateRange, PlayFilter, ScoreRange};
