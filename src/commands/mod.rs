//! Command implementations for the playbook export CLI

pub mod batch;
pub mod common;
pub mod generate;
pub mod summarize;


pub use batch::{handle_batch, BatchManifest, BatchParams};
pub use generate::{handle_generate, GenerateParams};
pub use summarize::handle_summarize;
