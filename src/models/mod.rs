//! Data models for the export engine
//!
//! - `play`: tactical play records (input)
//! - `config`: report configuration (input)
//! - `progress`: progress events and sinks
//! - `result`: artifacts and run results (output)

pub mod config;
pub mod play;
pub mod progress;
pub mod result;


pub use config::*;
pub use play::*;
pub use progress::*;
pub use result::*;
