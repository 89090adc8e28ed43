//! Command handlers - kept out of main.rs for testability

pub mod convert;

pub use convert::{build_config, execute_convert, progress_reporter};
