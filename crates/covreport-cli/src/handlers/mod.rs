//! Command handlers - extracted from main.rs for testability
//!
//! Each handler module contains:
//! - The execution logic for a CLI command
//! - Pure helper functions
//! - Tests

pub mod config;
pub mod report;
pub mod system_tests;

// Re-export handlers for convenient access
pub use config::{execute_config, resolve_report_config};
pub use report::{execute_reports, write_reports, ReportRun};
pub use system_tests::execute_system_tests;
