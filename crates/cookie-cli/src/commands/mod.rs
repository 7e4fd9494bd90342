//! Command implementations for cookie-cli

pub mod completions;
pub mod init;
pub mod rules;
pub mod sync;

pub use completions::run_completions;
pub use init::run_init;
pub use rules::{run_clear, run_export, run_import, run_list};
pub use sync::run_sync;
