//! Command handler modules
//!
//! One module per subcommand; `main.rs` only parses arguments and dispatches.

pub mod cleanup;
pub mod config;
pub mod deploy;
pub mod status;

// Re-export all public handler functions for convenient use
pub use cleanup::handle_cleanup_staging;
pub use config::{handle_config_init, handle_config_show};
pub use deploy::handle_deploy;
pub use status::handle_status;
