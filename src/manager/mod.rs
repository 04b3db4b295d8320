// Command handlers
pub mod config;    // Configuration management
pub mod query;     // Listing submissions and repositories
pub mod sync;      // Sync run
pub mod watermark; // Watermark inspection

pub use config::handle_config_command;
pub use query::{handle_list_command, handle_repos_command};
pub use sync::handle_sync_command;
pub use watermark::handle_watermark_command;
