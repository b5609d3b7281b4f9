// Command handlers over the prompt library
pub mod config; // Configuration management
pub mod crud; // Create, show, edit, favorite, delete
pub mod query; // List, search and suggestions
pub mod sync; // Sync enable/disable/status

pub use config::handle_config_command;
pub use crud::{
    handle_delete_command, handle_edit_command, handle_favorite_command, handle_new_command,
    handle_show_command,
};
pub use query::{handle_list_command, handle_search_command, handle_suggest_command};
pub use sync::handle_sync_command;
