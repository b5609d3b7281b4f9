//! promptdeck - a personal library of AI prompts
//!
//! Prompts live in a local key-value store and can optionally be mirrored
//! to a remote collection (a REST service or a GitHub Gist). The
//! [`PromptLibrary`] service owns the collection; the CLI is a thin layer
//! over it.

pub mod cli;
pub mod config;
pub mod core;
pub mod manager;
pub mod storage;
pub mod sync;
pub mod utils;

// Re-export core types and traits for easier use
pub use crate::core::{
    data::{Category, NewPrompt, Prompt, PromptPatch, PromptStats},
    operations::{LibraryOptions, PromptLibrary},
    search::{ScoredPrompt, SearchEngine, SearchFilters, SortBy, SortOrder},
    traits::{KeyValueStore, RemoteStore, StoreKey},
};
pub use utils::error::{AppError, AppResult};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
