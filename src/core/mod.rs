//! Core business logic layer
//!
//! Entity model, search and ranking, the storage and remote seams, and the
//! `PromptLibrary` service that ties them together.

pub mod data;
pub mod operations;
pub mod search;
pub mod traits;
