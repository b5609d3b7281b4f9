use crate::config::Config;
use crate::core::data::Category;
use crate::core::operations::PromptLibrary;
use crate::core::search::{SortBy, SortOrder};
use crate::manager;
use crate::utils::error::AppResult;
use crate::utils::output::ListFormat;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "promptdeck")]
#[command(about = "Manage a personal library of AI prompts")]
#[command(version)]
pub struct Cli {
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[arg(short, long, help = "Enable debug logging")]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new prompt
    New(NewArgs),

    /// Show prompt details
    Show(ShowArgs),

    /// Edit fields of an existing prompt
    Edit(EditArgs),

    /// Delete a prompt
    Delete(DeleteArgs),

    /// Toggle the favorite flag of a prompt
    Fav(ShowArgs),

    /// List prompts
    List(ListArgs),

    /// Search prompts by relevance
    Search(SearchArgs),

    /// Suggest prompt titles for a partial input
    Suggest(SuggestArgs),

    /// Remote sync management
    Sync(SyncArgs),

    /// Configuration management
    Config(ConfigArgs),
}

impl Commands {
    pub async fn execute(self, config: Config) -> AppResult<()> {
        if let Commands::Config(args) = self {
            return manager::handle_config_command(config, args.command);
        }

        let mut library = PromptLibrary::from_config(&config).await?;
        let result = self.run(&mut library, &config).await;
        library.shutdown().await;
        result
    }

    async fn run(self, library: &mut PromptLibrary, config: &Config) -> AppResult<()> {
        match self {
            Commands::New(args) => manager::handle_new_command(library, &args),
            Commands::Show(args) => manager::handle_show_command(library, &args),
            Commands::Edit(args) => manager::handle_edit_command(library, &args),
            Commands::Delete(args) => manager::handle_delete_command(library, &args),
            Commands::Fav(args) => manager::handle_favorite_command(library, &args),
            Commands::List(args) => manager::handle_list_command(library, config, &args),
            Commands::Search(args) => manager::handle_search_command(library, config, &args),
            Commands::Suggest(args) => manager::handle_suggest_command(library, config, &args),
            Commands::Sync(args) => manager::handle_sync_command(library, args.command).await,
            Commands::Config(_) => Ok(()),
        }
    }
}

#[derive(Args)]
pub struct NewArgs {
    #[arg(short = 'T', long)]
    pub title: Option<String>,

    #[arg(long)]
    pub content: Option<String>,

    #[arg(short = 'c', long, help = "Category (suggested from the text when omitted)")]
    pub category: Option<Category>,

    #[arg(short = 't', long = "tag")]
    pub tags: Vec<String>,

    #[arg(short, long)]
    pub favorite: bool,
}

#[derive(Args)]
pub struct ShowArgs {
    #[arg(help = "Prompt ID")]
    pub id: String,
}

#[derive(Args)]
pub struct EditArgs {
    #[arg(help = "Prompt ID")]
    pub id: String,

    #[arg(short = 'T', long)]
    pub title: Option<String>,

    #[arg(long)]
    pub content: Option<String>,

    #[arg(short = 'c', long)]
    pub category: Option<Category>,

    #[arg(short = 't', long = "tag", help = "Replace the tags (repeatable)")]
    pub tags: Vec<String>,

    #[arg(long, conflicts_with = "tags", help = "Remove all tags")]
    pub clear_tags: bool,
}

#[derive(Args)]
pub struct DeleteArgs {
    #[arg(help = "Prompt ID")]
    pub id: String,

    #[arg(short, long)]
    pub force: bool,
}

#[derive(Args)]
pub struct FilterArgs {
    #[arg(short = 'c', long)]
    pub category: Option<Category>,

    #[arg(short = 't', long = "tag", help = "Tag filter (repeatable, all must match)")]
    pub tags: Vec<String>,

    #[arg(long)]
    pub favorites: bool,

    #[arg(short, long)]
    pub sort: Option<SortBy>,

    #[arg(short, long, default_value = "desc")]
    pub order: SortOrder,

    #[arg(short, long, default_value = "simple")]
    pub format: ListFormat,
}

#[derive(Args)]
pub struct ListArgs {
    #[command(flatten)]
    pub filters: FilterArgs,

    #[arg(long, help = "Show statistics about the collection")]
    pub stats: bool,

    #[arg(long = "tags", help = "Show all available tags")]
    pub show_tags: bool,

    #[arg(long = "categories", help = "Show all categories with prompt counts")]
    pub show_categories: bool,
}

#[derive(Args)]
pub struct SearchArgs {
    pub query: String,

    #[command(flatten)]
    pub filters: FilterArgs,

    #[arg(long, value_name = "YYYY-MM-DD", help = "Created on or after this day")]
    pub since: Option<String>,

    #[arg(long, value_name = "YYYY-MM-DD", help = "Created on or before this day")]
    pub until: Option<String>,

    #[arg(long, help = "Minimum content length in characters")]
    pub min_len: Option<usize>,

    #[arg(long, help = "Maximum content length in characters")]
    pub max_len: Option<usize>,
}

#[derive(Args)]
pub struct SuggestArgs {
    pub partial: String,

    #[arg(short, long)]
    pub limit: Option<usize>,
}

#[derive(Args)]
pub struct SyncArgs {
    #[command(subcommand)]
    pub command: SyncCommands,
}

#[derive(Subcommand, Clone, Copy)]
pub enum SyncCommands {
    /// Enable sync; the remote collection replaces local prompts
    Enable,

    /// Disable sync; local changes stay local
    Disable,

    /// Show whether sync is enabled and which remote is configured
    Status,
}

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: Option<ConfigCommands>,
}

#[derive(Subcommand, Clone, Copy)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Reset configuration to defaults
    Reset,
}
