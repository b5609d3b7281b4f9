// Configuration operations

use crate::cli::ConfigCommands;
use crate::config::Config;
use crate::utils::error::AppResult;
use crate::utils::{self, handle_flow, FlowResult, OutputStyle};

pub fn handle_config_command(config: Config, command: Option<ConfigCommands>) -> AppResult<()> {
    match command {
        Some(ConfigCommands::Show) => {
            handle_show_command(&config);
            Ok(())
        }
        Some(ConfigCommands::Reset) => handle_reset_command(),
        None => {
            handle_config_help();
            Ok(())
        }
    }
}

fn handle_show_command(config: &Config) {
    println!("⚙️  promptdeck Configuration");
    println!("==========================");

    println!("General:");
    println!("  Data dir: {}", config.general.data_dir.display());
    println!("  Default sort: {:?}", config.general.default_sort);
    println!("  Suggestion limit: {}", config.general.suggestion_limit);
    println!("  Remote list limit: {}", config.general.remote_list_limit);
    println!("  Color: {}", config.general.color);
    println!("  Content preview: {}", config.general.content_preview);

    if let Some(remote) = &config.remote {
        println!("Remote:");
        println!("  Base URL: {}", remote.base_url);
        if remote.api_key.is_some() {
            println!("  API key: ✓");
        }
    }

    if let Some(gist) = &config.gist {
        println!("Gist:");
        println!("  File name: {}", gist.file_name);
        if gist.access_token.is_some() {
            println!("  Access token: ✓");
        }
        if let Some(gist_id) = &gist.gist_id {
            println!("  Gist ID: {}", gist_id);
        }
        println!("  Public: {}", gist.public);
    }
}

fn handle_config_help() {
    println!("⚙️  Configuration Management");
    println!("==========================");
    println!("Available configuration commands:");
    println!("  promptdeck config show    - Show current configuration");
    println!("  promptdeck config reset   - Reset configuration to defaults");
    println!();
    println!(
        "Configuration file location: {}",
        OutputStyle::muted(&Config::config_file_path().display().to_string())
    );
}

fn handle_reset_command() -> AppResult<()> {
    if utils::prompt_yes_no(
        "Are you sure you want to reset configuration to defaults? This will overwrite your current settings.",
    )? {
        Config::default().save()?;
        handle_flow(FlowResult::Success("Configuration reset to defaults".to_string()));
    } else {
        handle_flow(FlowResult::Cancelled("Reset cancelled".to_string()));
    }
    Ok(())
}
