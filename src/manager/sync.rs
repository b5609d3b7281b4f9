// Sync operations - enable, disable, status

use crate::cli::SyncCommands;
use crate::core::operations::PromptLibrary;
use crate::utils::error::AppResult;
use crate::utils::{handle_flow, print_warning, FlowResult, OutputStyle};

pub async fn handle_sync_command(library: &mut PromptLibrary, command: SyncCommands) -> AppResult<()> {
    match command {
        SyncCommands::Enable => handle_enable(library).await,
        SyncCommands::Disable => {
            handle_disable(library).await;
            Ok(())
        }
        SyncCommands::Status => {
            print_status(library);
            Ok(())
        }
    }
}

async fn handle_enable(library: &mut PromptLibrary) -> AppResult<()> {
    if library.is_sync_enabled() {
        handle_flow(FlowResult::Cancelled("Sync is already enabled".to_string()));
        return Ok(());
    }

    println!("🔄 Enabling sync...");
    if library.enable_sync().await? {
        handle_flow(FlowResult::Success(format!(
            "Sync enabled; {} prompt(s) loaded from remote",
            library.prompts().len()
        )));
    } else {
        print_warning("Sync enabled, but the remote could not be reached; local prompts were kept");
    }
    Ok(())
}

async fn handle_disable(library: &mut PromptLibrary) {
    if !library.is_sync_enabled() {
        handle_flow(FlowResult::Cancelled("Sync is already disabled".to_string()));
        return;
    }

    library.disable_sync().await;
    handle_flow(FlowResult::Success("Sync disabled; changes now stay local".to_string()));
}

fn print_status(library: &PromptLibrary) {
    OutputStyle::print_header("🔄 Sync Status");

    let state = if library.is_sync_enabled() {
        OutputStyle::success("enabled")
    } else {
        OutputStyle::muted("disabled")
    };
    println!("{:>12}: {}", OutputStyle::label("State"), state);

    match library.remote_name() {
        Some(name) => OutputStyle::print_field_colored("Remote", name, OutputStyle::info),
        None => OutputStyle::print_field_colored("Remote", "not configured", OutputStyle::warning),
    }
    OutputStyle::print_field_colored("Prompts", &library.prompts().len().to_string(), OutputStyle::info);
}
