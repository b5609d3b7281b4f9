// CRUD operations - Create, Read, Update, Delete

use crate::cli::{DeleteArgs, EditArgs, NewArgs, ShowArgs};
use crate::core::data::{normalize_tags, Category, NewPrompt, PromptPatch};
use crate::core::operations::PromptLibrary;
use crate::utils::{self, handle_flow, FlowResult, OutputStyle};
use crate::utils::error::AppResult;

// Create operations
pub fn handle_new_command(library: &mut PromptLibrary, args: &NewArgs) -> AppResult<()> {
    let title = match &args.title {
        Some(title) => title.clone(),
        None => utils::prompt_input(&format!("{}: ", OutputStyle::label("Title")))?,
    };

    let content = match &args.content {
        Some(content) => content.clone(),
        None => utils::prompt_multiline(&format!(
            "{} {}",
            OutputStyle::label("Prompt content"),
            OutputStyle::muted("(end with a line containing only '.')")
        ))?,
    };

    let category = args
        .category
        .unwrap_or_else(|| resolve_category(&title, &content));

    let draft = NewPrompt {
        is_favorite: args.favorite,
        ..NewPrompt::new(title, content, category).with_tags(&args.tags)
    };

    let prompt = library.create_prompt(draft)?;
    handle_flow(FlowResult::Success(format!(
        "Prompt '{}' saved as {} [{}]",
        prompt.title, prompt.id, prompt.category
    )));
    Ok(())
}

/// Keyword-based guess for a prompt created without `--category`
fn resolve_category(title: &str, content: &str) -> Category {
    Category::suggest(&format!("{} {}", title, content)).unwrap_or(Category::Personal)
}

// Read operations
pub fn handle_show_command(library: &PromptLibrary, args: &ShowArgs) -> AppResult<()> {
    match library.get(&args.id) {
        Some(prompt) => OutputStyle::print_prompt_detailed(prompt),
        None => not_found(&args.id),
    }
    Ok(())
}

// Update operations
pub fn handle_edit_command(library: &mut PromptLibrary, args: &EditArgs) -> AppResult<()> {
    let tags = if args.clear_tags {
        Some(Default::default())
    } else if !args.tags.is_empty() {
        Some(normalize_tags(&args.tags))
    } else {
        None
    };

    let patch = PromptPatch {
        title: args.title.clone(),
        content: args.content.clone(),
        category: args.category,
        tags,
        is_favorite: None,
    };

    if patch.is_empty() {
        utils::print_warning("Nothing to change; pass --title, --content, --category, --tag or --clear-tags");
        return Ok(());
    }

    match library.update_prompt(&args.id, patch)? {
        Some(prompt) => handle_flow(FlowResult::Success(format!("Prompt '{}' updated", prompt.title))),
        None => not_found(&args.id),
    }
    Ok(())
}

pub fn handle_favorite_command(library: &mut PromptLibrary, args: &ShowArgs) -> AppResult<()> {
    match library.toggle_favorite(&args.id) {
        Some(prompt) if prompt.is_favorite => {
            handle_flow(FlowResult::Success(format!("★ '{}' added to favorites", prompt.title)))
        }
        Some(prompt) => {
            handle_flow(FlowResult::Success(format!("'{}' removed from favorites", prompt.title)))
        }
        None => not_found(&args.id),
    }
    Ok(())
}

// Delete operations
pub fn handle_delete_command(library: &mut PromptLibrary, args: &DeleteArgs) -> AppResult<()> {
    let Some(prompt) = library.get(&args.id) else {
        not_found(&args.id);
        return Ok(());
    };

    println!("Prompt to delete:");
    OutputStyle::print_prompt_basic(prompt);

    if !args.force && !utils::prompt_yes_no("\nAre you sure you want to delete this prompt?")? {
        handle_flow(FlowResult::Cancelled("Prompt not deleted".to_string()));
        return Ok(());
    }

    if let Some(removed) = library.delete_prompt(&args.id) {
        handle_flow(FlowResult::Success(format!("Prompt '{}' deleted", removed.title)));
    }
    Ok(())
}

fn not_found(id: &str) {
    handle_flow(FlowResult::NotFound {
        item_type: "Prompt".to_string(),
        search_term: id.to_string(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_category_uses_keywords() {
        assert_eq!(
            resolve_category("Landing page", "Write ad copy for our marketing campaign"),
            Category::Marketing
        );
        assert_eq!(resolve_category("Haiku", "five seven five"), Category::Personal);
    }
}
