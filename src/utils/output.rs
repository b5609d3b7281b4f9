use crate::core::data::{Category, Prompt, PromptStats};
use crate::core::search::ScoredPrompt;
use crate::utils::error::{AppError, AppResult};
use crate::utils::format::{format_datetime, format_tags_comma, format_tags_hash, truncate_string};
use clap::ValueEnum;
use colored::*;

const PREVIEW_LEN: usize = 80;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ListFormat {
    #[default]
    Simple,
    Detailed,
    Json,
}

/// Prompt field types for unified display
enum PromptField {
    Id,
    Title,
    Category,
    Tags,
    Favorite,
    Created,
    Updated,
}

pub struct OutputStyle;

impl OutputStyle {
    pub fn description(text: &str) -> ColoredString {
        text.bright_green()
    }

    pub fn content(text: &str) -> ColoredString {
        text.clear()
    }

    pub fn tags(text: &str) -> ColoredString {
        text.bright_cyan()
    }

    pub fn tag(text: &str) -> ColoredString {
        text.cyan()
    }

    pub fn title(text: &str) -> ColoredString {
        text.bright_blue().bold()
    }

    pub fn header(text: &str) -> ColoredString {
        text.bold()
    }

    pub fn label(text: &str) -> ColoredString {
        text.cyan()
    }

    pub fn success(text: &str) -> ColoredString {
        text.green()
    }

    pub fn error(text: &str) -> ColoredString {
        text.red()
    }

    pub fn warning(text: &str) -> ColoredString {
        text.yellow()
    }

    pub fn info(text: &str) -> ColoredString {
        text.blue()
    }

    pub fn muted(text: &str) -> ColoredString {
        text.dimmed()
    }

    pub fn separator() -> String {
        "─".repeat(50)
    }

    pub fn header_separator() -> String {
        "═".repeat(50)
    }

    pub fn print_header(title: &str) {
        println!("{}", Self::title(title));
        println!("{}", Self::header_separator());
    }

    pub fn print_field_colored(label: &str, value: &str, color_fn: impl Fn(&str) -> ColoredString) {
        println!("{:>12}: {}", Self::label(label), color_fn(value));
    }

    fn print_prompt_field(field: PromptField, prompt: &Prompt) {
        match field {
            PromptField::Id => Self::print_field_colored("ID", &prompt.id, Self::muted),
            PromptField::Title => Self::print_field_colored("Title", &prompt.title, Self::description),
            PromptField::Category => {
                Self::print_field_colored("Category", prompt.category.as_str(), Self::tag)
            }
            PromptField::Tags => {
                Self::print_field_colored("Tags", &format_tags_comma(&prompt.tags), Self::tags)
            }
            PromptField::Favorite => {
                if prompt.is_favorite {
                    Self::print_field_colored("Favorite", "★", Self::warning);
                }
            }
            PromptField::Created => {
                Self::print_field_colored("Created", &format_datetime(&prompt.created_at), Self::muted)
            }
            PromptField::Updated => {
                Self::print_field_colored("Updated", &format_datetime(&prompt.updated_at), Self::muted)
            }
        }
    }

    pub fn print_prompt_basic(prompt: &Prompt) {
        println!("  Title: {}", Self::description(&prompt.title));
        println!("  Content: {}", Self::content(&truncate_string(&prompt.content, PREVIEW_LEN)));
        println!("  Created: {}", Self::muted(&format_datetime(&prompt.created_at)));
    }

    pub fn print_prompt_detailed(prompt: &Prompt) {
        println!("{}", Self::title("📝 Prompt Details"));

        Self::print_prompt_field(PromptField::Id, prompt);
        Self::print_prompt_field(PromptField::Title, prompt);
        Self::print_prompt_field(PromptField::Category, prompt);
        Self::print_prompt_field(PromptField::Tags, prompt);
        Self::print_prompt_field(PromptField::Favorite, prompt);
        Self::print_prompt_field(PromptField::Created, prompt);
        Self::print_prompt_field(PromptField::Updated, prompt);

        println!("\n{}:", Self::title("📄 Content"));
        println!("{}", Self::content(&prompt.content));
    }

    fn print_prompt_list_preview(prompt: &Prompt) {
        Self::print_prompt_field(PromptField::Id, prompt);
        Self::print_prompt_field(PromptField::Category, prompt);
        if !prompt.tags.is_empty() {
            Self::print_prompt_field(PromptField::Tags, prompt);
        }
        Self::print_prompt_field(PromptField::Favorite, prompt);
        Self::print_prompt_field(PromptField::Updated, prompt);

        let lines: Vec<&str> = prompt.content.lines().take(3).collect();
        if !lines.is_empty() {
            println!("   {}:", Self::label("Preview"));
            for line in lines {
                println!("     {}", Self::content(line));
            }
            if prompt.content.lines().count() > 3 {
                println!("     {}", Self::muted("..."));
            }
        }
    }

    /// One line per prompt: `title [category] ★ #tags: preview  (id)`
    pub fn format_prompt_line(prompt: &Prompt, content_preview: bool) -> String {
        let favorite = if prompt.is_favorite { " ★" } else { "" };
        let preview = if content_preview {
            format!(": {}", truncate_string(&prompt.content, PREVIEW_LEN))
        } else {
            String::new()
        };

        format!(
            "{} {}{}{}{}  {}",
            Self::description(&prompt.title),
            Self::tag(&format!("[{}]", prompt.category)),
            Self::warning(favorite),
            Self::tags(&format_tags_hash(&prompt.tags)),
            Self::content(&preview),
            Self::muted(&format!("({})", short_id(&prompt.id))),
        )
    }
}

/// First block of a uuid, enough to tell prompts apart in a listing
fn short_id(id: &str) -> &str {
    id.split('-').next().unwrap_or(id)
}

pub fn print_prompt_count(count: usize) {
    if count == 0 {
        println!("{}", OutputStyle::muted("No prompts found."));
    } else {
        println!(
            "📝 {} ({} found)",
            OutputStyle::header("Prompts"),
            OutputStyle::info(&count.to_string())
        );
    }
}

pub fn print_warning(message: &str) {
    println!("⚠️  {}", OutputStyle::warning(message));
}

/// Display formatter for the list and search outputs
pub struct DisplayFormatter;

impl DisplayFormatter {
    pub fn format_list(prompts: &[&Prompt], format: ListFormat, content_preview: bool) -> AppResult<()> {
        match format {
            ListFormat::Simple => Self::print_simple_list(prompts, content_preview),
            ListFormat::Detailed => Self::print_detailed_list(prompts),
            ListFormat::Json => Self::print_json_list(prompts)?,
        }
        Ok(())
    }

    /// Simple and JSON output include each score
    pub fn format_search(results: &[ScoredPrompt<'_>], format: ListFormat, content_preview: bool) -> AppResult<()> {
        match format {
            ListFormat::Json => {
                let rows: Vec<_> = results
                    .iter()
                    .map(|r| serde_json::json!({ "score": r.score, "prompt": r.prompt }))
                    .collect();
                println!("{}", to_pretty_json(&rows)?);
            }
            ListFormat::Simple => {
                print_prompt_count(results.len());
                println!("{}", OutputStyle::separator());
                for result in results {
                    println!(
                        "{} {}",
                        OutputStyle::info(&format!("{:>6.1}", result.score)),
                        OutputStyle::format_prompt_line(result.prompt, content_preview)
                    );
                }
            }
            ListFormat::Detailed => {
                let prompts: Vec<&Prompt> = results.iter().map(|r| r.prompt).collect();
                Self::print_detailed_list(&prompts);
            }
        }
        Ok(())
    }

    pub fn print_tags(tags: &[String]) {
        println!("🏷️  Available Tags ({})", tags.len());
        println!("====================");
        for tag in tags {
            println!("  {}", tag);
        }
    }

    pub fn print_categories(stats: &PromptStats) {
        println!("📁 Categories");
        println!("=========================");
        for category in Category::ALL {
            let count = stats.category_counts.get(&category).copied().unwrap_or(0);
            println!("  {:<12} {}", category.as_str(), OutputStyle::muted(&count.to_string()));
        }
    }

    pub fn print_stats(stats: &PromptStats) {
        OutputStyle::print_header("📊 Prompt Statistics");
        OutputStyle::print_field_colored("Prompts", &stats.total_prompts.to_string(), OutputStyle::info);
        OutputStyle::print_field_colored("Favorites", &stats.favorites.to_string(), OutputStyle::info);
        OutputStyle::print_field_colored("Tags", &stats.total_tags.to_string(), OutputStyle::info);

        if !stats.category_counts.is_empty() {
            println!("\n{}", OutputStyle::header("By category"));
            for (category, count) in &stats.category_counts {
                println!("  {:<12} {}", category.as_str(), count);
            }
        }

        let mut top_tags: Vec<_> = stats.tag_counts.iter().collect();
        top_tags.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        if !top_tags.is_empty() {
            println!("\n{}", OutputStyle::header("Top tags"));
            for (tag, count) in top_tags.into_iter().take(10) {
                println!("  {:<12} {}", OutputStyle::tag(tag), count);
            }
        }
    }

    fn print_simple_list(prompts: &[&Prompt], content_preview: bool) {
        print_prompt_count(prompts.len());
        println!("{}", OutputStyle::separator());

        for prompt in prompts {
            println!("{}", OutputStyle::format_prompt_line(prompt, content_preview));
        }
    }

    fn print_detailed_list(prompts: &[&Prompt]) {
        OutputStyle::print_header("📝 Detailed Prompt List");

        for (i, prompt) in prompts.iter().enumerate() {
            println!("\n{}. {}", i + 1, OutputStyle::description(&prompt.title));
            OutputStyle::print_prompt_list_preview(prompt);

            if i + 1 < prompts.len() {
                println!("{}", OutputStyle::separator());
            }
        }
    }

    fn print_json_list(prompts: &[&Prompt]) -> AppResult<()> {
        println!("{}", to_pretty_json(&prompts)?);
        Ok(())
    }
}

fn to_pretty_json<T: serde::Serialize + ?Sized>(value: &T) -> AppResult<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| AppError::Io(format!("Failed to serialize prompts to JSON: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::data::NewPrompt;
    use chrono::Utc;

    #[test]
    fn test_format_prompt_line() {
        colored::control::set_override(false);
        let prompt = NewPrompt::new("Cold email", "Write a short\nintro email", Category::Business)
            .with_tags(["sales", "email"])
            .into_prompt(Utc::now());

        let line = OutputStyle::format_prompt_line(&prompt, true);
        assert!(line.starts_with("Cold email [business] #email #sales: Write a short intro email"));
        assert!(line.ends_with(&format!("({})", short_id(&prompt.id))));

        let line = OutputStyle::format_prompt_line(&prompt, false);
        assert!(!line.contains("intro"));
    }

    #[test]
    fn test_short_id() {
        assert_eq!(short_id("1b4e28ba-2fa1-11d2-883f-0016d3cca427"), "1b4e28ba");
        assert_eq!(short_id("remote-1"), "remote");
        assert_eq!(short_id("plain"), "plain");
    }
}
