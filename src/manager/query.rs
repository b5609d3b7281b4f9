// Query operations - listing, searching and suggestions

use crate::cli::{FilterArgs, ListArgs, SearchArgs, SuggestArgs};
use crate::config::Config;
use crate::core::operations::PromptLibrary;
use crate::core::search::{DateRange, SearchFilters, SortBy};
use crate::utils::error::{AppError, AppResult};
use crate::utils::format::{parse_day_end, parse_day_start};
use crate::utils::{handle_flow, DisplayFormatter, FlowResult, ListFormat, OutputStyle};

pub fn handle_list_command(library: &PromptLibrary, config: &Config, args: &ListArgs) -> AppResult<()> {
    if args.stats {
        DisplayFormatter::print_stats(&library.stats());
        return Ok(());
    }

    if args.show_tags {
        let tags = library.all_tags();
        if tags.is_empty() {
            handle_flow(FlowResult::EmptyList {
                item_type: "tags".to_string(),
            });
        } else {
            DisplayFormatter::print_tags(&tags);
        }
        return Ok(());
    }

    if args.show_categories {
        DisplayFormatter::print_categories(&library.stats());
        return Ok(());
    }

    // Without a query every prompt scores the same, so relevance keeps
    // insertion order; listing defaults to most recently updated instead.
    let filters = build_filters(&args.filters, config, String::new(), SortBy::UpdatedAt);
    let results = library.search(&filters);

    if results.is_empty() && args.filters.format != ListFormat::Json {
        handle_flow(FlowResult::EmptyList {
            item_type: "prompts matching your criteria".to_string(),
        });
        return Ok(());
    }

    let prompts: Vec<_> = results.iter().map(|r| r.prompt).collect();
    DisplayFormatter::format_list(&prompts, args.filters.format, config.general.content_preview)
}

pub fn handle_search_command(library: &PromptLibrary, config: &Config, args: &SearchArgs) -> AppResult<()> {
    let filters = search_filters(args, config)?;
    let results = library.search(&filters);

    if results.is_empty() && args.filters.format != ListFormat::Json {
        handle_flow(FlowResult::NotFound {
            item_type: "Prompts matching".to_string(),
            search_term: args.query.clone(),
        });
        return Ok(());
    }

    DisplayFormatter::format_search(&results, args.filters.format, config.general.content_preview)
}

pub fn handle_suggest_command(library: &PromptLibrary, config: &Config, args: &SuggestArgs) -> AppResult<()> {
    let limit = args.limit.unwrap_or(config.general.suggestion_limit);
    let suggestions = library.suggestions(&args.partial, limit);

    if suggestions.is_empty() {
        handle_flow(FlowResult::EmptyList {
            item_type: "suggestions".to_string(),
        });
        return Ok(());
    }

    for title in suggestions {
        println!("{}", OutputStyle::description(&title));
    }
    Ok(())
}

fn build_filters(args: &FilterArgs, config: &Config, query: String, fallback_sort: SortBy) -> SearchFilters {
    let sort_by = args.sort.unwrap_or(match config.general.default_sort {
        SortBy::Relevance => fallback_sort,
        configured => configured,
    });

    SearchFilters {
        query,
        category: args.category,
        tags: args.tags.clone(),
        favorites_only: args.favorites,
        sort_by,
        sort_order: args.order,
        ..SearchFilters::default()
    }
}

fn search_filters(args: &SearchArgs, config: &Config) -> AppResult<SearchFilters> {
    let from = args.since.as_deref().map(parse_day_start).transpose().map_err(AppError::Validation)?;
    let to = args.until.as_deref().map(parse_day_end).transpose().map_err(AppError::Validation)?;

    if let (Some(min), Some(max)) = (args.min_len, args.max_len)
        && min > max
    {
        return Err(AppError::Validation(format!(
            "--min-len ({}) is greater than --max-len ({})",
            min, max
        )));
    }

    let mut filters = build_filters(&args.filters, config, args.query.clone(), SortBy::Relevance);
    filters.date_range = (from.is_some() || to.is_some()).then_some(DateRange { from, to });
    filters.min_length = args.min_len;
    filters.max_length = args.max_len;
    Ok(filters)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::search::SortOrder;

    fn filter_args() -> FilterArgs {
        FilterArgs {
            category: None,
            tags: Vec::new(),
            favorites: false,
            sort: None,
            order: SortOrder::Desc,
            format: ListFormat::Simple,
        }
    }

    fn search_args(query: &str) -> SearchArgs {
        SearchArgs {
            query: query.to_string(),
            filters: filter_args(),
            since: None,
            until: None,
            min_len: None,
            max_len: None,
        }
    }

    #[test]
    fn test_sort_defaults() {
        let config = Config::default();
        let list = build_filters(&filter_args(), &config, String::new(), SortBy::UpdatedAt);
        assert_eq!(list.sort_by, SortBy::UpdatedAt);

        let search = search_filters(&search_args("seo"), &config).unwrap();
        assert_eq!(search.sort_by, SortBy::Relevance);
        assert_eq!(search.query, "seo");

        let mut config = Config::default();
        config.general.default_sort = SortBy::Title;
        let list = build_filters(&filter_args(), &config, String::new(), SortBy::UpdatedAt);
        assert_eq!(list.sort_by, SortBy::Title);
    }

    #[test]
    fn test_search_date_and_length_bounds() {
        let config = Config::default();
        let mut args = search_args("x");
        args.since = Some("2024-01-01".to_string());
        args.min_len = Some(10);

        let filters = search_filters(&args, &config).unwrap();
        let range = filters.date_range.unwrap();
        assert_eq!(range.from, Some(parse_day_start("2024-01-01").unwrap()));
        assert_eq!(range.to, None);
        assert_eq!(filters.min_length, Some(10));

        args.until = Some("01/02/2024".to_string());
        assert!(matches!(search_filters(&args, &config), Err(AppError::Validation(_))));

        let mut args = search_args("x");
        args.min_len = Some(20);
        args.max_len = Some(10);
        assert!(search_filters(&args, &config).is_err());
    }
}
