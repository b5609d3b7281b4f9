//! Relevance-ranked search over the in-memory collection
//!
//! The engine is stateless: it reads a slice of prompts and a set of
//! filters and returns borrowed, scored results. It never touches storage.

use crate::core::data::{Category, Prompt};
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Prompts touched within this window get the recency boost
pub const RECENT_WINDOW_DAYS: i64 = 7;

const TITLE_CONTAINS: f64 = 10.0;
const TITLE_EXACT: f64 = 20.0;
const TITLE_PREFIX: f64 = 10.0;
const CONTENT_CONTAINS: f64 = 5.0;
const CONTENT_REPEAT_PER_HIT: f64 = 2.0;
const CONTENT_REPEAT_CAP: f64 = 10.0;
const TAG_CONTAINS: f64 = 8.0;
const TAG_EXACT: f64 = 15.0;
const FUZZY_THRESHOLD: f64 = 0.7;
const FUZZY_WEIGHT: f64 = 3.0;
const FAVORITE_BOOST: f64 = 1.2;
const RECENT_BOOST: f64 = 1.1;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    #[default]
    Relevance,
    Title,
    CreatedAt,
    UpdatedAt,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Inclusive range over `created_at`; an open end is unbounded
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DateRange {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.from.is_none_or(|from| at >= from) && self.to.is_none_or(|to| at <= to)
    }
}

/// Query descriptor for [`SearchEngine::search`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchFilters {
    pub query: String,
    pub category: Option<Category>,
    /// Every entry must be a substring of at least one prompt tag
    pub tags: Vec<String>,
    pub favorites_only: bool,
    pub date_range: Option<DateRange>,
    pub sort_by: SortBy,
    pub sort_order: SortOrder,
    /// Content length bounds in characters, inclusive
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
}

impl SearchFilters {
    pub fn with_query(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredPrompt<'a> {
    pub prompt: &'a Prompt,
    pub score: f64,
}

/// Search engine for prompt filtering and ranking
pub struct SearchEngine;

impl SearchEngine {
    /// Filter, score and order `prompts`.
    ///
    /// With an empty query every prompt that passes the filters scores 1.
    /// With a non-empty query, prompts scoring 0 are dropped.
    pub fn search<'a>(
        prompts: &'a [Prompt],
        filters: &SearchFilters,
        now: DateTime<Utc>,
    ) -> Vec<ScoredPrompt<'a>> {
        let query = filters.query.trim().to_lowercase();

        let mut results: Vec<ScoredPrompt<'a>> = prompts
            .iter()
            .filter(|prompt| Self::passes_filters(prompt, filters))
            .filter_map(|prompt| {
                if query.is_empty() {
                    return Some(ScoredPrompt { prompt, score: 1.0 });
                }
                let score = Self::score(prompt, &query, now);
                (score > 0.0).then_some(ScoredPrompt { prompt, score })
            })
            .collect();

        Self::sort(&mut results, filters);
        results
    }

    /// Relevance of one prompt against an already lowercased query
    pub fn score(prompt: &Prompt, query: &str, now: DateTime<Utc>) -> f64 {
        if query.is_empty() {
            return 1.0;
        }

        let title = prompt.title.to_lowercase();
        let content = prompt.content.to_lowercase();
        let mut score = 0.0;

        if title.contains(query) {
            score += TITLE_CONTAINS;
            if title == query {
                score += TITLE_EXACT;
            }
            if title.starts_with(query) {
                score += TITLE_PREFIX;
            }
        }

        let hits = content.matches(query).count();
        if hits > 0 {
            score += CONTENT_CONTAINS;
            score += (hits as f64 * CONTENT_REPEAT_PER_HIT).min(CONTENT_REPEAT_CAP);
        }

        for tag in &prompt.tags {
            let tag = tag.to_lowercase();
            if tag.contains(query) {
                score += TAG_CONTAINS;
                if tag == query {
                    score += TAG_EXACT;
                }
            }
        }

        if score == 0.0 {
            let ratio = fuzzy_ratio(query, &title) + fuzzy_ratio(query, &content);
            if ratio > FUZZY_THRESHOLD {
                score += ratio * FUZZY_WEIGHT;
            }
        }

        if prompt.is_favorite {
            score *= FAVORITE_BOOST;
        }
        if now.signed_duration_since(prompt.updated_at) <= TimeDelta::days(RECENT_WINDOW_DAYS) {
            score *= RECENT_BOOST;
        }

        score
    }

    pub fn passes_filters(prompt: &Prompt, filters: &SearchFilters) -> bool {
        if filters.category.is_some_and(|category| prompt.category != category) {
            return false;
        }

        if filters.favorites_only && !prompt.is_favorite {
            return false;
        }

        let required = filters
            .tags
            .iter()
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty());
        for wanted in required {
            if !prompt.tags.iter().any(|tag| tag.to_lowercase().contains(&wanted)) {
                return false;
            }
        }

        if let Some(range) = &filters.date_range
            && !range.contains(prompt.created_at)
        {
            return false;
        }

        let length = prompt.content_len();
        if filters.min_length.is_some_and(|min| length < min)
            || filters.max_length.is_some_and(|max| length > max)
        {
            return false;
        }

        true
    }

    fn sort(results: &mut [ScoredPrompt<'_>], filters: &SearchFilters) {
        if filters.sort_by == SortBy::Relevance {
            results.sort_by(|a, b| b.score.total_cmp(&a.score));
            return;
        }

        results.sort_by(|a, b| {
            let (a, b) = (a.prompt, b.prompt);
            let ordering = match filters.sort_by {
                SortBy::Title => a
                    .title
                    .to_lowercase()
                    .cmp(&b.title.to_lowercase())
                    .then_with(|| a.title.cmp(&b.title)),
                SortBy::CreatedAt => a.created_at.cmp(&b.created_at),
                SortBy::UpdatedAt => a.updated_at.cmp(&b.updated_at),
                SortBy::Relevance => std::cmp::Ordering::Equal,
            };
            match filters.sort_order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });
    }

    /// Autocomplete candidates: distinct titles, then tags, containing `partial`
    pub fn suggestions(prompts: &[Prompt], partial: &str, limit: usize) -> Vec<String> {
        let needle = partial.trim().to_lowercase();
        if needle.is_empty() || limit == 0 {
            return Vec::new();
        }

        let titles = prompts.iter().map(|p| p.title.as_str());
        let tags = prompts.iter().flat_map(|p| p.tags.iter().map(String::as_str));

        let mut seen = HashSet::new();
        titles
            .chain(tags)
            .filter(|candidate| candidate.to_lowercase().contains(&needle))
            .filter(|candidate| seen.insert(*candidate))
            .take(limit)
            .map(str::to_string)
            .collect()
    }
}

/// Share of query characters found, in order, within `target`
fn fuzzy_ratio(query: &str, target: &str) -> f64 {
    let wanted: Vec<char> = query.chars().collect();
    if wanted.is_empty() {
        return 0.0;
    }

    let mut found = 0;
    for c in target.chars() {
        if found < wanted.len() && c == wanted[found] {
            found += 1;
        }
    }

    found as f64 / wanted.len() as f64
}
