//! Core data structures for prompt management
//!
//! This module contains the records shared by the store, the sync layer,
//! the search engine and the mutation façade.

use crate::utils::error::{AppError, AppResult};
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Closed set of prompt categories.
///
/// The lowercase name is the wire form for both local storage and the
/// remote collaborator, so adding a variant is a schema change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[derive(clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Writing,
    Marketing,
    Development,
    Design,
    Business,
    Education,
    Personal,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Writing,
        Category::Marketing,
        Category::Development,
        Category::Design,
        Category::Business,
        Category::Education,
        Category::Personal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Writing => "writing",
            Category::Marketing => "marketing",
            Category::Development => "development",
            Category::Design => "design",
            Category::Business => "business",
            Category::Education => "education",
            Category::Personal => "personal",
        }
    }

    /// Topic keywords associated with each category
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            Category::Writing => &[
                "write", "story", "blog", "essay", "article", "poem", "novel", "edit",
                "proofread", "narrative",
            ],
            Category::Marketing => &[
                "marketing", "campaign", "seo", "brand", "audience", "ad", "copy",
                "social media", "newsletter", "conversion",
            ],
            Category::Development => &[
                "code", "function", "bug", "api", "refactor", "rust", "python", "sql",
                "test", "debug",
            ],
            Category::Design => &[
                "design", "ui", "ux", "logo", "color", "layout", "typography", "wireframe",
                "figma", "palette",
            ],
            Category::Business => &[
                "business", "strategy", "sales", "revenue", "pitch", "startup", "meeting",
                "proposal", "investor", "plan",
            ],
            Category::Education => &[
                "learn", "teach", "lesson", "explain", "student", "course", "quiz",
                "study", "tutor", "curriculum",
            ],
            Category::Personal => &[
                "personal", "journal", "habit", "travel", "recipe", "fitness", "goal",
                "diary", "health", "family",
            ],
        }
    }

    /// Guess a category from free text by counting keyword hits.
    ///
    /// Returns `None` when no keyword of any category occurs. Ties resolve
    /// to the earlier variant in [`Category::ALL`].
    pub fn suggest(text: &str) -> Option<Category> {
        let text = text.to_lowercase();
        let mut best: Option<(Category, usize)> = None;

        for category in Category::ALL {
            let hits = category
                .keywords()
                .iter()
                .filter(|keyword| contains_word(&text, keyword))
                .count();
            if hits > 0 && best.is_none_or(|(_, top)| hits > top) {
                best = Some((category, hits));
            }
        }

        best.map(|(category, _)| category)
    }
}

/// Whole-word containment, so "ad" does not match inside "read".
fn contains_word(haystack: &str, needle: &str) -> bool {
    haystack.match_indices(needle).any(|(start, matched)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + matched.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| AppError::Validation(format!("Unknown category: {}", s)))
    }
}

/// A single prompt with metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prompt {
    pub id: String,
    pub title: String,
    pub content: String,
    pub category: Category,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub is_favorite: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A prompt that has not been assigned an id yet.
///
/// Used as the input of `create_prompt` and as the create payload sent to
/// the remote collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPrompt {
    pub title: String,
    pub content: String,
    pub category: Category,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub is_favorite: bool,
}

/// Partial update of a prompt.
///
/// There is no field for `id` or `createdAt`; a serialized patch naming
/// either is rejected by `deny_unknown_fields`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PromptPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<BTreeSet<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_favorite: Option<bool>,
}

/// Statistics about the prompt collection
#[derive(Debug, Default, PartialEq)]
pub struct PromptStats {
    pub total_prompts: usize,
    pub favorites: usize,
    pub total_tags: usize,
    pub category_counts: BTreeMap<Category, usize>,
    pub tag_counts: BTreeMap<String, usize>,
}

/// Trim tags, drop empty ones and collapse duplicates
pub fn normalize_tags<I, S>(tags: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tags.into_iter()
        .map(|t| t.as_ref().trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Next `updated_at` for a record last touched at `previous`.
///
/// Never returns a value at or before `previous`, even when the clock has
/// not advanced since the last mutation.
pub fn next_update_time(previous: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    now.max(previous + TimeDelta::microseconds(1))
}

fn require_text(field: &str, value: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{} must not be empty", field)));
    }
    Ok(())
}

impl NewPrompt {
    pub fn new(title: impl Into<String>, content: impl Into<String>, category: Category) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            category,
            tags: BTreeSet::new(),
            is_favorite: false,
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.tags = normalize_tags(tags);
        self
    }

    pub fn validate(&self) -> AppResult<()> {
        require_text("title", &self.title)?;
        require_text("content", &self.content)
    }

    /// Build the stored record, assigning a fresh id and timestamps
    pub fn into_prompt(self, now: DateTime<Utc>) -> Prompt {
        Prompt {
            id: Uuid::new_v4().to_string(),
            title: self.title,
            content: self.content,
            category: self.category,
            tags: normalize_tags(self.tags),
            is_favorite: self.is_favorite,
            created_at: now,
            updated_at: now,
        }
    }
}

impl PromptPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.category.is_none()
            && self.tags.is_none()
            && self.is_favorite.is_none()
    }

    pub fn validate(&self) -> AppResult<()> {
        if let Some(title) = &self.title {
            require_text("title", title)?;
        }
        if let Some(content) = &self.content {
            require_text("content", content)?;
        }
        Ok(())
    }

    pub fn favorite(is_favorite: bool) -> Self {
        Self {
            is_favorite: Some(is_favorite),
            ..Self::default()
        }
    }
}

impl Prompt {
    /// Merge a patch into this record and bump `updated_at`
    pub fn apply(&mut self, patch: &PromptPatch, now: DateTime<Utc>) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(content) = &patch.content {
            self.content = content.clone();
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(tags) = &patch.tags {
            self.tags = normalize_tags(tags);
        }
        if let Some(is_favorite) = patch.is_favorite {
            self.is_favorite = is_favorite;
        }
        self.touch(now);
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = next_update_time(self.updated_at, now);
    }

    /// Content length in characters
    pub fn content_len(&self) -> usize {
        self.content.chars().count()
    }
}

impl PromptStats {
    pub fn from_prompts(prompts: &[Prompt]) -> Self {
        let mut stats = PromptStats {
            total_prompts: prompts.len(),
            ..Self::default()
        };

        for prompt in prompts {
            if prompt.is_favorite {
                stats.favorites += 1;
            }
            *stats.category_counts.entry(prompt.category).or_insert(0) += 1;
            for tag in &prompt.tags {
                *stats.tag_counts.entry(tag.clone()).or_insert(0) += 1;
            }
        }
        stats.total_tags = stats.tag_counts.len();

        stats
    }
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.title, self.category)
    }
}
