/// Search and matching engine
///
/// This module holds the heuristics that decide which folders of a remote
/// archive are worth fetching and which file names count as hits for a
/// free-text search term.

pub mod collector;
pub mod discovery;
pub mod episode;
pub mod matcher;

// Re-export main types
pub use collector::{FileCollector, ScanState};
pub use discovery::FolderDiscoverer;
pub use episode::SeasonEpisodeParser;
pub use matcher::NameMatcher;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// A media file matched during a scan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MediaRecord {
    /// Absolute URL of the file.
    pub url: String,
    /// Percent-decoded display name.
    pub name: String,
    /// Inferred season number; present iff `episode` is present.
    pub season: Option<u32>,
    /// Inferred episode number; present iff `season` is present.
    pub episode: Option<u32>,
}

impl MediaRecord {
    pub fn is_episodic(&self) -> bool {
        self.season.is_some() && self.episode.is_some()
    }
}

/// Everything derived from the search term, computed once per scan and
/// threaded through every matching decision.
#[derive(Debug, Clone)]
pub struct SearchContext {
    /// Term exactly as the caller supplied it (trimmed).
    pub raw_term: String,
    /// Lowercased term.
    pub normalized: String,
    /// Significant word tokens: lowercased words longer than 2 characters.
    pub word_tokens: Vec<String>,
    /// Term with spaces replaced by dots, for separator-style file names.
    pub dot_variant: String,
    /// Term with spaces replaced by underscores.
    pub underscore_variant: String,
    /// First 19xx/20xx token found in the term, if any.
    pub year_hint: Option<String>,
}

impl SearchContext {
    pub fn new(term: &str) -> Self {
        let raw_term = term.trim().to_string();
        let normalized = raw_term.to_lowercase();

        let word_tokens: Vec<String> = normalized
            .split_whitespace()
            .filter(|word| word.len() > 2)
            .map(|word| word.to_string())
            .collect();

        let words: Vec<&str> = normalized.split_whitespace().collect();
        let dot_variant = words.join(".");
        let underscore_variant = words.join("_");

        let year_hint = Regex::new(r"(19\d\d|20\d\d)")
            .ok()
            .and_then(|re| re.find(&normalized).map(|m| m.as_str().to_string()));

        Self {
            raw_term,
            normalized,
            word_tokens,
            dot_variant,
            underscore_variant,
            year_hint,
        }
    }

    /// Whether the raw term is a single word.
    pub fn is_single_word(&self) -> bool {
        self.normalized.split_whitespace().count() == 1
    }

    /// Lowercased first character of the term, used for alphabetical shelves.
    pub fn first_letter(&self) -> Option<char> {
        self.normalized.chars().next()
    }

    /// True if any significant token appears in the (lowercased) name.
    pub fn contains_any_token(&self, name_lower: &str) -> bool {
        self.word_tokens.iter().any(|word| name_lower.contains(word))
    }
}
