/// Heuristic name matching for files and folders
use regex::Regex;

use super::SearchContext;

/// Decides whether a candidate name is relevant to the search term.
///
/// File matching and folder matching use different rule sets: files are
/// matched strictly (they end up in the playlist), folders loosely (a
/// wrong descent only costs a fetch). Rules are evaluated in a fixed
/// order and the first decision wins; the reason tag is kept for
/// diagnostics only.
pub struct NameMatcher {
    ctx: SearchContext,
    /// Whole-word pattern for a single-word raw term.
    term_boundary: Option<Regex>,
    /// Whole-word pattern for the single significant token, if there is
    /// exactly one.
    token_boundary: Option<Regex>,
    season_folder: Regex,
}

impl NameMatcher {
    pub fn new(ctx: SearchContext) -> Self {
        let term_boundary = if ctx.is_single_word() {
            whole_word_pattern(&ctx.normalized)
        } else {
            None
        };

        let token_boundary = if ctx.word_tokens.len() == 1 {
            whole_word_pattern(&ctx.word_tokens[0])
        } else {
            None
        };

        Self {
            ctx,
            term_boundary,
            token_boundary,
            season_folder: Regex::new(r"season|s\d+").unwrap(),
        }
    }

    pub fn context(&self) -> &SearchContext {
        &self.ctx
    }

    /// File-mode matching. Returns the reason tag on a hit.
    pub fn match_file(&self, name: &str) -> Option<String> {
        let name_lower = name.to_lowercase();

        // 1. Exact match of the full search term
        if name_lower.contains(&self.ctx.normalized) {
            if self.ctx.is_single_word() {
                if self.is_whole_word(&self.term_boundary, &name_lower) {
                    return Some("exact word match".to_string());
                }
                // Substring hit inside a larger word ("Up" in "Update"):
                // only the year fallback may still admit this name.
                return self.year_fallback(&name_lower);
            }
            return Some("exact phrase match".to_string());
        }

        // 2. Spaces replaced by dots/underscores, common in file names
        if name_lower.contains(&self.ctx.dot_variant)
            || name_lower.contains(&self.ctx.underscore_variant)
        {
            return Some("filename format match".to_string());
        }

        let tokens = &self.ctx.word_tokens;

        // 3. Three or more significant tokens: first token plus 75% of all
        if tokens.len() >= 3 {
            let matching = tokens.iter().filter(|w| name_lower.contains(w.as_str())).count();
            let percentage = matching as f64 / tokens.len() as f64;
            if name_lower.contains(tokens[0].as_str()) && percentage >= 0.75 {
                return Some(format!("multi-word match ({:.0}%)", percentage * 100.0));
            }
        }

        // 4. Exactly two tokens: both must be present
        if tokens.len() == 2 && tokens.iter().all(|w| name_lower.contains(w.as_str())) {
            return Some("all words match".to_string());
        }

        // 5. One token: must appear as a distinct word
        if tokens.len() == 1 && self.is_whole_word(&self.token_boundary, &name_lower) {
            return Some("single word match".to_string());
        }

        self.year_fallback(&name_lower)
    }

    /// Folder-mode matching: any one rule firing is sufficient.
    pub fn match_folder(&self, name: &str) -> bool {
        let name_lower = name.to_lowercase();
        let tokens = &self.ctx.word_tokens;

        name_lower.contains(&self.ctx.normalized)
            || name_lower.contains(&self.ctx.dot_variant)
            || name_lower.contains(&self.ctx.underscore_variant)
            || (tokens.len() > 1 && name_lower.contains(tokens[0].as_str()))
            || (tokens.len() == 1 && self.is_whole_word(&self.token_boundary, &name_lower))
            || self.season_folder.is_match(&name_lower)
    }

    /// Year special case: the term carries a year, the name carries the
    /// same year, and at least one other token matches too.
    fn year_fallback(&self, name_lower: &str) -> Option<String> {
        let year = self.ctx.year_hint.as_deref()?;
        if !name_lower.contains(year) {
            return None;
        }

        let other_matches = self
            .ctx
            .word_tokens
            .iter()
            .filter(|w| w.as_str() != year)
            .any(|w| name_lower.contains(w.as_str()));

        if other_matches {
            Some("movie with year match".to_string())
        } else {
            None
        }
    }

    fn is_whole_word(&self, pattern: &Option<Regex>, name_lower: &str) -> bool {
        pattern.as_ref().map_or(false, |re| re.is_match(name_lower))
    }
}

/// `(^|[^a-z0-9])word([^a-z0-9]|$)` over an already-lowercased name.
fn whole_word_pattern(word: &str) -> Option<Regex> {
    Regex::new(&format!(
        r"(^|[^a-z0-9]){}([^a-z0-9]|$)",
        regex::escape(word)
    ))
    .ok()
}
