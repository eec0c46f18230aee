/// Candidate folder discovery over a remote directory tree
use regex::Regex;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::fetch::DirectoryFetcher;
use super::SearchContext;

/// Genre shelf names commonly used to organize flat movie archives.
const GENRE_SHELVES: [&str; 5] = ["action", "drama", "comedy", "horror", "thriller"];

/// Walks the base URL one level (two for series trees) and collects the
/// folders worth scanning for files.
///
/// The walk is an explicit frontier over a seen-set rather than recursion:
/// duplicate links and self-referencing pages cannot loop it, and no URL
/// is fetched twice in one run. Fetch failures degrade the affected
/// branch to zero candidates and are never fatal.
pub struct FolderDiscoverer {
    fetcher: Arc<dyn DirectoryFetcher>,
    year_token: Regex,
    season_folder: Regex,
}

impl FolderDiscoverer {
    pub fn new(fetcher: Arc<dyn DirectoryFetcher>) -> Self {
        Self {
            fetcher,
            year_token: Regex::new(r"(19\d\d|20\d\d)").unwrap(),
            season_folder: Regex::new(r"season|s\d+").unwrap(),
        }
    }

    /// Discover candidate folders. The base URL is always the first
    /// element; the rest follow in the order their pages listed them,
    /// deduplicated by exact URL.
    pub async fn discover(&self, base_url: &str, ctx: &SearchContext) -> Vec<String> {
        info!("🔍 Discovering folders under {}", base_url);

        let mut folders = vec![base_url.to_string()];
        let mut seen: HashSet<String> = folders.iter().cloned().collect();

        let listing = match self.fetcher.fetch_listing(base_url).await {
            Ok(listing) => listing,
            Err(e) => {
                warn!("Folder discovery failed for {}: {}", base_url, e);
                return folders;
            }
        };

        let is_movie_dir = base_url.to_lowercase().contains("movie");

        for entry in listing.directories() {
            if !seen.insert(entry.url.clone()) {
                continue;
            }
            let name = entry.display_name().to_lowercase();

            if is_movie_dir {
                if self.movie_shelf_matches(&name, ctx) {
                    folders.push(entry.url.clone());
                }
            } else if ctx.contains_any_token(&name) {
                folders.push(entry.url.clone());
                self.admit_season_subfolders(&entry.url, &mut folders, &mut seen)
                    .await;
            }
        }

        info!("✅ Discovery found {} candidate folders", folders.len());
        folders
    }

    /// Movie archives are often shelved alphabetically, by year or by
    /// genre; admit any folder that could plausibly hold the title.
    fn movie_shelf_matches(&self, name: &str, ctx: &SearchContext) -> bool {
        if let Some(first) = ctx.first_letter() {
            if name.starts_with(first) || name.contains(first) {
                return true;
            }
        }
        if self.year_token.is_match(name) {
            return true;
        }
        if ctx.contains_any_token(name) {
            return true;
        }
        GENRE_SHELVES.iter().any(|genre| name.contains(genre))
    }

    /// For a series folder, look one level further down and admit
    /// season-labeled subfolders.
    async fn admit_season_subfolders(
        &self,
        folder_url: &str,
        folders: &mut Vec<String>,
        seen: &mut HashSet<String>,
    ) {
        let listing = match self.fetcher.fetch_listing(folder_url).await {
            Ok(listing) => listing,
            Err(e) => {
                debug!("Could not check {} for season folders: {}", folder_url, e);
                return;
            }
        };

        for entry in listing.directories() {
            let name = entry.display_name().to_lowercase();
            if self.season_folder.is_match(&name) && seen.insert(entry.url.clone()) {
                folders.push(entry.url.clone());
            }
        }
    }
}
