/// Media file collection within candidate folders
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::fetch::{DirectoryEntry, DirectoryFetcher, DirectoryListing};
use super::{MediaRecord, NameMatcher, SearchContext, SeasonEpisodeParser};

/// Deduplication state shared across every folder of one collection run.
///
/// A folder URL is never fetched twice and a media URL is never emitted
/// twice, no matter how many paths reach them.
#[derive(Debug, Default)]
pub struct ScanState {
    visited_folders: HashSet<String>,
    emitted_urls: HashSet<String>,
}

impl ScanState {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Work items for the traversal stack.
///
/// The movies-shelf fallback must run only after the matching subtree of
/// its folder produced nothing, so it is pushed underneath the matching
/// children together with a record-count snapshot to compare against.
enum WorkItem {
    Scan(String),
    MoviesFallback {
        folder_url: String,
        subfolders: Vec<DirectoryEntry>,
        records_before: usize,
    },
}

/// Collects matching media files from one candidate folder, descending
/// into subfolders when a folder has no direct hits.
pub struct FileCollector {
    fetcher: Arc<dyn DirectoryFetcher>,
    matcher: NameMatcher,
    parser: SeasonEpisodeParser,
    extensions: Vec<String>,
}

impl FileCollector {
    pub fn new(
        fetcher: Arc<dyn DirectoryFetcher>,
        ctx: SearchContext,
        extensions: &[String],
    ) -> Self {
        Self {
            fetcher,
            matcher: NameMatcher::new(ctx),
            parser: SeasonEpisodeParser::new(),
            extensions: normalize_extensions(extensions),
        }
    }

    /// Collect matching files reachable from `folder_url`. Fetch failures
    /// degrade the affected branch to zero results.
    pub async fn collect(&self, folder_url: &str, state: &mut ScanState) -> Vec<MediaRecord> {
        let mut records = Vec::new();
        let mut stack = vec![WorkItem::Scan(folder_url.to_string())];

        while let Some(item) = stack.pop() {
            match item {
                WorkItem::Scan(url) => {
                    if !state.visited_folders.insert(url.clone()) {
                        continue;
                    }

                    let listing = match self.fetcher.fetch_listing(&url).await {
                        Ok(listing) => listing,
                        Err(e) => {
                            warn!("Failed to list {}: {}", url, e);
                            continue;
                        }
                    };

                    let direct_hits = self.scan_files(&listing, state, &mut records);
                    if direct_hits > 0 {
                        continue;
                    }

                    debug!("No direct media files in {}, checking subfolders", url);
                    let subfolders: Vec<_> = listing.directories().cloned().collect();

                    // Deferred: only consulted if the matching subtree
                    // below stays empty.
                    if url.to_lowercase().contains("movies") {
                        stack.push(WorkItem::MoviesFallback {
                            folder_url: url.clone(),
                            subfolders: subfolders.clone(),
                            records_before: records.len(),
                        });
                    }

                    let matching: Vec<_> = subfolders
                        .iter()
                        .filter(|entry| self.matcher.match_folder(&entry.display_name()))
                        .collect();
                    for entry in matching.iter().rev() {
                        stack.push(WorkItem::Scan(entry.url.clone()));
                    }
                }
                WorkItem::MoviesFallback {
                    folder_url,
                    subfolders,
                    records_before,
                } => {
                    if records.len() > records_before {
                        continue;
                    }

                    debug!(
                        "No files under matching subfolders of {}, trying alphabetical and year shelves",
                        folder_url
                    );
                    let first_letter = self.matcher.context().first_letter();
                    let year_hint = self.matcher.context().year_hint.clone();

                    let shelves: Vec<String> = subfolders
                        .iter()
                        .filter(|entry| {
                            let name = entry.display_name().to_lowercase();
                            first_letter.map_or(false, |c| name.starts_with(c))
                                || year_hint.as_deref().map_or(false, |y| name.contains(y))
                        })
                        .map(|entry| entry.url.clone())
                        .collect();

                    for url in shelves.iter().rev() {
                        stack.push(WorkItem::Scan(url.clone()));
                    }
                }
            }
        }

        records
    }

    /// Scan one listing for direct file hits. Returns the number of
    /// matched files (the subfolder-descent guard), which can exceed the
    /// number of newly emitted records when duplicates are dropped.
    fn scan_files(
        &self,
        listing: &DirectoryListing,
        state: &mut ScanState,
        records: &mut Vec<MediaRecord>,
    ) -> usize {
        let mut matched = 0;

        for entry in listing.files() {
            let href_lower = entry.href.to_lowercase();
            if !self.extensions.iter().any(|ext| href_lower.ends_with(ext)) {
                continue;
            }

            let name = entry.display_name();
            let Some(reason) = self.matcher.match_file(&name) else {
                continue;
            };
            matched += 1;

            if !state.emitted_urls.insert(entry.url.clone()) {
                debug!("Skipped duplicate: {}", entry.url);
                continue;
            }

            let parsed = self.parser.parse(&name);
            info!("🎬 Found media file: {} ({})", name, reason);
            records.push(MediaRecord {
                url: entry.url.clone(),
                name,
                season: parsed.map(|(s, _)| s),
                episode: parsed.map(|(_, e)| e),
            });
        }

        matched
    }
}

/// Ensure every extension carries a leading dot and compares lowercase.
fn normalize_extensions(extensions: &[String]) -> Vec<String> {
    extensions
        .iter()
        .map(|ext| ext.trim())
        .filter(|ext| !ext.is_empty())
        .map(|ext| {
            let lower = ext.to_lowercase();
            if lower.starts_with('.') {
                lower
            } else {
                format!(".{}", lower)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::test_support::MockFetcher;

    fn collector(fetcher: Arc<MockFetcher>, term: &str) -> FileCollector {
        FileCollector::new(
            fetcher,
            SearchContext::new(term),
            &[".mp4".to_string(), ".mkv".to_string(), ".avi".to_string()],
        )
    }

    #[test]
    fn test_normalize_extensions() {
        let exts = normalize_extensions(&[
            "mp4".to_string(),
            ".MKV".to_string(),
            " avi ".to_string(),
            "".to_string(),
        ]);
        assert_eq!(exts, vec![".mp4", ".mkv", ".avi"]);
    }

    #[tokio::test]
    async fn test_direct_files_matched_and_parsed() {
        let fetcher = Arc::new(MockFetcher::new().page(
            "http://host/TV/Show/",
            &[
                ("Show.S01E02.mkv", false),
                ("Show.S01E01.mkv", false),
                ("Show.S01E01.nfo", false),
                ("Unrelated.S01E01.mkv", false),
            ],
        ));
        let collector = collector(Arc::clone(&fetcher), "Show");

        let mut state = ScanState::new();
        let records = collector.collect("http://host/TV/Show/", &mut state).await;

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "Show.S01E02.mkv");
        assert_eq!(records[0].season, Some(1));
        assert_eq!(records[0].episode, Some(2));
        assert_eq!(records[1].name, "Show.S01E01.mkv");
    }

    #[tokio::test]
    async fn test_descends_only_when_no_direct_hits() {
        let fetcher = Arc::new(
            MockFetcher::new()
                .page(
                    "http://host/TV/Show/",
                    &[("Season 1/", true), ("Extras/", true)],
                )
                .page(
                    "http://host/TV/Show/Season%201/",
                    &[("Show.S01E01.mkv", false)],
                ),
        );
        let collector = collector(Arc::clone(&fetcher), "Show");

        let mut state = ScanState::new();
        let records = collector.collect("http://host/TV/Show/", &mut state).await;

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].season, Some(1));
        // Extras/ does not match the folder rules and is never fetched
        assert_eq!(fetcher.fetch_count("http://host/TV/Show/Extras/"), 0);
    }

    #[tokio::test]
    async fn test_same_url_never_emitted_twice() {
        // The same file is reachable directly and through a season folder
        let fetcher = Arc::new(
            MockFetcher::new()
                .page(
                    "http://host/TV/A/",
                    &[("Show.S01E01.mkv", false)],
                )
                .page(
                    "http://host/TV/B/",
                    &[("../A/Show.S01E01.mkv", false)],
                ),
        );
        let collector = collector(Arc::clone(&fetcher), "Show");

        let mut state = ScanState::new();
        let mut records = collector.collect("http://host/TV/A/", &mut state).await;
        records.extend(collector.collect("http://host/TV/B/", &mut state).await);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].url, "http://host/TV/A/Show.S01E01.mkv");
    }

    #[tokio::test]
    async fn test_movies_fallback_uses_letter_and_year_shelves() {
        let fetcher = Arc::new(
            MockFetcher::new()
                .page(
                    "http://host/Movies/",
                    &[("I/", true), ("2010/", true), ("Z/", true)],
                )
                .page(
                    "http://host/Movies/I/",
                    &[("Inception.2010.1080p.mkv", false)],
                )
                .page("http://host/Movies/2010/", &[])
                .page("http://host/Movies/Z/", &[("Zoo.mkv", false)]),
        );
        let collector = collector(Arc::clone(&fetcher), "Inception 2010");

        let mut state = ScanState::new();
        let records = collector.collect("http://host/Movies/", &mut state).await;

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Inception.2010.1080p.mkv");
        assert_eq!(records[0].season, None);
        assert_eq!(records[0].episode, None);
        // Z/ matches neither the first letter nor the year shelf
        assert_eq!(fetcher.fetch_count("http://host/Movies/Z/"), 0);
    }

    #[tokio::test]
    async fn test_fallback_skipped_when_matching_subfolder_delivers() {
        let fetcher = Arc::new(
            MockFetcher::new()
                .page(
                    "http://host/Movies/",
                    &[("Inception Collection/", true), ("I/", true)],
                )
                .page(
                    "http://host/Movies/Inception%20Collection/",
                    &[("Inception.2010.mkv", false)],
                ),
        );
        let collector = collector(Arc::clone(&fetcher), "Inception 2010");

        let mut state = ScanState::new();
        let records = collector.collect("http://host/Movies/", &mut state).await;

        assert_eq!(records.len(), 1);
        // The matched subfolder delivered, so the alphabetical shelf
        // fallback never runs
        assert_eq!(fetcher.fetch_count("http://host/Movies/I/"), 0);
    }

    #[tokio::test]
    async fn test_fetch_failure_degrades_to_empty() {
        let fetcher = Arc::new(MockFetcher::new().failing("http://host/TV/Show/"));
        let collector = collector(Arc::clone(&fetcher), "Show");

        let mut state = ScanState::new();
        let records = collector.collect("http://host/TV/Show/", &mut state).await;
        assert!(records.is_empty());
    }
}
