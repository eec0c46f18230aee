/// Caller-facing scan pipeline: discover folders, collect files, write
/// the playlist
use anyhow::{bail, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::config::Config;
use crate::fetch::{DirectoryFetcher, HttpFetcher};
use crate::playlist::PlaylistWriter;
use crate::search::{FileCollector, FolderDiscoverer, MediaRecord, ScanState, SearchContext};

/// Receives `(percent_complete, status_message)` at coarse milestones.
pub type ProgressCallback = Arc<dyn Fn(u8, &str) + Send + Sync>;

/// One playlist-generation request.
#[derive(Debug, Clone)]
pub struct ScanRequest {
    pub base_url: String,
    pub search_term: String,
    /// Media extensions; empty means the configured defaults.
    pub extensions: Vec<String>,
    /// Playlist name; defaults to the search term with spaces replaced
    /// by underscores.
    pub playlist_name: Option<String>,
    /// Output directory; defaults to the configured one.
    pub output_dir: Option<PathBuf>,
}

/// What a completed run produced. Empty results are outcomes, not
/// errors: only invalid input and write failures surface as `Err`.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanOutcome {
    /// Discovery yielded no folders to scan.
    NoFolders,
    /// Folders were scanned but nothing matched.
    NoFiles,
    /// The playlist was written.
    Written { path: PathBuf, total: usize },
}

/// Orchestrates one scan end to end.
///
/// Folders are visited strictly sequentially; all deduplication state is
/// shared across the run, so no folder is fetched twice and no media URL
/// is emitted twice even when candidate subtrees overlap.
pub struct PlaylistGenerator {
    config: Config,
    discovery_fetcher: Arc<dyn DirectoryFetcher>,
    listing_fetcher: Arc<dyn DirectoryFetcher>,
    progress: Option<ProgressCallback>,
}

impl PlaylistGenerator {
    /// Create a generator backed by HTTP fetchers: a short-timeout one
    /// for discovery and a longer-timeout one for file listings.
    pub fn new(config: Config) -> Self {
        let discovery_fetcher = Arc::new(HttpFetcher::new(
            config.scan.folder_timeout_seconds,
            &config.scan.user_agent,
        ));
        let listing_fetcher = Arc::new(HttpFetcher::new(
            config.scan.listing_timeout_seconds,
            &config.scan.user_agent,
        ));
        Self::with_fetchers(config, discovery_fetcher, listing_fetcher)
    }

    /// Create a generator with explicit fetchers.
    pub fn with_fetchers(
        config: Config,
        discovery_fetcher: Arc<dyn DirectoryFetcher>,
        listing_fetcher: Arc<dyn DirectoryFetcher>,
    ) -> Self {
        Self {
            config,
            discovery_fetcher,
            listing_fetcher,
            progress: None,
        }
    }

    pub fn on_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    /// Run the full pipeline for one request.
    pub async fn generate(&self, request: &ScanRequest) -> Result<ScanOutcome> {
        let (folder_count, records) = self.run_scan(request).await?;

        if folder_count == 0 {
            self.report(100, "No matching folders found.");
            return Ok(ScanOutcome::NoFolders);
        }
        if records.is_empty() {
            self.report(100, "No media files found matching the search term.");
            return Ok(ScanOutcome::NoFiles);
        }

        self.report(
            75,
            &format!("Creating playlist with {} files...", records.len()),
        );

        let search_term = request.search_term.trim();
        let playlist_name = request
            .playlist_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| search_term.replace(' ', "_"));

        let output_dir = request
            .output_dir
            .clone()
            .unwrap_or_else(|| self.config.output.output_dir.clone());
        let writer = PlaylistWriter::new(output_dir, &self.config.output.playlist_extension);
        let path = writer.write(&playlist_name, &records).await?;

        self.report(
            100,
            &format!("Playlist created successfully at: {}", path.display()),
        );

        Ok(ScanOutcome::Written {
            path,
            total: records.len(),
        })
    }

    /// Discover candidate folders and collect matching records without
    /// writing anything. Record order is the order files were found in.
    pub async fn discover_and_collect(&self, request: &ScanRequest) -> Result<Vec<MediaRecord>> {
        let (_, records) = self.run_scan(request).await?;
        Ok(records)
    }

    /// Shared discovery + collection phase. Returns the candidate folder
    /// count alongside the deduplicated records.
    async fn run_scan(&self, request: &ScanRequest) -> Result<(usize, Vec<MediaRecord>)> {
        let base_url = request.base_url.trim();
        let search_term = request.search_term.trim();

        if base_url.is_empty() {
            bail!("base URL must not be empty");
        }
        if search_term.is_empty() {
            bail!("search term must not be empty");
        }

        let ctx = SearchContext::new(search_term);
        self.report(0, "Searching for matching folders...");

        let discoverer = FolderDiscoverer::new(Arc::clone(&self.discovery_fetcher));
        let folders = discoverer.discover(base_url, &ctx).await;
        if folders.is_empty() {
            return Ok((0, Vec::new()));
        }

        self.report(
            25,
            &format!(
                "Found {} folders. Searching for media files...",
                folders.len()
            ),
        );

        let extensions = if request.extensions.is_empty() {
            self.config.scan.default_extensions.clone()
        } else {
            request.extensions.clone()
        };
        let collector = FileCollector::new(Arc::clone(&self.listing_fetcher), ctx, &extensions);

        let mut state = ScanState::new();
        let mut records: Vec<MediaRecord> = Vec::new();
        let total = folders.len();

        for (index, folder) in folders.iter().enumerate() {
            self.report(
                25 + (50 * index / total) as u8,
                &format!("Scanning folder {}/{}: {}", index + 1, total, folder),
            );
            let found = collector.collect(folder, &mut state).await;
            records.extend(found);
        }

        Ok((total, records))
    }

    fn report(&self, percent: u8, message: &str) {
        info!("[{:3}%] {}", percent, message);
        if let Some(callback) = &self.progress {
            callback(percent, message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::test_support::MockFetcher;
    use std::sync::Mutex;
    use tempfile::TempDir;

    fn request(base_url: &str, term: &str, output_dir: PathBuf) -> ScanRequest {
        ScanRequest {
            base_url: base_url.to_string(),
            search_term: term.to_string(),
            extensions: Vec::new(),
            playlist_name: None,
            output_dir: Some(output_dir),
        }
    }

    fn tv_fetcher() -> Arc<MockFetcher> {
        Arc::new(
            MockFetcher::new()
                .page("http://host/TV/", &[("Show/", true)])
                .page("http://host/TV/Show/", &[("Season 1/", true)])
                .page(
                    "http://host/TV/Show/Season%201/",
                    &[("Show.S01E02.mkv", false), ("Show.S01E01.mkv", false)],
                ),
        )
    }

    #[tokio::test]
    async fn test_episodic_end_to_end() {
        let temp = TempDir::new().unwrap();
        let fetcher = tv_fetcher();
        let generator = PlaylistGenerator::with_fetchers(
            Config::default(),
            Arc::clone(&fetcher) as Arc<dyn DirectoryFetcher>,
            Arc::clone(&fetcher) as Arc<dyn DirectoryFetcher>,
        );

        let outcome = generator
            .generate(&request("http://host/TV/", "Show", temp.path().to_path_buf()))
            .await
            .unwrap();

        let ScanOutcome::Written { path, total } = outcome else {
            panic!("expected a written playlist");
        };
        assert_eq!(total, 2);

        let content = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(content.contains("# TV Series Episodes"));
        let e1 = content.find("Show - S01E01").unwrap();
        let e2 = content.find("Show - S01E02").unwrap();
        assert!(e1 < e2);
    }

    #[tokio::test]
    async fn test_no_files_is_an_outcome_not_an_error() {
        let temp = TempDir::new().unwrap();
        let fetcher = Arc::new(MockFetcher::new().page("http://host/TV/", &[]));
        let generator = PlaylistGenerator::with_fetchers(
            Config::default(),
            Arc::clone(&fetcher) as Arc<dyn DirectoryFetcher>,
            Arc::clone(&fetcher) as Arc<dyn DirectoryFetcher>,
        );

        let outcome = generator
            .generate(&request("http://host/TV/", "Show", temp.path().to_path_buf()))
            .await
            .unwrap();
        assert_eq!(outcome, ScanOutcome::NoFiles);
    }

    #[tokio::test]
    async fn test_invalid_input_is_an_error() {
        let fetcher = Arc::new(MockFetcher::new());
        let generator = PlaylistGenerator::with_fetchers(
            Config::default(),
            Arc::clone(&fetcher) as Arc<dyn DirectoryFetcher>,
            Arc::clone(&fetcher) as Arc<dyn DirectoryFetcher>,
        );

        let temp = TempDir::new().unwrap();
        let missing_url = request("", "Show", temp.path().to_path_buf());
        assert!(generator.generate(&missing_url).await.is_err());

        let missing_term = request("http://host/TV/", "  ", temp.path().to_path_buf());
        assert!(generator.generate(&missing_term).await.is_err());
    }

    #[tokio::test]
    async fn test_progress_milestones() {
        let temp = TempDir::new().unwrap();
        let fetcher = tv_fetcher();
        let seen: Arc<Mutex<Vec<u8>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        let generator = PlaylistGenerator::with_fetchers(
            Config::default(),
            Arc::clone(&fetcher) as Arc<dyn DirectoryFetcher>,
            Arc::clone(&fetcher) as Arc<dyn DirectoryFetcher>,
        )
        .on_progress(Arc::new(move |percent, _message| {
            sink.lock().unwrap().push(percent);
        }));

        generator
            .generate(&request("http://host/TV/", "Show", temp.path().to_path_buf()))
            .await
            .unwrap();

        let percents = seen.lock().unwrap().clone();
        assert_eq!(percents.first(), Some(&0));
        assert_eq!(percents.last(), Some(&100));
        assert!(percents.windows(2).all(|w| w[0] <= w[1]));
        assert!(percents.contains(&25));
    }

    #[tokio::test]
    async fn test_discover_and_collect_returns_records_without_writing() {
        let temp = TempDir::new().unwrap();
        let fetcher = tv_fetcher();
        let generator = PlaylistGenerator::with_fetchers(
            Config::default(),
            Arc::clone(&fetcher) as Arc<dyn DirectoryFetcher>,
            Arc::clone(&fetcher) as Arc<dyn DirectoryFetcher>,
        );

        let records = generator
            .discover_and_collect(&request("http://host/TV/", "Show", temp.path().to_path_buf()))
            .await
            .unwrap();

        // Records keep discovery order; only the playlist writer sorts
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "Show.S01E02.mkv");
        assert_eq!(records[1].name, "Show.S01E01.mkv");
        assert!(!temp.path().join("Show.m3u").exists());
    }

    #[tokio::test]
    async fn test_playlist_name_defaults_to_underscored_term() {
        let temp = TempDir::new().unwrap();
        let fetcher = Arc::new(
            MockFetcher::new()
                .page("http://host/TV/", &[("My Show/", true)])
                .page("http://host/TV/My%20Show/", &[("My.Show.S01E01.mkv", false)]),
        );
        let generator = PlaylistGenerator::with_fetchers(
            Config::default(),
            Arc::clone(&fetcher) as Arc<dyn DirectoryFetcher>,
            Arc::clone(&fetcher) as Arc<dyn DirectoryFetcher>,
        );

        let outcome = generator
            .generate(&request(
                "http://host/TV/",
                "My Show",
                temp.path().to_path_buf(),
            ))
            .await
            .unwrap();

        let ScanOutcome::Written { path, .. } = outcome else {
            panic!("expected a written playlist");
        };
        assert!(path.ends_with("My_Show.m3u"));
    }
}
