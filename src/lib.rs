/// M3U Scout
///
/// Scans browsable HTTP/FTP media archives for a free-text search term,
/// infers season/episode metadata from file names and writes the matches
/// out as an extended M3U playlist.

pub mod categories;
pub mod config;
pub mod fetch;
pub mod pipeline;
pub mod playlist;
pub mod search;

// Re-export main types for easy access
pub use crate::categories::{Category, CategoryStore};
pub use crate::config::{Config, ConfigBuilder};
pub use crate::fetch::{
    DirectoryEntry, DirectoryFetcher, DirectoryListing, FetchError, HttpFetcher,
};
pub use crate::pipeline::{PlaylistGenerator, ProgressCallback, ScanOutcome, ScanRequest};
pub use crate::playlist::PlaylistWriter;
pub use crate::search::{
    FileCollector, FolderDiscoverer, MediaRecord, NameMatcher, ScanState, SearchContext,
    SeasonEpisodeParser,
};
