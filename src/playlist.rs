/// M3U playlist rendering and writing
use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use tracing::info;

use crate::search::MediaRecord;

/// Serializes collected media records into an extended M3U playlist.
///
/// Episodic records (season and episode known) come first, sorted by
/// (season, episode); everything else keeps input order under the Movies
/// banner. Rendering is deterministic: the same records always produce
/// byte-identical output.
pub struct PlaylistWriter {
    output_dir: PathBuf,
    extension: String,
}

impl PlaylistWriter {
    pub fn new(output_dir: impl Into<PathBuf>, extension: &str) -> Self {
        Self {
            output_dir: output_dir.into(),
            extension: extension.trim_start_matches('.').to_string(),
        }
    }

    /// Render the playlist text. An empty record list is a caller
    /// contract violation, not an empty playlist.
    pub fn render(playlist_name: &str, records: &[MediaRecord]) -> Result<String> {
        if records.is_empty() {
            bail!("refusing to render a playlist with no records");
        }

        let mut episodic: Vec<&MediaRecord> = records.iter().filter(|r| r.is_episodic()).collect();
        let unordered: Vec<&MediaRecord> = records.iter().filter(|r| !r.is_episodic()).collect();

        // Stable sort keeps input order for identical (season, episode)
        episodic.sort_by_key(|r| (r.season.unwrap_or(0), r.episode.unwrap_or(0)));

        let mut content = String::from("#EXTM3U\n");

        if !episodic.is_empty() {
            content.push_str("\n# TV Series Episodes\n");
            for record in episodic {
                let label = episodic_label(playlist_name, record);
                content.push_str(&format!("#EXTINF:-1,{}\n{}\n", label, record.url));
            }
        }

        if !unordered.is_empty() {
            content.push_str("\n# Movies\n");
            for record in unordered {
                let label = movie_label(record);
                content.push_str(&format!("#EXTINF:-1,{}\n{}\n", label, record.url));
            }
        }

        Ok(content)
    }

    /// Render and write `<output_dir>/<name>.<extension>`, creating the
    /// output directory if needed. Write failures are fatal to the run.
    pub async fn write(&self, playlist_name: &str, records: &[MediaRecord]) -> Result<PathBuf> {
        let content = Self::render(playlist_name, records)?;

        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .with_context(|| {
                format!(
                    "cannot create output directory {}",
                    self.output_dir.display()
                )
            })?;

        let path = self
            .output_dir
            .join(format!("{}.{}", playlist_name, self.extension));
        tokio::fs::write(&path, content)
            .await
            .with_context(|| format!("cannot write playlist {}", path.display()))?;

        info!("💾 Playlist saved at: {}", path.display());
        Ok(path)
    }
}

/// `"<name> - SxxEyy"` plus the bracketed uppercase extension.
fn episodic_label(playlist_name: &str, record: &MediaRecord) -> String {
    let mut label = format!(
        "{} - S{:02}E{:02}",
        playlist_name,
        record.season.unwrap_or(0),
        record.episode.unwrap_or(0)
    );
    if let Some(ext) = file_extension(&record.name) {
        label.push_str(&format!(" [{}]", ext.to_uppercase()));
    }
    label
}

/// Base name with separator characters turned back into spaces, plus the
/// bracketed uppercase extension.
fn movie_label(record: &MediaRecord) -> String {
    let (stem, ext) = match record.name.rfind('.') {
        Some(idx) if idx > 0 => (&record.name[..idx], Some(&record.name[idx + 1..])),
        _ => (record.name.as_str(), None),
    };

    let mut label = stem.replace('.', " ").replace('_', " ");
    if let Some(ext) = ext.filter(|e| !e.is_empty()) {
        label.push_str(&format!(" [{}]", ext.to_uppercase()));
    }
    label
}

/// Extension without the dot, if the name has one.
fn file_extension(name: &str) -> Option<&str> {
    match name.rfind('.') {
        Some(idx) if idx > 0 && idx + 1 < name.len() => Some(&name[idx + 1..]),
        _ => None,
    }
}
