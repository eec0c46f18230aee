/// Persisted category presets mapping labels to archive base URLs
use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

/// Sentinel entry older versions of the presets file kept at index 0.
/// Stripped once on load; never written back.
const LEGACY_PLACEHOLDER: &str = "Select a category...";

/// One named archive base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub label: String,
    pub url: String,
}

impl Category {
    /// Wire format is `"<label>- <url>"`, one string per entry.
    fn parse(entry: &str) -> Option<Self> {
        let (label, url) = entry.split_once("- ")?;
        let label = label.trim();
        let url = url.trim();
        if label.is_empty() || url.is_empty() {
            return None;
        }
        Some(Self {
            label: label.to_string(),
            url: url.to_string(),
        })
    }

    fn to_entry(&self) -> String {
        format!("{}- {}", self.label, self.url)
    }
}

/// Category presets persisted as a JSON list of `"<label>- <url>"`
/// strings, the wire format older releases wrote.
#[derive(Debug, Clone)]
pub struct CategoryStore {
    path: PathBuf,
    categories: Vec<Category>,
}

impl CategoryStore {
    /// Load presets, falling back to the defaults when the file does not
    /// exist yet. Malformed entries and the legacy placeholder entry are
    /// dropped here, once, rather than special-cased by every consumer.
    pub async fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(
                "Categories file not found at {}, using defaults",
                path.display()
            );
            return Ok(Self {
                path: path.to_path_buf(),
                categories: default_categories(),
            });
        }

        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("cannot read categories file {}", path.display()))?;
        let entries: Vec<String> = serde_json::from_str(&content)
            .with_context(|| format!("cannot parse categories file {}", path.display()))?;

        let categories: Vec<Category> = entries
            .iter()
            .filter(|entry| entry.as_str() != LEGACY_PLACEHOLDER)
            .filter_map(|entry| {
                let parsed = Category::parse(entry);
                if parsed.is_none() {
                    warn!("Skipping malformed category entry: {:?}", entry);
                }
                parsed
            })
            .collect();

        info!(
            "📄 Loaded {} categories from {}",
            categories.len(),
            path.display()
        );

        Ok(Self {
            path: path.to_path_buf(),
            categories,
        })
    }

    /// Persist the presets back in the wire format.
    pub async fn save(&self) -> Result<()> {
        let entries: Vec<String> = self.categories.iter().map(Category::to_entry).collect();
        let content = serde_json::to_string_pretty(&entries)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await.with_context(|| {
                    format!("cannot create categories directory {}", parent.display())
                })?;
            }
        }

        fs::write(&self.path, content)
            .await
            .with_context(|| format!("cannot write categories file {}", self.path.display()))?;

        info!("💾 Categories saved to: {}", self.path.display());
        Ok(())
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Resolve a label to its base URL (labels compare case-insensitively).
    pub fn resolve(&self, label: &str) -> Option<&str> {
        let wanted = label.trim().to_lowercase();
        self.categories
            .iter()
            .find(|c| c.label.to_lowercase() == wanted)
            .map(|c| c.url.as_str())
    }

    /// Add or replace a category by label.
    pub fn add(&mut self, label: &str, url: &str) -> Result<()> {
        if label.trim().is_empty() || url.trim().is_empty() {
            return Err(anyhow!("category label and URL must not be empty"));
        }

        let lowered = label.trim().to_lowercase();
        self.categories.retain(|c| c.label.to_lowercase() != lowered);
        self.categories.push(Category {
            label: label.trim().to_string(),
            url: url.trim().to_string(),
        });
        Ok(())
    }

    /// Remove a category by label. Returns whether anything was removed.
    pub fn remove(&mut self, label: &str) -> bool {
        let lowered = label.trim().to_lowercase();
        let before = self.categories.len();
        self.categories.retain(|c| c.label.to_lowercase() != lowered);
        self.categories.len() != before
    }
}

/// Built-in presets used until the user saves their own.
fn default_categories() -> Vec<Category> {
    [
        (
            "English Movies",
            "http://server2.ftpbd.net/FTP-2/English%20Movies/",
        ),
        (
            "English and Foreign TV Series",
            "http://server4.ftpbd.net/FTP-4/English%20%26%20Foreign%20TV%20Series/",
        ),
        (
            "Animation Movies",
            "http://server5.ftpbd.net/FTP-5/Animation%20Movies/",
        ),
        (
            "Anime and Cartoon Series",
            "http://server5.ftpbd.net/FTP-5/Anime%20%26%20Cartoon%20TV%20Series/",
        ),
        ("Documentary", "http://server5.ftpbd.net/FTP-5/Documentary/"),
    ]
    .into_iter()
    .map(|(label, url)| Category {
        label: label.to_string(),
        url: url.to_string(),
    })
    .collect()
}
