use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the playlist generator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Scanning and matching settings
    pub scan: ScanConfig,

    /// Output and playlist settings
    pub output: OutputConfig,

    /// Category preset settings
    pub categories: CategoriesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Timeout for folder-discovery requests (seconds)
    pub folder_timeout_seconds: u64,

    /// Timeout for file-listing requests (seconds); listings can be large
    pub listing_timeout_seconds: u64,

    /// Media extensions used when the caller supplies none
    pub default_extensions: Vec<String>,

    /// User-agent header sent with every request
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory playlists are written into
    pub output_dir: PathBuf,

    /// Playlist file extension (without the dot)
    pub playlist_extension: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoriesConfig {
    /// Path of the persisted category presets file
    pub categories_file: PathBuf,
}

impl Config {
    /// Load configuration from file
    pub fn load() -> Result<Self> {
        let config_paths = [
            "m3u-scout.toml",
            "config/m3u-scout.toml",
            "/etc/m3u-scout/config.toml",
        ];

        for path in &config_paths {
            if let Ok(config_str) = std::fs::read_to_string(path) {
                match toml::from_str(&config_str) {
                    Ok(config) => {
                        tracing::info!("📄 Loaded configuration from: {}", path);
                        return Ok(config);
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse config file {}: {}", path, e);
                    }
                }
            }
        }

        // Fall back to environment overrides over the defaults
        Self::from_env()
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(output_dir) = std::env::var("M3U_SCOUT_OUTPUT_DIR") {
            config.output.output_dir = PathBuf::from(output_dir);
        }

        if let Ok(timeout) = std::env::var("M3U_SCOUT_FOLDER_TIMEOUT") {
            config.scan.folder_timeout_seconds = timeout.parse().unwrap_or(5);
        }

        if let Ok(timeout) = std::env::var("M3U_SCOUT_LISTING_TIMEOUT") {
            config.scan.listing_timeout_seconds = timeout.parse().unwrap_or(15);
        }

        if let Ok(categories) = std::env::var("M3U_SCOUT_CATEGORIES_FILE") {
            config.categories.categories_file = PathBuf::from(categories);
        }

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: &str) -> Result<()> {
        let config_str = toml::to_string_pretty(self)?;
        std::fs::write(path, config_str)?;
        tracing::info!("💾 Configuration saved to: {}", path);
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.scan.folder_timeout_seconds == 0 {
            return Err(anyhow!("folder_timeout_seconds must be greater than 0"));
        }

        if self.scan.listing_timeout_seconds == 0 {
            return Err(anyhow!("listing_timeout_seconds must be greater than 0"));
        }

        if self.scan.default_extensions.is_empty() {
            return Err(anyhow!("default_extensions must not be empty"));
        }

        if self.output.playlist_extension.trim().is_empty() {
            return Err(anyhow!("playlist_extension must not be empty"));
        }

        Ok(())
    }

    /// Get runtime configuration summary
    pub fn summary(&self) -> String {
        format!(
            "M3U Scout Configuration:\n\
            - Folder Timeout: {}s\n\
            - Listing Timeout: {}s\n\
            - Default Extensions: {}\n\
            - Output Directory: {}\n\
            - Categories File: {}",
            self.scan.folder_timeout_seconds,
            self.scan.listing_timeout_seconds,
            self.scan.default_extensions.join(", "),
            self.output.output_dir.display(),
            self.categories.categories_file.display()
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scan: ScanConfig {
                folder_timeout_seconds: 5,
                listing_timeout_seconds: 15,
                default_extensions: vec![
                    ".mp4".to_string(),
                    ".mkv".to_string(),
                    ".avi".to_string(),
                ],
                user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
            },
            output: OutputConfig {
                output_dir: PathBuf::from("./playlists"),
                playlist_extension: "m3u".to_string(),
            },
            categories: CategoriesConfig {
                categories_file: PathBuf::from("categories.json"),
            },
        }
    }
}

/// Configuration builder for programmatic config creation
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_folder_timeout(mut self, seconds: u64) -> Self {
        self.config.scan.folder_timeout_seconds = seconds;
        self
    }

    pub fn with_listing_timeout(mut self, seconds: u64) -> Self {
        self.config.scan.listing_timeout_seconds = seconds;
        self
    }

    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.config.scan.default_extensions = extensions;
        self
    }

    pub fn with_output_dir(mut self, dir: PathBuf) -> Self {
        self.config.output.output_dir = dir;
        self
    }

    pub fn with_categories_file(mut self, path: PathBuf) -> Self {
        self.config.categories.categories_file = path;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.scan.folder_timeout_seconds, 5);
        assert_eq!(config.scan.listing_timeout_seconds, 15);
        assert_eq!(config.scan.default_extensions.len(), 3);
        assert_eq!(config.output.playlist_extension, "m3u");
    }

    #[test]
    fn test_config_builder() {
        let config = ConfigBuilder::new()
            .with_folder_timeout(2)
            .with_listing_timeout(30)
            .with_output_dir(PathBuf::from("/tmp/playlists"))
            .build();

        assert_eq!(config.scan.folder_timeout_seconds, 2);
        assert_eq!(config.scan.listing_timeout_seconds, 30);
        assert_eq!(config.output.output_dir, PathBuf::from("/tmp/playlists"));
    }

    #[test]
    fn test_config_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());

        let broken = ConfigBuilder::new().with_folder_timeout(0).build();
        assert!(broken.validate().is_err());

        let broken = ConfigBuilder::new().with_extensions(Vec::new()).build();
        assert!(broken.validate().is_err());
    }
}
