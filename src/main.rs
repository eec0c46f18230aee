use anyhow::{anyhow, Result};
use clap::{Arg, Command};
use std::path::PathBuf;
use tracing::{info, warn};

use m3u_scout::categories::CategoryStore;
use m3u_scout::config::Config;
use m3u_scout::pipeline::{PlaylistGenerator, ScanOutcome, ScanRequest};

#[tokio::main]
async fn main() -> Result<()> {
    let matches = Command::new("M3U Scout")
        .version("0.1.0")
        .about("Generates M3U playlists from browsable HTTP/FTP media archives")
        .arg(
            Arg::new("url")
                .short('u')
                .long("url")
                .value_name("URL")
                .help("Base URL of the archive to scan"),
        )
        .arg(
            Arg::new("category")
                .short('c')
                .long("category")
                .value_name("LABEL")
                .help("Use a saved category preset as the base URL"),
        )
        .arg(
            Arg::new("search")
                .short('s')
                .long("search")
                .value_name("TERM")
                .help("Movie or series name to search for"),
        )
        .arg(
            Arg::new("extensions")
                .short('e')
                .long("extensions")
                .value_name("LIST")
                .help("Comma-separated media extensions")
                .default_value(".mp4, .mkv, .avi"),
        )
        .arg(
            Arg::new("output-dir")
                .short('o')
                .long("output-dir")
                .value_name("DIR")
                .help("Directory the playlist is written into"),
        )
        .arg(
            Arg::new("name")
                .short('n')
                .long("name")
                .value_name("NAME")
                .help("Playlist name (defaults to the search term)"),
        )
        .arg(
            Arg::new("list-categories")
                .long("list-categories")
                .help("List saved category presets and exit")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("add-category")
                .long("add-category")
                .value_name("LABEL")
                .help("Save a category preset (requires --url)"),
        )
        .arg(
            Arg::new("remove-category")
                .long("remove-category")
                .value_name("LABEL")
                .help("Delete a saved category preset"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let verbose = matches.get_flag("verbose");
    tracing_subscriber::fmt()
        .with_env_filter(if verbose {
            "m3u_scout=debug,info"
        } else {
            "m3u_scout=info,warn"
        })
        .init();

    // Load configuration
    let config = Config::load().unwrap_or_else(|e| {
        warn!("Failed to load config, using defaults: {}", e);
        Config::default()
    });
    config.validate()?;

    let mut store = CategoryStore::load(&config.categories.categories_file).await?;

    // Category management modes
    if matches.get_flag("list-categories") {
        for category in store.categories() {
            println!("{}- {}", category.label, category.url);
        }
        return Ok(());
    }

    if let Some(label) = matches.get_one::<String>("remove-category") {
        if store.remove(label) {
            store.save().await?;
            info!("🗑️ Removed category: {}", label);
        } else {
            warn!("No category named {:?}", label);
        }
        return Ok(());
    }

    if let Some(label) = matches.get_one::<String>("add-category") {
        let url = matches
            .get_one::<String>("url")
            .ok_or_else(|| anyhow!("--add-category requires --url"))?;
        store.add(label, url)?;
        store.save().await?;
        info!("✅ Saved category: {}- {}", label, url);
        return Ok(());
    }

    // Scan mode
    let search_term = matches
        .get_one::<String>("search")
        .ok_or_else(|| anyhow!("a search term is required (--search)"))?;

    let base_url = match matches.get_one::<String>("url") {
        Some(url) => url.clone(),
        None => {
            let label = matches
                .get_one::<String>("category")
                .ok_or_else(|| anyhow!("either --url or --category is required"))?;
            store
                .resolve(label)
                .ok_or_else(|| anyhow!("no category named {:?}", label))?
                .to_string()
        }
    };

    let extensions: Vec<String> = matches
        .get_one::<String>("extensions")
        .map(|list| {
            list.split(',')
                .map(|ext| ext.trim().to_string())
                .filter(|ext| !ext.is_empty())
                .collect()
        })
        .unwrap_or_default();

    let output_dir = matches.get_one::<String>("output-dir").map(PathBuf::from);
    let playlist_name = matches.get_one::<String>("name").cloned();

    info!("🚀 M3U Scout starting...");
    info!("🌐 Base URL: {}", base_url);
    info!("🔎 Search term: {}", search_term);

    let request = ScanRequest {
        base_url,
        search_term: search_term.clone(),
        extensions,
        playlist_name,
        output_dir,
    };

    let generator = PlaylistGenerator::new(config);

    let start_time = std::time::Instant::now();
    let outcome = generator.generate(&request).await?;
    let duration = start_time.elapsed();

    match outcome {
        ScanOutcome::Written { path, total } => {
            info!("🎉 Scan completed in {:.2}s", duration.as_secs_f64());
            info!("✅ Playlist with {} files: {}", total, path.display());
        }
        ScanOutcome::NoFolders => {
            warn!("❌ No matching folders found.");
        }
        ScanOutcome::NoFiles => {
            warn!("❌ No media files found matching your search term.");
        }
    }

    Ok(())
}
