use std::path::PathBuf;

use crate::error::Result;
use crate::settings::{load_settings, save_settings, settings_path, shellexpand_path};
use crate::store::SqliteStore;

fn is_url(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

pub fn run(
    data_dir: Option<String>,
    feed_url: Option<String>,
    strict_filters: Option<bool>,
) -> Result<()> {
    let mut settings = load_settings();

    if let Some(dir) = data_dir {
        let expanded = shellexpand_path(&dir);
        std::fs::create_dir_all(&expanded)?;
        settings.data_dir = shellexpand_path(&expanded);
    }
    if let Some(url) = feed_url {
        settings.feed_url = if url.trim().is_empty() || is_url(&url) {
            url.trim().to_string()
        } else {
            shellexpand_path(&url)
        };
    }
    if let Some(strict) = strict_filters {
        settings.strict_filters = strict;
    }

    let db_path = settings.db_path();
    SqliteStore::open(&db_path)?;
    save_settings(&settings)?;

    println!("Data directory: {}", PathBuf::from(&settings.data_dir).display());
    println!("Cache database: {}", db_path.display());
    println!("Card feed:      {}", settings.feed_location());
    println!(
        "Filter tags:    {}",
        if settings.strict_filters { "strict" } else { "permissive" }
    );
    println!("Settings saved to {}", settings_path().display());
    Ok(())
}
