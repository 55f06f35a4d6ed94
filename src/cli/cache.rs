use comfy_table::{Cell, Table};

use crate::catalog::{read_snapshot, STORAGE_KEY};
use crate::error::Result;
use crate::settings::load_settings;
use crate::store::{KvStore, SqliteStore};

pub fn status() -> Result<()> {
    let settings = load_settings();
    let db_path = settings.db_path();

    println!("Database:   {}", db_path.display());
    println!("Feed:       {}", settings.feed_location());
    println!("TTL:        {}h", settings.cache_ttl_hours);

    if !db_path.exists() {
        println!();
        println!("No cache yet. Run `cardwise cards` to populate it.");
        return Ok(());
    }

    let store = SqliteStore::open(&db_path)?;
    let entries = store.entries()?;
    if !entries.is_empty() {
        let mut table = Table::new();
        table.set_header(vec!["Key", "Bytes", "Updated (UTC)"]);
        for (key, size, updated_at) in entries {
            table.add_row(vec![Cell::new(key), Cell::new(size), Cell::new(updated_at)]);
        }
        println!("\n{table}");
    }

    println!();
    match read_snapshot(&store) {
        Ok(Some(snapshot)) => {
            let now = chrono::Utc::now().timestamp_millis();
            let age_hours = snapshot.age_ms(now) as f64 / 3_600_000.0;
            let state = if snapshot.is_fresh(now, settings.cache_ttl_ms()) {
                "fresh"
            } else {
                "stale"
            };
            println!(
                "Snapshot:   {} cards, {age_hours:.1}h old ({state})",
                snapshot.cards.len()
            );
        }
        Ok(None) => println!("Snapshot:   none"),
        Err(e) => println!("Snapshot:   unreadable ({e})"),
    }
    Ok(())
}

pub fn clear(all: bool) -> Result<()> {
    let settings = load_settings();
    let db_path = settings.db_path();
    if !db_path.exists() {
        println!("Nothing to clear.");
        return Ok(());
    }
    let mut store = SqliteStore::open(&db_path)?;
    if all {
        store.clear()?;
        println!("Cleared every cache entry in {}", db_path.display());
    } else {
        store.remove(STORAGE_KEY)?;
        println!("Cleared card snapshot in {}", db_path.display());
    }
    Ok(())
}
