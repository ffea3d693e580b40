use colored::Colorize;

use crate::config::Config;
use crate::error::Result;
use crate::uploads::UploadStore;

// ── Upload registry ─────────────────────────────────────────────────────

pub fn cmd_uploads_list(config: &Config) -> Result<()> {
    let store = UploadStore::load(&config.uploads_path())?;

    if store.is_empty() {
        println!("{}", "No uploads registered.".yellow());
        return Ok(());
    }

    println!("{}", "Uploaded Builds".green().bold());
    println!("{}", "=".repeat(60));
    for (name, handle) in store.iter() {
        println!("  {}\t{}", name.cyan(), handle.dimmed());
    }
    println!("\n{} uploads in {}", store.len(), store.path().display());
    Ok(())
}

pub fn cmd_uploads_register(config: &Config, name: &str, handle: &str) -> Result<()> {
    let mut store = UploadStore::load(&config.uploads_path())?;
    if store.register(name, handle)? {
        println!("{} Registered {}", "Done!".green().bold(), name.to_lowercase());
    } else {
        println!("{} {} is already registered", "Note:".yellow(), name.to_lowercase());
    }
    Ok(())
}

pub fn cmd_uploads_remove(config: &Config, name: &str) -> Result<()> {
    let mut store = UploadStore::load(&config.uploads_path())?;
    if store.remove(name)? {
        println!("{} Removed {}", "Done!".green().bold(), name.to_lowercase());
    } else {
        eprintln!("{} No upload named '{}'", "Not found:".yellow(), name);
    }
    Ok(())
}
