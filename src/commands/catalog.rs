use colored::Colorize;

use super::runtime;
use crate::catalog::{Artifact, CatalogResolver, SourceBuilds};
use crate::config::Config;
use crate::error::Result;

// ── Catalog queries ─────────────────────────────────────────────────────

pub fn cmd_list(config: &Config) -> Result<()> {
    let resolver = CatalogResolver::from_config(config);
    let catalog = runtime()?.block_on(resolver.enumerate());

    println!("{}", "Available Builds".green().bold());
    println!("{}", "=".repeat(60));

    for entry in catalog.entries() {
        println!("\n{}", entry.source.name.to_uppercase().cyan().bold());
        match &entry.builds {
            SourceBuilds::Found(artifacts) => {
                for artifact in artifacts {
                    println!("  ├── {}", artifact.name);
                }
            }
            SourceBuilds::NoBuilds => println!("  └── {}", "(no builds)".dimmed()),
        }
    }

    println!(
        "\n{} builds across {} sources",
        catalog.artifact_count(),
        catalog.entries().len()
    );
    Ok(())
}

pub fn cmd_latest(config: &Config) -> Result<()> {
    let resolver = CatalogResolver::from_config(config);
    match runtime()?.block_on(resolver.latest()) {
        Some(artifact) => print_artifact("Latest:", &artifact),
        None => println!("{}", "No builds found.".yellow()),
    }
    Ok(())
}

pub fn cmd_find(config: &Config, keyword: &str) -> Result<()> {
    let resolver = CatalogResolver::from_config(config);
    match runtime()?.block_on(resolver.find(keyword)) {
        Some(artifact) => print_artifact("Found:", &artifact),
        None => eprintln!(
            "{} No build found matching '{}'",
            "Not found:".yellow(),
            keyword
        ),
    }
    Ok(())
}

pub fn cmd_sources(config: &Config) -> Result<()> {
    println!("{}", "Configured Sources".green().bold());
    println!("{}", "=".repeat(60));
    for source in &config.sources {
        println!("  {}\t{}", source.name.cyan().bold(), source.url);
    }
    println!(
        "\n  Fetch timeout: {}s, query timeout: {}s, link join: {:?}",
        config.fetch_timeout_secs, config.query_timeout_secs, config.link_join
    );
    Ok(())
}

fn print_artifact(label: &str, artifact: &Artifact) {
    println!("{} {}", label.green().bold(), artifact.name.bold());
    println!("  {}", artifact.location.cyan());
}
