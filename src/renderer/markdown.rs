use crate::catalog::{Artifact, Catalog, SourceBuilds};

pub const WELCOME: &str =
    "👋 *Welcome to Scene Bot!*\nUse /list, /latest, or /download <keyword>.";
pub const UNKNOWN_COMMAND: &str = "❌ Command not recognized. Use /start.";
pub const DOWNLOAD_USAGE: &str = "Usage: /download <keyword>";
pub const NO_BUILDS: &str = "No builds found.";

/// Escape Telegram legacy-Markdown control characters in user-facing names
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '_' | '*' | '`' | '[') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Render every source with its builds; empty sources get an explicit marker
pub fn render_catalog(catalog: &Catalog) -> String {
    let mut out = String::from("*Available Builds:*\n");

    for entry in catalog.entries() {
        out.push_str(&format!(
            "\n📌 *{}*\n",
            escape(&entry.source.name.to_uppercase())
        ));
        match &entry.builds {
            SourceBuilds::Found(artifacts) => {
                for artifact in artifacts {
                    out.push_str(&format!("  ├── {}\n", escape(&artifact.name)));
                }
            }
            SourceBuilds::NoBuilds => out.push_str("  └── (no builds)\n"),
        }
    }

    out
}

pub fn render_latest(artifact: &Artifact) -> String {
    format!(
        "🆕 *Latest Build:*\n📦 {}\n🔗 {}",
        escape(&artifact.name),
        escape(&artifact.location)
    )
}

pub fn render_no_match(keyword: &str) -> String {
    format!("No build found matching: *{}*", escape(keyword))
}

/// Caption attached to a forwarded build
pub fn render_caption(name: &str) -> String {
    format!("📦 *{}*", escape(name))
}

pub fn render_send_failed(name: &str) -> String {
    format!(
        "❌ Failed to send {}. (Check file size/access.)",
        escape(name)
    )
}

pub fn render_uploads<'a>(names: impl IntoIterator<Item = &'a str>) -> String {
    let mut out = String::from("*Uploaded Builds:*\n");
    let mut any = false;
    for name in names {
        out.push_str(&format!("  ├── {}\n", escape(name)));
        any = true;
    }
    if !any {
        return "No uploads registered.".to_string();
    }
    out
}

pub fn render_registered(name: &str, replaced: bool) -> String {
    if replaced {
        format!("✅ Registered *{}*", escape(name))
    } else {
        format!("✅ *{}* was already registered", escape(name))
    }
}

pub fn render_register_failed(name: &str) -> String {
    format!("❌ Could not register {}. Check the bot logs.", escape(name))
}
