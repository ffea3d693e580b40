use colored::Colorize;

use super::runtime;
use crate::bot;
use crate::config::Config;
use crate::error::Result;

pub fn cmd_serve(config: &Config) -> Result<()> {
    // Fail before printing anything if the bot cannot authenticate
    config.require_bot_token()?;

    eprintln!("{}", "scenebot starting...".green());
    eprintln!("{}", "Long polling Telegram, Ctrl-C to stop".dimmed());
    if config.admin_chat_id.is_none() {
        eprintln!(
            "{} No admin chat configured; uploads will not be registered",
            "Note:".yellow()
        );
    }

    runtime()?.block_on(bot::run(config))
}
