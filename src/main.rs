#![allow(dead_code)]
mod bot;
mod catalog;
mod cli;
mod commands;
mod config;
mod error;
mod intent;
mod logging;
mod renderer;
mod telegram;
mod uploads;

use clap::Parser;
use cli::{Cli, Commands, UploadsCommand};
use colored::Colorize;
use config::Config;
use error::Result;

use commands::catalog::{cmd_find, cmd_latest, cmd_list, cmd_sources};
use commands::serve::cmd_serve;
use commands::uploads::{cmd_uploads_list, cmd_uploads_register, cmd_uploads_remove};

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    // Every command needs a valid config; a bad one is fatal at startup
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::List => cmd_list(&config),
        Commands::Latest => cmd_latest(&config),
        Commands::Find { keyword } => cmd_find(&config, &keyword.join(" ")),
        Commands::Sources => cmd_sources(&config),
        Commands::Serve => cmd_serve(&config),
        Commands::Uploads { command } => match command {
            UploadsCommand::List => cmd_uploads_list(&config),
            UploadsCommand::Register { name, handle } => {
                cmd_uploads_register(&config, &name, &handle)
            }
            UploadsCommand::Remove { name } => cmd_uploads_remove(&config, &name),
        },
    }
}
