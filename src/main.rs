#[macro_use]
extern crate derive_builder;

use anyhow::Result;
use clap::{Command, CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Generator, Shell};
use clap_verbosity_flag::Verbosity;
use console::style;
use std::io::{self, BufRead};
use tracing::error;
use tracing_log::AsTrace;

mod command;
mod core;
mod format;
mod handler;
mod messages;
mod normalize;
mod repo;
mod settings;
mod teamcity;

use crate::handler::{Handler, Response};
use crate::repo::GitMirror;
use crate::settings::Settings;

#[derive(Debug, Parser)]
#[command(name = "teamcity-buildbot", author, version, about, long_about = None)] // Read from `Cargo.toml`
struct Cli {
    // If provided, outputs the completion file for given shell
    #[arg(long = "generate", value_enum)]
    generator: Option<Shell>,
    /// config.yaml in the user config directory is used by default
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    config: Option<std::path::PathBuf>,
    #[command(flatten)]
    verbose: Verbosity,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Reads chat messages from stdin, one per line
    #[command()]
    Shell {},

    /// Handles a single chat message, e.g. `exec list Wildcard*`
    #[command()]
    Exec { text: Vec<String> },
}

struct Console;

impl Response for Console {
    fn reply(&mut self, text: String) {
        println!("{} {}", style("buildbot>").bold().green(), text);
    }
}

fn print_completions<G: Generator>(gen: G, cmd: &mut Command) {
    generate(gen, cmd, cmd.get_name().to_string(), &mut io::stdout());
}

async fn handle(handler: &Handler<'_>, text: &str) {
    match handler.dispatch(text, &mut Console).await {
        Ok(true) => {}
        Ok(false) => println!("{}", style("Unknown command").yellow().italic()),
        Err(e) => error!("{text}: {e:#}"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.verbose.log_level_filter().as_trace())
        .init();

    if let Some(generator) = cli.generator {
        let mut cmd = Cli::command();
        eprintln!("Generating completion file for {generator:?}...");
        print_completions(generator, &mut cmd);

        return Ok(());
    } else if let Some(command) = cli.command {
        let config = Settings::new(cli.config.as_deref())?;

        let client = teamcity::Client::new(&config.teamcity)?;
        let mirror = GitMirror::new(&config.git)?;
        let handler = Handler::new(client, &mirror)?;

        match command {
            Commands::Exec { text } => {
                handle(&handler, &text.join(" ")).await;
            }

            Commands::Shell {} => {
                for line in io::stdin().lock().lines() {
                    let line = line?;

                    if !line.trim().is_empty() {
                        handle(&handler, &line).await;
                    }
                }
            }
        }
    }

    Ok(())
}
