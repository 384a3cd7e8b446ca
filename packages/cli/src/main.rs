mod commands;
mod store;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{
    init, mentions, paste, reflow, show, Context, InitArgs, MentionsArgs, PasteArgs, ReflowArgs,
    ShowArgs,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Pagesmith CLI - headless block editor for markdown pages
#[derive(Parser, Debug)]
#[command(name = "pagesmith")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding `<page_id>.json` files
    #[arg(long, global = true, default_value = "pages")]
    pages: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a default config and a welcome page
    Init(InitArgs),

    /// Print a page's blocks
    Show(ShowArgs),

    /// Paste text or HTML into a page block
    Paste(PasteArgs),

    /// Split lines that overflow a container width
    Reflow(ReflowArgs),

    /// Look up symbols for an @mention
    Mentions(MentionsArgs),
}

async fn run(cli: Cli) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let ctx = Context::load(cwd, &cli.pages)?;

    match cli.command {
        Command::Init(args) => init(args, &ctx).await,
        Command::Show(args) => show(args, &ctx).await,
        Command::Paste(args) => paste(args, &ctx).await,
        Command::Reflow(args) => reflow(args, &ctx).await,
        Command::Mentions(args) => mentions(args, &ctx).await,
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        eprintln!();
        eprintln!("{} {}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
