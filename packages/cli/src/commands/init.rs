use super::Context;
use crate::store::FilePageStore;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use pagesmith_editor::{EditorConfig, PageRecord, DEFAULT_CONFIG_NAME};
use std::fs;

const WELCOME_PAGE: &str = "welcome";

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Suggestion debounce in milliseconds
    #[arg(long, default_value_t = 300)]
    pub debounce_ms: u64,

    /// Autosave interval in seconds
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u64).range(1..))]
    pub autosave_secs: u64,

    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

pub async fn init(args: InitArgs, ctx: &Context) -> Result<()> {
    let config_path = ctx.cwd.join(DEFAULT_CONFIG_NAME);

    // Check if config already exists
    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!("{}", "📝 Initializing Pagesmith workspace...".bright_blue().bold());

    let config = EditorConfig {
        suggestion_debounce_ms: args.debounce_ms,
        autosave_interval_secs: args.autosave_secs,
        ..EditorConfig::default()
    };
    fs::write(&config_path, serde_json::to_string_pretty(&config)?)?;
    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);

    let store = FilePageStore::new(&ctx.pages_dir);
    let welcome = store.page_path(WELCOME_PAGE);
    if !welcome.exists() {
        store
            .create(
                WELCOME_PAGE,
                &PageRecord {
                    title: "Welcome".to_string(),
                    content: "## Getting started\nEvery line is a block.\n```\npagesmith show welcome\n```"
                        .to_string(),
                },
            )
            .await?;
        println!("  {} Created {}", "✓".green(), welcome.display());
    }

    println!();
    println!("{}", "✅ Workspace initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Run: pagesmith show {WELCOME_PAGE}");
    println!("  2. Run: pagesmith paste {WELCOME_PAGE} --text \"hello\"");

    Ok(())
}
