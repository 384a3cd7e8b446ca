use super::Context;
use crate::store::FileDefinitionSource;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use pagesmith_editor::{mention_query_at, MentionResolver};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub struct MentionsArgs {
    /// Query, or text ending in a partial `@mention`
    pub query: String,

    /// Symbol index file (JSON array)
    #[arg(short, long, default_value = "symbols.json")]
    pub index: PathBuf,

    /// Repository id the index belongs to
    #[arg(short, long, default_value = "local")]
    pub repo: String,

    /// Maximum number of matches (defaults to the configured limit)
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    pub format: String,
}

pub async fn mentions(args: MentionsArgs, ctx: &Context) -> Result<()> {
    let source = Arc::new(FileDefinitionSource::new(ctx.cwd.join(&args.index)));
    let resolver = MentionResolver::new(args.repo.clone(), source)
        .with_ttl(ctx.config.definitions_ttl())
        .with_max_results(args.limit.unwrap_or(ctx.config.max_mention_results));
    resolver.refresh().await?;

    // "ask @Auth" looks up "Auth"; a bare word is used as is
    let query = mention_query_at(&args.query, args.query.chars().count()).unwrap_or(args.query.as_str());
    let matches = resolver.find_matches(query);

    if args.format == "json" {
        println!("{}", serde_json::to_string_pretty(&matches)?);
        return Ok(());
    }

    if matches.is_empty() {
        println!("{} No symbols match {}", "⚠️".yellow(), query.bright_white());
        return Ok(());
    }

    for symbol in &matches {
        println!(
            "{:<8} {} {}",
            symbol.node_type.to_string().cyan(),
            symbol.node_name.bold(),
            format!(
                "{}:{}-{}",
                symbol.file_name, symbol.start_end_lines[0], symbol.start_end_lines[1]
            )
            .dimmed()
        );
    }

    Ok(())
}
