use super::Context;
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use pagesmith_editor::EditSession;

#[derive(Args, Debug)]
pub struct ReflowArgs {
    /// Page id (file name without `.json`)
    pub page_id: String,

    /// Container width in pixels
    #[arg(short, long)]
    pub width: f32,

    /// Report what would change without saving
    #[arg(long)]
    pub dry_run: bool,
}

/// Split every overflowing body block; returns the number of splits
pub fn reflow_session(session: &mut EditSession, width: f32) -> usize {
    let mut total = 0;
    let mut index = 1;
    while index < session.document().len() {
        let splits = session.settle_overflow(index, width);
        total += splits;
        index += splits + 1;
    }
    total
}

pub async fn reflow(args: ReflowArgs, ctx: &Context) -> Result<()> {
    if args.width.is_nan() || args.width <= 0.0 {
        return Err(anyhow!("Width must be positive, got {}", args.width));
    }

    let page = ctx.open_page(&args.page_id).await?;
    let splits = reflow_session(&mut page.session.lock(), args.width);

    if splits == 0 {
        println!("{} Every block fits in {}px", "✓".green(), args.width);
        return Ok(());
    }
    println!("{} Split overflowing lines {splits} times", "✓".green());

    if args.dry_run {
        println!("   (dry run, not saved)");
    } else if page.autosave.save_now().await? {
        println!("{} Saved {}", "✓".green(), args.page_id);
    }

    Ok(())
}
