use super::Context;
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use pagesmith_editor::{Caret, ClipboardPayload, PasteOutcome};
use std::fs;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct PasteArgs {
    /// Page id (file name without `.json`)
    pub page_id: String,

    /// Plain text to paste
    #[arg(long, conflicts_with = "file")]
    pub text: Option<String>,

    /// Read the plain text from a file
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Rich clipboard flavor, read from an HTML file
    #[arg(long)]
    pub html: Option<PathBuf>,

    /// Block to paste into (defaults to the last block)
    #[arg(short, long)]
    pub block: Option<usize>,

    /// Character offset inside the block (defaults to its end)
    #[arg(short, long)]
    pub offset: Option<usize>,
}

fn read_payload(args: &PasteArgs) -> Result<ClipboardPayload> {
    let plain = match (&args.text, &args.file) {
        (Some(text), _) => text.clone(),
        (None, Some(path)) => fs::read_to_string(path)?,
        (None, None) => String::new(),
    };
    let html = args.html.as_ref().map(fs::read_to_string).transpose()?;

    if plain.is_empty() && html.is_none() {
        return Err(anyhow!("Nothing to paste: pass --text, --file or --html"));
    }
    Ok(ClipboardPayload::Content { plain, html })
}

pub async fn paste(args: PasteArgs, ctx: &Context) -> Result<()> {
    let payload = read_payload(&args)?;
    let page = ctx.open_page(&args.page_id).await?;

    let outcome = {
        let mut session = page.session.lock();
        let last = session.document().len() - 1;
        let index = args.block.unwrap_or(last);
        let block = session
            .document()
            .get(index)
            .ok_or_else(|| anyhow!("Block {index} does not exist (page has {} blocks)", last + 1))?;
        let offset = args.offset.unwrap_or_else(|| block.char_len()).min(block.char_len());

        session.focus(index);
        session.set_caret(Some(Caret::new(index, offset)));
        session.paste(&payload)
    };

    match &outcome {
        PasteOutcome::Ignored => println!("{} Nothing pasted", "⚠️".yellow()),
        PasteOutcome::Unavailable(reason) => println!("{} Clipboard unavailable: {reason}", "✗".red()),
        PasteOutcome::Spliced { index, caret } => {
            println!("{} Pasted into block {index} (caret at {caret})", "✓".green())
        }
        PasteOutcome::Inserted { first_index, count } => {
            println!("{} Inserted {count} blocks at {first_index}", "✓".green())
        }
    }

    if page.autosave.save_now().await? {
        println!("{} Saved {}", "✓".green(), args.page_id);
    }

    Ok(())
}
