use super::Context;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use pagesmith_editor::BlockType;

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Page id (file name without `.json`)
    pub page_id: String,

    /// Print the serialized markdown body instead of the block list
    #[arg(long)]
    pub markdown: bool,
}

pub async fn show(args: ShowArgs, ctx: &Context) -> Result<()> {
    let page = ctx.open_page(&args.page_id).await?;
    let session = page.session.lock();
    let document = session.document();

    if args.markdown {
        println!("{}", document.body_markdown());
        return Ok(());
    }

    println!("{} {}", "Page".bright_blue().bold(), document.page_id);
    for (index, block) in document.blocks().iter().enumerate() {
        let tag = match block.block_type {
            BlockType::H1 | BlockType::H2 | BlockType::H3 => block.block_type.as_str().magenta(),
            BlockType::Code => block.block_type.as_str().yellow(),
            BlockType::Command => block.block_type.as_str().cyan(),
            BlockType::Text => block.block_type.as_str().normal(),
        };
        let content = if block.block_type.is_multiline() {
            block.content.replace('\n', "⏎")
        } else {
            block.content.clone()
        };
        println!("{:>4} {:<5} {}", index.to_string().dimmed(), tag, content);
    }

    Ok(())
}
