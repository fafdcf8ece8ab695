//! LitContext CLI: ranked research corpora and knowledge context for a topic.
//!
//! Searches bibliographic sources, filters and ranks the results, and
//! summarizes the corpus for downstream writing tools.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
