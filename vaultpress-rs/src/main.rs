//! Vaultpress CLI entry point.

use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use vaultpress::cli::Cli;
use vaultpress::config::Config;
use vaultpress::error::Result;
use vaultpress::{walk, PathIndex, Processor, SkipList, WalkOptions};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_level()))
        .init();

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e.report(cli.debug));
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

async fn run(cli: &Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::load_default()?,
    };
    cli.apply(&mut config);
    config.validate()?;

    let skip = Arc::new(match &config.skip_list {
        Some(path) => SkipList::load(path)?,
        None => SkipList::empty(),
    });
    let index = Arc::new(PathIndex::build(config.vault_root()?)?);

    let processor = Arc::new(Processor::from_config(&config, index, Arc::clone(&skip))?);
    let summary = walk(WalkOptions::from_config(&config, skip)?, processor).await?;

    log::info!(
        "converted {}, skipped {}, copied {}",
        summary.converted,
        summary.skipped,
        summary.copied
    );
    Ok(())
}
