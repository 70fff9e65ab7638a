use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use weft_core::api::TaskApi;
use weft_core::app::TaskServiceBuilder;
use weft_core::impls::{InMemoryTaskStore, InMemoryUserDirectory};
use weft_core::{config, logging};

mod cli;
mod demo;

#[tokio::main]
async fn main() {
    if let Err(err) = run_main().await {
        eprintln!("weft error: {err:?}");
        std::process::exit(1);
    }
}

async fn run_main() -> Result<()> {
    let args = cli::parse();
    let config = config::load_or_default(&args.config)
        .with_context(|| format!("loading config from {}", args.config))?;
    logging::init_logging(args.log_level.map(Into::into), config.log_level.as_deref())?;
    info!(environment = ?config.environment, "starting weft demo");

    // (A) in-memory adapters
    let store = Arc::new(InMemoryTaskStore::new());
    let users = Arc::new(InMemoryUserDirectory::with_users(demo::seed_users()));

    // (B) service + api boundary
    let service = TaskServiceBuilder::new()
        .store(store)
        .users(users)
        .config(&config)
        .build()?;
    let api = TaskApi::new(service, config.environment);

    // (C) scripted scenario
    demo::run(&api).await
}
