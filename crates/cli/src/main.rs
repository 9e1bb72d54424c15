mod cli;

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use yarsmith_core::config::{load_dotenv, Config};
use yarsmith_curate::validate::YaraBinary;
use yarsmith_llm::{providers, Oracle};

use crate::cli::{CliArgs, Stage};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = CliArgs::parse();

    load_dotenv();
    let mut config = Config::from_env();
    args.apply(&mut config);
    config.log_summary();

    // The one fatal precondition, checked before any corpus traversal.
    config
        .oracle
        .require_api_key()
        .context("oracle credential required")?;

    let provider =
        providers::create_provider(&config.oracle).context("failed to create oracle provider")?;
    let oracle = Oracle::new(
        provider,
        config.oracle.max_queries_per_run,
        Duration::from_secs_f64(config.oracle.query_delay_secs),
    );

    if matches!(args.stage, Stage::Curate | Stage::All) {
        let validator = YaraBinary::new(&config.curate.yara_binary_path);
        let repair_oracle = config.curate.fix_bad_rules.then_some(&oracle);
        let summary =
            yarsmith_curate::run_pass(&config.rules_dir, &config.curate, &validator, repair_oracle)
                .await
                .context("curation pass failed")?;
        info!(?summary, "curation finished");
    }

    if matches!(args.stage, Stage::Synth | Stage::All) {
        let summary = yarsmith_synth::run_pass(&config.rules_dir, &config.synth, &oracle)
            .await
            .context("synthesis pass failed")?;
        info!(?summary, "synthesis finished");
    }

    info!(queries_used = oracle.queries_used(), "done");
    Ok(())
}
