//! Two-Venue DEX Arbitrage Bot
//!
//! Main entry point. Watches one token pair across Uniswap V3 and SushiSwap
//! V2, re-quoting the round trip on every new block and submitting the
//! settlement transaction when the trip is strictly profitable.
//!
//! Architecture:
//! - WS block subscription on a dedicated connection (newHeads only)
//! - Second WS connection for quotes and execution RPC
//! - One cycle in flight at a time; blocks arriving mid-cycle are dropped
//! - Dry run by default; LIVE_MODE=true arms real submission
//! - If the subscription drops, the bot exits (restart via supervisor)
//!
//! Author: AI-Generated
//! Created: 2026-02-03

use anyhow::{Context, Result};
use arb_bot::arbitrage::{ExecutionSubmitter, OpportunityEvaluator};
use arb_bot::config::load_config_from_file;
use arb_bot::quote::{QuoteClient, SushiswapV2QuoteClient, UniswapV3QuoteClient};
use arb_bot::reporter::{CompositeReporter, JsonlReporter, LogReporter, Reporter};
use arb_bot::runner::{run_block_loop, ArbPipeline, BlockCycle};
use clap::Parser;
use ethers::prelude::*;
use futures::StreamExt;
use std::sync::Arc;
use tracing::{info, warn, Level};

/// Two-venue DEX arbitrage bot (Uniswap V3 / SushiSwap V2)
#[derive(Parser)]
#[command(name = "arb-bot")]
struct Args {
    /// Path to the .env file to load configuration from
    #[arg(short, long, env = "ENV_FILE", default_value = ".env")]
    env_file: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_target(false)
        .init();

    let args = Args::parse();

    info!("Arbitrage bot starting...");

    let config = load_config_from_file(&args.env_file)?;
    info!(
        "Configuration loaded from {} (chain_id: {})",
        args.env_file, config.chain_id
    );
    info!(
        "Monitored pair: {} -> {} -> {} | trade size {} raw | V3 fee tier {} | slippage {}bps",
        config.token_in.symbol,
        config.token_out.symbol,
        config.token_in.symbol,
        config.amount_in,
        config.fee_tier,
        config.slippage_bps
    );

    // Two WS connections: one for quote/execution RPC, one dedicated to the
    // newHeads subscription so heavy quoting never starves block delivery.
    info!("Connecting via WebSocket (RPC + subscription)...");
    let provider = Arc::new(
        Provider::<Ws>::connect(&config.rpc_url)
            .await
            .context("RPC WebSocket connection failed")?,
    );
    let sub_provider = Provider::<Ws>::connect(&config.rpc_url)
        .await
        .context("Subscription WebSocket connection failed")?;

    let current_block = provider.get_block_number().await?;
    info!("Connected! Current block: {} (2 WS connections)", current_block);

    // Quote clients, one per venue
    let venue_a: Arc<dyn QuoteClient> = Arc::new(UniswapV3QuoteClient::new(
        Arc::clone(&provider),
        config.uniswap_v3_quoter,
        config.fee_tier,
        config.quote_timeout_ms,
    ));
    let venue_b: Arc<dyn QuoteClient> = Arc::new(SushiswapV2QuoteClient::new(
        Arc::clone(&provider),
        config.sushiswap_v2_router,
        config.quote_timeout_ms,
    ));

    let evaluator = OpportunityEvaluator::new(
        venue_a,
        venue_b,
        config.token_in.clone(),
        config.token_out.clone(),
        config.amount_in,
        config.fee_tier,
    );

    // Execution wallet and submitter
    let wallet: LocalWallet = config
        .private_key
        .parse::<LocalWallet>()
        .context("PRIVATE_KEY is not a valid key")?;
    info!("Wallet loaded: {:?}", wallet.address());

    let mut executor = ExecutionSubmitter::new(Arc::clone(&provider), wallet, config.clone());
    if config.live_mode {
        executor.set_dry_run(false);
        warn!("LIVE TRADING MODE ENABLED - REAL MONEY AT RISK!");
    } else {
        info!("Executor initialized (DRY RUN mode)");
    }

    // Event sinks: console always, JSONL feed when configured
    let mut sinks: Vec<Box<dyn Reporter>> = vec![Box::new(LogReporter::new(
        config.token_in.clone(),
    ))];
    if let Some(dir) = &config.event_log_dir {
        sinks.push(Box::new(JsonlReporter::new(dir)?));
        info!("Event log enabled: {}", dir);
    }
    let reporter: Arc<dyn Reporter> = Arc::new(CompositeReporter::new(sinks));

    let cycle: Arc<dyn BlockCycle> =
        Arc::new(ArbPipeline::new(evaluator, executor, Arc::clone(&reporter)));

    // Subscribe to new blocks on the dedicated connection
    info!("Subscribing to new blocks via WebSocket (dedicated connection)...");
    let block_stream = sub_provider
        .subscribe_blocks()
        .await
        .context("Block subscription failed")?
        .filter_map(|block| futures::future::ready(block.number.map(|n| n.as_u64())));
    info!("WS block subscription active - reacting to blocks in real-time");

    tokio::select! {
        result = run_block_loop(block_stream, cycle, reporter) => {
            result?;
            // A healthy subscription never ends; treat it as a failure so
            // the supervisor restarts us.
            anyhow::bail!("Block subscription ended unexpectedly - restart the bot");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received - exiting");
        }
    }

    Ok(())
}
