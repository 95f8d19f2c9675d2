//! Two-Venue DEX Arbitrage Bot Library
//!
//! Components for block-triggered arbitrage between a Uniswap V3 pool and a
//! SushiSwap V2 pair on a single token pair: quote clients, the round-trip
//! evaluator, the on-chain execution submitter, and the monitoring loop.
//!
//! Author: AI-Generated
//! Created: 2026-02-03

pub mod arbitrage;
pub mod config;
pub mod contracts;
pub mod quote;
pub mod reporter;
pub mod runner;
pub mod types;

// Re-export commonly used types
pub use arbitrage::{amount_out_minimum, ExecutionSubmitter, OpportunityEvaluator};
pub use config::{load_config, load_config_from_file, BotConfig};
pub use quote::{QuoteClient, SushiswapV2QuoteClient, UniswapV3QuoteClient};
pub use reporter::{ArbEvent, CompositeReporter, JsonlReporter, LogReporter, Reporter};
pub use runner::{run_block_loop, ArbPipeline, BlockCycle};
pub use types::{
    ExecutionResult, ExecutionStatus, Opportunity, Quote, QuoteFailure, Token, VenueId,
};
