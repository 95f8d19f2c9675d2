//! Configuration management
//!
//! Loads all settings from environment variables (optionally seeded from a
//! .env file). Every required key missing or malformed is fatal at startup -
//! the bot never enters the monitoring loop on a partial configuration.
//!
//! Author: AI-Generated
//! Created: 2026-02-03

use crate::types::Token;
use anyhow::{bail, Context, Result};
use ethers::types::{Address, U256};
use ethers::utils::parse_units;
use std::str::FromStr;

/// Bot configuration, validated at startup
#[derive(Debug, Clone)]
pub struct BotConfig {
    // Network
    pub rpc_url: String,
    pub chain_id: u64,

    // Wallet
    pub private_key: String,

    // On-chain collaborators
    pub arbitrage_contract: Address,
    pub uniswap_v3_quoter: Address,
    pub sushiswap_v2_router: Address,

    // Monitored pair
    pub token_in: Token,
    pub token_out: Token,

    // Trade parameters
    /// Fixed trade size in raw units of `token_in`
    pub amount_in: U256,
    /// Uniswap V3 fee tier for the first leg (e.g. 500 = 0.05%)
    pub fee_tier: u32,
    /// Slippage tolerance in basis points (50 = 0.5%)
    pub slippage_bps: u32,

    // Limits
    pub quote_timeout_ms: u64,
    pub gas_limit: u64,
    pub max_gas_price_gwei: u64,

    // Modes
    pub live_mode: bool,
    /// JSONL event feed directory for the dashboard; None = console only
    pub event_log_dir: Option<String>,
}

impl BotConfig {
    /// Startup invariant checks. Called by `load_config_from_file`; kept
    /// separate so tests can exercise it on hand-built configs.
    pub fn validate(&self) -> Result<()> {
        if self.amount_in.is_zero() {
            bail!("TRADE_AMOUNT_IN must be greater than zero");
        }
        if self.token_in.address == self.token_out.address {
            bail!(
                "TOKEN_IN_ADDRESS and TOKEN_OUT_ADDRESS must differ (got {:?})",
                self.token_in.address
            );
        }
        if self.slippage_bps > 10_000 {
            bail!(
                "SLIPPAGE_TOLERANCE_BPS must be <= 10000, got {}",
                self.slippage_bps
            );
        }
        if self.fee_tier == 0 {
            bail!("FEE_TIER must be a nonzero V3 fee tier (e.g. 500, 3000)");
        }
        if self.quote_timeout_ms == 0 {
            bail!("QUOTE_TIMEOUT_MS must be greater than zero");
        }
        Ok(())
    }
}

fn required(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("{} not set", key))
}

fn required_address(key: &str) -> Result<Address> {
    let raw = required(key)?;
    Address::from_str(raw.trim()).with_context(|| format!("{} is not a valid address: {}", key, raw))
}

fn optional_parse<T: FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{} is malformed: {}", key, raw)),
        Err(_) => Ok(default),
    }
}

fn load_token(prefix: &str) -> Result<Token> {
    let address = required_address(&format!("{}_ADDRESS", prefix))?;
    let decimals: u8 = required(&format!("{}_DECIMALS", prefix))?
        .trim()
        .parse()
        .with_context(|| format!("{}_DECIMALS is malformed", prefix))?;
    let symbol = required(&format!("{}_SYMBOL", prefix))?;
    Ok(Token::new(address, decimals, symbol))
}

/// Load configuration from a specific .env file, then the process
/// environment. Fatal (Err) on any missing or malformed required key.
pub fn load_config_from_file(env_file: &str) -> Result<BotConfig> {
    dotenv::from_filename(env_file).ok();
    load_config()
}

/// Load configuration from the process environment.
pub fn load_config() -> Result<BotConfig> {
    let token_in = load_token("TOKEN_IN")?;
    let token_out = load_token("TOKEN_OUT")?;

    // Trade size is given in human units (e.g. "0.0002" WETH) and converted
    // to exact raw units against the input token's decimals - no floats.
    let amount_raw = required("TRADE_AMOUNT_IN")?;
    let amount_in: U256 = parse_units(amount_raw.trim(), token_in.decimals as u32)
        .with_context(|| format!("TRADE_AMOUNT_IN is malformed: {}", amount_raw))?
        .into();

    let config = BotConfig {
        rpc_url: required("RPC_URL")?,
        chain_id: required("CHAIN_ID")?
            .trim()
            .parse()
            .context("CHAIN_ID is malformed")?,
        private_key: required("PRIVATE_KEY")?,

        arbitrage_contract: required_address("ARBITRAGE_CONTRACT_ADDRESS")?,
        uniswap_v3_quoter: required_address("UNISWAP_V3_QUOTER")?,
        sushiswap_v2_router: required_address("SUSHISWAP_V2_ROUTER")?,

        token_in,
        token_out,

        amount_in,
        fee_tier: required("FEE_TIER")?
            .trim()
            .parse()
            .context("FEE_TIER is malformed")?,
        slippage_bps: required("SLIPPAGE_TOLERANCE_BPS")?
            .trim()
            .parse()
            .context("SLIPPAGE_TOLERANCE_BPS is malformed")?,

        quote_timeout_ms: optional_parse("QUOTE_TIMEOUT_MS", 5_000)?,
        gas_limit: optional_parse("GAS_LIMIT", 1_000_000)?,
        max_gas_price_gwei: optional_parse("MAX_GAS_PRICE_GWEI", 200)?,

        live_mode: optional_parse("LIVE_MODE", false)?,
        event_log_dir: std::env::var("EVENT_LOG_DIR").ok(),
    };

    config.validate()?;
    Ok(config)
}
