//! Core data structures for the two-venue arbitrage bot
//!
//! Token descriptors, per-venue quotes, evaluated opportunities, and
//! execution results. All profit arithmetic is carried out in integer
//! smallest-denomination units of the input token (i128 raw units) -
//! never floating point.
//!
//! Author: AI-Generated
//! Created: 2026-02-03

use ethers::types::{Address, U256};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Static descriptor of a tradable asset. Built once at startup from
/// configuration and shared read-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub address: Address,
    pub decimals: u8,
    pub symbol: String,
}

impl Token {
    pub fn new(address: Address, decimals: u8, symbol: String) -> Self {
        Self {
            address,
            decimals,
            symbol,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.symbol)
    }
}

/// The two venues we price against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VenueId {
    /// Concentrated-liquidity venue (Uniswap V3 Quoter, single-hop exact input)
    UniswapV3,
    /// Constant-product venue (SushiSwap V2 Router, path-based)
    SushiswapV2,
}

impl fmt::Display for VenueId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            VenueId::UniswapV3 => write!(f, "UniswapV3"),
            VenueId::SushiswapV2 => write!(f, "SushiswapV2"),
        }
    }
}

/// Why a venue quote produced no usable output amount.
///
/// The original bot swallowed every venue error into a zero sentinel;
/// keeping the cause explicit lets "no liquidity" and "call error" stay
/// distinguishable even though both degrade to "no opportunity".
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum QuoteFailure {
    #[error("invalid quote input: {0}")]
    InvalidInput(String),
    #[error("no liquidity: {0}")]
    NoLiquidity(String),
    #[error("venue call failed: {0}")]
    Rpc(String),
    #[error("quote timed out after {0}ms")]
    Timeout(u64),
}

/// A read-only output estimate from one venue for one block cycle.
///
/// Ephemeral by design: produced, consumed, and discarded within a single
/// block - venue prices change every block, so quotes are never cached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    pub venue: VenueId,
    pub token_in: Address,
    pub token_out: Address,
    pub amount_in: U256,
    /// Zero whenever `failure` is set; a failed quote never carries a
    /// real output amount into profit arithmetic.
    pub amount_out: U256,
    pub failure: Option<QuoteFailure>,
}

impl Quote {
    /// A successful quote with a venue-reported output amount.
    pub fn filled(
        venue: VenueId,
        token_in: Address,
        token_out: Address,
        amount_in: U256,
        amount_out: U256,
    ) -> Self {
        Self {
            venue,
            token_in,
            token_out,
            amount_in,
            amount_out,
            failure: None,
        }
    }

    /// A failed quote. `amount_out` is forced to zero so the canonical
    /// sentinel invariant holds regardless of the caller.
    pub fn failed(
        venue: VenueId,
        token_in: Address,
        token_out: Address,
        amount_in: U256,
        failure: QuoteFailure,
    ) -> Self {
        Self {
            venue,
            token_in,
            token_out,
            amount_in,
            amount_out: U256::zero(),
            failure: Some(failure),
        }
    }

    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }
}

/// Signed difference `amount_out - amount_in` in raw smallest units.
///
/// Saturates at the i128 bounds; realistic token amounts for a single
/// monitored pair sit far below that range.
pub fn profit_raw(amount_out: U256, amount_in: U256) -> i128 {
    let clamp = |v: U256| -> i128 {
        if v > U256::from(i128::MAX as u128) {
            i128::MAX
        } else {
            v.as_u128() as i128
        }
    };

    if amount_out >= amount_in {
        clamp(amount_out - amount_in)
    } else {
        clamp(amount_in - amount_out).saturating_neg()
    }
}

/// A profitable two-leg round trip computed for exactly one block.
/// Never persisted or reused - valid only for `block_number`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Opportunity {
    pub block_number: u64,
    /// Input amount in raw units of the input token
    pub amount_in: U256,
    /// Venue-A fee tier the first leg was priced against
    pub fee_tier: u32,
    /// First leg: input token -> intermediate token on Venue A
    pub first_leg: Quote,
    /// Second leg: intermediate token -> input token on Venue B
    pub second_leg: Quote,
    /// `second_leg.amount_out - amount_in` in raw units of the input token
    pub profit_raw: i128,
}

/// Terminal outcome of one execution attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionStatus {
    /// Included on-chain with success status
    Confirmed,
    /// Included on-chain but the settlement contract rejected it
    Reverted,
    /// Never broadcast (signing/network/pre-check failure)
    SubmissionFailed,
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ExecutionStatus::Confirmed => write!(f, "confirmed"),
            ExecutionStatus::Reverted => write!(f, "reverted"),
            ExecutionStatus::SubmissionFailed => write!(f, "submission_failed"),
        }
    }
}

/// Result of one execution attempt. All failure modes are contained here;
/// the executor never propagates them as errors to the monitoring loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub tx_hash: Option<String>,
    pub block_number: Option<u64>,
    pub status: ExecutionStatus,
    /// Present iff `status == Confirmed`. Raw units of the input token,
    /// re-derived from the owner's balance delta when observable.
    pub realized_profit_raw: Option<i128>,
    pub error: Option<String>,
    pub execution_time_ms: u64,
}
