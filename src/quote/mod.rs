//! Venue Quote Clients
//!
//! One client per venue protocol, both conforming to the same `QuoteClient`
//! contract so the evaluator stays protocol-agnostic. Every failure mode -
//! revert, RPC error, timeout, bad input - is caught locally and converted
//! into a failed `Quote`; a venue call can never propagate an error into
//! the monitoring loop.
//!
//! Author: AI-Generated
//! Created: 2026-02-03

pub mod sushiswap_v2;
pub mod uniswap_v3;

pub use sushiswap_v2::SushiswapV2QuoteClient;
pub use uniswap_v3::UniswapV3QuoteClient;

use crate::types::{Quote, QuoteFailure, Token, VenueId};
use async_trait::async_trait;
use ethers::contract::ContractError;
use ethers::providers::Middleware;
use ethers::types::U256;

/// Read-only pricing capability of one venue.
///
/// Venue-specific routing parameters (fee tier, hop path) are constructor
/// state on the concrete client, not part of the call contract.
#[async_trait]
pub trait QuoteClient: Send + Sync {
    fn venue(&self) -> VenueId;

    /// Simulate `amount_in` of `token_in` swapped into `token_out` on this
    /// venue. Infallible signature: errors come back as failed quotes.
    async fn quote(&self, token_in: &Token, token_out: &Token, amount_in: U256) -> Quote;
}

/// Shared input-constraint check for both venue clients.
pub(crate) fn check_inputs(
    token_in: &Token,
    token_out: &Token,
    amount_in: U256,
) -> Option<QuoteFailure> {
    if amount_in.is_zero() {
        return Some(QuoteFailure::InvalidInput(
            "amountIn must be greater than zero".to_string(),
        ));
    }
    if token_in.address == token_out.address {
        return Some(QuoteFailure::InvalidInput(format!(
            "tokenIn and tokenOut are the same asset ({})",
            token_in.symbol
        )));
    }
    None
}

/// Map a contract call error to the quote failure taxonomy.
///
/// A revert on a pricing function means the venue has nothing to fill
/// against (pool missing, insufficient liquidity); anything else is
/// transport-level.
pub(crate) fn classify_contract_error<M: Middleware>(err: &ContractError<M>) -> QuoteFailure {
    if err.is_revert() {
        QuoteFailure::NoLiquidity(format!("venue call reverted: {}", err))
    } else {
        QuoteFailure::Rpc(err.to_string())
    }
}
