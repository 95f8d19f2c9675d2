//! Uniswap V3 Quote Client (concentrated-liquidity venue)
//!
//! Prices a single-hop exact-input swap through the V3 Quoter contract:
//! `quoteExactInputSingle(tokenIn, tokenOut, fee, amountIn, 0)` as a
//! read-only simulated call. The fee tier selects which pool variant to
//! price against and is fixed at construction.
//!
//! Author: AI-Generated
//! Created: 2026-02-03

use crate::contracts::IQuoter;
use crate::quote::{check_inputs, classify_contract_error, QuoteClient};
use crate::types::{Quote, QuoteFailure, Token, VenueId};
use async_trait::async_trait;
use ethers::providers::Middleware;
use ethers::types::{Address, U256};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

pub struct UniswapV3QuoteClient<M> {
    quoter: IQuoter<M>,
    /// V3 fee tier (500 = 0.05%, 3000 = 0.30%, ...)
    fee_tier: u32,
    timeout_ms: u64,
}

impl<M: Middleware + 'static> UniswapV3QuoteClient<M> {
    pub fn new(provider: Arc<M>, quoter_address: Address, fee_tier: u32, timeout_ms: u64) -> Self {
        Self {
            quoter: IQuoter::new(quoter_address, provider),
            fee_tier,
            timeout_ms,
        }
    }
}

#[async_trait]
impl<M: Middleware + 'static> QuoteClient for UniswapV3QuoteClient<M> {
    fn venue(&self) -> VenueId {
        VenueId::UniswapV3
    }

    async fn quote(&self, token_in: &Token, token_out: &Token, amount_in: U256) -> Quote {
        if let Some(failure) = check_inputs(token_in, token_out, amount_in) {
            return Quote::failed(
                self.venue(),
                token_in.address,
                token_out.address,
                amount_in,
                failure,
            );
        }

        // sqrtPriceLimitX96 = 0 means no price limit on the simulation
        let call = self.quoter.quote_exact_input_single(
            token_in.address,
            token_out.address,
            self.fee_tier,
            amount_in,
            U256::zero(),
        );

        let outcome = tokio::time::timeout(Duration::from_millis(self.timeout_ms), call.call()).await;

        match outcome {
            Err(_elapsed) => {
                debug!(
                    "V3 quote timed out: {} -> {} after {}ms",
                    token_in.symbol, token_out.symbol, self.timeout_ms
                );
                Quote::failed(
                    self.venue(),
                    token_in.address,
                    token_out.address,
                    amount_in,
                    QuoteFailure::Timeout(self.timeout_ms),
                )
            }
            Ok(Err(e)) => {
                let failure = classify_contract_error(&e);
                debug!(
                    "V3 quote failed: {} -> {} (fee {}): {}",
                    token_in.symbol, token_out.symbol, self.fee_tier, failure
                );
                Quote::failed(
                    self.venue(),
                    token_in.address,
                    token_out.address,
                    amount_in,
                    failure,
                )
            }
            Ok(Ok(amount_out)) if amount_out.is_zero() => Quote::failed(
                self.venue(),
                token_in.address,
                token_out.address,
                amount_in,
                QuoteFailure::NoLiquidity("quoter returned zero output".to_string()),
            ),
            Ok(Ok(amount_out)) => {
                debug!(
                    "V3 quote: {} {} -> {} {} (fee {})",
                    amount_in, token_in.symbol, amount_out, token_out.symbol, self.fee_tier
                );
                Quote::filled(
                    self.venue(),
                    token_in.address,
                    token_out.address,
                    amount_in,
                    amount_out,
                )
            }
        }
    }
}
