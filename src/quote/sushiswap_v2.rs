//! SushiSwap V2 Quote Client (constant-product venue)
//!
//! Prices a swap through the V2 router's path-based output function:
//! `getAmountsOut(amountIn, [tokenIn, tokenOut])`. The returned array
//! carries one amount per path node; the final element is the output.
//!
//! Author: AI-Generated
//! Created: 2026-02-03

use crate::contracts::IUniswapV2Router02;
use crate::quote::{check_inputs, classify_contract_error, QuoteClient};
use crate::types::{Quote, QuoteFailure, Token, VenueId};
use async_trait::async_trait;
use ethers::providers::Middleware;
use ethers::types::{Address, U256};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

pub struct SushiswapV2QuoteClient<M> {
    router: IUniswapV2Router02<M>,
    timeout_ms: u64,
}

impl<M: Middleware + 'static> SushiswapV2QuoteClient<M> {
    pub fn new(provider: Arc<M>, router_address: Address, timeout_ms: u64) -> Self {
        Self {
            router: IUniswapV2Router02::new(router_address, provider),
            timeout_ms,
        }
    }
}

/// Extract the output amount from a getAmountsOut response.
/// The router echoes the input as element 0 and appends one amount per hop.
fn output_from_amounts(amounts: &[U256]) -> Result<U256, QuoteFailure> {
    match amounts {
        [] | [_] => Err(QuoteFailure::Rpc(format!(
            "router returned {} amounts, expected at least 2",
            amounts.len()
        ))),
        [.., out] if out.is_zero() => Err(QuoteFailure::NoLiquidity(
            "router returned zero output".to_string(),
        )),
        [.., out] => Ok(*out),
    }
}

#[async_trait]
impl<M: Middleware + 'static> QuoteClient for SushiswapV2QuoteClient<M> {
    fn venue(&self) -> VenueId {
        VenueId::SushiswapV2
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

        let path = vec![token_in.address, token_out.address];
        let call = self.router.get_amounts_out(amount_in, path);

        let outcome = tokio::time::timeout(Duration::from_millis(self.timeout_ms), call.call()).await;

        let result = match outcome {
            Err(_elapsed) => Err(QuoteFailure::Timeout(self.timeout_ms)),
            Ok(Err(e)) => Err(classify_contract_error(&e)),
            Ok(Ok(amounts)) => output_from_amounts(&amounts),
        };

        match result {
            Err(failure) => {
                debug!(
                    "V2 quote failed: {} -> {}: {}",
                    token_in.symbol, token_out.symbol, failure
                );
                Quote::failed(
                    self.venue(),
                    token_in.address,
                    token_out.address,
                    amount_in,
                    failure,
                )
            }
            Ok(amount_out) => {
                debug!(
                    "V2 quote: {} {} -> {} {}",
                    amount_in, token_in.symbol, amount_out, token_out.symbol
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
