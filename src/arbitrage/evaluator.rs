//! Opportunity Evaluator
//!
//! Runs the two-leg round-trip quote for one block and decides whether to
//! proceed: leg one buys the intermediate token on the concentrated-liquidity
//! venue, leg two sells it back on the constant-product venue. The second
//! leg's input is the first leg's output, so the calls are inherently serial.
//!
//! Profit is computed in integer smallest units of the input token; a failed
//! quote on either leg short-circuits to "no opportunity" for the block.
//!
//! Author: AI-Generated
//! Created: 2026-02-03

use crate::quote::QuoteClient;
use crate::types::{profit_raw, Opportunity, Token};
use ethers::types::U256;
use ethers::utils::format_units;
use std::sync::Arc;
use tracing::{debug, info};

/// Format a raw amount in human units for log lines; falls back to the raw
/// integer if the conversion fails.
pub(crate) fn display_units(amount: U256, decimals: u8) -> String {
    format_units(amount, decimals as u32).unwrap_or_else(|_| amount.to_string())
}

pub struct OpportunityEvaluator {
    venue_a: Arc<dyn QuoteClient>,
    venue_b: Arc<dyn QuoteClient>,
    token_in: Token,
    token_out: Token,
    /// Fixed trade size in raw units of `token_in`
    amount_in: U256,
    /// First-leg fee tier, carried into the opportunity for execution
    fee_tier: u32,
}

impl OpportunityEvaluator {
    pub fn new(
        venue_a: Arc<dyn QuoteClient>,
        venue_b: Arc<dyn QuoteClient>,
        token_in: Token,
        token_out: Token,
        amount_in: U256,
        fee_tier: u32,
    ) -> Self {
        Self {
            venue_a,
            venue_b,
            token_in,
            token_out,
            amount_in,
            fee_tier,
        }
    }

    /// Evaluate one block. Returns `Some` iff the round trip is strictly
    /// profitable; every failure path degrades to `None`.
    pub async fn evaluate(&self, block_number: u64) -> Option<Opportunity> {
        // Leg 1: input -> intermediate on venue A
        let first_leg = self
            .venue_a
            .quote(&self.token_in, &self.token_out, self.amount_in)
            .await;

        if let Some(failure) = &first_leg.failure {
            info!(
                "[block {}] {} quote unavailable ({}) - skipping",
                block_number,
                first_leg.venue,
                failure
            );
            return None;
        }

        // Leg 2: intermediate back -> input on venue B, fed by leg 1's output
        let second_leg = self
            .venue_b
            .quote(&self.token_out, &self.token_in, first_leg.amount_out)
            .await;

        if let Some(failure) = &second_leg.failure {
            info!(
                "[block {}] {} quote unavailable ({}) - skipping",
                block_number,
                second_leg.venue,
                failure
            );
            return None;
        }

        let profit = profit_raw(second_leg.amount_out, self.amount_in);

        debug!(
            "[block {}] {} {} -> {} {} ({}) -> {} {} ({}) | profit_raw={}",
            block_number,
            display_units(self.amount_in, self.token_in.decimals),
            self.token_in.symbol,
            display_units(first_leg.amount_out, self.token_out.decimals),
            self.token_out.symbol,
            first_leg.venue,
            display_units(second_leg.amount_out, self.token_in.decimals),
            self.token_in.symbol,
            second_leg.venue,
            profit
        );

        if profit <= 0 {
            return None;
        }

        info!(
            "[block {}] ARBITRAGE OPPORTUNITY: profit {} {} (raw {})",
            block_number,
            display_units(U256::from(profit as u128), self.token_in.decimals),
            self.token_in.symbol,
            profit
        );

        Some(Opportunity {
            block_number,
            amount_in: self.amount_in,
            fee_tier: self.fee_tier,
            first_leg,
            second_leg,
            profit_raw: profit,
        })
    }
}
