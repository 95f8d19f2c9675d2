//! Execution Submitter
//!
//! Builds and submits the settlement transaction for a detected opportunity:
//! a single `executeArbitrage` call on the deployed settlement contract with
//! a floor-computed minimum-output bound and an explicit gas-limit ceiling.
//! Awaits inclusion and maps the outcome onto the three-state result
//! (confirmed / reverted / submission failed) - no failure mode here is ever
//! allowed to propagate as an error into the monitoring loop.
//!
//! Realized profit is re-derived from the owner's input-token balance delta
//! (the contract forwards proceeds to its owner and returns no value),
//! falling back to the quoted profit if the balance read fails.
//!
//! Author: AI-Generated
//! Created: 2026-02-03

use crate::config::BotConfig;
use crate::contracts::{IArbitrage, IERC20};
use crate::types::{profit_raw, ExecutionResult, ExecutionStatus, Opportunity};
use ethers::middleware::SignerMiddleware;
use ethers::providers::Middleware;
use ethers::signers::{LocalWallet, Signer};
use ethers::types::{Address, U256, U64};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Floor of `expected_out * (10000 - slippage_bps) / 10000` in integer
/// arithmetic. Always <= expected_out for any tolerance in [0, 10000].
pub fn amount_out_minimum(expected_out: U256, slippage_bps: u32) -> U256 {
    let keep = 10_000u64.saturating_sub(slippage_bps as u64);
    expected_out * U256::from(keep) / U256::from(10_000u64)
}

pub struct ExecutionSubmitter<M: Middleware> {
    provider: Arc<M>,
    contract: IArbitrage<SignerMiddleware<Arc<M>, LocalWallet>>,
    /// Wallet address - the settlement contract's owner, where profit lands
    owner: Address,
    config: BotConfig,
    /// Simulates execution without submitting. Default on for safety.
    dry_run: bool,
}

impl<M: Middleware + 'static> ExecutionSubmitter<M> {
    pub fn new(provider: Arc<M>, wallet: LocalWallet, config: BotConfig) -> Self {
        let owner = wallet.address();
        let client = Arc::new(SignerMiddleware::new(
            Arc::clone(&provider),
            wallet.with_chain_id(config.chain_id),
        ));
        let contract = IArbitrage::new(config.arbitrage_contract, client);

        Self {
            provider,
            contract,
            owner,
            config,
            dry_run: true,
        }
    }

    /// Enable or disable dry run mode
    pub fn set_dry_run(&mut self, dry_run: bool) {
        self.dry_run = dry_run;
        if dry_run {
            info!("Executor in DRY RUN mode - trades will be simulated");
        } else {
            warn!("Executor in LIVE mode - trades will be executed!");
        }
    }

    /// Submit the settlement transaction for one opportunity and await its
    /// fate. Infallible signature: all failures land in the result.
    pub async fn execute(&self, opp: &Opportunity) -> ExecutionResult {
        let start_time = Instant::now();

        let min_out = amount_out_minimum(opp.second_leg.amount_out, self.config.slippage_bps);
        debug_assert!(min_out <= opp.second_leg.amount_out);

        info!(
            "Executing arbitrage for block {} | amountIn={} | expectedOut={} | minOut={} ({}bps tolerance)",
            opp.block_number,
            opp.amount_in,
            opp.second_leg.amount_out,
            min_out,
            self.config.slippage_bps
        );

        if self.dry_run {
            return self.simulate_execution(opp, start_time);
        }

        // Gas-price ceiling: refuse to chase opportunities through fee spikes
        match self.provider.get_gas_price().await {
            Ok(gas_price) => {
                let ceiling =
                    U256::from(self.config.max_gas_price_gwei) * U256::from(1_000_000_000u64);
                if gas_price > ceiling {
                    return submission_failed(
                        None,
                        format!(
                            "Gas price too high: {} gwei > {} gwei max",
                            gas_price / U256::from(1_000_000_000u64),
                            self.config.max_gas_price_gwei
                        ),
                        start_time,
                    );
                }
            }
            Err(e) => {
                return submission_failed(None, format!("Gas price query failed: {}", e), start_time);
            }
        }

        // Owner balance before, for realized-profit derivation. A failed read
        // is tolerated - we fall back to the quoted profit after confirmation.
        let balance_before = self.owner_balance(opp.first_leg.token_in).await;

        let call = self
            .contract
            .execute_arbitrage(
                opp.first_leg.token_in,
                opp.first_leg.token_out,
                opp.amount_in,
                opp.fee_tier,
                min_out,
            )
            .gas(self.config.gas_limit);

        let pending_tx = match call.send().await {
            Ok(pending) => pending,
            Err(e) => {
                return submission_failed(None, format!("Send failed: {}", e), start_time);
            }
        };

        let tx_hash = format!("{:?}", pending_tx.tx_hash());
        info!("Arbitrage tx submitted: {}", tx_hash);

        let receipt = match pending_tx.await {
            Ok(Some(receipt)) => receipt,
            Ok(None) => {
                return submission_failed(
                    Some(tx_hash),
                    "No receipt returned; transaction fate unresolved".to_string(),
                    start_time,
                );
            }
            Err(e) => {
                return submission_failed(
                    Some(tx_hash),
                    format!("Confirmation failed; transaction fate unresolved: {}", e),
                    start_time,
                );
            }
        };

        let included_block = receipt.block_number.map(|bn| bn.as_u64());

        if receipt.status != Some(U64::from(1)) {
            warn!(
                "Arbitrage tx reverted on-chain: {} (block {:?})",
                tx_hash, included_block
            );
            return ExecutionResult {
                tx_hash: Some(tx_hash),
                block_number: included_block,
                status: ExecutionStatus::Reverted,
                realized_profit_raw: None,
                error: Some("Settlement contract rejected the trade".to_string()),
                execution_time_ms: start_time.elapsed().as_millis() as u64,
            };
        }

        // Confirmed - derive realized profit from the owner balance delta
        let balance_after = self.owner_balance(opp.first_leg.token_in).await;
        let realized = match (balance_before, balance_after) {
            (Some(before), Some(after)) => profit_raw(after, before),
            _ => {
                debug!("Balance delta unobservable - reporting quoted profit");
                opp.profit_raw
            }
        };

        info!(
            "Arbitrage confirmed: {} | realized profit (raw) {}",
            tx_hash, realized
        );

        ExecutionResult {
            tx_hash: Some(tx_hash),
            block_number: included_block,
            status: ExecutionStatus::Confirmed,
            realized_profit_raw: Some(realized),
            error: None,
            execution_time_ms: start_time.elapsed().as_millis() as u64,
        }
    }

    async fn owner_balance(&self, token: Address) -> Option<U256> {
        let erc20 = IERC20::new(token, Arc::clone(&self.provider));
        match erc20.balance_of(self.owner).call().await {
            Ok(balance) => Some(balance),
            Err(e) => {
                debug!("Owner balance read failed for {:?}: {}", token, e);
                None
            }
        }
    }

    /// Dry run: report the trade that would have been submitted.
    fn simulate_execution(&self, opp: &Opportunity, start_time: Instant) -> ExecutionResult {
        info!(
            "DRY RUN: would execute arbitrage for block {} with quoted profit (raw) {}",
            opp.block_number, opp.profit_raw
        );

        ExecutionResult {
            tx_hash: Some("DRY_RUN_NO_TX".to_string()),
            block_number: Some(opp.block_number),
            status: ExecutionStatus::Confirmed,
            realized_profit_raw: Some(opp.profit_raw),
            error: None,
            execution_time_ms: start_time.elapsed().as_millis() as u64,
        }
    }
}

fn submission_failed(
    tx_hash: Option<String>,
    error: String,
    start_time: Instant,
) -> ExecutionResult {
    warn!("Execution submission failed: {}", error);
    ExecutionResult {
        tx_hash,
        block_number: None,
        status: ExecutionStatus::SubmissionFailed,
        realized_profit_raw: None,
        error: Some(error),
        execution_time_ms: start_time.elapsed().as_millis() as u64,
    }
}
