//! Block-driven monitoring loop
//!
//! Consumes a stream of new-block numbers and runs one evaluate-and-execute
//! cycle per block, with a single-flight guard: at most one cycle is ever in
//! flight, and block notifications arriving while one runs are dropped, not
//! queued. Stale prices are worthless, so catching up on a backlog of old
//! blocks would only quote against history.
//!
//! Author: AI-Generated
//! Created: 2026-02-03

use crate::arbitrage::{ExecutionSubmitter, OpportunityEvaluator};
use crate::reporter::{ArbEvent, Reporter};
use anyhow::Result;
use async_trait::async_trait;
use ethers::providers::Middleware;
use futures::{Stream, StreamExt};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

/// One per-block unit of work. Implementations contain all their own
/// failures; a cycle never returns an error into the loop.
#[async_trait]
pub trait BlockCycle: Send + Sync {
    async fn process_block(&self, block_number: u64);
}

/// The full evaluate-then-execute cycle for one block
pub struct ArbPipeline<M: Middleware> {
    evaluator: OpportunityEvaluator,
    executor: ExecutionSubmitter<M>,
    reporter: Arc<dyn Reporter>,
}

impl<M: Middleware + 'static> ArbPipeline<M> {
    pub fn new(
        evaluator: OpportunityEvaluator,
        executor: ExecutionSubmitter<M>,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        Self {
            evaluator,
            executor,
            reporter,
        }
    }
}

#[async_trait]
impl<M: Middleware + 'static> BlockCycle for ArbPipeline<M> {
    async fn process_block(&self, block_number: u64) {
        let opportunity = match self.evaluator.evaluate(block_number).await {
            Some(opp) => opp,
            None => {
                self.reporter.report(&ArbEvent::NoOpportunity {
                    block_number,
                    reason: "no profitable round trip".to_string(),
                });
                return;
            }
        };

        self.reporter.report(&ArbEvent::OpportunityFound {
            opportunity: opportunity.clone(),
        });

        let result = self.executor.execute(&opportunity).await;
        self.reporter.report(&ArbEvent::ExecutionCompleted {
            block_number,
            result,
        });
    }
}

/// Drive the loop until the block stream ends.
///
/// Duplicate or out-of-order notifications (block number <= the last one
/// seen) are dropped before the guard is consulted. On stream end the
/// in-flight cycle, if any, is drained before returning.
pub async fn run_block_loop<S>(
    mut blocks: S,
    cycle: Arc<dyn BlockCycle>,
    reporter: Arc<dyn Reporter>,
) -> Result<()>
where
    S: Stream<Item = u64> + Unpin,
{
    // Held by the in-flight cycle task; try_lock failing means skip
    let flight = Arc::new(Mutex::new(()));

    let mut last_block: u64 = 0;
    let mut blocks_seen: u64 = 0;
    let mut blocks_processed: u64 = 0;
    let mut blocks_skipped: u64 = 0;

    info!("Monitoring loop started - waiting for blocks");

    while let Some(block_number) = blocks.next().await {
        blocks_seen += 1;

        if block_number <= last_block {
            debug!(
                "Ignoring stale block notification {} (last seen {})",
                block_number, last_block
            );
            continue;
        }
        last_block = block_number;

        reporter.report(&ArbEvent::BlockReceived { block_number });

        match Arc::clone(&flight).try_lock_owned() {
            Ok(guard) => {
                blocks_processed += 1;
                let cycle = Arc::clone(&cycle);
                tokio::spawn(async move {
                    // Inner task forms the cycle boundary: a panicking cycle
                    // is logged with its block number, never crashes the loop
                    let work =
                        tokio::spawn(async move { cycle.process_block(block_number).await });
                    if let Err(e) = work.await {
                        error!("Cycle for block {} aborted: {}", block_number, e);
                    }
                    drop(guard);
                });
            }
            Err(_) => {
                blocks_skipped += 1;
                reporter.report(&ArbEvent::BlockSkipped { block_number });
            }
        }

        if blocks_seen % 100 == 0 {
            info!(
                "Stats: {} notifications | {} cycles run | {} skipped in-flight | head {}",
                blocks_seen, blocks_processed, blocks_skipped, last_block
            );
        }
    }

    // Stream ended; let an in-flight cycle finish before tearing down
    let _drain = flight.lock().await;
    info!(
        "Block stream ended after {} notifications ({} cycles, {} skipped)",
        blocks_seen, blocks_processed, blocks_skipped
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;
    use tokio::sync::mpsc;
    use tokio_stream::wrappers::ReceiverStream;

    /// Records processed blocks; optionally holds each cycle open for a while
    struct RecordingCycle {
        processed: StdMutex<Vec<u64>>,
        hold: Duration,
    }

    impl RecordingCycle {
        fn new(hold: Duration) -> Self {
            Self {
                processed: StdMutex::new(Vec::new()),
                hold,
            }
        }
    }

    #[async_trait]
    impl BlockCycle for RecordingCycle {
        async fn process_block(&self, block_number: u64) {
            self.processed.lock().unwrap().push(block_number);
            if !self.hold.is_zero() {
                tokio::time::sleep(self.hold).await;
            }
        }
    }

    struct RecordingReporter {
        events: StdMutex<Vec<ArbEvent>>,
    }

    impl RecordingReporter {
        fn new() -> Self {
            Self {
                events: StdMutex::new(Vec::new()),
            }
        }
    }

    impl Reporter for RecordingReporter {
        fn report(&self, event: &ArbEvent) {
            self.events.lock().unwrap().push(event.clone());
        }
    }

    #[tokio::test]
    async fn test_concurrent_blocks_are_dropped_not_queued() {
        // Cycle outlives the arrival of blocks 2 and 3
        let cycle = Arc::new(RecordingCycle::new(Duration::from_millis(100)));
        let reporter = Arc::new(RecordingReporter::new());

        let blocks = futures::stream::iter(vec![1u64, 2, 3]);
        run_block_loop(blocks, cycle.clone(), reporter.clone())
            .await
            .unwrap();

        // Only block 1 ran; 2 and 3 were dropped, never processed later
        assert_eq!(*cycle.processed.lock().unwrap(), vec![1]);

        let skipped: Vec<u64> = reporter
            .events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|e| match e {
                ArbEvent::BlockSkipped { block_number } => Some(*block_number),
                _ => None,
            })
            .collect();
        assert_eq!(skipped, vec![2, 3]);
    }

    #[tokio::test]
    async fn test_duplicate_block_notifications_ignored() {
        let cycle = Arc::new(RecordingCycle::new(Duration::ZERO));
        let reporter = Arc::new(RecordingReporter::new());

        let (tx, rx) = mpsc::channel(8);
        let feeder = tokio::spawn(async move {
            for block in [7u64, 7, 3, 8] {
                tx.send(block).await.unwrap();
                tokio::time::sleep(Duration::from_millis(30)).await;
            }
        });

        run_block_loop(ReceiverStream::new(rx), cycle.clone(), reporter.clone())
            .await
            .unwrap();
        feeder.await.unwrap();

        // Duplicate 7 and regressive 3 never reach a cycle
        assert_eq!(*cycle.processed.lock().unwrap(), vec![7, 8]);

        let received: Vec<u64> = reporter
            .events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|e| match e {
                ArbEvent::BlockReceived { block_number } => Some(*block_number),
                _ => None,
            })
            .collect();
        assert_eq!(received, vec![7, 8]);
    }

    #[tokio::test]
    async fn test_loop_drains_in_flight_cycle_before_returning() {
        let cycle = Arc::new(RecordingCycle::new(Duration::from_millis(80)));
        let reporter = Arc::new(RecordingReporter::new());

        let blocks = futures::stream::iter(vec![1u64]);
        run_block_loop(blocks, cycle.clone(), reporter.clone())
            .await
            .unwrap();

        // The 80ms cycle completed before run_block_loop returned
        assert_eq!(*cycle.processed.lock().unwrap(), vec![1]);
    }

    /// Cycle that panics on one specific block and records the rest
    struct PanickingCycle {
        panic_on: u64,
        processed: StdMutex<Vec<u64>>,
    }

    #[async_trait]
    impl BlockCycle for PanickingCycle {
        async fn process_block(&self, block_number: u64) {
            if block_number == self.panic_on {
                panic!("injected cycle failure");
            }
            self.processed.lock().unwrap().push(block_number);
        }
    }

    #[tokio::test]
    async fn test_panicking_cycle_does_not_kill_the_loop() {
        let cycle = Arc::new(PanickingCycle {
            panic_on: 1,
            processed: StdMutex::new(Vec::new()),
        });
        let reporter = Arc::new(RecordingReporter::new());

        let (tx, rx) = mpsc::channel(8);
        let feeder = tokio::spawn(async move {
            for block in [1u64, 2] {
                tx.send(block).await.unwrap();
                tokio::time::sleep(Duration::from_millis(30)).await;
            }
        });

        run_block_loop(ReceiverStream::new(rx), cycle.clone(), reporter.clone())
            .await
            .unwrap();
        feeder.await.unwrap();

        // Block 1's panic was contained at the cycle boundary; block 2 ran
        assert_eq!(*cycle.processed.lock().unwrap(), vec![2]);
    }

    mod pipeline {
        use super::*;
        use crate::arbitrage::{ExecutionSubmitter, OpportunityEvaluator};
        use crate::config::BotConfig;
        use crate::quote::QuoteClient;
        use crate::types::{ExecutionStatus, Quote, QuoteFailure, Token, VenueId};
        use ethers::providers::{Http, Provider};
        use ethers::signers::LocalWallet;
        use ethers::types::{Address, U256};

        /// Venue that always fills at a fixed output amount
        struct ScriptedVenue {
            venue: VenueId,
            out: U256,
        }

        #[async_trait]
        impl QuoteClient for ScriptedVenue {
            fn venue(&self) -> VenueId {
                self.venue
            }

            async fn quote(&self, token_in: &Token, token_out: &Token, amount_in: U256) -> Quote {
                Quote::filled(
                    self.venue,
                    token_in.address,
                    token_out.address,
                    amount_in,
                    self.out,
                )
            }
        }

        fn token_in() -> Token {
            Token::new(Address::repeat_byte(0x44), 18, "WETH".to_string())
        }

        fn token_out() -> Token {
            Token::new(Address::repeat_byte(0x55), 18, "DAI".to_string())
        }

        fn config() -> BotConfig {
            BotConfig {
                rpc_url: "http://localhost:8545".to_string(),
                chain_id: 31337,
                private_key: String::new(),
                arbitrage_contract: Address::repeat_byte(0x11),
                uniswap_v3_quoter: Address::repeat_byte(0x22),
                sushiswap_v2_router: Address::repeat_byte(0x33),
                token_in: token_in(),
                token_out: token_out(),
                amount_in: U256::from(200u64),
                fee_tier: 500,
                slippage_bps: 50,
                quote_timeout_ms: 5_000,
                gas_limit: 1_000_000,
                max_gas_price_gwei: 200,
                live_mode: false,
                event_log_dir: None,
            }
        }

        fn build_pipeline(
            second_leg_out: U256,
            reporter: Arc<dyn Reporter>,
        ) -> ArbPipeline<Provider<Http>> {
            let evaluator = OpportunityEvaluator::new(
                Arc::new(ScriptedVenue {
                    venue: VenueId::UniswapV3,
                    out: U256::from(620_000u64),
                }),
                Arc::new(ScriptedVenue {
                    venue: VenueId::SushiswapV2,
                    out: second_leg_out,
                }),
                token_in(),
                token_out(),
                U256::from(200u64),
                500,
            );

            let provider =
                Arc::new(Provider::<Http>::try_from("http://localhost:8545").unwrap());
            let wallet: LocalWallet =
                "dcf2cbdd171a21c480aa7f53d77f31bb102282b3ff099c78e3118b37348c72f7"
                    .parse()
                    .unwrap();
            // Dry run by default: no RPC is ever issued
            let executor = ExecutionSubmitter::new(provider, wallet, config());

            ArbPipeline::new(evaluator, executor, reporter)
        }

        #[tokio::test]
        async fn test_profitable_block_reports_find_then_execution() {
            let reporter = Arc::new(RecordingReporter::new());
            let pipeline = build_pipeline(U256::from(205u64), reporter.clone());

            pipeline.process_block(42).await;

            let events = reporter.events.lock().unwrap();
            assert_eq!(events.len(), 2);
            match &events[0] {
                ArbEvent::OpportunityFound { opportunity } => {
                    assert_eq!(opportunity.block_number, 42);
                    assert_eq!(opportunity.profit_raw, 5);
                }
                other => panic!("unexpected first event: {:?}", other),
            }
            match &events[1] {
                ArbEvent::ExecutionCompleted {
                    block_number,
                    result,
                } => {
                    assert_eq!(*block_number, 42);
                    assert_eq!(result.status, ExecutionStatus::Confirmed);
                    assert_eq!(result.realized_profit_raw, Some(5));
                }
                other => panic!("unexpected second event: {:?}", other),
            }
        }

        /// Venue whose call always fails at the transport level
        struct FailingVenue {
            venue: VenueId,
        }

        #[async_trait]
        impl QuoteClient for FailingVenue {
            fn venue(&self) -> VenueId {
                self.venue
            }

            async fn quote(&self, token_in: &Token, token_out: &Token, amount_in: U256) -> Quote {
                Quote::failed(
                    self.venue,
                    token_in.address,
                    token_out.address,
                    amount_in,
                    QuoteFailure::Rpc("connection refused".to_string()),
                )
            }
        }

        #[tokio::test]
        async fn test_permanently_failing_venue_never_stops_the_loop() {
            let evaluator = OpportunityEvaluator::new(
                Arc::new(FailingVenue {
                    venue: VenueId::UniswapV3,
                }),
                Arc::new(ScriptedVenue {
                    venue: VenueId::SushiswapV2,
                    out: U256::from(205u64),
                }),
                token_in(),
                token_out(),
                U256::from(200u64),
                500,
            );
            let provider =
                Arc::new(Provider::<Http>::try_from("http://localhost:8545").unwrap());
            let wallet: LocalWallet =
                "dcf2cbdd171a21c480aa7f53d77f31bb102282b3ff099c78e3118b37348c72f7"
                    .parse()
                    .unwrap();
            let executor = ExecutionSubmitter::new(provider, wallet, config());
            let reporter = Arc::new(RecordingReporter::new());
            let cycle: Arc<dyn BlockCycle> = Arc::new(ArbPipeline::new(
                evaluator,
                executor,
                reporter.clone() as Arc<dyn Reporter>,
            ));

            let (tx, rx) = mpsc::channel(8);
            let feeder = tokio::spawn(async move {
                for block in [10u64, 11, 12] {
                    tx.send(block).await.unwrap();
                    tokio::time::sleep(Duration::from_millis(30)).await;
                }
            });

            run_block_loop(ReceiverStream::new(rx), cycle, reporter.clone())
                .await
                .unwrap();
            feeder.await.unwrap();

            // Every block still got its own cycle and its own verdict
            let no_opp: Vec<u64> = reporter
                .events
                .lock()
                .unwrap()
                .iter()
                .filter_map(|e| match e {
                    ArbEvent::NoOpportunity { block_number, .. } => Some(*block_number),
                    _ => None,
                })
                .collect();
            assert_eq!(no_opp, vec![10, 11, 12]);
        }

        #[tokio::test]
        async fn test_unprofitable_block_reports_no_opportunity() {
            let reporter = Arc::new(RecordingReporter::new());
            let pipeline = build_pipeline(U256::from(199u64), reporter.clone());

            pipeline.process_block(43).await;

            let events = reporter.events.lock().unwrap();
            assert_eq!(events.len(), 1);
            assert!(matches!(
                events[0],
                ArbEvent::NoOpportunity {
                    block_number: 43,
                    ..
                }
            ));
        }
    }

    #[tokio::test]
    async fn test_loop_recovers_after_each_cycle() {
        // Instant cycles, paced arrivals: every block gets its own cycle
        let cycle = Arc::new(RecordingCycle::new(Duration::ZERO));
        let reporter = Arc::new(RecordingReporter::new());

        let (tx, rx) = mpsc::channel(8);
        let feeder = tokio::spawn(async move {
            for block in [10u64, 11, 12] {
                tx.send(block).await.unwrap();
                tokio::time::sleep(Duration::from_millis(30)).await;
            }
        });

        run_block_loop(ReceiverStream::new(rx), cycle.clone(), reporter.clone())
            .await
            .unwrap();
        feeder.await.unwrap();

        assert_eq!(*cycle.processed.lock().unwrap(), vec![10, 11, 12]);
    }
}
