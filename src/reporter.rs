//! Event reporting
//!
//! Per-block lifecycle events fanned out to one or more sinks: the console
//! (tracing) and an optional JSONL append feed (one event per line, daily
//! files: events_YYYY-MM-DD.jsonl). Reporting is best-effort - a sink
//! failure is logged and swallowed, never surfaced to the monitoring loop.
//!
//! Author: AI-Generated
//! Created: 2026-02-03

use crate::arbitrage::evaluator::display_units;
use crate::types::{ExecutionResult, ExecutionStatus, Opportunity, Token};
use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// One per-block lifecycle event
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ArbEvent {
    /// A new block notification entered the pipeline
    BlockReceived { block_number: u64 },
    /// Notification dropped because a previous cycle was still in flight
    BlockSkipped { block_number: u64 },
    /// Cycle completed without a profitable round trip
    NoOpportunity { block_number: u64, reason: String },
    /// Cycle found a profitable round trip
    OpportunityFound { opportunity: Opportunity },
    /// Execution attempt finished (any status)
    ExecutionCompleted {
        block_number: u64,
        result: ExecutionResult,
    },
}

impl ArbEvent {
    pub fn block_number(&self) -> u64 {
        match self {
            ArbEvent::BlockReceived { block_number }
            | ArbEvent::BlockSkipped { block_number }
            | ArbEvent::NoOpportunity { block_number, .. }
            | ArbEvent::ExecutionCompleted { block_number, .. } => *block_number,
            ArbEvent::OpportunityFound { opportunity } => opportunity.block_number,
        }
    }
}

/// Sink for lifecycle events. Implementations must not panic and must not
/// block the loop on sink failures.
pub trait Reporter: Send + Sync {
    fn report(&self, event: &ArbEvent);
}

/// Console reporter: renders events through tracing at sensible levels.
pub struct LogReporter {
    token_in: Token,
}

impl LogReporter {
    pub fn new(token_in: Token) -> Self {
        Self { token_in }
    }
}

impl Reporter for LogReporter {
    fn report(&self, event: &ArbEvent) {
        match event {
            ArbEvent::BlockReceived { block_number } => {
                debug!("Block {} received", block_number);
            }
            ArbEvent::BlockSkipped { block_number } => {
                debug!("Block {} skipped - cycle already in flight", block_number);
            }
            ArbEvent::NoOpportunity {
                block_number,
                reason,
            } => {
                debug!("Block {}: no opportunity ({})", block_number, reason);
            }
            ArbEvent::OpportunityFound { opportunity } => {
                info!(
                    "Block {}: opportunity found | profit {} {} (raw {})",
                    opportunity.block_number,
                    display_units(
                        ethers::types::U256::from(opportunity.profit_raw.unsigned_abs()),
                        self.token_in.decimals
                    ),
                    self.token_in.symbol,
                    opportunity.profit_raw
                );
            }
            ArbEvent::ExecutionCompleted {
                block_number,
                result,
            } => match result.status {
                ExecutionStatus::Confirmed => {
                    info!(
                        "Block {}: execution confirmed in {}ms | tx {:?} | realized (raw) {:?}",
                        block_number,
                        result.execution_time_ms,
                        result.tx_hash,
                        result.realized_profit_raw
                    );
                }
                ExecutionStatus::Reverted => {
                    warn!(
                        "Block {}: execution reverted | tx {:?}",
                        block_number, result.tx_hash
                    );
                }
                ExecutionStatus::SubmissionFailed => {
                    warn!(
                        "Block {}: submission failed | {:?}",
                        block_number, result.error
                    );
                }
            },
        }
    }
}

/// Timestamped line as written to the JSONL feed
#[derive(Serialize)]
struct EventLine<'a> {
    timestamp: DateTime<Utc>,
    #[serde(flatten)]
    event: &'a ArbEvent,
}

/// JSONL reporter (one event per line). Creates daily files so the feed
/// stays greppable and rotation is free.
pub struct JsonlReporter {
    base_dir: PathBuf,
}

impl JsonlReporter {
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();

        fs::create_dir_all(&base_dir)
            .with_context(|| format!("Failed to create event log directory: {:?}", base_dir))?;

        Ok(Self { base_dir })
    }

    fn file_path_for_date(base_dir: &Path, date: NaiveDate) -> PathBuf {
        base_dir.join(format!("events_{}.jsonl", date.format("%Y-%m-%d")))
    }

    /// Today's feed file
    pub fn current_file_path(&self) -> PathBuf {
        Self::file_path_for_date(&self.base_dir, Utc::now().date_naive())
    }

    fn append(&self, event: &ArbEvent) -> Result<()> {
        let file_path = self.current_file_path();

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&file_path)
            .with_context(|| format!("Failed to open event log file: {:?}", file_path))?;

        let line = EventLine {
            timestamp: Utc::now(),
            event,
        };
        let json = serde_json::to_string(&line).context("Failed to serialize event")?;

        writeln!(file, "{}", json)?;

        Ok(())
    }

    /// Read all events recorded for a specific date
    pub fn read_all(&self, date: NaiveDate) -> Result<Vec<ArbEvent>> {
        let path = Self::file_path_for_date(&self.base_dir, date);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&path)?;
        let reader = BufReader::new(file);

        let mut events = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if !line.trim().is_empty() {
                let event: ArbEvent = serde_json::from_str(&line)
                    .with_context(|| format!("Failed to parse event line: {}", line))?;
                events.push(event);
            }
        }

        Ok(events)
    }
}

impl Reporter for JsonlReporter {
    fn report(&self, event: &ArbEvent) {
        if let Err(e) = self.append(event) {
            warn!("Event log write failed: {:#}", e);
        }
    }
}

/// Fans one event out to every configured sink
pub struct CompositeReporter {
    sinks: Vec<Box<dyn Reporter>>,
}

impl CompositeReporter {
    pub fn new(sinks: Vec<Box<dyn Reporter>>) -> Self {
        Self { sinks }
    }
}

impl Reporter for CompositeReporter {
    fn report(&self, event: &ArbEvent) {
        for sink in &self.sinks {
            sink.report(event);
        }
    }
}
