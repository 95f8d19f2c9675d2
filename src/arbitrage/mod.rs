//! Arbitrage Module
//!
//! Opportunity evaluation and trade execution for the two-venue round trip.
//!
//! Author: AI-Generated
//! Created: 2026-02-03

pub mod evaluator;
pub mod executor;

pub use evaluator::OpportunityEvaluator;
pub use executor::{amount_out_minimum, ExecutionSubmitter};
