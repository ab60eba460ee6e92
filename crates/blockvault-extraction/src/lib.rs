//! BlockVault Extraction - the validated multi-provider pipeline
//!
//! One call renders a risk-analysis instruction from a wallet's transaction
//! history, sends it to the primary provider with JSON-constrained output,
//! validates the reply, and falls back to the secondary provider on any
//! failure. The primary-then-fallback cycle repeats up to a bounded attempt
//! count with a fixed inter-attempt delay.
//!
//! The pipeline holds no mutable state: concurrent extractions are
//! independent, and nothing is persisted.

pub mod pipeline;
pub mod prompt;

pub use pipeline::*;
pub use prompt::*;
