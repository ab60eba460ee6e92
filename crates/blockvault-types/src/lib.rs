//! BlockVault Types - Canonical domain types for the reliability oracle
//!
//! This crate contains the foundational types for the BlockVault oracle with
//! zero dependencies on other blockvault crates. It defines:
//!
//! - Wallet and transaction-record types fed into the extraction pipeline
//! - The schema variants an extraction can be validated against
//! - The validated assessment payloads returned to downstream consumers
//!
//! # Architectural Invariants
//!
//! 1. Transaction records are opaque to the pipeline — they are serialized
//!    into the instruction payload, never interpreted
//! 2. An assessment is only constructible from a payload that passed
//!    schema validation in full; partial results are unrepresentable
//! 3. One schema variant is canonical per deployment, selected by
//!    configuration rather than by which prompt happens to run

pub mod address;
pub mod assessment;
pub mod record;
pub mod schema;

pub use address::*;
pub use assessment::*;
pub use record::*;
pub use schema::*;

/// Version of the BlockVault types schema
pub const TYPES_VERSION: &str = "0.1.0";
