//! BlockVault LLM - Unified LLM Provider Abstraction
//!
//! This crate provides a single interface over the text-generation services
//! the oracle extracts from:
//!
//! ## Cloud Providers
//! - Google (Gemini) — default primary
//! - Groq (hosted Llama) — default fallback
//!
//! ## Local Providers (no API keys required)
//! - OpenAI-compatible: vLLM, llama.cpp, etc.
//!
//! ## Key Design Principles
//!
//! 1. Credentials are resolved from the environment once at construction,
//!    never embedded in code
//! 2. Provider handles are explicit values, injected into callers — there
//!    is no module-load singleton
//! 3. JSON-mode is requested wherever the provider supports constrained
//!    output; everywhere else the instruction carries the constraint

pub mod pair;
pub mod providers;
pub mod scripted;
pub mod types;

pub use pair::*;
pub use providers::*;
pub use scripted::*;
pub use types::*;
