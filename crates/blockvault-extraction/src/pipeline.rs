//! The extraction pipeline
//!
//! Two-level loop: every attempt tries the primary provider and, on any
//! recoverable failure, the fallback provider with the same rendered
//! instruction. Recoverable failures (transport, empty reply, parse,
//! schema) all take the same path — the distinction matters for logs, not
//! for control flow. Only exhaustion and deadline breaches reach the
//! caller.

use std::sync::Arc;
use std::time::Duration;

use blockvault_guard::{Guard, GuardError};
use blockvault_llm::{CompletionRequest, LLMError, LLMProvider, Message, ProviderPair};
use blockvault_types::{ExtractionResult, SchemaVariant, TxRecord, WalletAddress};
use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::time::Instant;

use crate::prompt::render_instruction;

/// Terminal errors surfaced to the caller
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error(
        "no valid reply after {attempts} attempts across {primary} and {fallback}: {last_error}"
    )]
    ExhaustedRetries {
        attempts: u32,
        primary: String,
        fallback: String,
        last_error: String,
    },

    #[error("overall deadline of {deadline:?} exceeded after {attempts} completed attempts")]
    DeadlineExceeded { deadline: Duration, attempts: u32 },

    #[error("max_attempts must be at least 1")]
    NoAttemptsConfigured,
}

/// Recoverable per-call failures; logged, then routed to fallback/retry
#[derive(Error, Debug)]
enum AttemptError {
    #[error("transport: {0}")]
    Transport(LLMError),

    #[error("provider returned empty content")]
    EmptyReply,

    #[error("call timed out after {0:?}")]
    Timeout(Duration),

    #[error("reply rejected: {0}")]
    Rejected(#[from] GuardError),
}

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// The schema variant to prompt for and validate against
    pub schema: SchemaVariant,
    /// Bound on the primary-then-fallback cycles
    pub max_attempts: u32,
    /// Fixed sleep between cycles — deliberately not exponential backoff
    pub retry_delay: Duration,
    /// Timeout applied to each individual provider call
    pub attempt_timeout: Duration,
    /// Deadline for the whole extraction, checked before each cycle
    pub overall_deadline: Duration,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            schema: SchemaVariant::default(),
            max_attempts: 3,
            retry_delay: Duration::from_secs(1),
            attempt_timeout: Duration::from_secs(30),
            overall_deadline: Duration::from_secs(120),
        }
    }
}

impl ExtractorConfig {
    /// Build configuration from environment variables, falling back to
    /// defaults for anything unset or unparseable
    ///
    /// Reads `BLOCKVAULT_SCHEMA`, `BLOCKVAULT_MAX_ATTEMPTS`,
    /// `BLOCKVAULT_RETRY_DELAY_MS`, `BLOCKVAULT_ATTEMPT_TIMEOUT_SECS`,
    /// `BLOCKVAULT_OVERALL_DEADLINE_SECS`.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            schema: std::env::var("BLOCKVAULT_SCHEMA")
                .ok()
                .and_then(|v| SchemaVariant::from_str(&v))
                .unwrap_or(defaults.schema),
            max_attempts: env_parse("BLOCKVAULT_MAX_ATTEMPTS", defaults.max_attempts),
            retry_delay: Duration::from_millis(env_parse(
                "BLOCKVAULT_RETRY_DELAY_MS",
                defaults.retry_delay.as_millis() as u64,
            )),
            attempt_timeout: Duration::from_secs(env_parse(
                "BLOCKVAULT_ATTEMPT_TIMEOUT_SECS",
                defaults.attempt_timeout.as_secs(),
            )),
            overall_deadline: Duration::from_secs(env_parse(
                "BLOCKVAULT_OVERALL_DEADLINE_SECS",
                defaults.overall_deadline.as_secs(),
            )),
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

/// A validated extraction plus attempt metadata
#[derive(Debug, Clone, serde::Serialize)]
pub struct ExtractionReport {
    /// Unique id for this extraction run
    pub trace_id: String,
    /// The wallet that was assessed
    pub wallet: WalletAddress,
    /// The validated payload, exactly as the model returned it
    pub result: ExtractionResult,
    /// Name of the provider that produced the accepted reply
    pub provider: String,
    /// Cycle on which the accepted reply arrived (1-based)
    pub attempts: u32,
    /// Wall-clock duration of the extraction in milliseconds
    pub duration_ms: u64,
    /// When the extraction started
    pub started_at: DateTime<Utc>,
}

/// The extraction pipeline
///
/// Stateless across calls: provider handles and configuration are fixed at
/// construction, and each [`extract`](Extractor::extract) call is
/// independent.
pub struct Extractor {
    primary: Arc<dyn LLMProvider>,
    fallback: Arc<dyn LLMProvider>,
    guard: Guard,
    config: ExtractorConfig,
}

impl Extractor {
    /// Create a pipeline from explicit provider handles
    pub fn new(
        primary: Arc<dyn LLMProvider>,
        fallback: Arc<dyn LLMProvider>,
        config: ExtractorConfig,
    ) -> Self {
        Self {
            primary,
            fallback,
            guard: Guard::new(config.schema),
            config,
        }
    }

    /// Create a pipeline from a resolved provider pair
    pub fn from_pair(pair: ProviderPair, config: ExtractorConfig) -> Self {
        Self::new(pair.primary().clone(), pair.fallback().clone(), config)
    }

    /// The active schema variant
    pub fn schema(&self) -> SchemaVariant {
        self.config.schema
    }

    /// Extract a validated reliability assessment for a wallet
    ///
    /// Runs up to `max_attempts` primary-then-fallback cycles and returns
    /// the first reply that survives validation. An incomplete or
    /// mistyped reply is never returned — it counts as a failed call.
    pub async fn extract(
        &self,
        wallet: &WalletAddress,
        transactions: &[TxRecord],
    ) -> Result<ExtractionReport, ExtractError> {
        if self.config.max_attempts == 0 {
            return Err(ExtractError::NoAttemptsConfigured);
        }

        let instruction = render_instruction(self.config.schema, wallet, transactions);
        let trace_id = uuid::Uuid::new_v4().to_string();
        let started_at = Utc::now();
        let started = Instant::now();
        let deadline = started + self.config.overall_deadline;

        tracing::info!(
            %trace_id,
            wallet = %wallet,
            schema = %self.config.schema,
            transactions = transactions.len(),
            "starting extraction"
        );

        let mut last_error = String::new();

        for attempt in 1..=self.config.max_attempts {
            if Instant::now() >= deadline {
                tracing::error!(%trace_id, attempt, "extraction deadline exceeded");
                return Err(ExtractError::DeadlineExceeded {
                    deadline: self.config.overall_deadline,
                    attempts: attempt - 1,
                });
            }

            for provider in [&self.primary, &self.fallback] {
                match self.try_provider(provider.as_ref(), &instruction).await {
                    Ok(result) => {
                        let report = ExtractionReport {
                            trace_id: trace_id.clone(),
                            wallet: wallet.clone(),
                            result,
                            provider: provider.name().to_string(),
                            attempts: attempt,
                            duration_ms: started.elapsed().as_millis() as u64,
                            started_at,
                        };
                        tracing::info!(
                            trace_id = %report.trace_id,
                            provider = %report.provider,
                            attempt,
                            duration_ms = report.duration_ms,
                            "extraction succeeded"
                        );
                        return Ok(report);
                    }
                    Err(err) => {
                        tracing::warn!(
                            %trace_id,
                            provider = provider.name(),
                            attempt,
                            max_attempts = self.config.max_attempts,
                            %err,
                            "provider call failed"
                        );
                        last_error = format!("{}: {}", provider.name(), err);
                    }
                }
            }

            if attempt < self.config.max_attempts {
                tokio::time::sleep(self.config.retry_delay).await;
            }
        }

        tracing::error!(
            %trace_id,
            attempts = self.config.max_attempts,
            last_error = %last_error,
            "extraction exhausted all attempts"
        );

        Err(ExtractError::ExhaustedRetries {
            attempts: self.config.max_attempts,
            primary: self.primary.name().to_string(),
            fallback: self.fallback.name().to_string(),
            last_error,
        })
    }

    async fn try_provider(
        &self,
        provider: &dyn LLMProvider,
        instruction: &str,
    ) -> Result<ExtractionResult, AttemptError> {
        let request = CompletionRequest::new(vec![Message::user(instruction)])
            .with_json_mode()
            .with_max_tokens(1024);

        let response =
            match tokio::time::timeout(self.config.attempt_timeout, provider.complete(request))
                .await
            {
                Err(_) => return Err(AttemptError::Timeout(self.config.attempt_timeout)),
                Ok(Err(err)) => return Err(AttemptError::Transport(err)),
                Ok(Ok(response)) => response,
            };

        if response.content.trim().is_empty() {
            return Err(AttemptError::EmptyReply);
        }

        Ok(self.guard.parse(&response.content)?)
    }
}
