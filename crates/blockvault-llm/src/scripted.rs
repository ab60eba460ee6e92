//! Scripted provider for tests
//!
//! Plays back a programmed sequence of replies and errors, and counts the
//! calls it receives. The extraction pipeline's attempt-accounting tests
//! are written against this.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use crate::providers::LLMProvider;
use crate::types::*;

/// One programmed step in a script
pub enum ScriptedReply {
    /// Return this content successfully
    Content(String),
    /// Fail with a network error
    NetworkError,
    /// Fail with a request error
    RequestFailed,
}

/// An [`LLMProvider`] that replays a script
///
/// When the script runs out, every further call repeats the final step.
pub struct ScriptedProvider {
    name: &'static str,
    script: Mutex<VecDeque<ScriptedReply>>,
    last: Mutex<Option<ScriptedReply>>,
    calls: AtomicU32,
}

impl ScriptedProvider {
    pub fn new(name: &'static str, script: Vec<ScriptedReply>) -> Self {
        Self {
            name,
            script: Mutex::new(script.into()),
            last: Mutex::new(None),
            calls: AtomicU32::new(0),
        }
    }

    /// Provider that always returns the same content
    pub fn always(name: &'static str, content: impl Into<String>) -> Self {
        Self::new(name, vec![ScriptedReply::Content(content.into())])
    }

    /// Provider that always fails with a network error
    pub fn always_failing(name: &'static str) -> Self {
        Self::new(name, vec![ScriptedReply::NetworkError])
    }

    /// Number of completion calls received so far
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    fn reply_to_result(&self, reply: &ScriptedReply) -> Result<CompletionResponse> {
        match reply {
            ScriptedReply::Content(content) => Ok(CompletionResponse::new(content.clone())),
            ScriptedReply::NetworkError => Err(LLMError::NetworkError {
                message: format!("{}: connection refused", self.name),
            }),
            ScriptedReply::RequestFailed => Err(LLMError::RequestFailed {
                message: format!("{}: HTTP 500", self.name),
            }),
        }
    }
}

#[async_trait]
impl LLMProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        self.name
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Scripted
    }

    async fn is_available(&self) -> bool {
        true
    }

    async fn complete(&self, _request: CompletionRequest) -> Result<CompletionResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let next = self.script.lock().expect("script lock").pop_front();
        match next {
            Some(reply) => {
                let result = self.reply_to_result(&reply);
                *self.last.lock().expect("script lock") = Some(reply);
                result
            }
            None => {
                let last = self.last.lock().expect("script lock");
                match last.as_ref() {
                    Some(reply) => self.reply_to_result(reply),
                    None => Err(LLMError::RequestFailed {
                        message: format!("{}: empty script", self.name),
                    }),
                }
            }
        }
    }
}
