//! The tool-calling conversation loop.

use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::error::{ConversationError, Result};
use crate::model::{Backend, Message, ModelRequest, ToolCall, ToolResult, ToolSpec, Usage};
use crate::tools::{ToolError, ToolHost};

/// Default cap on model calls per exchange.
pub const DEFAULT_MAX_TURNS: usize = 8;

/// How an exchange ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The model answered in plain text.
    Answer(String),
    /// The model was still calling tools after the last allowed turn.
    TurnLimitReached { max_turns: usize },
}

/// A finished exchange.
#[derive(Debug, Clone)]
pub struct Exchange {
    pub outcome: Outcome,
    /// Full history, starting with the user prompt.
    pub messages: Vec<Message>,
    /// Number of model calls made.
    pub turns: usize,
    /// Token usage summed over all turns.
    pub usage: Usage,
}

impl Exchange {
    /// The answer text, if the model produced one.
    pub fn answer(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Answer(text) => Some(text),
            Outcome::TurnLimitReached { .. } => None,
        }
    }
}

/// Drives a model and a tool host until the model answers in text.
///
/// Each call to [`Conversation::ask`] starts from an empty history; nothing
/// carries over between exchanges.
pub struct Conversation<B, H> {
    backend: B,
    tools: H,
    specs: Vec<ToolSpec>,
    allowed: Option<HashSet<String>>,
    max_turns: usize,
}

impl<B: Backend, H: ToolHost> Conversation<B, H> {
    /// Create a conversation exposing every tool the host offers.
    pub fn new(backend: B, tools: H) -> Self {
        let specs = tools.specs().to_vec();
        Self {
            backend,
            tools,
            specs,
            allowed: None,
            max_turns: DEFAULT_MAX_TURNS,
        }
    }

    /// Cap the number of model calls per exchange (at least one).
    pub fn with_max_turns(mut self, max_turns: usize) -> Self {
        self.max_turns = max_turns.max(1);
        self
    }

    /// Only advertise and run the named tools. An empty list allows all.
    pub fn with_allowed_tools<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let allowed: HashSet<String> = names.into_iter().map(Into::into).collect();
        if allowed.is_empty() {
            self.allowed = None;
            self.specs = self.tools.specs().to_vec();
        } else {
            self.specs = self
                .tools
                .specs()
                .iter()
                .filter(|s| allowed.contains(&s.name))
                .cloned()
                .collect();
            self.allowed = Some(allowed);
        }
        self
    }

    /// Tools advertised to the model.
    pub fn specs(&self) -> &[ToolSpec] {
        &self.specs
    }

    /// Give the tool host back.
    pub fn into_tools(self) -> H {
        self.tools
    }

    /// Run one exchange for the given prompt.
    pub async fn ask(&self, prompt: &str) -> Result<Exchange> {
        let mut messages = vec![Message::user(prompt)];
        let mut usage = Usage::default();

        for turn in 1..=self.max_turns {
            debug!(turn, history = messages.len(), "calling model");
            let response = self
                .backend
                .call(ModelRequest {
                    messages: &messages,
                    tools: &self.specs,
                })
                .await?;
            usage += response.usage;

            let message = response.message;
            let calls = message.tool_calls();

            if calls.is_empty() {
                let text = message.text();
                if text.trim().is_empty() {
                    return Err(ConversationError::EmptyResponse);
                }
                messages.push(message);
                return Ok(Exchange {
                    outcome: Outcome::Answer(text),
                    messages,
                    turns: turn,
                    usage,
                });
            }

            messages.push(message);

            // Nothing would read the results.
            if turn == self.max_turns {
                break;
            }

            let mut results = Vec::with_capacity(calls.len());
            for call in &calls {
                results.push(self.run_tool(call).await);
            }
            messages.push(Message::tool_results(results));
        }

        warn!(max_turns = self.max_turns, "turn limit reached without an answer");
        Ok(Exchange {
            outcome: Outcome::TurnLimitReached {
                max_turns: self.max_turns,
            },
            messages,
            turns: self.max_turns,
            usage,
        })
    }

    async fn run_tool(&self, call: &ToolCall) -> ToolResult {
        let tool_call_id = call.id.clone();

        if let Some(allowed) = &self.allowed
            && !allowed.contains(&call.name)
        {
            warn!(tool = %call.name, "model called a tool outside the allowlist");
            return ToolResult::Failure {
                tool_call_id,
                error: ToolError::CapabilityDenied(call.name.clone()),
            };
        }

        info!(tool = %call.name, input = %call.input, "calling tool");
        match self.tools.execute(call).await {
            Ok(output) => ToolResult::Success {
                tool_call_id,
                output,
            },
            Err(error) => {
                warn!(tool = %call.name, %error, "tool call failed");
                ToolResult::Failure {
                    tool_call_id,
                    error,
                }
            }
        }
    }
}
