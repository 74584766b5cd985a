pub mod error;
pub mod config;
pub mod request;
pub mod client;
pub mod agents;
pub mod server;
use serde::{Deserialize, Serialize};

/*

choice-agents: a thin async layer over the OpenRouter chat-completion
API. One shared core builds the request, sends it and normalizes the
reply or the failure; concrete agents only shape the prompt.

choice-agents/
├── Cargo.toml
├── src/
│   ├── lib.rs          # Re-exports, AgentInfo, Context
│   ├── error.rs        # Error enum and its Display
│   ├── config.rs       # Options, resolved AgentConfig, ServerConfig
│   ├── request.rs      # Wire types for /chat/completions
│   ├── client.rs       # AgentCore: send_message and friends
│   ├── agents/         # Persona + Agent traits, concrete agents
│   │   ├── mod.rs
│   │   ├── event_generator.rs
│   │   └── summarizer.rs
│   ├── server.rs       # axum routes in front of the agents
│   └── main.rs         # choice-server binary
└── tests/              # Integration tests against a mock endpoint

*/

pub use agents::{Agent, EventGenerator, Persona, Summarizer};
pub use client::AgentCore;
pub use config::{AgentConfig, AgentOptions, Limits, ServerConfig};
pub use error::{Error, Result};
pub use request::{
  CompletionRequest, CompletionResponse, ConversationMessage, Role
};

/// Introspection record returned by `Agent::info`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentInfo
{   pub name: String
  , pub model: String
  , pub system_prompt: String
}

/// Optional structured input that shapes how `process` builds its prompt.
/// Each agent decides which keys it reads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Context(serde_json::Map<String, serde_json::Value>);

impl Context
{   pub fn new() -> Self
    {   Context::default()
    }

    pub fn with(
      mut self
    , key: impl Into<String>
    , value: impl Into<serde_json::Value>
    ) -> Self
    {   self.0.insert(key.into(), value.into());
        self
    }

    /// Value of `key` as prompt text.
    /// Empty strings, nulls, `false` and zero count as absent.
    pub fn text(&self, key: &str) -> Option<String>
    {   use serde_json::Value;
        match self.0.get(key)?
        {   Value::String(s) if !s.is_empty() => Some(s.clone())
          , Value::Number(n) if n.as_f64() != Some(0.0) => {
              Some(number_text(n))
            }
          , Value::Bool(true) => Some("true".to_string())
          , v @ (Value::Array(_) | Value::Object(_)) => Some(v.to_string())
          , _ => None
        }
    }
}

// Integral floats print without a fraction, so `1.0` reads as `1`
fn number_text(n: &serde_json::Number) -> String
{   if let Some(i) = n.as_i64()
    {   i.to_string()
    } else if let Some(u) = n.as_u64()
    {   u.to_string()
    } else
    {   n.as_f64().map(|f| f.to_string()).unwrap_or_else(|| n.to_string())
    }
}
