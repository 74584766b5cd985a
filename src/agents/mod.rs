//! Agent capabilities and the concrete agents built on them

pub mod event_generator;
pub mod summarizer;

pub use event_generator::EventGenerator;
pub use summarizer::Summarizer;

use async_trait::async_trait;

/// Construction-time identity of an agent
pub trait Persona
{   /// Name reported by `Agent::info` and used to qualify failures
    const NAME: &'static str;

    /// Token and temperature defaults when the caller sets none
    fn limits() -> crate::config::Limits
    {   crate::config::Limits::default()
    }

    /// Instruction text sent as the first message of every request.
    /// Called once when the agent is built; the result is cached.
    fn system_prompt() -> String;
}

/// Caller-facing capability shared by every agent
#[async_trait]
pub trait Agent: Send + Sync
{   /// Shared request/response machinery
    fn core(&self) -> &crate::client::AgentCore;

    /// Shape `input` into a task-specific instruction and return the
    /// model's reply
    async fn process(
      &self
    , input: &str
    , context: Option<&crate::Context>
    ) -> crate::error::Result<String>;

    fn info(&self) -> crate::AgentInfo
    {   self.core().info()
    }
}
