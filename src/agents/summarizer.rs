use async_trait::async_trait;
use log::debug;

use crate::agents::{Agent, Persona};
use crate::client::AgentCore;
use crate::config::{AgentOptions, Limits};
use crate::error::{Error, Result};

pub const LENGTH_KEY: &str = "length";
pub const DEFAULT_LENGTH: &str = "medium";
pub const DEFAULT_MAX_POINTS: u32 = 5;

/// Summarizes content; tuned for faithfulness over creativity
#[derive(Debug, Clone)]
pub struct Summarizer
{   core: AgentCore
}

impl Persona for Summarizer
{   const NAME: &'static str = "Summarizer";

    fn limits() -> Limits
    {   Limits
        {   max_tokens: 800
          , temperature: 0.3
        }
    }

    fn system_prompt() -> String
    {   String::new()
    }
}

impl Summarizer
{   pub fn new(options: AgentOptions) -> Result<Self>
    {   Ok(Summarizer
        {   core: AgentCore::new::<Self>(options)?
        })
    }

    /// Build with an explicit environment lookup
    pub fn with_lookup<F>(options: AgentOptions, lookup: F)
      -> Result<Self>
    where F: Fn(&str) -> Option<String>
    {   Ok(Summarizer
        {   core: AgentCore::with_lookup::<Self, _>(options, lookup)?
        })
    }

    pub fn instruction(
      input: &str
    , context: Option<&crate::Context>
    ) -> String
    {   let length = context
          .and_then(|c| c.text(LENGTH_KEY))
          .unwrap_or_else(|| DEFAULT_LENGTH.to_string());
        format!(
          "Please summarize the following content with a {} length summary:\n\n{}",
          length, input
        )
    }

    pub fn length_prompt(
      content: &str
    , max_words: u32
    , focus_areas: &[String]
    ) -> String
    {   let focus = if focus_areas.is_empty()
        {   String::new()
        } else
        {   format!("\nFocus on these areas: {}.", focus_areas.join(", "))
        };
        format!(
          "Summarize the following content in {} words or less.{}\n\n{}",
          max_words, focus, content
        )
    }

    pub fn bullet_prompt(content: &str, max_points: u32) -> String
    {   format!(
          "Create a bullet point summary of the following content \
           with no more than {} key points:\n\n{}",
          max_points, content
        )
    }

    /// Summarize within a word ceiling, optionally steering the focus
    pub async fn summarize_with_length(
      &self
    , content: &str
    , max_words: u32
    , focus_areas: &[String]
    ) -> Result<String>
    {   debug!("Summarizing in at most {} words", max_words);
        let prompt = Self::length_prompt(content, max_words, focus_areas);
        self.process(&prompt, None).await
    }

    /// Bullet summary with at most `max_points` points (default 5)
    pub async fn create_bullet_summary(
      &self
    , content: &str
    , max_points: Option<u32>
    ) -> Result<String>
    {   let max_points = max_points.unwrap_or(DEFAULT_MAX_POINTS);
        debug!("Creating bullet summary with {} points", max_points);
        let prompt = Self::bullet_prompt(content, max_points);
        self.process(&prompt, None).await
    }
}

#[async_trait]
impl Agent for Summarizer
{   fn core(&self) -> &AgentCore
    {   &self.core
    }

    async fn process(
      &self
    , input: &str
    , context: Option<&crate::Context>
    ) -> Result<String>
    {   let prompt = Self::instruction(input, context);
        self.core
          .send_message(&prompt, &[])
          .await
          .map_err(|e| Error::processing(Self::NAME, e))
    }
}
