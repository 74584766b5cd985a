use async_trait::async_trait;
use log::debug;

use crate::agents::{Agent, Persona};
use crate::client::AgentCore;
use crate::config::{AgentOptions, Limits};
use crate::error::{Error, Result};

/// Context key whose value is appended to the instruction
pub const ADDITIONAL_CONTEXT_KEY: &str = "additionalContext";

/// Generates event descriptions; tuned for creative variation
#[derive(Debug, Clone)]
pub struct EventGenerator
{   core: AgentCore
}

impl Persona for EventGenerator
{   const NAME: &'static str = "EventGenerator";

    fn limits() -> Limits
    {   Limits
        {   max_tokens: 1500
          , temperature: 0.8
        }
    }

    fn system_prompt() -> String
    {   String::new()
    }
}

impl EventGenerator
{   pub fn new(options: AgentOptions) -> Result<Self>
    {   Ok(EventGenerator
        {   core: AgentCore::new::<Self>(options)?
        })
    }

    /// Build with an explicit environment lookup
    pub fn with_lookup<F>(options: AgentOptions, lookup: F)
      -> Result<Self>
    where F: Fn(&str) -> Option<String>
    {   Ok(EventGenerator
        {   core: AgentCore::with_lookup::<Self, _>(options, lookup)?
        })
    }

    /// Append `additionalContext` as a labeled suffix when present
    pub fn instruction(
      input: &str
    , context: Option<&crate::Context>
    ) -> String
    {   match context.and_then(|c| c.text(ADDITIONAL_CONTEXT_KEY))
        {   Some(extra) => {
              format!("{}\n\nAdditional context: {}", input, extra)
            }
          , None => input.to_string()
        }
    }

    pub fn event_prompt(
      event_type: &str
    , audience: &str
    , duration: &str
    , constraints: Option<&str>
    ) -> String
    {   let mut prompt = format!(
          "Generate a detailed {} event for {} lasting {}.",
          event_type, audience, duration
        );
        if let Some(constraints) = constraints.filter(|c| !c.is_empty())
        {   prompt.push_str(" Constraints: ");
            prompt.push_str(constraints);
        }
        prompt
    }

    /// Generate an event of the given type, audience and duration
    pub async fn generate_event(
      &self
    , event_type: &str
    , audience: &str
    , duration: &str
    , constraints: Option<&str>
    ) -> Result<String>
    {   debug!("Generating {} event", event_type);
        let prompt = Self::event_prompt(
          event_type, audience, duration, constraints
        );
        self.process(&prompt, None).await
    }
}

#[async_trait]
impl Agent for EventGenerator
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

#[cfg(test)]
mod tests
{   use super::*;
    use crate::Context;

    #[test]
    fn test_event_prompt_contains_triple()
    {   let cases = [
          ("workshop", "engineers", "2 hours")
        , ("team-building", "new hires", "one afternoon")
        , ("quiz", "students aged 12", "45 minutes")
        ];
        for (kind, audience, duration) in cases
        {   let prompt = EventGenerator::event_prompt(
              kind, audience, duration, None
            );
            assert!(prompt.contains(kind));
            assert!(prompt.contains(audience));
            assert!(prompt.contains(duration));
            assert!(!prompt.contains("Constraints"));
        }
    }

    #[test]
    fn test_event_prompt_constraints_only_when_given()
    {   let prompt = EventGenerator::event_prompt(
          "hackathon", "students", "1 day", Some("budget under 500 PLN")
        );
        assert_eq!(
          prompt,
          "Generate a detailed hackathon event for students lasting 1 day. \
           Constraints: budget under 500 PLN"
        );
    }

    #[test]
    fn test_instruction_appends_additional_context()
    {   let context = Context::new()
          .with(ADDITIONAL_CONTEXT_KEY, "it is raining");
        assert_eq!(
          EventGenerator::instruction("plan a picnic", Some(&context)),
          "plan a picnic\n\nAdditional context: it is raining"
        );
        assert_eq!(
          EventGenerator::instruction("plan a picnic", None),
          "plan a picnic"
        );
        assert_eq!(
          EventGenerator::instruction(
            "plan a picnic",
            Some(&Context::new().with("length", "short"))
          ),
          "plan a picnic"
        );
    }

    #[test]
    fn test_persona_defaults()
    {   let agent = EventGenerator::with_lookup(
          AgentOptions::default().with_api_key("k"),
          |_| None
        ).unwrap();
        let info = agent.info();
        assert_eq!(info.name, "EventGenerator");
        assert_eq!(info.system_prompt, "");
        assert_eq!(agent.core().config().max_tokens, 1500);
        assert_eq!(agent.core().config().temperature, 0.8);
    }
}
