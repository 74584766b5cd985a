use log::{debug, trace, error};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};

use crate::config::{AgentConfig, AgentOptions};
use crate::error::{Error, Result, NO_RESPONSE};
use crate::request::{
  error_message_from_body, CompletionRequest, CompletionResponse
, ConversationMessage
};

/// Shared request/response machinery every agent delegates to.
///
/// Holds the resolved configuration, the cached system prompt and a
/// pooled HTTP client. Nothing here is mutated after construction, so
/// one core may serve concurrent calls.
#[derive(Debug, Clone)]
pub struct AgentCore
{   name: &'static str
  , config: AgentConfig
  , http_client: reqwest::Client
}

impl AgentCore
{   /// Build the core for a persona, reading fallbacks from the environment
    pub fn new<P: crate::agents::Persona>(options: AgentOptions)
      -> Result<Self>
    {   Self::with_lookup::<P, _>(options, crate::config::env_lookup)
    }

    /// Build the core with an explicit variable lookup.
    /// The persona's system prompt is produced here, once.
    pub fn with_lookup<P, F>(options: AgentOptions, lookup: F)
      -> Result<Self>
    where P: crate::agents::Persona
        , F: Fn(&str) -> Option<String>
    {   debug!("Creating AgentCore for {}", P::NAME);
        let config = AgentConfig::resolve_with(
          options,
          P::limits(),
          P::system_prompt(),
          lookup
        )?;
        Self::from_config(P::NAME, config)
    }

    pub fn from_config(name: &'static str, config: AgentConfig)
      -> Result<Self>
    {   let http_client = reqwest::Client::builder()
          .build()
          .map_err(|e| {
            error!("Failed to build HTTP client: {}", e);
            Error::InvalidConfiguration(e.to_string())
          })?;

        Ok(AgentCore
        {   name
          , config
          , http_client
        })
    }

    pub fn name(&self) -> &'static str
    {   self.name
    }

    pub fn config(&self) -> &AgentConfig
    {   &self.config
    }

    pub fn system_prompt(&self) -> &str
    {   &self.config.system_prompt
    }

    pub fn info(&self) -> crate::AgentInfo
    {   crate::AgentInfo
        {   name: self.name.to_string()
          , model: self.config.model.clone()
          , system_prompt: self.config.system_prompt.clone()
        }
    }

    /// Assemble the request body for one exchange.
    /// Limits come from the fixed configuration, never the call site.
    pub fn build_request(
      &self
    , user_message: &str
    , additional_messages: &[ConversationMessage]
    ) -> CompletionRequest
    {   let mut request = CompletionRequest::new(
          self.config.model.as_str(),
          self.system_prompt(),
          additional_messages,
          user_message
        );
        request.max_tokens = Some(self.config.max_tokens);
        request.temperature = Some(self.config.temperature);
        request.top_p = self.config.top_p;
        request.frequency_penalty = self.config.frequency_penalty;
        request.presence_penalty = self.config.presence_penalty;
        request
    }

    /// Send one non-streaming completion request and return the first
    /// choice's content verbatim.
    ///
    /// Every failure comes back as `Error::Api`.
    pub async fn send_message(
      &self
    , user_message: &str
    , additional_messages: &[ConversationMessage]
    ) -> Result<String>
    {   let request = self.build_request(
          user_message,
          additional_messages
        );
        debug!(
          "{} sending {} messages to {}",
          self.name, request.messages.len(), self.config.model
        );
        trace!("Completion request: {:?}", request);

        let response = self.http_client
          .post(self.config.completions_url())
          .header(AUTHORIZATION, format!("Bearer {}", self.config.api_key))
          .header(CONTENT_TYPE, "application/json")
          .header("HTTP-Referer", &self.config.site.referer)
          .header("X-Title", &self.config.site.title)
          .json(&request)
          .send()
          .await
          .map_err(|e| {
            error!("HTTP error: {}", e);
            Error::api(e.to_string())
          })?;

        let status = response.status();
        trace!("Completion response status: {}", status);

        if !status.is_success()
        {   let status_text = status
              .canonical_reason()
              .map(str::to_string)
              .unwrap_or_else(|| status.as_str().to_string());
            let body = response.bytes().await
              .map(|b| b.to_vec())
              .unwrap_or_default();
            let message
              = error_message_from_body(&body, &status_text);
            error!("OpenRouter API error ({}): {}", status, message);
            return Err(Error::api(message));
        }

        let completion: CompletionResponse
          = response.json().await.map_err(|e| {
            error!("Parse error: {}", e);
            Error::api(e.to_string())
          })?;

        if let Some(usage) = completion.usage()
        {   debug!(
              "{} used {} tokens",
              self.name, usage.total_tokens
            );
        }

        completion.first_content()
          .ok_or_else(|| {
            error!("No choices in response");
            Error::api(NO_RESPONSE)
          })
    }
}

#[cfg(test)]
mod tests
{   use super::*;
    use crate::agents::Persona;
    use crate::config::{Limits, API_KEY_VAR};
    use crate::request::Role;

    struct Terse;

    impl Persona for Terse
    {   const NAME: &'static str = "Terse";

        fn limits() -> Limits
        {   Limits { max_tokens: 42, temperature: 0.1 }
        }

        fn system_prompt() -> String
        {   "Answer in one word.".to_string()
        }
    }

    fn core() -> AgentCore
    {   AgentCore::with_lookup::<Terse, _>(
          AgentOptions::default().with_api_key("test-key"),
          |_| None
        ).unwrap()
    }

    #[test]
    fn test_missing_key_is_configuration_error()
    {   let result = AgentCore::with_lookup::<Terse, _>(
          AgentOptions::default(),
          |_| None
        );
        let err = result.unwrap_err();
        assert!(err.is_configuration());
        assert_eq!(err, Error::MissingApiKey(API_KEY_VAR.to_string()));
    }

    #[test]
    fn test_build_request_leads_with_single_system_entry()
    {   let core = core();
        let history = vec![
          ConversationMessage::user("earlier")
        , ConversationMessage::assistant("reply")
        ];

        for _ in 0..3
        {   let request = core.build_request("hi", &history);
            let systems = request.messages
              .iter()
              .filter(|m| m.role == Role::System)
              .count();
            assert_eq!(systems, 1);
            assert_eq!(request.messages[0].role, Role::System);
            assert_eq!(request.messages[0].content, "Answer in one word.");
            assert_eq!(request.messages.last().unwrap().content, "hi");
            assert_eq!(request.messages.len(), 4);
        }
    }

    #[test]
    fn test_build_request_uses_configured_limits()
    {   let request = core().build_request("hi", &[]);
        assert_eq!(request.model, crate::config::DEFAULT_MODEL);
        assert_eq!(request.max_tokens, Some(42));
        assert_eq!(request.temperature, Some(0.1));
        assert_eq!(request.stream, None);
    }

    #[test]
    fn test_info()
    {   let info = core().info();
        assert_eq!(info.name, "Terse");
        assert_eq!(info.system_prompt, "Answer in one word.");
    }
}
