//! Configuration resolution for agents and the HTTP server

use serde::{Deserialize, Serialize};
use std::fmt;
use log::{debug, error};

pub const API_KEY_VAR: &str = "OPENROUTER_API_KEY";
pub const API_URL_VAR: &str = "OPENROUTER_API_URL";
pub const SITE_URL_VAR: &str = "YOUR_SITE_URL";
pub const SITE_NAME_VAR: &str = "YOUR_SITE_NAME";
pub const BIND_ADDR_VAR: &str = "BIND_ADDR";

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_MODEL: &str = "openai/gpt-3.5-turbo";
pub const DEFAULT_MAX_TOKENS: u32 = 1000;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_SITE_URL: &str = "http://localhost:3000";
pub const DEFAULT_SITE_NAME: &str = "Make a Choice API";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";

/// Caller-supplied construction options; every field may be left unset
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentOptions
{   pub api_key: Option<String>
  , pub model: Option<String>
  , pub base_url: Option<String>
  , pub max_tokens: Option<u32>
  , pub temperature: Option<f32>
  , pub top_p: Option<f32>
  , pub frequency_penalty: Option<f32>
  , pub presence_penalty: Option<f32>
}

impl AgentOptions
{   pub fn with_api_key(mut self, key: impl Into<String>) -> Self
    {   self.api_key = Some(key.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self
    {   self.model = Some(model.into());
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self
    {   self.base_url = Some(url.into());
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self
    {   self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self
    {   self.temperature = Some(temperature);
        self
    }
}

/// Limits an agent falls back to when the caller sets none
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Limits
{   pub max_tokens: u32
  , pub temperature: f32
}

impl Default for Limits
{   fn default() -> Self
    {   Limits
        {   max_tokens: DEFAULT_MAX_TOKENS
          , temperature: DEFAULT_TEMPERATURE
        }
    }
}

/// Descriptive headers sent with every completion request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteHeaders
{   /// Value of `HTTP-Referer`
    pub referer: String
  , /// Value of `X-Title`
    pub title: String
}

impl Default for SiteHeaders
{   fn default() -> Self
    {   SiteHeaders
        {   referer: DEFAULT_SITE_URL.to_string()
          , title: DEFAULT_SITE_NAME.to_string()
        }
    }
}

/// Fully resolved agent configuration, fixed for the agent's lifetime
#[derive(Clone, PartialEq)]
pub struct AgentConfig
{   pub api_key: String
  , pub base_url: String
  , pub model: String
  , pub system_prompt: String
  , pub max_tokens: u32
  , pub temperature: f32
  , pub top_p: Option<f32>
  , pub frequency_penalty: Option<f32>
  , pub presence_penalty: Option<f32>
  , pub site: SiteHeaders
}

impl fmt::Debug for AgentConfig
{   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {   f.debug_struct("AgentConfig")
          .field("api_key", &"<redacted>")
          .field("base_url", &self.base_url)
          .field("model", &self.model)
          .field("system_prompt", &self.system_prompt)
          .field("max_tokens", &self.max_tokens)
          .field("temperature", &self.temperature)
          .field("top_p", &self.top_p)
          .field("frequency_penalty", &self.frequency_penalty)
          .field("presence_penalty", &self.presence_penalty)
          .field("site", &self.site)
          .finish()
    }
}

/// Process environment lookup used by `AgentCore::new`
pub fn env_lookup(key: &str) -> Option<String>
{   std::env::var(key).ok()
}

fn non_empty(value: Option<String>) -> Option<String>
{   value.filter(|v| !v.trim().is_empty())
}

impl AgentConfig
{   /// Resolve each field as explicit option, then `lookup`, then default.
    /// A missing API key fails here, before any request is built.
    pub fn resolve_with<F>(
      options: AgentOptions
    , limits: Limits
    , system_prompt: String
    , lookup: F
    ) -> crate::error::Result<Self>
    where F: Fn(&str) -> Option<String>
    {   let var = |key: &str| non_empty(lookup(key));

        let api_key = non_empty(options.api_key)
          .or_else(|| var(API_KEY_VAR))
          .ok_or_else(|| {
            error!("No API key given and {} is unset", API_KEY_VAR);
            crate::error::Error::MissingApiKey(API_KEY_VAR.to_string())
          })?;

        let base_url = non_empty(options.base_url)
          .or_else(|| var(API_URL_VAR))
          .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
          .trim_end_matches('/')
          .to_string();

        let model = non_empty(options.model)
          .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let defaults = SiteHeaders::default();
        let site = SiteHeaders
        {   referer: var(SITE_URL_VAR).unwrap_or(defaults.referer)
          , title: var(SITE_NAME_VAR).unwrap_or(defaults.title)
        };

        let config = AgentConfig
        {   api_key
          , base_url
          , model
          , system_prompt
          , max_tokens: options.max_tokens.unwrap_or(limits.max_tokens)
          , temperature: options.temperature
              .unwrap_or(limits.temperature)
          , top_p: options.top_p
          , frequency_penalty: options.frequency_penalty
          , presence_penalty: options.presence_penalty
          , site
        };
        config.validate()?;

        debug!(
          "Resolved agent config: model={} base_url={}",
          config.model, config.base_url
        );
        Ok(config)
    }

    fn validate(&self) -> crate::error::Result<()>
    {   if self.max_tokens == 0
        {   return Err(crate::error::Error::InvalidConfiguration(
              "max_tokens must be positive".to_string()
            ));
        }
        if !(0.0..=2.0).contains(&self.temperature)
        {   return Err(crate::error::Error::InvalidConfiguration(
              format!(
                "temperature {} is outside [0, 2]",
                self.temperature
              )
            ));
        }
        Ok(())
    }

    pub fn completions_url(&self) -> String
    {   format!("{}/chat/completions", self.base_url)
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig
{   pub bind_addr: String
}

impl ServerConfig
{   pub fn from_env() -> Self
    {   ServerConfig
        {   bind_addr: non_empty(env_lookup(BIND_ADDR_VAR))
              .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
        }
    }
}

#[cfg(test)]
mod tests
{   use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)])
      -> impl Fn(&str) -> Option<String>
    {   let vars: HashMap<String, String> = pairs
          .iter()
          .map(|(k, v)| (k.to_string(), v.to_string()))
          .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_missing_key_fails_at_resolution()
    {   let result = AgentConfig::resolve_with(
          AgentOptions::default(),
          Limits::default(),
          String::new(),
          lookup_from(&[])
        );
        assert_eq!(
          result.unwrap_err(),
          crate::error::Error::MissingApiKey(API_KEY_VAR.to_string())
        );
    }

    #[test]
    fn test_empty_explicit_key_falls_back_to_env()
    {   let config = AgentConfig::resolve_with(
          AgentOptions::default().with_api_key(""),
          Limits::default(),
          String::new(),
          lookup_from(&[(API_KEY_VAR, "env-key")])
        ).unwrap();
        assert_eq!(config.api_key, "env-key");
    }

    #[test]
    fn test_explicit_values_win()
    {   let config = AgentConfig::resolve_with(
          AgentOptions::default()
            .with_api_key("explicit")
            .with_model("anthropic/claude-3.5-haiku")
            .with_base_url("http://localhost:9999/v1/"),
          Limits { max_tokens: 800, temperature: 0.3 },
          "prompt".to_string(),
          lookup_from(&[
            (API_KEY_VAR, "env-key")
          , (API_URL_VAR, "http://ignored")
          ])
        ).unwrap();

        assert_eq!(config.api_key, "explicit");
        assert_eq!(config.model, "anthropic/claude-3.5-haiku");
        assert_eq!(
          config.completions_url(),
          "http://localhost:9999/v1/chat/completions"
        );
        assert_eq!(config.max_tokens, 800);
        assert_eq!(config.temperature, 0.3);
        assert_eq!(config.system_prompt, "prompt");
    }

    #[test]
    fn test_defaults_and_site_headers()
    {   let config = AgentConfig::resolve_with(
          AgentOptions::default(),
          Limits::default(),
          String::new(),
          lookup_from(&[
            (API_KEY_VAR, "k")
          , (SITE_NAME_VAR, "Demo")
          ])
        ).unwrap();

        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.max_tokens, DEFAULT_MAX_TOKENS);
        assert_eq!(config.site.referer, DEFAULT_SITE_URL);
        assert_eq!(config.site.title, "Demo");
    }

    #[test]
    fn test_out_of_range_limits_rejected()
    {   let hot = AgentConfig::resolve_with(
          AgentOptions::default().with_temperature(2.5),
          Limits::default(),
          String::new(),
          lookup_from(&[(API_KEY_VAR, "k")])
        );
        assert!(matches!(
          hot,
          Err(crate::error::Error::InvalidConfiguration(_))
        ));

        let empty = AgentConfig::resolve_with(
          AgentOptions::default().with_max_tokens(0),
          Limits::default(),
          String::new(),
          lookup_from(&[(API_KEY_VAR, "k")])
        );
        assert!(matches!(
          empty,
          Err(crate::error::Error::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_debug_redacts_key()
    {   let config = AgentConfig::resolve_with(
          AgentOptions::default().with_api_key("sk-secret"),
          Limits::default(),
          String::new(),
          lookup_from(&[])
        ).unwrap();
        assert!(!format!("{:?}", config).contains("sk-secret"));
    }
}
