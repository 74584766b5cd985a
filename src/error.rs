use std::fmt;

/// Message carried when the service answers without any choice
pub const NO_RESPONSE: &str = "No response from OpenRouter API";

/// Custom error type for agent operations
/// Implements Clone so callers can fan a failure out
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error
{   /// No API key from the caller nor from the named variable
    MissingApiKey(String)
  , /// Limits or addresses that can never produce a valid request
    InvalidConfiguration(String)
  , /// Normalized transport failure: bad status, no choices,
    /// network fault or undecodable payload
    Api(String)
  , /// A specialized agent re-wrapping an underlying failure
    Processing
    {   agent: String
      , message: String
    }
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error
{   pub fn api(message: impl Into<String>) -> Self
    {   Error::Api(message.into())
    }

    /// Qualify a failure with the agent name, keeping the cause text
    pub fn processing(agent: &str, cause: Error) -> Self
    {   Error::Processing
        {   agent: agent.to_string()
          , message: cause.to_string()
        }
    }

    /// Construction-time failures that abort agent creation
    pub fn is_configuration(&self) -> bool
    {   matches!(
          self,
          Error::MissingApiKey(_) | Error::InvalidConfiguration(_)
        )
    }
}

impl fmt::Display for Error
{   fn fmt(&self, f: &mut fmt::Formatter<'_>)
      -> fmt::Result
    {   match self
        {   Error::MissingApiKey(var) => {
              write!(f,
                "OpenRouter API key not provided. Set {} in your environment.",
                var
              )
            }
          , Error::InvalidConfiguration(msg) => {
              write!(f, "Invalid configuration: {}", msg)
            }
          , Error::Api(msg) => {
              write!(f, "OpenRouter API Error: {}", msg)
            }
          , Error::Processing { agent, message } => {
              write!(f, "{} processing failed: {}", agent, message)
            }
        }
    }
}

impl std::error::Error for Error {}
