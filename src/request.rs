//! Wire types exchanged with the chat-completion endpoint

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Speaker of a conversation message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role
{   System
  , User
  , Assistant
}

/// One entry of the conversation sent to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationMessage
{   pub role: Role
  , pub content: String
}

impl ConversationMessage
{   pub fn new(role: Role, content: impl Into<String>) -> Self
    {   ConversationMessage
        {   role
          , content: content.into()
        }
    }

    pub fn system(content: impl Into<String>) -> Self
    {   Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self
    {   Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self
    {   Self::new(Role::Assistant, content)
    }
}

/// Body of `POST /chat/completions`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest
{   pub model: String
  , pub messages: Vec<ConversationMessage>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f32>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f32>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>
}

impl CompletionRequest
{   /// Lay out `[system, ...history, user]`.
    /// The system entry is always first and appears once.
    pub fn new(
      model: impl Into<String>
    , system_prompt: &str
    , history: &[ConversationMessage]
    , user_message: &str
    ) -> Self
    {   let mut messages
          = Vec::with_capacity(history.len() + 2);
        messages.push(ConversationMessage::system(system_prompt));
        messages.extend(history.iter().cloned());
        messages.push(ConversationMessage::user(user_message));

        CompletionRequest
        {   model: model.into()
          , messages
          , max_tokens: None
          , temperature: None
          , top_p: None
          , frequency_penalty: None
          , presence_penalty: None
          , stream: None
        }
    }
}

/// Treat an explicit `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D)
  -> std::result::Result<T, D::Error>
where
    D: serde::Deserializer<'de>
  , T: Default + Deserialize<'de>
{   Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// Only `content` is read; the other fields are kept loosely typed so a
// provider quirk in them cannot fail the call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseMessage
{   #[serde(default)]
    pub role: Option<Value>
  , #[serde(default)]
    pub content: Option<Value>
}

impl ResponseMessage
{   /// Text of the message; `null` or missing reads as empty
    pub fn text(self) -> String
    {   match self.content
        {   Some(Value::String(s)) => s
          , Some(Value::Null) | None => String::new()
          , Some(other) => other.to_string()
        }
    }
}

/// One candidate completion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice
{   #[serde(default)]
    pub index: Option<Value>
  , #[serde(default, deserialize_with = "null_as_default")]
    pub message: ResponseMessage
  , #[serde(default)]
    pub finish_reason: Option<Value>
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage
{   #[serde(default)]
    pub prompt_tokens: u64
  , #[serde(default)]
    pub completion_tokens: u64
  , #[serde(default)]
    pub total_tokens: u64
}

/// Successful reply of the completion endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionResponse
{   #[serde(default)]
    pub id: Option<Value>
  , #[serde(default)]
    pub object: Option<Value>
  , #[serde(default)]
    pub created: Option<Value>
  , #[serde(default)]
    pub model: Option<Value>
  , #[serde(default, deserialize_with = "null_as_default")]
    pub choices: Vec<Choice>
  , #[serde(default)]
    pub usage: Option<Value>
}

impl CompletionResponse
{   /// Content of the first choice, if any choice came back
    pub fn first_content(self) -> Option<String>
    {   self.choices
          .into_iter()
          .next()
          .map(|c| c.message.text())
    }

    /// Token accounting, when the provider sent a well-formed block
    pub fn usage(&self) -> Option<Usage>
    {   self.usage
          .as_ref()
          .and_then(|u| serde_json::from_value(u.clone()).ok())
    }
}

/// Pull a readable message out of a non-success response body.
///
/// The `error` field may be a plain string or an object with a
/// `message`; anything unreadable falls back to `status_text`.
pub fn error_message_from_body(body: &[u8], status_text: &str)
  -> String
{   let payload: Value
      = match serde_json::from_slice(body)
      {   Ok(v) => v
        , Err(_) => return status_text.to_string()
      };

    let described = match payload.get("error")
    {   Some(Value::String(s)) => s.clone()
      , Some(Value::Object(obj)) => {
          obj.get("message")
            .and_then(|m| m.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| {
              Value::Object(obj.clone()).to_string()
            })
        }
      , Some(Value::Null) | None => String::new()
      , Some(other) => other.to_string()
    };

    if described.is_empty()
    {   status_text.to_string()
    } else
    {   described
    }
}
