//! Request and response pieces shared by the vendor adapters

use serde::{Deserialize, Serialize};

pub const ROLE_USER: &str = "user";
pub const ROLE_DEVELOPER: &str = "developer";

/// Role-tagged message, the wire shape OpenAI and Anthropic agree on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage
{   pub role: String
  , pub content: String
}

impl ChatMessage
{   pub fn user(content: impl Into<String>) -> Self
    {   ChatMessage
        {   role: ROLE_USER.to_string()
          , content: content.into()
        }
    }

    pub fn developer(content: impl Into<String>) -> Self
    {   ChatMessage
        {   role: ROLE_DEVELOPER.to_string()
          , content: content.into()
        }
    }
}

/// Unified prompt response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptResponse
{   /// Text of the first candidate
    pub text: String
  , /// Backend that generated it
    pub vendor: crate::Vendor
  , /// Model that generated it, as reported by the vendor when present
    pub model: String
  , /// Total tokens billed for the call, when reported
    pub tokens_used: Option<usize>
}
