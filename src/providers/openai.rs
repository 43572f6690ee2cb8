use serde::{Deserialize, Serialize};
use log::{debug, error};

use crate::config::{self, check_range, require_non_empty};
use crate::error::{Error, Result};
use crate::request::ChatMessage;

pub const OPENAI_API_URL: &str
  = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const MAX_TEMPERATURE: f32 = 2.0;

// ===== Wire Types =====

#[derive(Debug, Clone, Serialize)]
pub struct OpenAiChatRequest
{   pub model: String
  , pub messages: Vec<ChatMessage>
  , pub temperature: f32
  , pub top_p: f32
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiChatResponse
{   #[serde(default)]
    pub id: String
  , #[serde(default)]
    pub model: String
  , #[serde(default)]
    pub choices: Vec<Choice>
  , #[serde(default)]
    pub usage: Option<Usage>
  , #[serde(default)]
    pub system_fingerprint: Option<String>
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice
{   pub message: ChoiceMessage
  , #[serde(default)]
    pub finish_reason: Option<String>
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChoiceMessage
{   #[serde(default)]
    pub role: Option<String>
  , #[serde(default)]
    pub content: Option<String>
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Usage
{   pub prompt_tokens: usize
  , pub completion_tokens: usize
  , pub total_tokens: usize
}

// ===== Adapter =====

/// Chat completions adapter, bearer-token auth
pub struct OpenAiClient
{   api_key: String
  , base_url: String
  , model: String
  , temperature: f32
  , top_p: f32
  , system_prompt: String
  , http_client: reqwest::Client
}

impl OpenAiClient
{   pub fn new(api_key: impl Into<String>) -> Result<Self>
    {   let http_client = config::build_http_client(
          std::time::Duration::from_secs(config::DEFAULT_TIMEOUT_SECS)
        )?;
        Ok(Self::with_http_client(api_key, http_client))
    }

    pub fn with_http_client(
      api_key: impl Into<String>
    , http_client: reqwest::Client
    ) -> Self
    {   debug!("Creating OpenAiClient");
        OpenAiClient
        {   api_key: api_key.into()
          , base_url: OPENAI_API_URL.to_string()
          , model: DEFAULT_MODEL.to_string()
          , temperature: 0.7
          , top_p: 1.0
          , system_prompt: String::new()
          , http_client
        }
    }

    /// Full endpoint URL, not a prefix
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self
    {   self.base_url = base_url.into();
        self
    }

    pub fn set_model(&mut self, model: &str) -> Result<()>
    {   require_non_empty(model, "model cannot be empty")?;
        self.model = model.to_string();
        Ok(())
    }

    pub fn set_temperature(&mut self, temperature: f32) -> Result<()>
    {   check_range(temperature, 0.0, MAX_TEMPERATURE, "temperature")?;
        self.temperature = temperature;
        Ok(())
    }

    pub fn set_top_p(&mut self, top_p: f32) -> Result<()>
    {   check_range(top_p, 0.0, 1.0, "topP")?;
        self.top_p = top_p;
        Ok(())
    }

    /// Rejects an empty prompt.
    ///
    /// Older releases of this adapter had the check inverted (empty
    /// accepted, anything else refused) and callers ignored the error.
    /// Code that relied on that now gets its system prompt sent.
    pub fn set_system_prompt(&mut self, prompt: &str) -> Result<()>
    {   require_non_empty(prompt, "system prompt cannot be empty")?;
        self.system_prompt = prompt.to_string();
        Ok(())
    }

    pub fn temperature(&self) -> f32
    {   self.temperature
    }

    pub fn top_p(&self) -> f32
    {   self.top_p
    }

    pub fn system_prompt(&self) -> &str
    {   &self.system_prompt
    }

    pub fn build_request(&self, prompt: &str) -> OpenAiChatRequest
    {   let mut messages = Vec::with_capacity(2);
        if !self.system_prompt.is_empty()
        {   messages.push(ChatMessage::developer(&self.system_prompt));
        }
        messages.push(ChatMessage::user(prompt));

        OpenAiChatRequest
        {   model: self.model.clone()
          , messages
          , temperature: self.temperature
          , top_p: self.top_p
        }
    }
}

#[async_trait::async_trait]
impl crate::Completion for OpenAiClient
{   fn vendor(&self) -> crate::Vendor
    {   crate::Vendor::OpenAi
    }

    fn model(&self) -> &str
    {   &self.model
    }

    async fn complete(&self, prompt: &str)
      -> Result<crate::PromptResponse>
    {   debug!("OpenAI completion for model: {}", self.model);
        let request = self.build_request(prompt);

        let builder = self.http_client
          .post(&self.base_url)
          .bearer_auth(&self.api_key);

        let response: OpenAiChatResponse = super::post_json(
          builder,
          &request,
          crate::Vendor::OpenAi
        ).await?;

        let text = response.choices.first()
          .and_then(|c| c.message.content.clone())
          .ok_or_else(|| {
            error!("No text choice in OpenAI response");
            Error::EmptyResponse
          })?;

        Ok(crate::PromptResponse
        {   text
          , vendor: crate::Vendor::OpenAi
          , model: if response.model.is_empty()
            {   self.model.clone()
            } else
            {   response.model
            }
          , tokens_used: response.usage.map(|u| u.total_tokens)
        })
    }
}
