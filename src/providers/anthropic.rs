use serde::{Deserialize, Serialize};
use log::{debug, error};

use crate::config::{self, check_max_tokens, check_range, require_non_empty};
use crate::error::{Error, Result};
use crate::request::ChatMessage;

pub const ANTHROPIC_API_URL: &str
  = "https://api.anthropic.com/v1/messages";
pub const ANTHROPIC_VERSION: &str = "2023-06-01";
pub const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20241022";
pub const DEFAULT_MAX_TOKENS: u32 = 2480;

// ===== Wire Types =====

#[derive(Debug, Clone, Serialize)]
pub struct AnthropicRequest
{   pub model: String
  , pub temperature: f32
  , pub top_p: f32
  , pub max_tokens: u32
  , #[serde(skip_serializing_if = "String::is_empty")]
    pub system: String
  , pub messages: Vec<ChatMessage>
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContentBlock
{   #[serde(rename = "type", default)]
    pub kind: String
  , #[serde(default)]
    pub text: Option<String>
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnthropicResponse
{   #[serde(default)]
    pub id: String
  , #[serde(default)]
    pub content: Vec<ContentBlock>
  , #[serde(default)]
    pub model: String
  , #[serde(default)]
    pub stop_reason: Option<String>
  , #[serde(default)]
    pub stop_sequence: Option<String>
  , #[serde(default)]
    pub usage: Option<Usage>
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Usage
{   pub input_tokens: usize
  , pub output_tokens: usize
}

// ===== Adapter =====

/// Messages API adapter, `x-api-key` auth
pub struct AnthropicClient
{   api_key: String
  , base_url: String
  , model: String
  , temperature: f32
  , top_p: f32
  , max_tokens: u32
  , system: String
  , http_client: reqwest::Client
}

impl AnthropicClient
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
    {   debug!("Creating AnthropicClient");
        AnthropicClient
        {   api_key: api_key.into()
          , base_url: ANTHROPIC_API_URL.to_string()
          , model: DEFAULT_MODEL.to_string()
          , temperature: 0.7
          , top_p: 1.0
          , max_tokens: DEFAULT_MAX_TOKENS
          , system: String::new()
          , http_client
        }
    }

    /// Full endpoint URL, not a prefix
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self
    {   self.base_url = base_url.into();
        self
    }

    pub fn set_model(&mut self, model: &str) -> Result<()>
    {   require_non_empty(model, "model is required")?;
        self.model = model.to_string();
        Ok(())
    }

    pub fn set_temperature(&mut self, temperature: f32) -> Result<()>
    {   check_range(temperature, 0.0, 1.0, "temperature")?;
        self.temperature = temperature;
        Ok(())
    }

    pub fn set_top_p(&mut self, top_p: f32) -> Result<()>
    {   check_range(top_p, 0.0, 1.0, "topP")?;
        self.top_p = top_p;
        Ok(())
    }

    pub fn set_max_tokens(&mut self, max_tokens: u32) -> Result<()>
    {   check_max_tokens(max_tokens)?;
        self.max_tokens = max_tokens;
        Ok(())
    }

    pub fn set_system_prompt(&mut self, system: &str) -> Result<()>
    {   require_non_empty(system, "system is required")?;
        self.system = system.to_string();
        Ok(())
    }

    pub fn temperature(&self) -> f32
    {   self.temperature
    }

    pub fn top_p(&self) -> f32
    {   self.top_p
    }

    pub fn max_tokens(&self) -> u32
    {   self.max_tokens
    }

    pub fn build_request(&self, prompt: &str) -> AnthropicRequest
    {   AnthropicRequest
        {   model: self.model.clone()
          , temperature: self.temperature
          , top_p: self.top_p
          , max_tokens: self.max_tokens
          , system: self.system.clone()
          , messages: vec![ChatMessage::user(prompt)]
        }
    }
}

#[async_trait::async_trait]
impl crate::Completion for AnthropicClient
{   fn vendor(&self) -> crate::Vendor
    {   crate::Vendor::Anthropic
    }

    fn model(&self) -> &str
    {   &self.model
    }

    async fn complete(&self, prompt: &str)
      -> Result<crate::PromptResponse>
    {   debug!("Anthropic completion for model: {}", self.model);
        let request = self.build_request(prompt);

        let builder = self.http_client
          .post(&self.base_url)
          .header("x-api-key", &self.api_key)
          .header("anthropic-version", ANTHROPIC_VERSION);

        let response: AnthropicResponse = super::post_json(
          builder,
          &request,
          crate::Vendor::Anthropic
        ).await?;

        let text = response.content.iter()
          .find(|block| block.kind == "text")
          .and_then(|block| block.text.clone())
          .ok_or_else(|| {
            error!("No text block in Anthropic response");
            Error::EmptyResponse
          })?;

        Ok(crate::PromptResponse
        {   text
          , vendor: crate::Vendor::Anthropic
          , model: if response.model.is_empty()
            {   self.model.clone()
            } else
            {   response.model
            }
          , tokens_used: response.usage
              .map(|u| u.input_tokens + u.output_tokens)
        })
    }
}
