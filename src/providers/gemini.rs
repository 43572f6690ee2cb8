use serde::{Deserialize, Serialize};
use log::{debug, error};

use crate::config::{self, check_max_tokens, check_range, require_non_empty};
use crate::error::{Error, Result};
use crate::request::ROLE_USER;

pub const GEMINI_API_BASE: &str
  = "https://generativelanguage.googleapis.com/v1beta/models";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

// ===== Wire Types =====

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part
{   #[serde(default)]
    pub text: String
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content
{   #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>
  , #[serde(default)]
    pub parts: Vec<Part>
}

impl Content
{   fn text(role: Option<&str>, text: &str) -> Self
    {   Content
        {   role: role.map(str::to_string)
          , parts: vec![Part { text: text.to_string() }]
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig
{   #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>
}

#[derive(Debug, Clone, Serialize)]
pub struct GeminiRequest
{   #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>
  , pub contents: Vec<Content>
  , #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate
{   #[serde(default)]
    pub content: Option<Content>
  , #[serde(default)]
    pub finish_reason: Option<String>
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata
{   #[serde(default)]
    pub prompt_token_count: usize
  , #[serde(default)]
    pub candidates_token_count: usize
  , #[serde(default)]
    pub total_token_count: usize
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiResponse
{   #[serde(default)]
    pub candidates: Vec<Candidate>
  , #[serde(default)]
    pub usage_metadata: Option<UsageMetadata>
  , #[serde(default)]
    pub model_version: Option<String>
}

impl GeminiResponse
{   /// Text of the first part of the first candidate
    pub fn first_text(&self) -> Option<&str>
    {   self.candidates.first()?
          .content.as_ref()?
          .parts.first()
          .map(|p| p.text.as_str())
    }
}

// ===== Adapter =====

/// generateContent adapter; the key travels as a query parameter
pub struct GeminiClient
{   api_key: String
  , base_url: String
  , model: String
  , system: String
  , generation: GenerationConfig
  , http_client: reqwest::Client
}

impl GeminiClient
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
    {   debug!("Creating GeminiClient");
        GeminiClient
        {   api_key: api_key.into()
          , base_url: GEMINI_API_BASE.to_string()
          , model: DEFAULT_MODEL.to_string()
          , system: String::new()
          , generation: GenerationConfig::default()
          , http_client
        }
    }

    /// Models collection URL; `/{model}:generateContent` is appended
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self
    {   self.base_url = base_url.into();
        self
    }

    pub fn set_model(&mut self, model: &str) -> Result<()>
    {   require_non_empty(model, "model cannot be empty")?;
        self.model = model.to_string();
        Ok(())
    }

    pub fn set_system_prompt(&mut self, system: &str) -> Result<()>
    {   require_non_empty(system, "system prompt cannot be empty")?;
        self.system = system.to_string();
        Ok(())
    }

    pub fn set_temperature(&mut self, temperature: f32) -> Result<()>
    {   check_range(temperature, 0.0, 1.0, "temperature")?;
        self.generation.temperature = Some(temperature);
        Ok(())
    }

    pub fn set_top_p(&mut self, top_p: f32) -> Result<()>
    {   check_range(top_p, 0.0, 1.0, "topP")?;
        self.generation.top_p = Some(top_p);
        Ok(())
    }

    pub fn set_max_tokens(&mut self, max_tokens: u32) -> Result<()>
    {   check_max_tokens(max_tokens)?;
        self.generation.max_output_tokens = Some(max_tokens);
        Ok(())
    }

    pub fn generation_config(&self) -> &GenerationConfig
    {   &self.generation
    }

    pub fn endpoint(&self) -> String
    {   format!("{}/{}:generateContent", self.base_url, self.model)
    }

    pub fn build_request(&self, prompt: &str) -> GeminiRequest
    {   let system_instruction = if self.system.is_empty()
        {   None
        } else
        {   Some(Content::text(None, &self.system))
        };
        let generation_config
          = if self.generation == GenerationConfig::default()
            {   None
            } else
            {   Some(self.generation.clone())
            };

        GeminiRequest
        {   system_instruction
          , contents: vec![Content::text(Some(ROLE_USER), prompt)]
          , generation_config
        }
    }
}

#[async_trait::async_trait]
impl crate::Completion for GeminiClient
{   fn vendor(&self) -> crate::Vendor
    {   crate::Vendor::Gemini
    }

    fn model(&self) -> &str
    {   &self.model
    }

    async fn complete(&self, prompt: &str)
      -> Result<crate::PromptResponse>
    {   debug!("Gemini completion for model: {}", self.model);
        let request = self.build_request(prompt);

        let builder = self.http_client
          .post(self.endpoint())
          .query(&[("key", self.api_key.as_str())]);

        let response: GeminiResponse = super::post_json(
          builder,
          &request,
          crate::Vendor::Gemini
        ).await?;

        let text = response.first_text()
          .map(str::to_string)
          .ok_or_else(|| {
            error!("No candidates in Gemini response");
            Error::EmptyResponse
          })?;

        Ok(crate::PromptResponse
        {   text
          , vendor: crate::Vendor::Gemini
          , model: response.model_version
              .unwrap_or_else(|| self.model.clone())
          , tokens_used: response.usage_metadata
              .map(|u| u.total_token_count)
        })
    }
}
