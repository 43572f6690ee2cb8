use std::time::Duration;
use log::debug;

use crate::config::{check_range, AiConfig};
use crate::error::Result;
use crate::providers::{AnthropicClient, GeminiClient, OpenAiClient};
use crate::{Completion, Vendor};

/// Unified entry point: one validated config, one bound adapter.
///
/// Adapter fields are written only inside [`Ai::new`]; afterwards the
/// facade hands out shared references only, so calls from several
/// tasks at once never observe a half-applied configuration.
pub struct Ai
{   adapter: Box<dyn Completion>
}

impl Ai
{   /// Validate `config`, pick a vendor and bind its adapter
    pub fn new(config: AiConfig) -> Result<Self>
    {   config.validate()?;
        let http_client
          = crate::config::build_http_client(config.timeout())?;
        Self::bind(config, http_client)
    }

    /// Same as [`Ai::new`] with a caller-supplied HTTP client
    pub fn with_http_client(
      config: AiConfig
    , http_client: reqwest::Client
    ) -> Result<Self>
    {   config.validate()?;
        Self::bind(config, http_client)
    }

    fn bind(config: AiConfig, http_client: reqwest::Client)
      -> Result<Self>
    {   let vendor = config.vendor();
        debug!("Binding {} adapter for model: {}", vendor, config.model);

        let adapter: Box<dyn Completion> = match vendor
        {   Vendor::Anthropic => {
              check_range(config.temperature, 0.0, 1.0, "temperature")?;
              let mut claude = AnthropicClient::with_http_client(
                config.api_key,
                http_client
              );
              if let Some(url) = config.base_url
              {   claude = claude.with_base_url(url);
              }
              claude.set_model(&config.model)?;
              claude.set_temperature(config.temperature)?;
              claude.set_top_p(config.top_p)?;
              claude.set_system_prompt(&config.system_prompt)?;
              if let Some(max_tokens) = config.max_tokens
              {   claude.set_max_tokens(max_tokens)?;
              }
              Box::new(claude)
            }
          , Vendor::Gemini => {
              let mut gemini = GeminiClient::with_http_client(
                config.api_key,
                http_client
              );
              if let Some(url) = config.base_url
              {   gemini = gemini.with_base_url(url);
              }
              gemini.set_model(&config.model)?;
              gemini.set_system_prompt(&config.system_prompt)?;
              Box::new(gemini)
            }
          , Vendor::OpenAi => {
              check_range(
                config.temperature,
                0.0,
                crate::providers::openai::MAX_TEMPERATURE,
                "temperature"
              )?;
              let mut openai = OpenAiClient::with_http_client(
                config.api_key,
                http_client
              );
              if let Some(url) = config.base_url
              {   openai = openai.with_base_url(url);
              }
              openai.set_model(&config.model)?;
              openai.set_temperature(config.temperature)?;
              openai.set_top_p(config.top_p)?;
              openai.set_system_prompt(&config.system_prompt)?;
              Box::new(openai)
            }
        };

        Ok(Ai { adapter })
    }

    /// Backend the facade is bound to
    pub fn vendor(&self) -> Vendor
    {   self.adapter.vendor()
    }

    pub fn model(&self) -> &str
    {   self.adapter.model()
    }

    /// Generated text for `prompt`; adapter errors pass through as-is
    pub async fn get_completion(&self, prompt: &str) -> Result<String>
    {   self.adapter.get_completion(prompt).await
    }

    /// Like [`Ai::get_completion`] but keeps usage and model details
    pub async fn complete(&self, prompt: &str)
      -> Result<crate::PromptResponse>
    {   self.adapter.complete(prompt).await
    }

    /// [`Ai::get_completion`] bounded by `deadline`
    pub async fn get_completion_with_deadline(
      &self
    , prompt: &str
    , deadline: Duration
    ) -> Result<String>
    {   tokio::time::timeout(deadline, self.get_completion(prompt))
          .await?
    }
}

impl std::fmt::Debug for Ai
{   fn fmt(&self, f: &mut std::fmt::Formatter<'_>)
      -> std::fmt::Result
    {   f.debug_struct("Ai")
          .field("vendor", &self.vendor())
          .field("model", &self.model())
          .finish()
    }
}
