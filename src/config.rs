//! Facade configuration and the shared argument checks

use serde::{Deserialize, Serialize};
use crate::error::{Error, Result};

pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Everything the facade needs to bind one adapter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig
{   /// Vendor API key, sent as header or query parameter
    pub api_key: String
  , /// Model identifier, also the vendor selector
    pub model: String
  , /// System instruction sent with every prompt
    pub system_prompt: String
  , /// Sampling temperature (range depends on vendor)
    pub temperature: f32
  , /// Nucleus sampling, 0 to 1
    pub top_p: f32
  , /// Generation cap; Anthropic only through the facade
    pub max_tokens: Option<u32>
  , /// Skip substring routing and use this vendor
    pub vendor: Option<crate::Vendor>
  , /// Override the vendor endpoint (proxies, test servers)
    pub base_url: Option<String>
  , /// Request timeout in seconds
    pub timeout_secs: Option<u64>
}

impl Default for AiConfig
{   fn default() -> Self
    {   AiConfig
        {   api_key: String::new()
          , model: String::new()
          , system_prompt: String::new()
          , temperature: 0.7
          , top_p: 1.0
          , max_tokens: None
          , vendor: None
          , base_url: None
          , timeout_secs: None
        }
    }
}

impl AiConfig
{   /// Parse a config from a JSON document; absent fields take defaults
    pub fn from_json(json: &str) -> Result<Self>
    {   Ok(serde_json::from_str(json)?)
    }

    /// Vendor this config routes to
    pub fn vendor(&self) -> crate::Vendor
    {   self.vendor
          .unwrap_or_else(|| crate::Vendor::from_model(&self.model))
    }

    /// Vendor-independent checks, in the order callers see them
    pub fn validate(&self) -> Result<()>
    {   require_non_empty(&self.api_key, "api key is required")?;
        require_non_empty(&self.model, "model is required")?;
        require_non_empty(
          &self.system_prompt,
          "system prompt is required"
        )?;
        check_range(self.top_p, 0.0, 1.0, "topP")?;
        Ok(())
    }

    /// Per-request deadline for the owned HTTP client
    pub fn timeout(&self) -> std::time::Duration
    {   std::time::Duration::from_secs(
          self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)
        )
    }
}

pub(crate) fn require_non_empty(value: &str, msg: &str)
  -> Result<()>
{   if value.is_empty()
    {   return Err(Error::InvalidArgument(msg.to_string()));
    }
    Ok(())
}

/// Inclusive range check; NaN is rejected
pub(crate) fn check_range(
  value: f32
, min: f32
, max: f32
, name: &str
) -> Result<()>
{   if !(min..=max).contains(&value)
    {   return Err(Error::InvalidArgument(format!(
          "{} must be between {} and {}",
          name, min, max
        )));
    }
    Ok(())
}

pub(crate) fn check_max_tokens(value: u32) -> Result<()>
{   if value < 1
    {   return Err(Error::InvalidArgument(
          "max tokens must be at least 1".to_string()
        ));
    }
    Ok(())
}

pub(crate) fn build_http_client(timeout: std::time::Duration)
  -> Result<reqwest::Client>
{   reqwest::Client::builder()
      .timeout(timeout)
      .build()
      .map_err(|e| Error::NetworkError(e.to_string()))
}
