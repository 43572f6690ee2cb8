//! ailib: one completion call shape over several vendor HTTP APIs.
//!
//! ```text
//! AiConfig ──► Ai::new ──► Vendor::from_model ──► adapter (Box<dyn Completion>)
//!                                                  ├── providers::openai
//!                                                  ├── providers::anthropic
//!                                                  └── providers::gemini
//! ```
//!
//! The facade is built once and never reconfigured; each
//! `get_completion` is exactly one POST to the selected vendor.

pub mod error;
pub mod config;
pub mod providers;
pub mod request;
pub mod client;

use serde::{Deserialize, Serialize};

pub use client::Ai;
pub use config::AiConfig;
pub use error::{Error, Result};
pub use request::PromptResponse;

// ===== Vendors =====

/// Backends reachable through the facade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Vendor
{   /// Anthropic messages API (Claude models)
    Anthropic
  , /// OpenAI chat completions API, also the fallback
    OpenAi
  , /// Google generative language API (Gemini models)
    Gemini
}

/// Model substring routing to Anthropic
pub const ANTHROPIC_MARKER: &str = "claude";
/// Model substring routing to Gemini
pub const GEMINI_MARKER: &str = "gemini";

impl Vendor
{   /// Pick a backend from a free-text model identifier.
    ///
    /// Case-sensitive substring match: `claude` wins first, then
    /// `gemini`, and anything else (including `Claude-3`) goes to
    /// OpenAI.
    pub fn from_model(model: &str) -> Vendor
    {   if model.contains(ANTHROPIC_MARKER)
        {   Vendor::Anthropic
        } else if model.contains(GEMINI_MARKER)
        {   Vendor::Gemini
        } else
        {   Vendor::OpenAi
        }
    }
}

impl std::fmt::Display for Vendor
{   fn fmt(&self, f: &mut std::fmt::Formatter<'_>)
      -> std::fmt::Result
    {   let name = match self
        {   Vendor::Anthropic => "anthropic"
          , Vendor::OpenAi => "openai"
          , Vendor::Gemini => "gemini"
        };
        f.write_str(name)
    }
}

// ===== Completion capability =====

/// Anything that can turn a prompt into generated text.
#[async_trait::async_trait]
pub trait Completion: Send + Sync
{   /// Backend this adapter talks to
    fn vendor(&self) -> Vendor;

    /// Model identifier sent on the wire
    fn model(&self) -> &str;

    /// One request/response round trip, first candidate plus usage
    async fn complete(&self, prompt: &str)
      -> Result<PromptResponse>;

    /// Text of the first candidate only
    async fn get_completion(&self, prompt: &str)
      -> Result<String>
    {   self.complete(prompt).await.map(|r| r.text)
    }
}
