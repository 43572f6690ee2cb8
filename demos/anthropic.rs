//! Runs one prompt through the Anthropic backend.
//!
//! `ANTHROPIC_KEY=... cargo run --example anthropic`

use ailib::{Ai, AiConfig};
use log::error;

#[tokio::main]
async fn main()
{   env_logger::init();

    let config = AiConfig
    {   api_key: std::env::var("ANTHROPIC_KEY").unwrap_or_default()
      , model: "claude-3-5-sonnet-20241022".to_string()
      , system_prompt: "You are a helpful assistant.".to_string()
      , max_tokens: Some(1024)
      , ..AiConfig::default()
    };

    let ai = match Ai::new(config)
    {   Ok(ai) => ai
      , Err(e) => {
          error!("Error creating AI: {}", e);
          return;
        }
    };

    match ai.get_completion("Hello, how are you?").await
    {   Ok(text) => println!("{}", text)
      , Err(e) => error!("Error sending message: {}", e)
    }
}
