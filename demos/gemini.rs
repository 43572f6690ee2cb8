//! Runs one prompt through the Gemini backend.
//!
//! `GEMINI_KEY=... cargo run --example gemini`

use ailib::{Ai, AiConfig};
use log::error;

#[tokio::main]
async fn main()
{   env_logger::init();

    let config = AiConfig
    {   api_key: std::env::var("GEMINI_KEY").unwrap_or_default()
      , model: "gemini-1.5-flash".to_string()
      , system_prompt: "You are a helpful assistant.".to_string()
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
