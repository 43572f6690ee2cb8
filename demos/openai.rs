//! Runs one prompt through the OpenAI backend.
//!
//! `OPENAI_KEY=... cargo run --example openai`

use ailib::{Ai, AiConfig};
use log::error;

#[tokio::main]
async fn main()
{   env_logger::init();

    let config = AiConfig
    {   api_key: std::env::var("OPENAI_KEY").unwrap_or_default()
      , model: "gpt-4o".to_string()
      , system_prompt: "You are a helpful assistant.".to_string()
      , temperature: 0.7
      , top_p: 1.0
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
