//! Vendor adapters

pub mod anthropic;
pub mod gemini;
pub mod openai;

pub use anthropic::AnthropicClient;
pub use gemini::GeminiClient;
pub use openai::OpenAiClient;

use log::{error, trace};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Error;

/// Encode `body`, send the prepared POST, decode the reply.
///
/// Body is encoded up front so a marshal failure never reaches
/// the network.
pub(crate) async fn post_json<Req, Resp>(
  builder: reqwest::RequestBuilder
, body: &Req
, vendor: crate::Vendor
) -> Result<Resp, Error>
where
  Req: Serialize + std::fmt::Debug
, Resp: DeserializeOwned
{   trace!("{} request: {:?}", vendor, body);
    let payload = serde_json::to_vec(body).map_err(|e| {
      error!("Error marshalling {} request: {}", vendor, e);
      Error::SerializationError(e.to_string())
    })?;

    let response = builder
      .header("Content-Type", "application/json")
      .body(payload)
      .send()
      .await
      .map_err(|e| {
        let e = Error::from(e);
        error!("{} HTTP error: {}", vendor, e);
        e
      })?;

    let status = response.status();
    trace!("{} response status: {}", vendor, status);

    let bytes = response.bytes().await.map_err(|e| {
      let e = Error::from(e);
      error!("Error reading {} response: {}", vendor, e);
      e
    })?;

    if !status.is_success()
    {   let body = String::from_utf8_lossy(&bytes).into_owned();
        error!("{} API error {}: {}", vendor, status, body);
        return Err(Error::ApiError
        {   status: status.as_u16()
          , body
        });
    }

    serde_json::from_slice(&bytes).map_err(|e| {
      error!("Error unmarshalling {} response: {}", vendor, e);
      Error::SerializationError(e.to_string())
    })
}
