use std::fmt;

/// Error type for every ailib operation
/// Implements Clone so callers can stash and compare results
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error
{   /// Bad configuration value, raised before any network activity
    InvalidArgument(String)
  , /// Transport or connection failure
    NetworkError(String)
  , /// Request could not be encoded or response could not be decoded
    SerializationError(String)
  , /// Vendor answered with zero candidates
    EmptyResponse
  , /// Vendor answered with a non-success HTTP status
    ApiError
    {   status: u16
      , body: String
    }
  , /// Deadline elapsed before the vendor answered
    Timeout
}

impl fmt::Display for Error
{   fn fmt(&self, f: &mut fmt::Formatter<'_>)
      -> fmt::Result
    {   match self
        {   Error::InvalidArgument(msg) => {
              write!(f, "Invalid argument: {}", msg)
            }
          , Error::NetworkError(msg) => {
              write!(f, "Network error: {}", msg)
            }
          , Error::SerializationError(msg) => {
              write!(f, "Serialization error: {}", msg)
            }
          , Error::EmptyResponse => {
              write!(f, "API response contained no candidates")
            }
          , Error::ApiError { status, body } => {
              write!(f, "API error ({}): {}", status, body)
            }
          , Error::Timeout => {
              write!(f, "Request timed out")
            }
        }
    }
}

impl std::error::Error for Error {}

/// The request URL is stripped first: Gemini carries the key in it
impl From<reqwest::Error> for Error
{   fn from(e: reqwest::Error) -> Self
    {   let e = e.without_url();
        if e.is_timeout()
        {   Error::Timeout
        } else if e.is_decode()
        {   Error::SerializationError(e.to_string())
        } else
        {   Error::NetworkError(e.to_string())
        }
    }
}

impl From<serde_json::Error> for Error
{   fn from(e: serde_json::Error) -> Self
    {   Error::SerializationError(e.to_string())
    }
}

impl From<tokio::time::error::Elapsed> for Error
{   fn from(_: tokio::time::error::Elapsed) -> Self
    {   Error::Timeout
    }
}

pub type Result<T> = std::result::Result<T, Error>;
