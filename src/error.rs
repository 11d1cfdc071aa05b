// Request fault taxonomy
// Faults carry full detail for server-side logs; clients only ever see
// the generic envelopes built in api::response.

use thiserror::Error;

/// Faults that can surface while a request moves through the middleware chain.
#[derive(Debug, Error)]
pub enum RequestFault {
    /// The request body could not be read or did not parse as its declared
    /// content type.
    #[error("malformed request body: {0}")]
    MalformedBody(String),

    /// A response envelope failed to serialize to JSON.
    #[error("failed to encode response body: {0}")]
    ResponseEncoding(#[from] serde_json::Error),

    /// A response could not be assembled from its parts.
    #[error("failed to build response: {0}")]
    ResponseBuild(#[from] hyper::http::Error),
}

impl RequestFault {
    /// Status code the terminal error handler maps this fault to.
    pub fn status(&self) -> hyper::StatusCode {
        match self {
            Self::MalformedBody(_) => hyper::StatusCode::BAD_REQUEST,
            Self::ResponseEncoding(_) | Self::ResponseBuild(_) => {
                hyper::StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}
