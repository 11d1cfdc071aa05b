// Body parsing middleware
//
// Parses request bodies according to their declared content type before
// routing. Parser error text stays server-side; clients only see the
// generic bad-request envelope built by the terminal error handler.

use crate::error::RequestFault;
use hyper::body::Bytes;
use hyper::header::HeaderValue;

/// Parse a collected request body according to its `Content-Type`.
///
/// - `application/json` bodies parse into a JSON value
/// - `application/x-www-form-urlencoded` bodies parse into a string map
/// - empty bodies and undeclared/unknown content types pass through unparsed
pub fn parse(
    content_type: Option<&HeaderValue>,
    bytes: &Bytes,
) -> Result<Option<serde_json::Value>, RequestFault> {
    if bytes.is_empty() {
        return Ok(None);
    }

    let Some(content_type) = content_type.and_then(|v| v.to_str().ok()) else {
        return Ok(None);
    };

    if content_type.starts_with("application/json") {
        let value = serde_json::from_slice(bytes)
            .map_err(|e| RequestFault::MalformedBody(format!("invalid JSON body: {e}")))?;
        return Ok(Some(value));
    }

    if content_type.starts_with("application/x-www-form-urlencoded") {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(bytes)
            .map_err(|e| RequestFault::MalformedBody(format!("invalid form body: {e}")))?;
        let map: serde_json::Map<String, serde_json::Value> = pairs
            .into_iter()
            .map(|(k, v)| (k, serde_json::Value::String(v)))
            .collect();
        return Ok(Some(serde_json::Value::Object(map)));
    }

    Ok(None)
}
