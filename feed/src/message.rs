use serde_json::Value;
use structures::{Comment, FeedEnvelope, NEW_COMMENT_TYPE};

use crate::errors::DecodeError;

/// Decodes one socket frame. `Ok(None)` is a well-formed frame of a type we
/// don't consume.
pub fn decode_message(text: &str) -> Result<Option<Comment>, DecodeError> {
    let envelope: FeedEnvelope = serde_json::from_str(text).map_err(DecodeError::Envelope)?;

    if envelope.kind != NEW_COMMENT_TYPE {
        return Ok(None);
    }

    serde_json::from_value(envelope.payload.unwrap_or(Value::Null))
        .map(Some)
        .map_err(DecodeError::Payload)
}
