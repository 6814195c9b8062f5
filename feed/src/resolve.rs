use log::debug;
use serde_json::Value;

use crate::errors::TransportError;

pub const DEFAULT_RESOLUTION_ENDPOINT: &str =
    "https://gateway.reddit.com/desktopapi/v1/postcomments/";

/// Stream IDs are bare post IDs; the API keys posts by their `t3_` fullname.
pub fn post_id(stream_id: &str) -> String {
    format!("t3_{}", stream_id)
}

/// Reads `posts["t3_<id>"].liveCommentsWebsocket` out of a post description.
pub fn extract_socket_url(response: &Value, stream_id: &str) -> Option<String> {
    response
        .get("posts")?
        .get(post_id(stream_id))?
        .get("liveCommentsWebsocket")?
        .as_str()
        .filter(|url| !url.is_empty())
        .map(ToOwned::to_owned)
}

/// One request against the description endpoint to find the socket of a
/// live stream.
pub async fn resolve_socket_url(
    client: &reqwest::Client,
    endpoint: &str,
    stream_id: &str,
) -> Result<String, TransportError> {
    let url = format!("{}{}", endpoint, post_id(stream_id));
    debug!("Resolving live comments socket via {}", url);

    let response: Value = client
        .get(&url)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    extract_socket_url(&response, stream_id)
        .ok_or_else(|| TransportError::NoLiveSocket(stream_id.to_string()))
}
