use thiserror::Error;
use tokio_tungstenite::tungstenite;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("neither commentSocketURL nor streamID is configured")]
    NotConfigured,
    #[error("stream {0} has no live comments socket")]
    NoLiveSocket(String),
    #[error("stream resolution request failed: {0}")]
    Resolution(#[from] reqwest::Error),
    #[error("could not open {url}: {source}")]
    Connect {
        url: String,
        source: tungstenite::Error,
    },
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("frame is not a feed envelope: {0}")]
    Envelope(serde_json::Error),
    #[error("comment payload is malformed: {0}")]
    Payload(serde_json::Error),
}
