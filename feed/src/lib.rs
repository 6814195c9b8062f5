mod connection;
mod errors;
mod message;
mod resolve;

pub use crate::connection::{
    ConnectionState, FeedConfig, FeedConnection, FeedEvent, SocketSource,
    DEFAULT_RESOLUTION_TIMEOUT,
};
pub use crate::errors::{DecodeError, TransportError};
pub use crate::message::decode_message;
pub use crate::resolve::{
    extract_socket_url, post_id, resolve_socket_url, DEFAULT_RESOLUTION_ENDPOINT,
};
pub use structures::Comment;
