use std::time::Duration;

use futures_util::StreamExt;
use log::{debug, info, warn};
use structures::{Comment, Settings};
use tokio::net::TcpStream;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};

use crate::{
    errors::TransportError,
    message::decode_message,
    resolve::{resolve_socket_url, DEFAULT_RESOLUTION_ENDPOINT},
};

pub const DEFAULT_RESOLUTION_TIMEOUT: Duration = Duration::from_secs(10);

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Open,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedEvent {
    Connected,
    Comment(Comment),
    Disconnected,
}

/// Where the socket URL comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SocketSource {
    Direct(String),
    Stream(String),
}

#[derive(Debug, Clone)]
pub struct FeedConfig {
    pub comment_socket_url: Option<String>,
    pub stream_id: Option<String>,
    pub resolution_endpoint: String,
    pub resolution_timeout: Duration,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            comment_socket_url: None,
            stream_id: None,
            resolution_endpoint: DEFAULT_RESOLUTION_ENDPOINT.to_string(),
            resolution_timeout: DEFAULT_RESOLUTION_TIMEOUT,
        }
    }
}

impl FeedConfig {
    /// Empty strings in the settings mean "not configured".
    pub fn from_settings(settings: &Settings) -> Self {
        let non_empty = |value: &str| {
            let value = value.trim();
            (!value.is_empty()).then(|| value.to_string())
        };

        Self {
            comment_socket_url: non_empty(&settings.comment_socket_url),
            stream_id: non_empty(&settings.stream_id),
            ..Self::default()
        }
    }

    /// A direct socket URL wins over a stream ID.
    pub fn source(&self) -> Option<SocketSource> {
        if let Some(url) = &self.comment_socket_url {
            return Some(SocketSource::Direct(url.clone()));
        }

        self.stream_id.clone().map(SocketSource::Stream)
    }
}

/// A live comments socket. It never reconnects on its own: once closed,
/// `next_event` reports `Disconnected` once and the owner may call `open`
/// again.
pub struct FeedConnection {
    config: FeedConfig,
    state: ConnectionState,
    socket: Option<Socket>,
    announce_open: bool,
    announce_close: bool,
}

impl FeedConnection {
    pub fn new(config: FeedConfig) -> Self {
        Self {
            config,
            state: ConnectionState::Disconnected,
            socket: None,
            announce_open: false,
            announce_close: false,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    pub async fn open(&mut self) -> Result<(), TransportError> {
        if self.state == ConnectionState::Open {
            return Ok(());
        }

        self.state = ConnectionState::Connecting;
        self.announce_close = false;

        match self.establish().await {
            Ok(socket) => {
                info!("Feed connected");
                self.socket = Some(socket);
                self.state = ConnectionState::Open;
                self.announce_open = true;
                Ok(())
            }
            Err(err) => {
                self.state = ConnectionState::Closed;
                Err(err)
            }
        }
    }

    async fn establish(&self) -> Result<Socket, TransportError> {
        let url = match self.config.source() {
            Some(SocketSource::Direct(url)) => url,
            Some(SocketSource::Stream(stream_id)) => {
                let client = reqwest::Client::builder()
                    .timeout(self.config.resolution_timeout)
                    .build()?;
                resolve_socket_url(&client, &self.config.resolution_endpoint, &stream_id).await?
            }
            None => return Err(TransportError::NotConfigured),
        };

        debug!("Opening feed socket {}", url);
        let connected = connect_async(url.as_str()).await;
        let (socket, _response) =
            connected.map_err(|source| TransportError::Connect { url, source })?;

        Ok(socket)
    }

    /// Waits for the next thing worth reacting to. Frames that aren't
    /// comments are skipped here; undecodable ones are logged first.
    pub async fn next_event(&mut self) -> Option<FeedEvent> {
        if self.announce_open {
            self.announce_open = false;
            return Some(FeedEvent::Connected);
        }

        let Some(socket) = self.socket.as_mut() else {
            return self.take_close_announcement();
        };

        while let Some(frame) = socket.next().await {
            let text = match frame {
                Ok(Message::Text(text)) => text,
                Ok(Message::Close(_)) => break,
                Ok(_) => continue,
                Err(err) => {
                    warn!("Feed read error: {}", err);
                    break;
                }
            };

            match decode_message(&text) {
                Ok(Some(comment)) => return Some(FeedEvent::Comment(comment)),
                Ok(None) => continue,
                Err(err) => warn!("Feed message could not be parsed: {}", err),
            }
        }

        self.mark_closed();
        self.take_close_announcement()
    }

    pub async fn close(&mut self) {
        if let Some(mut socket) = self.socket.take() {
            if let Err(err) = socket.close(None).await {
                debug!("Feed socket did not close cleanly: {}", err);
            }
        }

        if matches!(
            self.state,
            ConnectionState::Connecting | ConnectionState::Open
        ) {
            self.mark_closed();
        }
    }

    fn mark_closed(&mut self) {
        info!("Feed disconnected");
        self.socket = None;
        self.state = ConnectionState::Closed;
        self.announce_open = false;
        self.announce_close = true;
    }

    fn take_close_announcement(&mut self) -> Option<FeedEvent> {
        if self.announce_close {
            self.announce_close = false;
            Some(FeedEvent::Disconnected)
        } else {
            None
        }
    }
}
