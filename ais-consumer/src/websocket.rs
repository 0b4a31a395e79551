use ais_core::ConnectionStatus;
use async_trait::async_trait;
use futures::StreamExt;
use snafu::IntoError;
use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};
use tracing::{error, info, warn};

use crate::{
    error::error::WebSocketSnafu,
    transport::{AisTransport, TransportEvent},
};

type Stream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Live frames read from a websocket server.
///
/// The connection is made lazily on the first poll after `Connecting` has been reported.
/// There is no reconnect, a failed or dropped connection ends the transport.
pub struct WebSocketTransport {
    state: WebSocketState,
}

enum WebSocketState {
    Init(String),
    Connect(String),
    Open(Box<Stream>),
    Closing(Box<Stream>),
    Done,
}

impl WebSocketTransport {
    pub fn new(url: impl Into<String>) -> WebSocketTransport {
        WebSocketTransport {
            state: WebSocketState::Init(url.into()),
        }
    }

    fn finish(&mut self) -> Option<TransportEvent> {
        self.state = WebSocketState::Done;
        Some(TransportEvent::Status(ConnectionStatus::Closed))
    }
}

#[async_trait]
impl AisTransport for WebSocketTransport {
    async fn next_event(&mut self) -> Option<TransportEvent> {
        loop {
            match &mut self.state {
                WebSocketState::Init(url) => {
                    self.state = WebSocketState::Connect(std::mem::take(url));
                    return Some(TransportEvent::Status(ConnectionStatus::Connecting));
                }
                WebSocketState::Connect(url) => match connect_async(url.as_str()).await {
                    Ok((stream, _)) => {
                        info!("connected to {url}");
                        self.state = WebSocketState::Open(Box::new(stream));
                        return Some(TransportEvent::Status(ConnectionStatus::Open));
                    }
                    Err(e) => {
                        error!("failed to connect to {url}: {:?}", WebSocketSnafu.into_error(e));
                        return self.finish();
                    }
                },
                WebSocketState::Open(stream) => match stream.next().await {
                    Some(Ok(Message::Text(text))) => return Some(TransportEvent::Frame(text)),
                    Some(Ok(Message::Binary(bytes))) => match String::from_utf8(bytes) {
                        Ok(text) => return Some(TransportEvent::Frame(text)),
                        Err(e) => warn!("dropping non utf-8 binary frame: {e}"),
                    },
                    Some(Ok(Message::Close(frame))) => {
                        info!("server closed the connection: {frame:?}");
                        if let WebSocketState::Open(stream) =
                            std::mem::replace(&mut self.state, WebSocketState::Done)
                        {
                            self.state = WebSocketState::Closing(stream);
                        }
                        return Some(TransportEvent::Status(ConnectionStatus::Closing));
                    }
                    Some(Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_))) => {}
                    Some(Err(e)) => {
                        error!("websocket failed: {:?}", WebSocketSnafu.into_error(e));
                        return self.finish();
                    }
                    None => return self.finish(),
                },
                WebSocketState::Closing(stream) => match stream.next().await {
                    Some(Ok(_)) => {}
                    Some(Err(_)) | None => return self.finish(),
                },
                WebSocketState::Done => return None,
            }
        }
    }
}
