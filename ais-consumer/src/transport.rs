use ais_core::ConnectionStatus;
use async_trait::async_trait;
use futures::StreamExt;
use snafu::IntoError;
use tokio::io::AsyncRead;
use tokio_util::codec::{FramedRead, LinesCodec};
use tracing::error;

use crate::error::error::LinesSnafu;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Status(ConnectionStatus),
    Frame(String),
}

/// A source of live frames and connection status transitions.
#[async_trait]
pub trait AisTransport: Send {
    /// Returns `None` once the transport is exhausted, the last status emitted before that
    /// is always [`ConnectionStatus::Closed`].
    ///
    /// Must be cancel safe, it is polled inside `select!`.
    async fn next_event(&mut self) -> Option<TransportEvent>;
}

#[async_trait]
impl<T: AisTransport + ?Sized> AisTransport for Box<T> {
    async fn next_event(&mut self) -> Option<TransportEvent> {
        (**self).next_event().await
    }
}

/// Newline delimited frames read from any byte stream, such as stdin or a pipe.
pub struct LinesTransport<R> {
    state: LinesState<R>,
}

enum LinesState<R> {
    Start(FramedRead<R, LinesCodec>),
    Streaming(FramedRead<R, LinesCodec>),
    Done,
}

impl<R: AsyncRead + Unpin> LinesTransport<R> {
    pub fn new(source: R, max_frame_length: usize) -> LinesTransport<R> {
        let codec = LinesCodec::new_with_max_length(max_frame_length);
        LinesTransport {
            state: LinesState::Start(FramedRead::new(source, codec)),
        }
    }
}

#[async_trait]
impl<R: AsyncRead + Unpin + Send> AisTransport for LinesTransport<R> {
    async fn next_event(&mut self) -> Option<TransportEvent> {
        match &mut self.state {
            LinesState::Start(_) => {
                if let LinesState::Start(framed) =
                    std::mem::replace(&mut self.state, LinesState::Done)
                {
                    self.state = LinesState::Streaming(framed);
                }
                Some(TransportEvent::Status(ConnectionStatus::Open))
            }
            LinesState::Streaming(framed) => match framed.next().await {
                Some(Ok(line)) => Some(TransportEvent::Frame(line)),
                Some(Err(e)) => {
                    error!("live stream failed: {:?}", LinesSnafu.into_error(e));
                    self.state = LinesState::Done;
                    Some(TransportEvent::Status(ConnectionStatus::Closed))
                }
                None => {
                    self.state = LinesState::Done;
                    Some(TransportEvent::Status(ConnectionStatus::Closed))
                }
            },
            LinesState::Done => None,
        }
    }
}
