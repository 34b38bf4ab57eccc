//! One task per opened WebSocket.
//!
//! The task owns the socket halves and reports everything it sees to the link
//! actor as [`TransportEvent`]s tagged with its generation. It never decides
//! anything about reconnecting.

use super::machine::TransportFailure;

use crate::error::link::LinkError;

use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

#[derive(Debug)]
pub(crate) enum TransportEventKind {
    Opened,
    Frame(String),
    Failed(TransportFailure),
}

#[derive(Debug)]
pub(crate) struct TransportEvent {
    pub(crate) generation: u64,
    pub(crate) kind: TransportEventKind,
}

/// Handle the actor keeps for the live transport.
pub(crate) struct LiveTransport {
    pub(crate) generation: u64,
    pub(crate) writer: mpsc::UnboundedSender<Message>,
    shutdown: Option<oneshot::Sender<()>>,
}

impl LiveTransport {
    /// Spawn the transport task for `url`.
    pub(crate) fn open(
        generation: u64,
        url: String,
        events: mpsc::UnboundedSender<TransportEvent>,
    ) -> Self {
        let (writer, writer_rx) = mpsc::unbounded_channel();
        let (shutdown, shutdown_rx) = oneshot::channel();

        tokio::spawn(run(generation, url, writer_rx, shutdown_rx, events));

        Self {
            generation,
            writer,
            shutdown: Some(shutdown),
        }
    }

    /// Ask the task to close the socket. It emits no further events.
    pub(crate) fn close(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}

async fn run(
    generation: u64,
    url: String,
    mut writer_rx: mpsc::UnboundedReceiver<Message>,
    mut shutdown_rx: oneshot::Receiver<()>,
    events: mpsc::UnboundedSender<TransportEvent>,
) {
    let emit = |kind: TransportEventKind| {
        let _ = events.send(TransportEvent { generation, kind });
    };

    let connected = tokio::select! {
        result = connect_async(url.as_str()) => result,
        _ = &mut shutdown_rx => {
            debug!("Transport #{generation} closed before it opened");
            return;
        }
    };

    let ws_stream = match connected {
        Ok((ws_stream, response)) => {
            info!(
                "Transport #{generation} open to {url} (HTTP status: {})",
                response.status()
            );
            ws_stream
        }
        Err(e) => {
            let error = LinkError::from(e);
            error!("Transport #{generation} failed to open {url}: {error}");
            emit(TransportEventKind::Failed(TransportFailure::Error(
                error.to_string(),
            )));
            return;
        }
    };

    emit(TransportEventKind::Opened);
    let (mut sink, mut stream) = ws_stream.split();

    loop {
        tokio::select! {
            _ = &mut shutdown_rx => {
                debug!("Transport #{generation} closing on request");
                let _ = sink.close().await;
                return;
            }
            outgoing = writer_rx.recv() => match outgoing {
                Some(message) => {
                    if let Err(e) = sink.send(message).await {
                        error!("Transport #{generation} send failed: {e}");
                        emit(TransportEventKind::Failed(TransportFailure::Error(e.to_string())));
                        return;
                    }
                }
                None => {
                    let _ = sink.close().await;
                    return;
                }
            },
            incoming = stream.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    emit(TransportEventKind::Frame(text.as_str().to_owned()));
                }
                Some(Ok(Message::Binary(bytes))) => match String::from_utf8(bytes.to_vec()) {
                    Ok(text) => emit(TransportEventKind::Frame(text)),
                    Err(_) => warn!(
                        "Transport #{generation} dropped non-UTF-8 binary frame ({} bytes)",
                        bytes.len()
                    ),
                },
                Some(Ok(Message::Close(frame))) => {
                    let reason = frame.map(|f| f.reason.as_str().to_owned());
                    info!("Transport #{generation} closed by peer: {:?}", reason);
                    emit(TransportEventKind::Failed(TransportFailure::Closed(reason)));
                    return;
                }
                // Ping/pong are answered by tungstenite.
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    error!("Transport #{generation} read failed: {e}");
                    emit(TransportEventKind::Failed(TransportFailure::Error(e.to_string())));
                    return;
                }
                None => {
                    emit(TransportEventKind::Failed(TransportFailure::Closed(None)));
                    return;
                }
            },
        }
    }
}
