//! WebSocket transport task
//!
//! Performs the handshake, then pumps frames both ways on a single task:
//! queued requests go out as text frames, inbound text frames go to the
//! client for correlation.

use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

use super::client::{Outbound, RpcClient};

/// Drive one connection until it closes or fails
pub(crate) async fn run(client: RpcClient) {
    let (stream, _response) = match tokio_tungstenite::connect_async(client.url()).await {
        Ok(connected) => connected,
        Err(e) => {
            client.handle_failure(&e.to_string());
            return;
        }
    };

    let (mut sink, mut source) = stream.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<Outbound>();
    if !client.handle_open(tx) {
        // Closed while the handshake was in flight
        let _ = sink.send(Message::Close(None)).await;
        return;
    }

    loop {
        tokio::select! {
            outbound = rx.recv() => match outbound {
                Some(Outbound::Text(text)) => {
                    if let Err(e) = sink.send(Message::Text(text.into())).await {
                        client.handle_failure(&e.to_string());
                        break;
                    }
                }
                Some(Outbound::Close) | None => {
                    let _ = sink.send(Message::Close(None)).await;
                    break;
                }
            },
            frame = source.next() => match frame {
                Some(Ok(Message::Text(text))) => client.handle_text(text.as_str()),
                Some(Ok(Message::Binary(data))) => client.handle_binary(data.len()),
                Some(Ok(Message::Ping(data))) => {
                    let _ = sink.send(Message::Pong(data)).await;
                }
                Some(Ok(Message::Close(frame))) => {
                    client.handle_remote_close(frame.map(|f| f.reason.to_string()));
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    client.handle_failure(&e.to_string());
                    break;
                }
                None => {
                    client.handle_failure("connection reset");
                    break;
                }
            },
        }
    }

    client.logger().debug(&format!("[transport] Socket task for {} finished", client.url()));
}
