//! In-process WebSocket backend for exercising the session core.

use std::sync::{Arc, Mutex};

use futures::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::accept_hdr_async;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::tungstenite::handshake::server::{Request, Response};

/// What the fake backend should do to a connected client.
pub enum ServerAction {
    /// Push a text frame to the client.
    Text(String),
    /// Close the connection from the server side.
    Close,
}

/// One accepted client connection.
pub struct BackendConn {
    /// Query string from the handshake request.
    pub query: Option<String>,
    /// Text frames received from the client, in order.
    pub received: mpsc::Receiver<String>,
    /// Server-side actions to run against this client.
    pub actions: mpsc::Sender<ServerAction>,
}

/// A listening fake backend.
pub struct Backend {
    /// `host:port` to dial.
    pub host: String,
    /// Accepted connections, in accept order.
    pub conns: mpsc::Receiver<BackendConn>,
}

/// Start a fake backend on an ephemeral local port.
pub async fn spawn_backend() -> Backend {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let host = listener.local_addr().expect("local addr").to_string();
    let (conn_tx, conns) = mpsc::channel(8);

    let _ = tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let _ = tokio::spawn(serve_client(stream, conn_tx.clone()));
        }
    });

    Backend { host, conns }
}

async fn serve_client(stream: TcpStream, conn_tx: mpsc::Sender<BackendConn>) {
    let query = Arc::new(Mutex::new(None));
    let seen = Arc::clone(&query);
    let callback = move |req: &Request, resp: Response| {
        *seen.lock().expect("query lock") = req.uri().query().map(str::to_owned);
        Ok(resp)
    };
    let Ok(ws) = accept_hdr_async(stream, callback).await else {
        return;
    };

    let (received_tx, received) = mpsc::channel(32);
    let (actions, mut action_rx) = mpsc::channel(32);
    let query = query.lock().expect("query lock").take();
    if conn_tx
        .send(BackendConn {
            query,
            received,
            actions,
        })
        .await
        .is_err()
    {
        return;
    }

    let (mut ws_tx, mut ws_rx) = ws.split();
    loop {
        tokio::select! {
            frame = ws_rx.next() => match frame {
                Some(Ok(WsMessage::Text(text))) => {
                    let _ = received_tx.send(text.as_str().to_owned()).await;
                }
                Some(Ok(WsMessage::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(_)) => break,
            },
            action = action_rx.recv() => match action {
                Some(ServerAction::Text(text)) => {
                    let _ = ws_tx.send(WsMessage::Text(text.into())).await;
                }
                Some(ServerAction::Close) => {
                    let _ = ws_tx.close().await;
                    break;
                }
                None => break,
            },
        }
    }
}
