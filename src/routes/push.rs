//! Push channel
//!
//! A WebSocket per open viewer. The server only observes connects and
//! disconnects for now; the session loop owns the socket so server-to-client
//! events can be sent from here later.

use std::net::SocketAddr;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        ConnectInfo, State,
    },
    http::HeaderMap,
    response::Response,
    routing::get,
    Router,
};

use crate::presence::client_address;
use crate::state::AppState;

/// Create the push channel router
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(upgrade))
}

/// Handle WebSocket upgrade request
async fn upgrade(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    headers: HeaderMap,
    peer: Option<ConnectInfo<SocketAddr>>,
) -> Response {
    let client = client_address(&headers, peer.map(|ConnectInfo(addr)| addr));
    ws.on_upgrade(move |socket| handle_socket(socket, state, client))
}

/// Hold the viewer session open until the client goes away
async fn handle_socket(mut socket: WebSocket, state: AppState, client: String) {
    let session = state.viewers().connect(client);

    while let Some(msg) = socket.recv().await {
        match msg {
            Ok(Message::Close(_)) => break,
            // Clients have nothing to tell the server yet
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(session = %session.id(), "Push channel error: {}", e);
                break;
            }
        }
    }

    drop(session);
}
