use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use tokio::sync::broadcast::error::RecvError;

use crate::adapters::http::state::HttpState;
use crate::domain::pipeline::{PipelineView, WsStateMessage};

pub async fn ws_handler(ws: WebSocketUpgrade, State(st): State<HttpState>) -> impl axum::response::IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, st))
}

fn encode(view: PipelineView) -> String {
    serde_json::to_string(&WsStateMessage { r#type: "state".into(), view }).unwrap_or_default()
}

async fn handle_socket(mut socket: WebSocket, st: HttpState) {
    let mut rx = st.orchestrator.subscribe();

    // Current state first, then every change.
    if socket.send(Message::Text(encode(st.orchestrator.view()).into())).await.is_err() {
        return;
    }

    loop {
        let view = match rx.recv().await {
            Ok(view) => view,
            Err(RecvError::Lagged(_)) => st.orchestrator.view(),
            Err(RecvError::Closed) => break,
        };
        if socket.send(Message::Text(encode(view).into())).await.is_err() {
            break;
        }
    }
}
