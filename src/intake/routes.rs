//! Web chat surface: REST snapshot/reset plus a WebSocket chat.
//!
//! One shared session sits behind an async mutex, so turns from any
//! connected client are processed one at a time.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, mpsc};
use tower_http::cors::CorsLayer;
use tracing::{debug, info, warn};

use super::controller::DialogueController;
use super::model::{Profile, Session, Transcript};
use super::state::DialogueState;
use crate::channels::ReplySink;
use crate::error::ChannelError;

/// Shared state for the chat routes.
#[derive(Clone)]
pub struct ChatRouteState {
    pub controller: Arc<DialogueController>,
    pub session: Arc<Mutex<Session>>,
}

impl ChatRouteState {
    pub fn new(controller: Arc<DialogueController>) -> Self {
        let mut session = Session::new();
        controller.greet(&mut session);
        Self {
            controller,
            session: Arc::new(Mutex::new(session)),
        }
    }
}

/// JSON view of the session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub display_name: String,
    pub transcript: Transcript,
    pub profile: Profile,
    pub state: DialogueState,
}

impl From<&Session> for SessionSnapshot {
    fn from(session: &Session) -> Self {
        Self {
            display_name: session.display_name().to_string(),
            transcript: session.transcript.clone(),
            profile: session.profile.clone(),
            state: session.state.clone(),
        }
    }
}

// ── JSON Protocol ───────────────────────────────────────────────────────

/// Message from browser → server.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ClientMessage {
    Message { content: String },
    Reset,
}

/// Message from server → browser.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ServerMessage {
    /// Full transcript, sent on connect and after reset.
    Transcript { entries: Transcript },
    /// One fragment of a reply still being generated.
    StreamChunk { content: String },
    /// Final reply of a turn.
    Response { content: String },
    Error { message: String },
}

/// Forwards streamed fragments to the socket writer.
struct ChunkSink(mpsc::UnboundedSender<ServerMessage>);

impl ReplySink for ChunkSink {
    fn fragment(&mut self, text: &str) {
        let chunk = ServerMessage::StreamChunk {
            content: text.to_string(),
        };
        if self.0.send(chunk).is_err() {
            debug!(len = text.len(), "Stream chunk dropped, forwarder gone");
        }
    }
}

// ── REST ────────────────────────────────────────────────────────────────

/// GET /api/session
async fn get_session(State(state): State<ChatRouteState>) -> impl IntoResponse {
    let session = state.session.lock().await;
    Json(SessionSnapshot::from(&*session))
}

/// POST /api/session/reset
///
/// Replaces the whole session and returns the fresh snapshot.
async fn reset_session(State(state): State<ChatRouteState>) -> impl IntoResponse {
    let mut session = state.session.lock().await;
    session.reset();
    state.controller.greet(&mut session);
    info!(session_id = %session.id, "Session reset via REST");
    Json(SessionSnapshot::from(&*session))
}

// ── WebSocket ───────────────────────────────────────────────────────────

async fn ws_chat_handler(
    ws: WebSocketUpgrade,
    State(state): State<ChatRouteState>,
) -> impl IntoResponse {
    info!("Web chat client connecting");
    ws.on_upgrade(|socket| handle_chat_socket(socket, state))
}

async fn send_json(socket: &mut WebSocket, msg: &ServerMessage) -> bool {
    match serde_json::to_string(msg) {
        Ok(json) => socket.send(Message::Text(json.into())).await.is_ok(),
        Err(e) => {
            warn!(error = %e, "Failed to serialize server message");
            true
        }
    }
}

async fn send_transcript(socket: &mut WebSocket, state: &ChatRouteState) -> bool {
    let entries = state.session.lock().await.transcript.clone();
    send_json(socket, &ServerMessage::Transcript { entries }).await
}

/// Run one turn, streaming fragments to the socket while it is in flight.
async fn run_turn(socket: &mut WebSocket, state: &ChatRouteState, content: String) -> bool {
    let mut session = state.session.lock().await;
    let current = session.clone();
    let controller = Arc::clone(&state.controller);
    let (tx, mut rx) = mpsc::unbounded_channel();

    let turn = async move {
        let mut sink = ChunkSink(tx);
        controller.handle_turn(&current, &content, &mut sink).await
    };
    let forward = async {
        let mut connected = true;
        while let Some(msg) = rx.recv().await {
            if connected && !send_json(socket, &msg).await {
                connected = false;
            }
        }
        connected
    };

    let (outcome, connected) = tokio::join!(turn, forward);
    let reply = outcome.reply.clone();
    *session = outcome.session;
    drop(session);

    connected && send_json(socket, &ServerMessage::Response { content: reply }).await
}

async fn handle_chat_socket(mut socket: WebSocket, state: ChatRouteState) {
    info!("Web chat client connected");

    if !send_transcript(&mut socket, &state).await {
        return;
    }

    while let Some(result) = socket.recv().await {
        let keep_open = match result {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(ClientMessage::Message { content }) => {
                    if content.trim().is_empty() {
                        continue;
                    }
                    run_turn(&mut socket, &state, content).await
                }
                Ok(ClientMessage::Reset) => {
                    {
                        let mut session = state.session.lock().await;
                        session.reset();
                        state.controller.greet(&mut session);
                        info!(session_id = %session.id, "Session reset via WebSocket");
                    }
                    send_transcript(&mut socket, &state).await
                }
                Err(e) => {
                    let err = ChannelError::InvalidMessage(e.to_string());
                    debug!(error = %err, "Invalid JSON from web chat client");
                    send_json(
                        &mut socket,
                        &ServerMessage::Error {
                            message: err.to_string(),
                        },
                    )
                    .await
                }
            },
            Ok(Message::Ping(data)) => socket.send(Message::Pong(data)).await.is_ok(),
            Ok(Message::Close(_)) => false,
            Ok(_) => true,
            Err(e) => {
                warn!(error = %e, "Web chat WebSocket error");
                false
            }
        };
        if !keep_open {
            break;
        }
    }

    info!("Web chat connection closed");
}

/// Build the chat routes.
pub fn chat_routes(state: ChatRouteState) -> Router {
    Router::new()
        .route("/api/session", get(get_session))
        .route("/api/session/reset", post(reset_session))
        .route("/ws/chat", get(ws_chat_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
