//! Integration tests for the web chat WebSocket + REST surface.
//!
//! Each test spins up an Axum server on a random port, connects via
//! tokio-tungstenite, and walks the intake conversation over the wire.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt as _;
use futures_util::SinkExt;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::time::timeout;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use grievance_assist::config::AssistantConfig;
use grievance_assist::error::LlmError;
use grievance_assist::intake::prompts::GREETING;
use grievance_assist::intake::{ChatRouteState, DialogueController, chat_routes};
use grievance_assist::llm::{CompletionRequest, CompletionResponse, FragmentStream, LlmProvider};

/// Maximum time any test is allowed to run before we consider it hung.
const TEST_TIMEOUT: Duration = Duration::from_secs(5);

const CHAT_FRAGMENTS: [&str; 3] = ["Your refund ", "request is ", "being processed."];

/// Stub LLM provider (no real backend calls). Classifies everything as
/// Finance and streams a fixed chat reply in three fragments.
struct StubLlm;

#[async_trait]
impl LlmProvider for StubLlm {
    fn model_name(&self) -> &str {
        "stub"
    }

    async fn complete(&self, _request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        Ok(CompletionResponse {
            content: "Finance".to_string(),
        })
    }

    async fn stream(&self, _request: CompletionRequest) -> Result<FragmentStream, LlmError> {
        let fragments = CHAT_FRAGMENTS.map(|f| Ok::<_, LlmError>(f.to_string()));
        Ok(futures::stream::iter(fragments).boxed())
    }
}

/// Start an Axum server on a random port, return (port, state).
async fn start_server() -> (u16, ChatRouteState) {
    let llm: Arc<dyn LlmProvider> = Arc::new(StubLlm);
    let controller = Arc::new(DialogueController::new(llm, AssistantConfig::default()));
    let state = ChatRouteState::new(controller);
    let app = chat_routes(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    // Give the server a moment to start accepting connections.
    tokio::time::sleep(Duration::from_millis(50)).await;

    (port, state)
}

/// Parse a WS text frame into a serde_json::Value.
fn parse_ws_json(msg: &Message) -> Value {
    match msg {
        Message::Text(txt) => serde_json::from_str(txt).expect("invalid JSON from server"),
        other => panic!("expected Text frame, got {:?}", other),
    }
}

type Ws = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

async fn connect(port: u16) -> Ws {
    let (ws, _resp) = connect_async(format!("ws://127.0.0.1:{port}/ws/chat"))
        .await
        .expect("WS connect failed");
    ws
}

async fn next_json(ws: &mut Ws) -> Value {
    let msg = ws.next().await.unwrap().unwrap();
    parse_ws_json(&msg)
}

/// Send a chat message and return (stream chunks, final response).
async fn say(ws: &mut Ws, content: &str) -> (Vec<String>, String) {
    ws.send(Message::Text(
        json!({"type": "message", "content": content}).to_string().into(),
    ))
    .await
    .unwrap();

    let mut chunks = Vec::new();
    loop {
        let json = next_json(ws).await;
        match json["type"].as_str() {
            Some("stream_chunk") => chunks.push(json["content"].as_str().unwrap().to_string()),
            Some("response") => return (chunks, json["content"].as_str().unwrap().to_string()),
            other => panic!("unexpected frame type {:?}: {json}", other),
        }
    }
}

// ── WebSocket Tests ──────────────────────────────────────────────────

#[tokio::test]
async fn ws_connect_receives_greeting_transcript() {
    timeout(TEST_TIMEOUT, async {
        let (port, _state) = start_server().await;
        let mut ws = connect(port).await;

        let json = next_json(&mut ws).await;
        assert_eq!(json["type"], "transcript");
        let entries = json["entries"].as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["role"], "assistant");
        assert_eq!(entries[0]["content"], GREETING);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn ws_full_intake_then_streamed_chat() {
    timeout(TEST_TIMEOUT, async {
        let (port, state) = start_server().await;
        let mut ws = connect(port).await;
        let _ = next_json(&mut ws).await;

        let (_, reply) = say(&mut ws, "Alice").await;
        assert_eq!(reply, "What's your gender?");

        let (_, reply) = say(&mut ws, "Female").await;
        assert_eq!(reply, "What's your postal PIN code?");

        let (_, reply) = say(&mut ws, "110001").await;
        assert_eq!(reply, "Do you have any disability? (Yes/No)");

        let (_, reply) = say(&mut ws, "No").await;
        assert_eq!(reply, "Any grievance you'd like to share?");

        let (chunks, reply) = say(&mut ws, "My refund is pending").await;
        assert!(chunks.is_empty());
        assert!(reply.contains("- **Pin**: 110001"));
        assert!(reply.contains("`confirm`"));

        let (chunks, reply) = say(&mut ws, "confirm").await;
        assert!(chunks.is_empty());
        assert!(reply.contains("**Finance**"));
        assert!(reply.contains("**Refund & Finance Dept**"));

        // After confirmation free text is chatted, and the reply streams.
        let (chunks, reply) = say(&mut ws, "When will I get my money?").await;
        assert_eq!(chunks, CHAT_FRAGMENTS.map(String::from).to_vec());
        assert_eq!(reply, CHAT_FRAGMENTS.concat());

        let session = state.session.lock().await;
        assert!(session.state.confirmed);
        assert_eq!(session.display_name(), "Alice");
        assert_eq!(session.transcript.last().unwrap().content, CHAT_FRAGMENTS.concat());
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn ws_invalid_value_is_rejected_and_reasked() {
    timeout(TEST_TIMEOUT, async {
        let (port, state) = start_server().await;
        let mut ws = connect(port).await;
        let _ = next_json(&mut ws).await;

        say(&mut ws, "Bob").await;
        let (_, reply) = say(&mut ws, "robot").await;
        assert!(reply.contains("valid"), "got: {reply}");

        let session = state.session.lock().await;
        assert!(session.profile.gender.is_none());
        assert_eq!(session.state.stage.to_string(), "gender");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn ws_reset_sends_fresh_transcript() {
    timeout(TEST_TIMEOUT, async {
        let (port, state) = start_server().await;
        let mut ws = connect(port).await;
        let _ = next_json(&mut ws).await;

        say(&mut ws, "Carol").await;
        ws.send(Message::Text(json!({"type": "reset"}).to_string().into()))
            .await
            .unwrap();

        let json = next_json(&mut ws).await;
        assert_eq!(json["type"], "transcript");
        let entries = json["entries"].as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["content"], GREETING);

        let session = state.session.lock().await;
        assert!(session.profile.name.is_none());
        assert_eq!(session.display_name(), "USER");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn ws_invalid_json_returns_error() {
    timeout(TEST_TIMEOUT, async {
        let (port, _state) = start_server().await;
        let mut ws = connect(port).await;
        let _ = next_json(&mut ws).await;

        ws.send(Message::Text("not json".into())).await.unwrap();
        let json = next_json(&mut ws).await;
        assert_eq!(json["type"], "error");
        assert!(
            json["message"]
                .as_str()
                .unwrap()
                .starts_with("Invalid message format:")
        );
    })
    .await
    .expect("test timed out");
}

// ── REST Tests ───────────────────────────────────────────────────────

#[tokio::test]
async fn rest_session_reflects_ws_turns() {
    timeout(TEST_TIMEOUT, async {
        let (port, _state) = start_server().await;
        let mut ws = connect(port).await;
        let _ = next_json(&mut ws).await;
        say(&mut ws, "Dev").await;

        let json: Value = reqwest::get(format!("http://127.0.0.1:{port}/api/session"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(json["display_name"], "Dev");
        assert_eq!(json["profile"]["name"], "Dev");
        assert_eq!(json["state"]["stage"], "gender");
        assert_eq!(json["transcript"].as_array().unwrap().len(), 3);

        let json: Value = reqwest::Client::new()
            .post(format!("http://127.0.0.1:{port}/api/session/reset"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(json["display_name"], "USER");
        assert_eq!(json["state"]["stage"], "name");
    })
    .await
    .expect("test timed out");
}
