//! The conversation loop driving a real Workbench MCP server over an
//! in-memory pipe, with the REST API stood in by a local axum server.

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::Mutex;

use axum::Router;
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use mcp::WorkbenchServer;
use rmcp::ServiceExt;
use runtime::{
    Backend, Conversation, McpClient, McpToolHost, Message, ModelError, ModelRequest,
    ModelResponse, Part, Role, ToolCall, ToolHost, ToolResult, Usage,
};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use workbench::{WorkbenchClient, WorkbenchConfig};

async fn upstream(uri: Uri) -> Response {
    match uri.path() {
        "/rest/study/study_id/ST000001/summary" => axum::Json(json!({
            "study_id": "ST000001",
            "study_title": "Intestinal Samples II pre/post transplantation",
        }))
        .into_response(),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response(),
    }
}

async fn start_upstream() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, Router::new().fallback(upstream))
            .await
            .unwrap();
    });
    addr
}

/// Start a server on one end of a duplex pipe and return a host on the other.
async fn connect_host() -> McpToolHost {
    let addr = start_upstream().await;
    let client =
        WorkbenchClient::new(WorkbenchConfig::new(format!("http://{addr}/rest"))).unwrap();

    let (server_io, client_io) = tokio::io::duplex(64 * 1024);
    tokio::spawn(async move {
        let service = WorkbenchServer::new(client).serve(server_io).await.unwrap();
        let _ = service.waiting().await;
    });

    let client = McpClient::from_transport(client_io).await.unwrap();
    McpToolHost::new(client).await.unwrap()
}

struct Scripted(Mutex<VecDeque<Message>>);

impl Backend for Scripted {
    async fn call(&self, _request: ModelRequest<'_>) -> Result<ModelResponse, ModelError> {
        let message = self
            .0
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| ModelError::Api("script exhausted".into()))?;
        Ok(ModelResponse {
            message,
            usage: Usage::default(),
        })
    }
}

fn summary_call(study_id: &str) -> ToolCall {
    ToolCall {
        id: "call_1".into(),
        name: "get_study_summary".into(),
        input: json!({ "study_id": study_id }),
    }
}

#[tokio::test]
async fn host_lists_the_catalogue() {
    let host = connect_host().await;
    let names: Vec<&str> = host.specs().iter().map(|s| s.name.as_str()).collect();

    assert_eq!(names.len(), 13);
    assert!(names.contains(&"get_study_summary"));
    assert!(names.contains(&"get_all_studies_untargeted"));
}

#[tokio::test]
async fn summary_comes_back_unchanged() {
    let host = connect_host().await;
    let output = host.execute(&summary_call("ST000001")).await.unwrap();

    assert_eq!(
        output,
        json!({
            "study_id": "ST000001",
            "study_title": "Intestinal Samples II pre/post transplantation",
        })
    );
}

#[tokio::test]
async fn upstream_failure_arrives_as_error_data() {
    let host = connect_host().await;
    let output = host.execute(&summary_call("ST000500")).await.unwrap();

    let object = output.as_object().unwrap();
    assert_eq!(object.len(), 1);
    assert!(
        object["error"]
            .as_str()
            .unwrap()
            .starts_with("API request failed: ")
    );
}

#[tokio::test]
async fn conversation_answers_after_one_tool_call() {
    let host = connect_host().await;
    let backend = Scripted(Mutex::new(VecDeque::from([
        Message {
            role: Role::Assistant,
            parts: vec![Part::ToolCall(summary_call("ST000001"))],
        },
        Message::assistant("ST000001 compares intestinal samples before and after transplant."),
    ])));

    let conversation = Conversation::new(backend, host).with_allowed_tools(["get_study_summary"]);
    let exchange = conversation
        .ask("Can you give me the summary of study ST000001?")
        .await
        .unwrap();

    assert_eq!(
        exchange.answer(),
        Some("ST000001 compares intestinal samples before and after transplant.")
    );
    let result = exchange.messages[2]
        .parts
        .iter()
        .find_map(|p| match p {
            Part::ToolResult(ToolResult::Success { output, .. }) => Some(output.clone()),
            _ => None,
        })
        .unwrap();
    assert_eq!(result["study_id"], Value::from("ST000001"));
}
