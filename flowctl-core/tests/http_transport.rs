//! ReqwestTransport and HttpUploader against a local axum server

use std::net::SocketAddr;
use std::time::Duration;

use axum::extract::{Multipart, Path};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use flowctl_core::{
    AuthContext, FlowError, FlowInvoker, InvocationRequest, ReqwestTransport, TransportErrorKind,
    Tweaks,
};
use serde_json::{json, Value};

async fn spawn(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn echo_run(
    Path((tenant, flow)): Path<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok()).map(String::from);
    Json(json!({
        "tenant": tenant,
        "flow": flow,
        "authorization": header("authorization"),
        "content_type": header("content-type"),
        "body": body,
    }))
}

async fn fail_run() -> (StatusCode, &'static str) {
    (StatusCode::INTERNAL_SERVER_ERROR, "boom")
}

async fn slow_run() -> Json<Value> {
    tokio::time::sleep(Duration::from_secs(5)).await;
    Json(json!({"late": true}))
}

async fn accept_upload(
    Path((_tenant, flow)): Path<(String, String)>,
    mut multipart: Multipart,
) -> (StatusCode, Json<Value>) {
    while let Some(field) = multipart.next_field().await.unwrap() {
        if field.name() == Some("file") {
            let name = field.file_name().unwrap_or("unnamed").to_string();
            let data = field.bytes().await.unwrap();
            assert!(!data.is_empty());
            return (
                StatusCode::CREATED,
                Json(json!({"flowId": flow, "file_path": format!("{}/{}", flow, name)})),
            );
        }
    }
    (StatusCode::BAD_REQUEST, Json(json!({"detail": "no file"})))
}

fn router() -> Router {
    Router::new()
        .route("/lf/{tenant}/api/v1/run/{flow}", post(echo_run))
        .route("/lf/{tenant}/api/v1/upload/{flow}", post(accept_upload))
        .route("/broken/lf/{tenant}/api/v1/run/{flow}", post(fail_run))
        .route("/slow/lf/{tenant}/api/v1/run/{flow}", post(slow_run))
}

#[tokio::test]
async fn sends_bearer_and_json_body() {
    let addr = spawn(router()).await;
    let auth = AuthContext::new(format!("http://{}", addr), "tenant-1", "flow-1")
        .with_token(Some("tok-123".into()));
    let invoker = FlowInvoker::new(auth, ReqwestTransport::new());

    let tweaks = Tweaks::from_json(r#"{"ChatInput-ivyVt": {}}"#).unwrap();
    let result = invoker
        .invoke("", &InvocationRequest::new("hello").with_tweaks(tweaks))
        .await
        .unwrap();

    assert_eq!(result["tenant"], "tenant-1");
    assert_eq!(result["flow"], "flow-1");
    assert_eq!(result["authorization"], "Bearer tok-123");
    assert_eq!(result["content_type"], "application/json");
    assert_eq!(
        result["body"],
        json!({
            "input_value": "hello",
            "output_type": "chat",
            "input_type": "chat",
            "tweaks": {"ChatInput-ivyVt": {}}
        })
    );
}

#[tokio::test]
async fn omits_authorization_without_token() {
    let addr = spawn(router()).await;
    let auth = AuthContext::new(format!("http://{}", addr), "t", "f");
    let invoker = FlowInvoker::new(auth, ReqwestTransport::new());

    let result = invoker.invoke("f", &InvocationRequest::new("hi")).await.unwrap();
    assert_eq!(result["authorization"], Value::Null);
}

#[tokio::test]
async fn server_error_carries_status_and_body() {
    let addr = spawn(router()).await;
    let auth = AuthContext::new(format!("http://{}/broken", addr), "t", "f");
    let invoker = FlowInvoker::new(auth, ReqwestTransport::new());

    let err = invoker.invoke("f", &InvocationRequest::new("hi")).await.unwrap_err();
    match err {
        FlowError::RemoteInvocation { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "boom");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn connection_refused_is_transport_error() {
    // Bind then drop to get a port nobody listens on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let auth = AuthContext::new(format!("http://{}", addr), "t", "f");
    let invoker = FlowInvoker::new(auth, ReqwestTransport::new());

    let err = invoker.invoke("f", &InvocationRequest::new("hi")).await.unwrap_err();
    match err {
        FlowError::Transport(e) => assert_eq!(e.kind, TransportErrorKind::Connect),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn slow_server_hits_configured_timeout() {
    let addr = spawn(router()).await;
    let auth = AuthContext::new(format!("http://{}/slow", addr), "t", "f");
    let transport = ReqwestTransport::with_timeout(Some(Duration::from_millis(200))).unwrap();
    let invoker = FlowInvoker::new(auth, transport);

    let err = invoker.invoke("f", &InvocationRequest::new("hi")).await.unwrap_err();
    match err {
        FlowError::Transport(e) => assert_eq!(e.kind, TransportErrorKind::Timeout),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[cfg(feature = "upload")]
#[tokio::test]
async fn upload_points_components_at_remote_path() {
    use flowctl_core::{FileUploader, HttpUploader};

    let addr = spawn(router()).await;
    let auth = AuthContext::new(format!("http://{}", addr), "t", "flow-9");
    let uploader = HttpUploader::new(auth, "");

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("faq.txt");
    std::fs::write(&path, "Q: hours? A: 9-5").unwrap();

    let base = Tweaks::from_json(r#"{"Prompt-9qAHi": {}}"#).unwrap();
    let tweaks = uploader
        .upload(&path, &["File-oYNDr".to_string()], base)
        .await
        .unwrap();

    assert_eq!(tweaks.get("File-oYNDr"), Some(&json!({"path": "flow-9/faq.txt"})));
    assert_eq!(tweaks.get("Prompt-9qAHi"), Some(&json!({})));
}
