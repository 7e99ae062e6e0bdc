use super::*;
use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct RecordedUpload {
    file_name: Option<String>,
    file_type: Option<String>,
    bytes: Vec<u8>,
}

#[derive(Clone, Default)]
struct MockState {
    uploads: Arc<Mutex<Vec<RecordedUpload>>>,
    snapshots: Arc<Mutex<Vec<CacheSnapshot>>>,
    process_forms: Arc<Mutex<Vec<Vec<(String, String)>>>>,
    tested_providers: Arc<Mutex<Vec<String>>>,
}

async fn text_fields(mut multipart: Multipart) -> Vec<(String, String)> {
    let mut fields = Vec::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let value = field.text().await.unwrap_or_default();
        fields.push((name, value));
    }
    fields
}

async fn handle_validate(State(state): State<MockState>, mut multipart: Multipart) -> Json<Value> {
    let mut upload = RecordedUpload::default();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                upload.file_name = field.file_name().map(str::to_string);
                upload.bytes = field.bytes().await.map(|b| b.to_vec()).unwrap_or_default();
            }
            Some("file_type") => upload.file_type = field.text().await.ok(),
            _ => {}
        }
    }
    let file_name = upload.file_name.clone().unwrap_or_default();
    state.uploads.lock().await.push(upload);
    Json(json!({
        "status": "success",
        "message": "文件验证通过",
        "file_path": format!("/uploads/{file_name}"),
        "preserve_structure": true
    }))
}

async fn handle_prepare_editor(
    State(state): State<MockState>,
    Json(snapshot): Json<CacheSnapshot>,
) -> Json<Value> {
    state.snapshots.lock().await.push(snapshot);
    Json(json!({"status": "success", "cache_key": "0", "message": "编辑器准备成功"}))
}

async fn handle_process(State(state): State<MockState>, multipart: Multipart) -> impl IntoResponse {
    let fields = text_fields(multipart).await;
    let broken = fields
        .iter()
        .any(|(name, value)| name == "llm_provider" && value == "broken");
    state.process_forms.lock().await.push(fields);
    if broken {
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"detail": "boom"})));
    }
    (
        StatusCode::OK,
        Json(json!({"output_file": "/download?file_path=/uploads/a_output.md"})),
    )
}

async fn handle_latest_cache() -> Json<Value> {
    Json(json!({
        "status": "success",
        "md_path": "/uploads/a.md",
        "csv_path": "/uploads/dict.csv",
        "llm_provider": "deepseek",
        "cache_key": ""
    }))
}

async fn handle_test_api(State(state): State<MockState>, multipart: Multipart) -> Json<Value> {
    let fields = text_fields(multipart).await;
    let provider = fields
        .into_iter()
        .find(|(name, _)| name == "llm_provider")
        .map(|(_, value)| value)
        .unwrap_or_default();
    state.tested_providers.lock().await.push(provider.clone());
    if provider == "unknown" {
        return Json(json!({"status": "error", "error": "unsupported provider"}));
    }
    Json(json!({"status": "success", "test_results": {"latency_ms": 12}}))
}

async fn spawn_server(app: Router) -> String {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
}

async fn spawn_wizard_server() -> (String, MockState) {
    let state = MockState::default();
    let app = Router::new()
        .route("/validate-file", post(handle_validate))
        .route("/prepare-editor", post(handle_prepare_editor))
        .route("/process", post(handle_process))
        .route("/get-latest-cache", get(handle_latest_cache))
        .route("/test-api", post(handle_test_api))
        .with_state(state.clone());
    (spawn_server(app).await, state)
}

#[test]
fn endpoint_keeps_base_path_prefix() {
    let api = HttpWizardApi::new("http://localhost:8008/wizard").expect("api");
    assert_eq!(
        api.endpoint(PROCESS_ROUTE).expect("url").as_str(),
        "http://localhost:8008/wizard/process"
    );

    let api = HttpWizardApi::new("http://localhost:8008").expect("api");
    assert_eq!(
        api.endpoint(VALIDATE_FILE_ROUTE).expect("url").as_str(),
        "http://localhost:8008/validate-file"
    );
}

#[test]
fn rejects_unparseable_server_url() {
    let err = HttpWizardApi::new("not a url").expect_err("must fail");
    assert!(matches!(err, WizardError::InvalidUrl(_)));
}

#[tokio::test]
async fn validate_file_sends_multipart_file_and_role() {
    let (server_url, state) = spawn_wizard_server().await;
    let api = HttpWizardApi::new(&server_url).expect("api");

    let response = api
        .validate_file(UploadFile::new("report.md", b"# Report\n".to_vec()), FileRole::Md)
        .await
        .expect("validate");

    assert_eq!(response.status, "success");
    assert_eq!(response.file_path.as_deref(), Some("/uploads/report.md"));
    assert_eq!(response.preserve_structure, Some(true));

    let uploads = state.uploads.lock().await.clone();
    assert_eq!(
        uploads,
        vec![RecordedUpload {
            file_name: Some("report.md".to_string()),
            file_type: Some("md".to_string()),
            bytes: b"# Report\n".to_vec(),
        }]
    );
}

#[tokio::test]
async fn prepare_editor_posts_snapshot_as_json() {
    let (server_url, state) = spawn_wizard_server().await;
    let api = HttpWizardApi::new(&server_url).expect("api");
    let snapshot = CacheSnapshot {
        md_path: "/uploads/a.md".to_string(),
        csv_path: String::new(),
        llm_provider: "deepseek".to_string(),
    };

    let response = api.prepare_editor(&snapshot).await.expect("prepare");
    assert!(response.is_success());
    assert_eq!(response.cache_key(), Some("0"));
    assert_eq!(state.snapshots.lock().await.clone(), vec![snapshot]);
}

#[tokio::test]
async fn process_returns_output_file_on_success() {
    let (server_url, state) = spawn_wizard_server().await;
    let api = HttpWizardApi::new(&server_url).expect("api");
    let request = ProcessRequest {
        md_path: "/uploads/a.md".to_string(),
        csv_path: "/uploads/dict.csv".to_string(),
        llm_provider: "deepseek".to_string(),
    };

    let response = api.process(&request).await.expect("process");
    assert_eq!(response.output_file, "/download?file_path=/uploads/a_output.md");

    let forms = state.process_forms.lock().await.clone();
    assert_eq!(
        forms,
        vec![vec![
            ("md_path".to_string(), "/uploads/a.md".to_string()),
            ("csv_path".to_string(), "/uploads/dict.csv".to_string()),
            ("llm_provider".to_string(), "deepseek".to_string()),
        ]]
    );
}

#[tokio::test]
async fn process_maps_http_error_status() {
    let (server_url, _state) = spawn_wizard_server().await;
    let api = HttpWizardApi::new(&server_url).expect("api");
    let request = ProcessRequest {
        md_path: "/uploads/a.md".to_string(),
        csv_path: "/uploads/dict.csv".to_string(),
        llm_provider: "broken".to_string(),
    };

    let err = api.process(&request).await.expect_err("must fail");
    assert!(matches!(err, WizardError::Processing { status: 500 }));
    assert!(err.to_string().contains("处理失败"));
}

#[tokio::test]
async fn latest_cache_decodes_stored_paths() {
    let (server_url, _state) = spawn_wizard_server().await;
    let api = HttpWizardApi::new(&server_url).expect("api");

    let response = api.latest_cache().await.expect("cache");
    assert!(response.is_success());
    assert_eq!(response.csv_path(), Some("/uploads/dict.csv"));
    assert_eq!(response.llm_provider(), Some("deepseek"));
    assert_eq!(response.cache_key, Some(String::new()));
}

#[tokio::test]
async fn test_api_sends_provider_form_field() {
    let (server_url, state) = spawn_wizard_server().await;
    let api = HttpWizardApi::new(&server_url).expect("api");

    let ok = api.test_api("deepseek").await.expect("test api");
    assert!(!ok.is_error());
    assert_eq!(ok.test_results, Some(json!({"latency_ms": 12})));

    let failed = api.test_api("unknown").await.expect("test api");
    assert!(failed.is_error());
    assert_eq!(failed.error.as_deref(), Some("unsupported provider"));

    assert_eq!(
        state.tested_providers.lock().await.clone(),
        vec!["deepseek".to_string(), "unknown".to_string()]
    );
}

#[tokio::test]
async fn non_json_body_is_a_decode_error() {
    let app = Router::new().route("/get-latest-cache", get(|| async { "<html>oops</html>" }));
    let server_url = spawn_server(app).await;
    let api = HttpWizardApi::new(&server_url).expect("api");

    let err = api.latest_cache().await.expect_err("must fail");
    assert!(matches!(err, WizardError::Decode(_)), "unexpected error: {err}");
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let api = HttpWizardApi::new(&format!("http://{addr}")).expect("api");
    let err = api.latest_cache().await.expect_err("must fail");
    assert!(matches!(err, WizardError::Transport(_)), "unexpected error: {err}");
}
