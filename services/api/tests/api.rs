//! Tests for the REST surface: session token issuance and metadata.

use std::{net::SocketAddr, path::PathBuf, sync::Arc};
use tokio::net::TcpListener;
use voicegate_api::{config::Config, router::create_router, state::AppState};

const SECRET: &[u8] = b"rest-test-secret";

async fn spawn_service(metadata_path: PathBuf) -> (SocketAddr, Arc<AppState>) {
    let config = Config {
        bind_address: "127.0.0.1:0".parse().unwrap(),
        api_key: Some("test-upstream-key".to_string()),
        agent_url: "ws://127.0.0.1:1".to_string(),
        session_secret: SECRET.to_vec(),
        validate_settings: false,
        metadata_path,
        log_level: tracing::Level::INFO,
    };
    let state = Arc::new(AppState::new(config));
    let app = create_router(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr, state)
}

fn temp_manifest(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("voicegate-{}-{}.toml", name, std::process::id()));
    std::fs::write(&path, contents).unwrap();
    path
}

#[tokio::test]
async fn session_endpoint_issues_a_verifiable_token() {
    let (addr, state) = spawn_service("deepgram.toml".into()).await;

    let body: serde_json::Value = reqwest::get(format!("http://{addr}/api/session"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let token = body["token"].as_str().expect("token should be a string");
    let claims = state.jwt.validate(token).expect("token should verify");
    assert!(claims.exp > claims.iat);
}

#[tokio::test]
async fn metadata_endpoint_serves_the_meta_table() {
    let path = temp_manifest(
        "meta",
        "[meta]\ntitle = \"Voicegate\"\nlanguage = \"Rust\"\n",
    );
    let (addr, _state) = spawn_service(path).await;

    let response = reqwest::get(format!("http://{addr}/api/metadata"))
        .await
        .unwrap();
    assert!(response.status().is_success());

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["title"], "Voicegate");
    assert_eq!(body["language"], "Rust");
}

#[tokio::test]
async fn metadata_endpoint_reports_a_missing_meta_table() {
    let path = temp_manifest("no-meta", "[build]\ncommand = \"cargo build\"\n");
    let (addr, _state) = spawn_service(path).await;

    let response = reqwest::get(format!("http://{addr}/api/metadata"))
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);

    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn metadata_endpoint_reports_an_unreadable_manifest() {
    let (addr, _state) = spawn_service("does-not-exist.toml".into()).await;

    let response = reqwest::get(format!("http://{addr}/api/metadata"))
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);
}
