//! Shared integration-test server bootstrap helpers.

use axum::http::{header, HeaderName, HeaderValue, StatusCode};
use axum_test::{TestRequest, TestServer};
use std::path::Path;
use tempfile::TempDir;
use waste_server::seeds::seed_database;
use waste_server::{create_app, AppState, Config, Database};

pub(crate) const TEST_MAX_SIZE: usize = 64 * 1024;
pub(crate) const TEST_HOST: &str = "localhost:8666";

pub(crate) fn test_config_for_db_path(db_path: &Path) -> Config {
    Config {
        port: 0,
        db_path: db_path.to_str().expect("db path").to_string(),
        max_paste_size: TEST_MAX_SIZE,
        ..Config::default()
    }
}

pub(crate) fn test_server_for_config(config: Config) -> TestServer {
    let db = Database::new(config.db_path.as_str()).expect("open db");
    seed_database(&db).expect("seed");
    let state = AppState::new(config, db).expect("state");
    TestServer::new(create_app(state)).expect("server")
}

pub(crate) fn setup_test_server() -> (TestServer, TempDir) {
    let temp_dir = TempDir::new().expect("temp dir");
    let config = test_config_for_db_path(&temp_dir.path().join("db"));
    (test_server_for_config(config), temp_dir)
}

pub(crate) fn with_header(request: TestRequest, name: &'static str, value: &str) -> TestRequest {
    request.add_header(
        HeaderName::from_static(name),
        HeaderValue::from_str(value).expect("header value"),
    )
}

/// Headers a browser sends on a top-level navigation.
pub(crate) fn as_browser(request: TestRequest) -> TestRequest {
    request
        .add_header(
            header::ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,*/*;q=0.8"),
        )
        .add_header(
            header::USER_AGENT,
            HeaderValue::from_static("Mozilla/5.0 (X11; Linux x86_64) Gecko/20100101"),
        )
}

pub(crate) fn as_curl(request: TestRequest) -> TestRequest {
    request.add_header(header::USER_AGENT, HeaderValue::from_static("curl/8.5.0"))
}

/// Create a paste owned by `token` and return its id.
pub(crate) async fn create_paste(server: &TestServer, token: &str, body: &[u8]) -> String {
    let request = with_header(server.post("/"), "x-uuid", token)
        .add_header(header::HOST, HeaderValue::from_static(TEST_HOST));
    let response = request.bytes(body.to_vec().into()).await;
    assert_eq!(response.status_code(), StatusCode::OK, "{}", response.text());

    let location = response
        .headers()
        .get(header::CONTENT_LOCATION)
        .and_then(|value| value.to_str().ok())
        .expect("content location")
        .to_string();
    location.trim_start_matches('/').to_string()
}
