//! Integration tests for the authenticated client flow.
//!
//! These run the real reqwest transport and refresh endpoint against a
//! local mock server: token renewal with replay, refresh rejection,
//! session persistence, and header precedence.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::sync::Arc;

use mockito::Matcher;
use riptide_application::{
    CancellationToken, MemorySessionStore, SessionStore, SessionStoreExt,
};
use riptide_domain::{
    ApiError, ApiRequest, AuthSession, HttpMethod, RefreshError, TokenPair, UploadForm,
    AUTHORIZATION,
};
use riptide_infrastructure::{ClientSet, FileSessionStore, Settings, FEATURE_HEADER};
use serde_json::{json, Value};

fn settings_for(server: &mockito::ServerGuard) -> Settings {
    let base = format!("{}/api", server.url());
    Settings {
        auth_base_url: base.clone(),
        catalog_base_url: base.clone(),
        api_base_url: base,
        timeout_ms: 2_000,
        ..Settings::default()
    }
}

fn memory_store_with_tokens() -> Arc<MemorySessionStore> {
    let store = Arc::new(MemorySessionStore::new());
    store.set_tokens(&TokenPair::new("a1", "r1"));
    store
}

#[tokio::test]
async fn test_expired_token_is_renewed_and_the_request_replayed() {
    let mut server = mockito::Server::new_async().await;
    let rejected = server
        .mock("GET", "/api/widgets")
        .match_header("authorization", "Bearer a1")
        .with_status(401)
        .with_body(r#"{"message": "token expired"}"#)
        .create_async()
        .await;
    let refresh = server
        .mock("POST", "/api/auth/refresh")
        .match_body(Matcher::Json(json!({"refreshToken": "r1"})))
        .with_status(200)
        .with_body(r#"{"accessToken": "a2", "refreshToken": "r2"}"#)
        .create_async()
        .await;
    let replayed = server
        .mock("GET", "/api/widgets")
        .match_header("authorization", "Bearer a2")
        .with_status(200)
        .with_body(r#"{"items": []}"#)
        .create_async()
        .await;

    let store = memory_store_with_tokens();
    let clients = ClientSet::with_store(&settings_for(&server), store.clone()).unwrap();

    let reply: Value = clients.catalog.get_json("/widgets", None).await.unwrap();

    assert_eq!(reply, json!({"items": []}));
    let session = store.snapshot();
    assert_eq!(session.access_token.as_deref(), Some("a2"));
    assert_eq!(session.refresh_token.as_deref(), Some("r2"));
    rejected.assert_async().await;
    refresh.assert_async().await;
    replayed.assert_async().await;
}

#[tokio::test]
async fn test_rejected_refresh_clears_the_durable_session() {
    let mut server = mockito::Server::new_async().await;
    let _rejected = server
        .mock("GET", "/api/widgets")
        .with_status(401)
        .with_body(r#"{"message": "token expired"}"#)
        .create_async()
        .await;
    let refresh = server
        .mock("POST", "/api/auth/refresh")
        .with_status(400)
        .with_body(r#"{"message": "invalid refresh token"}"#)
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    let store = Arc::new(FileSessionStore::open(&path));
    store.set_tokens(&TokenPair::new("a1", "r1"));
    assert!(path.exists());

    let clients = ClientSet::with_store(&settings_for(&server), store.clone()).unwrap();
    let err = clients
        .generic
        .get_json::<Value>("/widgets", None)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ApiError::Refresh(RefreshError::Rejected { status: 400, .. })
    ));
    assert_eq!(store.snapshot(), AuthSession::default());
    assert!(!path.exists());
    refresh.assert_async().await;
}

#[tokio::test]
async fn test_a_request_is_replayed_at_most_once() {
    let mut server = mockito::Server::new_async().await;
    // The server keeps answering 401 even for the renewed token.
    let always_rejected = server
        .mock("GET", "/api/widgets")
        .with_status(401)
        .with_body(r#"{"message": "token expired"}"#)
        .expect(2)
        .create_async()
        .await;
    let refresh = server
        .mock("POST", "/api/auth/refresh")
        .with_status(200)
        .with_body(r#"{"accessToken": "a2", "refreshToken": "r2"}"#)
        .expect(1)
        .create_async()
        .await;

    let store = memory_store_with_tokens();
    let clients = ClientSet::with_store(&settings_for(&server), store).unwrap();

    let err = clients
        .catalog
        .get_json::<Value>("/widgets", None)
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(401));
    always_rejected.assert_async().await;
    refresh.assert_async().await;
}

#[tokio::test]
async fn test_requests_carry_feature_tag_and_stored_bearer() {
    let mut server = mockito::Server::new_async().await;
    let products = server
        .mock("GET", "/api/products")
        .match_header(FEATURE_HEADER, "catalog")
        .match_header("authorization", "Bearer a1")
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    let store = memory_store_with_tokens();
    let clients = ClientSet::with_store(&settings_for(&server), store).unwrap();

    clients
        .catalog
        .get_json::<Value>("/products", None)
        .await
        .unwrap();
    products.assert_async().await;
}

#[tokio::test]
async fn test_caller_supplied_authorization_wins() {
    let mut server = mockito::Server::new_async().await;
    let external = server
        .mock("GET", "/api/external")
        .match_header("authorization", "Bearer custom")
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    let store = memory_store_with_tokens();
    let clients = ClientSet::with_store(&settings_for(&server), store).unwrap();

    let request = ApiRequest::new(HttpMethod::Get, "/external")
        .with_header(AUTHORIZATION, "Bearer custom");
    clients.generic.execute(request, None).await.unwrap();
    external.assert_async().await;
}

#[tokio::test]
async fn test_login_then_logout_through_the_session_service() {
    let mut server = mockito::Server::new_async().await;
    let login = server
        .mock("POST", "/api/auth/login")
        .match_body(Matcher::Json(
            json!({"email": "ada@example.com", "password": "hunter2"}),
        ))
        .with_status(200)
        .with_body(
            r#"{
                "accessToken": "a1",
                "refreshToken": "r1",
                "user": {"email": "ada@example.com", "name": "Ada"}
            }"#,
        )
        .create_async()
        .await;
    let logout = server
        .mock("POST", "/api/auth/logout")
        .match_header("authorization", "Bearer a1")
        .with_status(204)
        .create_async()
        .await;

    let store = Arc::new(MemorySessionStore::new());
    let clients = ClientSet::with_store(&settings_for(&server), store.clone()).unwrap();
    let service = clients.session_service();

    service.login("ada@example.com", "hunter2").await.unwrap();
    assert!(service.is_authenticated());
    assert_eq!(
        store.cached_user_as::<Value>().unwrap()["email"],
        "ada@example.com"
    );

    service.logout().await;
    assert!(!service.is_authenticated());
    assert_eq!(store.snapshot(), AuthSession::default());
    login.assert_async().await;
    logout.assert_async().await;
}

#[tokio::test]
async fn test_validation_errors_arrive_per_field() {
    let mut server = mockito::Server::new_async().await;
    let _users = server
        .mock("POST", "/api/users")
        .with_status(422)
        .with_body(
            r#"{
                "message": "validation failed",
                "errors": [{"field": "email", "message": "is invalid"}]
            }"#,
        )
        .create_async()
        .await;

    let store = memory_store_with_tokens();
    let clients = ClientSet::with_store(&settings_for(&server), store).unwrap();

    let err = clients
        .generic
        .post_json::<Value>("/users", json!({"email": "nope"}), None)
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(422));
    assert_eq!(err.field_errors().len(), 1);
    assert_eq!(err.field_errors()[0].field, "email");
}

#[tokio::test]
async fn test_multipart_upload_round_trips() {
    let mut server = mockito::Server::new_async().await;
    let files = server
        .mock("POST", "/api/files")
        .match_header(
            "content-type",
            Matcher::Regex("multipart/form-data.*".into()),
        )
        .match_header("authorization", "Bearer a1")
        .with_status(200)
        .with_body(r#"{"id": "f1"}"#)
        .create_async()
        .await;

    let store = memory_store_with_tokens();
    let clients = ClientSet::with_store(&settings_for(&server), store).unwrap();

    let form = UploadForm::new()
        .text("kind", "avatar")
        .bytes("file", "avatar.png", vec![0x89, 0x50]);
    let reply: Value = clients.generic.upload("/files", form, None).await.unwrap();

    assert_eq!(reply, json!({"id": "f1"}));
    files.assert_async().await;
}

#[tokio::test]
async fn test_file_part_is_read_from_disk() {
    let mut server = mockito::Server::new_async().await;
    let files = server
        .mock("POST", "/api/files")
        .match_header(
            "content-type",
            Matcher::Regex("multipart/form-data.*".into()),
        )
        .match_body(Matcher::Regex("quarterly numbers".into()))
        .with_status(200)
        .with_body(r#"{"id": "f2"}"#)
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.txt");
    std::fs::write(&path, b"quarterly numbers").unwrap();

    let store = memory_store_with_tokens();
    let clients = ClientSet::with_store(&settings_for(&server), store).unwrap();

    let form = UploadForm::new().file("file", &path);
    let reply: Value = clients.generic.upload("/files", form, None).await.unwrap();

    assert_eq!(reply, json!({"id": "f2"}));
    files.assert_async().await;
}

#[tokio::test]
async fn test_upload_with_missing_file_fails_before_sending() {
    let mut server = mockito::Server::new_async().await;
    let untouched = server
        .mock("POST", "/api/files")
        .expect(0)
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store = memory_store_with_tokens();
    let clients = ClientSet::with_store(&settings_for(&server), store).unwrap();

    let form = UploadForm::new().file("file", dir.path().join("missing.bin"));
    let err = clients
        .generic
        .upload::<Value>("/files", form, None)
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Transport { timed_out: false, .. }));
    assert!(
        err.to_string()
            .starts_with("transport failure: request body failed")
    );
    untouched.assert_async().await;
}

#[tokio::test]
async fn test_cancelled_request_never_reaches_the_server() {
    let mut server = mockito::Server::new_async().await;
    let untouched = server
        .mock("GET", "/api/slow")
        .expect(0)
        .create_async()
        .await;

    let store = memory_store_with_tokens();
    let clients = ClientSet::with_store(&settings_for(&server), store).unwrap();

    let token = CancellationToken::new();
    token.cancel();
    let err = clients
        .generic
        .get_json::<Value>("/slow", Some(&token))
        .await
        .unwrap_err();

    assert!(err.is_cancelled());
    untouched.assert_async().await;
}

#[tokio::test]
async fn test_cancelled_upload_never_reaches_the_server() {
    let mut server = mockito::Server::new_async().await;
    let untouched = server
        .mock("POST", "/api/files")
        .expect(0)
        .create_async()
        .await;

    let store = memory_store_with_tokens();
    let clients = ClientSet::with_store(&settings_for(&server), store).unwrap();

    let token = CancellationToken::new();
    token.cancel();
    let form = UploadForm::new().bytes("file", "avatar.png", vec![0x89, 0x50]);
    let err = clients
        .generic
        .upload::<Value>("/files", form, Some(&token))
        .await
        .unwrap_err();

    assert!(err.is_cancelled());
    untouched.assert_async().await;
}

#[tokio::test]
async fn test_corrupt_session_file_starts_signed_out() {
    let mut server = mockito::Server::new_async().await;
    let anonymous = server
        .mock("GET", "/api/widgets")
        .match_header(AUTHORIZATION, Matcher::Missing)
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    std::fs::write(&path, b"{ definitely not json").unwrap();

    let settings = Settings {
        session_file: Some(path),
        ..settings_for(&server)
    };
    let clients = ClientSet::from_settings(&settings).unwrap();

    assert_eq!(clients.store.cached_user_as::<Value>(), None);
    assert!(!clients.store.snapshot().is_authenticated());

    clients
        .generic
        .get_json::<Value>("/widgets", None)
        .await
        .unwrap();
    anonymous.assert_async().await;
}
