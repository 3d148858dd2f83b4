use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use brigo_api::{
    adapters::MemoryAdapter,
    config::Config,
    web::{self, state::AppState},
};
use brigo_core::domain::{Material, Notebook, NotebookStatus};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn app() -> Router {
    let memory = Arc::new(MemoryAdapter::new());
    let config = Config::from_lookup(|_| None).unwrap();
    web::router(Arc::new(AppState {
        notebooks: memory.clone(),
        accounts: memory,
        config: Arc::new(config),
    }))
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    cookie: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Option<String>, Vec<u8>) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        request = request.header(header::COOKIE, cookie);
    }
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, set_cookie, bytes.to_vec())
}

/// Signs up and returns the `Cookie` header value for the new session.
async fn sign_up(app: &Router, email: &str) -> String {
    let (status, set_cookie, _) = send(
        app,
        Method::POST,
        "/auth/signup",
        None,
        Some(json!({ "email": email, "password": "correct horse" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    set_cookie
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string()
}

async fn create_notebook(app: &Router, cookie: &str, title: &str) -> Notebook {
    let (status, _, body) = send(
        app,
        Method::POST,
        "/notebooks",
        Some(cookie),
        Some(json!({ "title": title })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    serde_json::from_slice(&body).unwrap()
}

async fn list_notebooks(app: &Router, cookie: &str) -> Vec<Notebook> {
    let (status, _, body) = send(app, Method::GET, "/notebooks", Some(cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn notebook_routes_require_a_session() {
    let app = app();

    let (status, _, _) = send(&app, Method::GET, "/notebooks", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _, _) =
        send(&app, Method::GET, "/notebooks", Some("session=made-up"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn signup_then_login_with_the_same_password() {
    let app = app();
    sign_up(&app, "ada@example.com").await;

    let (status, _, _) = send(
        &app,
        Method::POST,
        "/auth/signup",
        None,
        Some(json!({ "email": "ada@example.com", "password": "another one" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _, _) = send(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": "ada@example.com", "password": "wrong password" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, set_cookie, body) = send(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": "ada@example.com", "password": "correct horse" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(set_cookie.unwrap().starts_with("session="));
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["email"], "ada@example.com");
}

#[tokio::test]
async fn logout_invalidates_the_session() {
    let app = app();
    let cookie = sign_up(&app, "bo@example.com").await;

    let (status, _, _) = send(&app, Method::POST, "/auth/logout", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, _) = send(&app, Method::GET, "/notebooks", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn create_update_and_delete_a_notebook() {
    let app = app();
    let cookie = sign_up(&app, "cy@example.com").await;

    let older = create_notebook(&app, &cookie, "Physics").await;
    let newer = create_notebook(&app, &cookie, "Chemistry").await;
    assert_eq!(newer.status, NotebookStatus::Pending);

    let listed: Vec<String> = list_notebooks(&app, &cookie)
        .await
        .into_iter()
        .map(|nb| nb.id)
        .collect();
    assert_eq!(listed, vec![newer.id.clone(), older.id.clone()]);

    let (status, _, _) = send(
        &app,
        Method::PATCH,
        &format!("/notebooks/{}", older.id),
        Some(&cookie),
        Some(json!({ "title": "T", "progress": 75.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _, _) = send(
        &app,
        Method::DELETE,
        &format!("/notebooks/{}", newer.id),
        Some(&cookie),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let remaining = list_notebooks(&app, &cookie).await;
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].title, "T");
    assert_eq!(remaining[0].progress, 75.0);
    assert_eq!(remaining[0].flashcard_count, older.flashcard_count);
}

#[tokio::test]
async fn materials_are_stored_in_order() {
    let app = app();
    let cookie = sign_up(&app, "di@example.com").await;
    let notebook = create_notebook(&app, &cookie, "History").await;
    let uri = format!("/notebooks/{}/materials", notebook.id);

    let (status, _, body) = send(
        &app,
        Method::POST,
        &uri,
        Some(&cookie),
        Some(json!({ "kind": "copied-text", "content": "The Treaty of Westphalia" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let first: Material = serde_json::from_slice(&body).unwrap();
    assert!(!first.id.starts_with("material-"));

    let (status, _, _) = send(
        &app,
        Method::POST,
        &uri,
        Some(&cookie),
        Some(json!({ "kind": "youtube", "uri": "https://youtu.be/abc" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _, _) = send(
        &app,
        Method::POST,
        &uri,
        Some(&cookie),
        Some(json!({ "kind": "pdf" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let notebooks = list_notebooks(&app, &cookie).await;
    let kinds: Vec<String> = notebooks[0]
        .materials
        .iter()
        .map(|m| m.kind.to_string())
        .collect();
    assert_eq!(kinds, vec!["copied-text".to_string(), "youtube".to_string()]);
}

#[tokio::test]
async fn users_cannot_touch_each_others_notebooks() {
    let app = app();
    let owner = sign_up(&app, "ed@example.com").await;
    let intruder = sign_up(&app, "fi@example.com").await;
    let notebook = create_notebook(&app, &owner, "Private").await;

    assert!(list_notebooks(&app, &intruder).await.is_empty());

    let (status, _, _) = send(
        &app,
        Method::DELETE,
        &format!("/notebooks/{}", notebook.id),
        Some(&intruder),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _, _) = send(
        &app,
        Method::PATCH,
        &format!("/notebooks/{}", notebook.id),
        Some(&intruder),
        Some(json!({ "title": "Mine now" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    assert_eq!(list_notebooks(&app, &owner).await[0].title, "Private");
}

#[tokio::test]
async fn rejects_empty_or_out_of_range_updates() {
    let app = app();
    let cookie = sign_up(&app, "gu@example.com").await;
    let notebook = create_notebook(&app, &cookie, "Maths").await;
    let uri = format!("/notebooks/{}", notebook.id);

    let (status, _, _) =
        send(&app, Method::PATCH, &uri, Some(&cookie), Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, _) = send(
        &app,
        Method::PATCH,
        &uri,
        Some(&cookie),
        Some(json!({ "progress": 140.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
