use std::{
    net::SocketAddr,
    sync::{Arc, Mutex},
};

use assert_cmd::Command;
use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use color_eyre::Result;
use predicates::prelude::*;
use serde_json::{Value, json};

use dynaform::{
    FieldMap,
    posts::{ApiError, Board, ClientConfig, HttpPostsClient, PostsApi, RecordId},
};

#[derive(Clone, Default)]
struct Posts {
    stored: Arc<Mutex<Vec<Value>>>,
}

async fn list_posts(State(posts): State<Posts>) -> Json<Value> {
    Json(Value::Array(posts.stored.lock().unwrap().clone()))
}

async fn create_post(
    State(posts): State<Posts>,
    Json(mut body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if body.get("title").and_then(Value::as_str) == Some("reject") {
        return (StatusCode::BAD_REQUEST, Json(json!({"message": "bad request"})));
    }
    let mut stored = posts.stored.lock().unwrap();
    body["id"] = json!(stored.len() + 100);
    stored.push(body.clone());
    (StatusCode::CREATED, Json(body))
}

async fn start_server(seed: Vec<Value>) -> Result<(SocketAddr, Posts)> {
    let posts = Posts {
        stored: Arc::new(Mutex::new(seed)),
    };
    let app = Router::new()
        .route("/posts", get(list_posts).post(create_post))
        .with_state(posts.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((addr, posts))
}

fn client(addr: SocketAddr) -> Result<HttpPostsClient> {
    let config = ClientConfig {
        // Trailing slash must not produce `//posts`.
        base_url: format!("http://{addr}/"),
        ..ClientConfig::default()
    };
    Ok(HttpPostsClient::new(&config)?)
}

fn values(pairs: &[(&str, &str)]) -> FieldMap {
    pairs.iter().copied().collect()
}

#[tokio::test]
async fn list_decodes_records_in_order() -> Result<()> {
    let (addr, _) = start_server(vec![
        json!({"id": 5, "title": "hello", "views": 3}),
        json!({"title": "second", "id": "6"}),
    ])
    .await?;
    let records = client(addr)?.list().await?;

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].id, RecordId(5));
    assert_eq!(records[0].fields.keys().collect::<Vec<_>>(), vec!["title", "views"]);
    assert_eq!(records[0].get("views"), Some("3"));
    assert_eq!(records[1].id, RecordId(6));
    assert_eq!(records[1].get("id"), None);
    Ok(())
}

#[tokio::test]
async fn create_posts_json_body() -> Result<()> {
    let (addr, posts) = start_server(Vec::new()).await?;
    client(addr)?
        .create(&values(&[("title", "hi"), ("body", "there")]))
        .await?;

    let stored = posts.stored.lock().unwrap().clone();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0]["title"], "hi");
    assert_eq!(stored[0]["body"], "there");
    Ok(())
}

#[tokio::test]
async fn rejected_create_carries_server_message() -> Result<()> {
    let (addr, posts) = start_server(Vec::new()).await?;
    let err = client(addr)?
        .create(&values(&[("title", "reject")]))
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Server(_)));
    assert_eq!(err.to_string(), "Server error: bad request");
    assert!(posts.stored.lock().unwrap().is_empty());
    Ok(())
}

#[tokio::test]
async fn board_appends_with_local_ids() -> Result<()> {
    let (addr, _) = start_server(vec![json!({"id": 40, "title": "old"})]).await?;
    let mut board = Board::new(Arc::new(client(addr)?));
    board.load().await;
    assert_eq!(board.records().len(), 1);

    let created = board
        .create_from_form(values(&[("title", "new")]))
        .await
        .expect("server accepts the create");
    // Ids come from the local counter, not from the server response.
    assert_eq!(created.id, RecordId(1));
    assert!(board.create_from_form(values(&[("title", "reject")])).await.is_none());
    assert_eq!(board.records().len(), 2);
    Ok(())
}

#[tokio::test]
async fn unreachable_server_is_an_http_error() -> Result<()> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);

    let err = client(addr)?.list().await.unwrap_err();
    assert!(matches!(err, ApiError::Http(_)), "{err}");
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn cli_lists_records_as_json() -> Result<()> {
    let (addr, _) = start_server(vec![json!({"id": 1, "title": "hello"})]).await?;
    let base_url = format!("http://{addr}");

    tokio::task::spawn_blocking(move || {
        Command::cargo_bin("dynaform")
            .unwrap()
            .args(["--base-url", &base_url, "list", "--json"])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#"[{"id":1,"title":"hello"}]"#));
    })
    .await?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn cli_create_reports_server_error() -> Result<()> {
    let (addr, _) = start_server(Vec::new()).await?;
    let base_url = format!("http://{addr}");

    tokio::task::spawn_blocking(move || {
        Command::cargo_bin("dynaform")
            .unwrap()
            .args(["--base-url", &base_url, "create", "--field", "title=reject"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Server error: bad request"));
    })
    .await?;
    Ok(())
}
