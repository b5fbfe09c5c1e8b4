use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Path, Query};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{routing::get, Json, Router};
use drivesync_core::{FolderId, FOLDER_MIME_TYPE};
use drivesync_infra::{DriveClient, RemoteError, RemoteErrorKind, StaticToken};
use serde_json::json;

const TOKEN: &str = "test-token";

fn blob() -> Vec<u8> {
    (0..100u8).collect()
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {TOKEN}"))
}

async fn list_files(
    headers: HeaderMap,
    Query(q): Query<HashMap<String, String>>,
) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let query = q.get("q").cloned().unwrap_or_default();
    if query.contains("'broken'") {
        return (StatusCode::INTERNAL_SERVER_ERROR, "backend down").into_response();
    }
    assert_eq!(query, "'F1' in parents and trashed=false");

    match q.get("pageToken").map(String::as_str) {
        None => Json(json!({
            "nextPageToken": "p2",
            "files": [
                {"id": "1", "name": "a.txt", "mimeType": "text/plain", "size": "5"},
                {"id": "2", "name": "b.csv", "mimeType": "text/csv", "size": "7"}
            ]
        }))
        .into_response(),
        Some("p2") => Json(json!({
            "files": [
                {"id": "3", "name": "sub", "mimeType": FOLDER_MIME_TYPE}
            ]
        }))
        .into_response(),
        Some(other) => panic!("unexpected page token {other}"),
    }
}

async fn get_file(
    headers: HeaderMap,
    Path(id): Path<String>,
    Query(q): Query<HashMap<String, String>>,
) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if q.get("alt").map(String::as_str) == Some("media") {
        return media(&id, &headers);
    }
    match id.as_str() {
        "folder" => Json(json!({"id": "folder", "mimeType": FOLDER_MIME_TYPE})).into_response(),
        "plain" => Json(json!({"id": "plain", "mimeType": "text/plain"})).into_response(),
        "private" => StatusCode::FORBIDDEN.into_response(),
        "boom" => (StatusCode::INTERNAL_SERVER_ERROR, "oops").into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

fn media(id: &str, headers: &HeaderMap) -> Response {
    let content = match id {
        "blob" | "whole" | "stalled" => blob(),
        "empty" => Vec::new(),
        _ => return StatusCode::NOT_FOUND.into_response(),
    };
    if id == "whole" {
        return (StatusCode::OK, content).into_response();
    }

    let range = headers
        .get(header::RANGE)
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.strip_prefix("bytes="))
        .and_then(|v| v.split_once('-'))
        .map(|(a, b)| (a.parse::<usize>().unwrap(), b.parse::<usize>().unwrap()));
    let Some((start, end)) = range else {
        return (StatusCode::OK, content).into_response();
    };
    if id == "stalled" && start > 0 {
        return (StatusCode::PARTIAL_CONTENT, Vec::<u8>::new()).into_response();
    }
    if start >= content.len() {
        return StatusCode::RANGE_NOT_SATISFIABLE.into_response();
    }
    let end = end.min(content.len() - 1);
    (
        StatusCode::PARTIAL_CONTENT,
        [(
            header::CONTENT_RANGE,
            format!("bytes {start}-{end}/{}", content.len()),
        )],
        content[start..=end].to_vec(),
    )
        .into_response()
}

async fn start_server() -> (SocketAddr, tokio::task::JoinHandle<()>) {
    let app = Router::new()
        .route("/drive/v3/files", get(list_files))
        .route("/drive/v3/files/:id", get(get_file));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, handle)
}

fn drive(addr: SocketAddr, token: &str, chunk_size: u64) -> DriveClient {
    DriveClient::new(
        reqwest::Client::new(),
        Arc::new(StaticToken::new(token)),
        chunk_size,
    )
    .with_base_url(&format!("http://{addr}/drive/v3"))
    .unwrap()
}

#[tokio::test]
async fn validate_folder_distinguishes_folders_missing_and_errors() {
    let (addr, handle) = start_server().await;
    let client = drive(addr, TOKEN, 1024);

    assert!(client.validate_folder(&FolderId::from("folder")).await.unwrap());
    assert!(!client.validate_folder(&FolderId::from("plain")).await.unwrap());
    assert!(!client.validate_folder(&FolderId::from("missing")).await.unwrap());
    assert!(!client.validate_folder(&FolderId::from("private")).await.unwrap());

    let err = client
        .validate_folder(&FolderId::from("boom"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), RemoteErrorKind::Server);

    let unauthorized = drive(addr, "wrong", 1024);
    let err = unauthorized
        .validate_folder(&FolderId::from("folder"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), RemoteErrorKind::Auth);

    handle.abort();
}

#[tokio::test]
async fn list_children_follows_pagination() {
    let (addr, handle) = start_server().await;
    let client = drive(addr, TOKEN, 1024);

    let entries = client.list_children(&FolderId::from("F1")).await.unwrap();
    let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["a.txt", "b.csv", "sub"]);
    assert_eq!(entries[0].size, Some(5));
    assert_eq!(entries[2].size, None);
    assert!(entries[2].is_folder());

    let err = client
        .list_children(&FolderId::from("broken"))
        .await
        .unwrap_err();
    assert!(matches!(err, RemoteError::Status { status: 500, .. }));

    handle.abort();
}

#[tokio::test]
async fn media_stream_reads_in_ranged_chunks() {
    let (addr, handle) = start_server().await;
    let client = drive(addr, TOKEN, 30);

    let mut stream = client.open_media("blob").unwrap();
    let mut data = Vec::new();
    let mut fractions = Vec::new();
    while let Some(chunk) = stream.next_chunk().await.unwrap() {
        data.extend_from_slice(&chunk.data);
        fractions.push(chunk.fraction);
    }

    assert_eq!(data, blob());
    assert_eq!(fractions, vec![0.3, 0.6, 0.9, 1.0]);
    assert_eq!(stream.total_size(), Some(100));
    assert!(stream.next_chunk().await.unwrap().is_none());

    handle.abort();
}

#[tokio::test]
async fn media_stream_handles_empty_and_unranged_files() {
    let (addr, handle) = start_server().await;
    let client = drive(addr, TOKEN, 30);

    let mut empty = client.open_media("empty").unwrap();
    assert!(empty.next_chunk().await.unwrap().is_none());
    assert_eq!(empty.total_size(), Some(0));

    let mut whole = client.open_media("whole").unwrap();
    let chunk = whole.next_chunk().await.unwrap().unwrap();
    assert_eq!(chunk.data.len(), 100);
    assert_eq!(chunk.fraction, 1.0);
    assert!(whole.next_chunk().await.unwrap().is_none());

    let mut missing = client.open_media("nope").unwrap();
    let err = missing.next_chunk().await.unwrap_err();
    assert_eq!(err.kind(), RemoteErrorKind::NotFound);

    handle.abort();
}

#[tokio::test]
async fn media_stream_fails_when_server_stops_short_of_total() {
    let (addr, handle) = start_server().await;
    let client = drive(addr, TOKEN, 30);

    let mut stream = client.open_media("stalled").unwrap();
    let first = stream.next_chunk().await.unwrap().unwrap();
    assert_eq!(first.data.len(), 30);
    assert_eq!(stream.total_size(), Some(100));

    let err = stream.next_chunk().await.unwrap_err();
    assert_eq!(err.kind(), RemoteErrorKind::Network);
    assert_eq!(stream.bytes_received(), 30);

    handle.abort();
}
