mod common;

use std::path::Path;

use common::{TestServer, abort_after, get};
use model_mock::{FileConfig, MODEL_FILE_NAME, ModelFile, router};

async fn start(path: &Path) -> TestServer {
    TestServer::start(router(ModelFile::new(FileConfig::new(0, path)))).await
}

fn pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 7 % 256) as u8).collect()
}

#[tokio::test]
async fn serves_file_bytes_on_both_paths() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(MODEL_FILE_NAME);
    let data = pattern(2 * 1024 * 1024 + 4321);
    std::fs::write(&path, &data).unwrap();

    let server = start(&path).await;

    for route in ["/", "/model.gguf"] {
        let res = get(server.addr, route).await;
        assert_eq!(res.status, 200, "{route}");
        assert_eq!(res.header("content-length"), Some(data.len().to_string().as_str()));
        assert_eq!(res.header("content-type"), Some("application/octet-stream"));
        assert_eq!(res.header("accept-ranges"), Some("bytes"));
        assert_eq!(
            res.header("content-disposition").map(str::to_owned),
            Some(format!("attachment; filename=\"{MODEL_FILE_NAME}\"")),
        );
        assert!(res.body == data, "{route} body differs from the file");
    }

    server.stop().await;
}

#[tokio::test]
async fn health_reports_actual_size() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.gguf");
    std::fs::write(&path, pattern(12_345)).unwrap();

    let server = start(&path).await;

    let res = get(server.addr, "/health").await;
    assert_eq!(res.status, 200);
    assert_eq!(res.header("content-type"), Some("application/json"));
    assert_eq!(&res.body[..], br#"{"status":"ok","file_size":12345}"#);

    server.stop().await;
}

#[tokio::test]
async fn missing_file_is_404_and_503() {
    let dir = tempfile::tempdir().unwrap();
    let server = start(&dir.path().join("absent.gguf")).await;

    assert_eq!(get(server.addr, "/model.gguf").await.status, 404);
    assert_eq!(get(server.addr, "/").await.status, 404);

    let res = get(server.addr, "/health").await;
    assert_eq!(res.status, 503);
    assert_eq!(&res.body[..], br#"{"status":"error","message":"Model file not found"}"#);

    server.stop().await;
}

#[tokio::test]
async fn file_appearing_later_is_picked_up() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("late.gguf");
    let server = start(&path).await;

    assert_eq!(get(server.addr, "/health").await.status, 503);

    std::fs::write(&path, b"GGUF").unwrap();

    let res = get(server.addr, "/model.gguf").await;
    assert_eq!(res.status, 200);
    assert_eq!(&res.body[..], b"GGUF");
    assert_eq!(&get(server.addr, "/health").await.body[..], br#"{"status":"ok","file_size":4}"#);

    server.stop().await;
}

#[tokio::test]
async fn directory_is_not_a_model() {
    let dir = tempfile::tempdir().unwrap();
    let server = start(dir.path()).await;

    assert_eq!(get(server.addr, "/model.gguf").await.status, 404);
    assert_eq!(get(server.addr, "/health").await.status, 503);

    server.stop().await;
}

#[tokio::test]
async fn unknown_paths_are_404() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.gguf");
    std::fs::write(&path, b"GGUF").unwrap();
    let server = start(&path).await;

    assert_eq!(get(server.addr, "/models/model.gguf").await.status, 404);
    assert_eq!(get(server.addr, "/healthz").await.status, 404);
    assert_eq!(&get(server.addr, "/model.gguf").await.body[..], b"GGUF");

    server.stop().await;
}

#[tokio::test]
async fn survives_client_abort_mid_download() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("big.gguf");
    let data = pattern(32 * 1024 * 1024);
    std::fs::write(&path, &data).unwrap();

    let server = start(&path).await;

    abort_after(server.addr, "/model.gguf", 128 * 1024).await;

    let res = get(server.addr, "/model.gguf").await;
    assert_eq!(res.status, 200);
    assert!(res.body == data);

    server.stop().await;
}
