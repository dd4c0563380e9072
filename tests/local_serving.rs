//! Local layout resolution and service endpoints over real sockets.

use axum::http::StatusCode;

mod common;

use common::{client, config_with_peers, spawn_relay, start_mock_backend, write_file, MockReply};

#[tokio::test]
async fn serves_each_layout_with_its_content_type() {
    let root = tempfile::tempdir().unwrap();
    write_file(root.path(), "avatar.png", b"direct");
    write_file(root.path(), "Images/photo.jpg", b"image");
    write_file(root.path(), "Contracts/lease.pdf", b"contract");
    write_file(root.path(), "tickets/42/report.pdf", b"ticket");

    let (addr, shutdown) = spawn_relay(config_with_peers(root.path(), &[])).await;

    let cases = [
        ("avatar.png", "image/png", "direct"),
        ("photo.jpg", "image/jpeg", "image"),
        ("lease.pdf", "application/pdf", "contract"),
        ("tickets/42/report.pdf", "application/pdf", "ticket"),
    ];
    for (path, content_type, body) in cases {
        let res = client()
            .get(format!("http://{}/files/{}", addr, path))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK, "{}", path);
        assert_eq!(res.headers()["content-type"], content_type, "{}", path);
        assert_eq!(res.headers()["access-control-allow-origin"], "*");
        assert_eq!(res.text().await.unwrap(), body, "{}", path);
    }

    shutdown.trigger();
}

#[tokio::test]
async fn ticket_file_beats_flat_layouts() {
    let root = tempfile::tempdir().unwrap();
    write_file(root.path(), "tickets/7/scan.png", b"ticket");
    write_file(root.path(), "Images/scan.png", b"image");

    let (addr, shutdown) = spawn_relay(config_with_peers(root.path(), &[])).await;

    let res = client()
        .get(format!("http://{}/files/tickets/7/scan.png", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.text().await.unwrap(), "ticket");

    shutdown.trigger();
}

#[tokio::test]
async fn untyped_extension_is_served_without_content_type() {
    let root = tempfile::tempdir().unwrap();
    write_file(root.path(), "notes.txt", b"plain");

    let (addr, shutdown) = spawn_relay(config_with_peers(root.path(), &[])).await;

    let res = client()
        .get(format!("http://{}/files/notes.txt", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().get("content-type").is_none());
    assert_eq!(res.text().await.unwrap(), "plain");

    shutdown.trigger();
}

#[tokio::test]
async fn traversal_is_rejected_without_relay() {
    let root = tempfile::tempdir().unwrap();
    let outside = tempfile::tempdir().unwrap();
    write_file(outside.path(), "secret.pdf", b"secret");
    let peer = start_mock_backend(MockReply::ok("application/pdf", "remote")).await;

    let (addr, shutdown) =
        spawn_relay(config_with_peers(root.path(), &[("file-store", peer.url())])).await;

    let res = client()
        .get(format!("http://{}/files/..%2F..%2Fsecret.pdf", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(peer.call_count(), 0);

    shutdown.trigger();
}

#[tokio::test]
async fn legacy_uploads_fall_back_to_old_directory() {
    let root = tempfile::tempdir().unwrap();
    let old = tempfile::tempdir().unwrap();
    write_file(root.path(), "fresh.png", b"fresh");
    write_file(old.path(), "memo.m4a", b"memo");
    let peer = start_mock_backend(MockReply::ok("image/png", "remote")).await;

    let mut config = config_with_peers(root.path(), &[("file-store", peer.url())]);
    config.storage.legacy_uploads_dir = Some(old.path().to_path_buf());
    let (addr, shutdown) = spawn_relay(config).await;

    let res = client()
        .get(format!("http://{}/uploads/fresh.png", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.text().await.unwrap(), "fresh");

    let res = client()
        .get(format!("http://{}/uploads/memo.m4a", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["content-type"], "audio/mpeg");
    assert_eq!(res.text().await.unwrap(), "memo");

    let res = client()
        .get(format!("http://{}/uploads/absent.png", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(peer.call_count(), 0);

    shutdown.trigger();
}

#[tokio::test]
async fn index_and_health() {
    let root = tempfile::tempdir().unwrap();
    let (addr, shutdown) = spawn_relay(config_with_peers(root.path(), &[])).await;

    let body: serde_json::Value = client()
        .get(format!("http://{}/", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["endpoints"]["files"], "/files/");
    assert_eq!(body["endpoints"]["uploads"], "/uploads/");

    let body: serde_json::Value = client()
        .get(format!("http://{}/api/v1/health", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body, serde_json::json!({"status": "ok"}));

    shutdown.trigger();
}

#[tokio::test]
async fn custom_mount_moves_asset_route() {
    let root = tempfile::tempdir().unwrap();
    write_file(root.path(), "Images/x.png", b"png");

    let mut config = config_with_peers(root.path(), &[]);
    config.storage.mount = "assets".to_string();
    let (addr, shutdown) = spawn_relay(config).await;

    let res = client()
        .get(format!("http://{}/assets/x.png", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.text().await.unwrap(), "png");

    let res = client()
        .get(format!("http://{}/files/x.png", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Route not found");

    shutdown.trigger();
}

#[cfg(unix)]
#[tokio::test]
async fn unreadable_local_entry_is_a_server_error() {
    let root = tempfile::tempdir().unwrap();
    let looped = root.path().join("loop.png");
    std::os::unix::fs::symlink(&looped, &looped).unwrap();
    let peer = start_mock_backend(MockReply::ok("image/png", "remote")).await;

    let (addr, shutdown) =
        spawn_relay(config_with_peers(root.path(), &[("file-store", peer.url())])).await;

    let res = client()
        .get(format!("http://{}/files/loop.png", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(peer.call_count(), 0);

    shutdown.trigger();
}
