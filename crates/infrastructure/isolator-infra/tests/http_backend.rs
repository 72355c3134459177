use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use camino::Utf8PathBuf;
use isolator_core::{CreateProfileRequest, ProfileArchive, ProfileStatus};
use isolator_infra::{
    export_file_name, ApiError, ApiErrorKind, HttpProfilesBackend, ProfilesBackend,
};
use serde_json::json;
use tempfile::tempdir;

#[derive(Clone, Default)]
struct Seen {
    calls: Arc<Mutex<Vec<String>>>,
}

impl Seen {
    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

async fn start_mock_backend(seen: Seen) -> (SocketAddr, tokio::task::JoinHandle<()>) {
    async fn list() -> impl IntoResponse {
        Json(json!({
            "profiles": [
                { "name": "work", "status": "running", "size_mb": 120, "has_desktop_entry": true },
                { "name": "banking", "status": "exited", "size_mb": 2.5, "has_desktop_entry": false }
            ]
        }))
    }

    async fn create(
        State(seen): State<Seen>,
        Json(body): Json<CreateProfileRequest>,
    ) -> impl IntoResponse {
        seen.record(format!(
            "create:{}:{}",
            body.name,
            body.location.as_deref().unwrap_or("-")
        ));
        if body.name == "taken" {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Profile directory already exists" })),
            );
        }
        (StatusCode::OK, Json(json!({ "status": "created", "name": body.name })))
    }

    async fn start(State(seen): State<Seen>, Path(name): Path<String>) -> impl IntoResponse {
        seen.record(format!("start:{name}"));
        if name == "work" {
            return (
                StatusCode::CONFLICT,
                Json(json!({ "error": "already running" })),
            )
                .into_response();
        }
        Json(json!({ "status": "started" })).into_response()
    }

    async fn stop(State(seen): State<Seen>, Path(name): Path<String>) -> impl IntoResponse {
        seen.record(format!("stop:{name}"));
        (StatusCode::INTERNAL_SERVER_ERROR, "docker daemon unavailable")
    }

    async fn delete(State(seen): State<Seen>, Path(name): Path<String>) -> impl IntoResponse {
        seen.record(format!("delete:{name}"));
        Json(json!({ "status": "deleted", "name": name }))
    }

    async fn status(Path(name): Path<String>) -> impl IntoResponse {
        Json(json!({ "name": name, "status": "exited", "size_mb": 7.25 }))
    }

    async fn export(Path(name): Path<String>) -> impl IntoResponse {
        format!("PK-archive-of-{name}")
    }

    async fn import(State(seen): State<Seen>, mut form: Multipart) -> impl IntoResponse {
        while let Ok(Some(field)) = form.next_field().await {
            if field.name() == Some("file") {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.unwrap_or_default();
                seen.record(format!("import:{file_name}:{}", bytes.len()));
                return Json(json!({
                    "status": "imported",
                    "name": "restored",
                    "path": "/home/op/Chrome/restored",
                    "message": "Profile imported successfully"
                }))
                .into_response();
            }
        }
        (StatusCode::BAD_REQUEST, Json(json!({ "error": "No file provided" }))).into_response()
    }

    let app = Router::new()
        .route("/api/profiles", get(list).post(create))
        .route("/api/profiles/import", post(import))
        .route("/api/profiles/:name", axum::routing::delete(delete))
        .route("/api/profiles/:name/start", post(start))
        .route("/api/profiles/:name/stop", post(stop))
        .route("/api/profiles/:name/status", get(status))
        .route("/api/profiles/:name/export", get(export))
        .with_state(seen);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, handle)
}

fn backend_for(addr: SocketAddr) -> HttpProfilesBackend {
    HttpProfilesBackend::new(reqwest::Client::new(), &format!("http://{addr}/")).unwrap()
}

#[tokio::test]
async fn lists_profiles_in_server_order() {
    let (addr, _server) = start_mock_backend(Seen::default()).await;
    let backend = backend_for(addr);

    let profiles = backend.list_profiles().await.unwrap();
    assert_eq!(profiles.len(), 2);
    assert_eq!(profiles[0].name, "work");
    assert_eq!(profiles[0].status, ProfileStatus::Running);
    assert_eq!(profiles[1].name, "banking");
    assert_eq!(profiles[1].size_mb, 2.5);
}

#[tokio::test]
async fn non_success_is_an_application_error_with_server_message() {
    let (addr, _server) = start_mock_backend(Seen::default()).await;
    let backend = backend_for(addr);

    let err = backend.start_profile("work").await.unwrap_err();
    assert_eq!(err.kind(), ApiErrorKind::Application);
    match &err {
        ApiError::Application { status, message } => {
            assert_eq!(*status, 409);
            assert_eq!(message.as_deref(), Some("already running"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.user_message("Failed to start profile"), "already running");
}

#[tokio::test]
async fn non_json_error_body_falls_back() {
    let (addr, _server) = start_mock_backend(Seen::default()).await;
    let backend = backend_for(addr);

    let err = backend.stop_profile("work").await.unwrap_err();
    assert!(matches!(
        err,
        ApiError::Application {
            status: 500,
            message: None
        }
    ));
    assert_eq!(err.user_message("Failed to stop profile"), "Failed to stop profile");
}

#[tokio::test]
async fn names_are_percent_encoded_into_paths() {
    let seen = Seen::default();
    let (addr, _server) = start_mock_backend(seen.clone()).await;
    let backend = backend_for(addr);

    backend.start_profile("my profile/2").await.unwrap();
    backend.delete_profile("ünï?#").await.unwrap();

    assert_eq!(seen.calls(), ["start:my profile/2", "delete:ünï?#"]);
    assert_eq!(
        backend.export_url("my profile"),
        format!("http://{addr}/api/profiles/my%20profile/export")
    );
}

#[tokio::test]
async fn create_sends_optional_location() {
    let seen = Seen::default();
    let (addr, _server) = start_mock_backend(seen.clone()).await;
    let backend = backend_for(addr);

    backend
        .create_profile(&CreateProfileRequest {
            name: "work".into(),
            location: None,
        })
        .await
        .unwrap();
    backend
        .create_profile(&CreateProfileRequest {
            name: "travel".into(),
            location: Some("/mnt/data/travel".into()),
        })
        .await
        .unwrap();
    let err = backend
        .create_profile(&CreateProfileRequest {
            name: "taken".into(),
            location: None,
        })
        .await
        .unwrap_err();

    assert_eq!(
        err.user_message("Failed to create profile"),
        "Profile directory already exists"
    );
    assert_eq!(
        seen.calls(),
        ["create:work:-", "create:travel:/mnt/data/travel", "create:taken:-"]
    );
}

#[tokio::test]
async fn status_and_import_decode_bodies() {
    let seen = Seen::default();
    let (addr, _server) = start_mock_backend(seen.clone()).await;
    let backend = backend_for(addr);

    let report = backend.profile_status("banking").await.unwrap();
    assert_eq!(report.name, "banking");
    assert_eq!(report.status, ProfileStatus::Exited);
    assert_eq!(report.size_mb, 7.25);

    let receipt = backend
        .import_profile(&ProfileArchive {
            file_name: "restored.zip".into(),
            bytes: vec![1, 2, 3, 4],
        })
        .await
        .unwrap();
    assert_eq!(receipt.name.as_deref(), Some("restored"));
    assert_eq!(receipt.message.as_deref(), Some("Profile imported successfully"));
    assert_eq!(seen.calls(), ["import:restored.zip:4"]);
}

#[tokio::test]
async fn export_is_downloaded_to_named_zip() {
    let (addr, _server) = start_mock_backend(Seen::default()).await;
    let backend = backend_for(addr);
    let dir = tempdir().unwrap();
    let dest = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
    let target = dest.join(export_file_name("work"));

    let written = backend
        .download_url(&backend.export_url("work"), &target)
        .await
        .unwrap();
    assert_eq!(target, dest.join("work.zip"));
    assert_eq!(written, "PK-archive-of-work".len() as u64);
    assert_eq!(std::fs::read_to_string(&target).unwrap(), "PK-archive-of-work");
    assert!(!dest.join("work.zip.part").exists());
}

#[tokio::test]
async fn failed_download_leaves_no_partial_file() {
    let (addr, _server) = start_mock_backend(Seen::default()).await;
    let backend = backend_for(addr);
    let dir = tempdir().unwrap();
    let dest = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
    // A directory in the way makes the final rename fail after the body was written.
    let target = dest.join("work.zip");
    std::fs::create_dir(&target).unwrap();

    let err = backend
        .download_url(&backend.export_url("work"), &target)
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Io(_)), "unexpected error: {err:?}");
    assert!(!dest.join("work.zip.part").exists());
    assert!(target.is_dir());
}

#[tokio::test]
async fn unreachable_backend_is_a_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let backend = backend_for(addr);
    let err = backend.list_profiles().await.unwrap_err();
    assert_eq!(err.kind(), ApiErrorKind::Transport);
}

#[test]
fn rejects_unusable_base_urls() {
    assert!(HttpProfilesBackend::new(reqwest::Client::new(), "not a url").is_err());
    assert!(HttpProfilesBackend::new(reqwest::Client::new(), "mailto:op@example.com").is_err());

    let prefixed =
        HttpProfilesBackend::new(reqwest::Client::new(), "http://127.0.0.1:5000/isolator/")
            .unwrap();
    assert_eq!(prefixed.base_url(), "http://127.0.0.1:5000/isolator");
}
