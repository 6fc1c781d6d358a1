//! Common test utilities for portal integration tests

use std::sync::Arc;
use std::time::Duration;

use api_lib::{
    adapters::Argon2Hasher,
    config::Config,
    web::{create_router, AppState},
};
use axum_test::{
    multipart::{MultipartForm, Part},
    TestServer,
};
use chrono::Utc;
use portal_core::{FileTransferService, InMemoryKeyValueStore, KeyValueStore};
use serde_json::{json, Value};

pub const TEACHER_EMAIL: &str = "teacher@example.com";
pub const TEACHER_PASSWORD: &str = "teacher123";
pub const STUDENT_EMAIL: &str = "student@example.com";
pub const STUDENT_PASSWORD: &str = "student123";

/// Config with instant file transfers.
pub fn test_config() -> Config {
    Config {
        transfer_delay: Duration::ZERO,
        ..Config::default()
    }
}

/// Create a test server over the given key-value store
pub async fn create_test_server_with(kv: Arc<dyn KeyValueStore>, config: Config) -> TestServer {
    let state = AppState::initialize(Arc::new(config), kv, Arc::new(Argon2Hasher::new()))
        .await
        .expect("Failed to initialize portal");
    let app = create_router(Arc::new(state));
    TestServer::new(app).expect("Failed to create test server")
}

/// Create a test server over a fresh in-memory store, moving files through `files`
pub async fn create_test_server_with_files(files: Arc<dyn FileTransferService>) -> TestServer {
    let state = AppState::initialize(
        Arc::new(test_config()),
        Arc::new(InMemoryKeyValueStore::new()),
        Arc::new(Argon2Hasher::new()),
    )
    .await
    .expect("Failed to initialize portal");
    let app = create_router(Arc::new(AppState { files, ..state }));
    TestServer::new(app).expect("Failed to create test server")
}

/// Create a test server over a fresh in-memory store
pub async fn create_test_server() -> TestServer {
    create_test_server_with(Arc::new(InMemoryKeyValueStore::new()), test_config()).await
}

pub async fn login(server: &TestServer, email: &str, password: &str) {
    let response = server
        .post("/auth/login")
        .json(&json!({ "email": email, "password": password }))
        .await;
    assert_eq!(response.status_code(), 200, "login failed for {}", email);
}

pub async fn login_teacher(server: &TestServer) {
    login(server, TEACHER_EMAIL, TEACHER_PASSWORD).await;
}

pub async fn login_student(server: &TestServer) {
    login(server, STUDENT_EMAIL, STUDENT_PASSWORD).await;
}

/// Creates an assignment due in a week as the teacher and returns its id.
/// Leaves the teacher signed in.
pub async fn create_assignment(server: &TestServer, title: &str) -> String {
    login_teacher(server).await;
    let response = server
        .post("/teacher/assignments")
        .json(&json!({
            "title": title,
            "description": "Chapter 3 exercises",
            "deadline": Utc::now() + chrono::Duration::days(7),
            "allowed_file_types": ".pdf,.docx",
            "max_points": 100
        }))
        .await;
    assert_eq!(response.status_code(), 201);
    let body: Value = response.json();
    body["id"].as_str().expect("assignment id").to_string()
}

pub fn file_form(file_name: &str, bytes: Vec<u8>) -> MultipartForm {
    MultipartForm::new().add_part(
        "file",
        Part::bytes(bytes)
            .file_name(file_name)
            .mime_type("application/pdf"),
    )
}

/// Submits a small PDF for the assignment as the seeded student and returns
/// the submission id. Leaves the student signed in.
pub async fn submit(server: &TestServer, assignment_id: &str) -> String {
    login_student(server).await;
    let response = server
        .post(&format!("/student/assignments/{}/submit", assignment_id))
        .multipart(
            file_form("essay.pdf", b"%PDF-1.4 essay".to_vec()).add_text("comment", "First draft"),
        )
        .await;
    assert_eq!(response.status_code(), 201);
    let body: Value = response.json();
    body["id"].as_str().expect("submission id").to_string()
}
