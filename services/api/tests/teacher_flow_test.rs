//! Tests for the teacher's assignment and grading pages

mod common;

use chrono::Utc;
use common::{create_assignment, create_test_server, login_teacher, submit};
use serde_json::{json, Value};

#[tokio::test]
async fn test_created_assignment_appears_once() {
    let server = create_test_server().await;
    let id = create_assignment(&server, "HW1").await;

    let rows: Value = server.get("/teacher/assignments").await.json();
    let rows = rows.as_array().expect("rows");
    let matching: Vec<&Value> = rows
        .iter()
        .filter(|r| r["assignment"]["title"] == "HW1")
        .collect();
    assert_eq!(matching.len(), 1);
    assert_eq!(matching[0]["assignment"]["id"], id.as_str());
    assert_eq!(matching[0]["submission_count"], 0);
    assert_eq!(matching[0]["assignment"]["overdue"], false);
}

#[tokio::test]
async fn test_create_requires_fields_and_future_deadline() {
    let server = create_test_server().await;
    login_teacher(&server).await;

    let missing_title = server
        .post("/teacher/assignments")
        .json(&json!({
            "title": "  ",
            "description": "d",
            "deadline": Utc::now() + chrono::Duration::days(1),
            "allowed_file_types": ".pdf"
        }))
        .await;
    assert_eq!(missing_title.status_code(), 400);

    let past_deadline = server
        .post("/teacher/assignments")
        .json(&json!({
            "title": "Late",
            "description": "d",
            "deadline": Utc::now() - chrono::Duration::days(1),
            "allowed_file_types": ".pdf"
        }))
        .await;
    assert_eq!(past_deadline.status_code(), 400);
    let body: Value = past_deadline.json();
    assert_eq!(body["reason"], "Deadline must be in the future");
}

#[tokio::test]
async fn test_update_changes_only_given_fields() {
    let server = create_test_server().await;
    let id = create_assignment(&server, "HW1").await;

    let response = server
        .put(&format!("/teacher/assignments/{}", id))
        .json(&json!({ "title": "HW1 (revised)" }))
        .await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["title"], "HW1 (revised)");
    assert_eq!(body["description"], "Chapter 3 exercises");

    let missing = server
        .put("/teacher/assignments/does-not-exist")
        .json(&json!({ "title": "x" }))
        .await;
    assert_eq!(missing.status_code(), 404);
}

#[tokio::test]
async fn test_toast_follows_a_mutation() {
    let server = create_test_server().await;
    create_assignment(&server, "HW1").await;

    let response = server.get("/toast").await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["message"], "Assignment created successfully!");
    assert_eq!(body["kind"], "success");
}

#[tokio::test]
async fn test_submit_then_grade() {
    let server = create_test_server().await;
    let assignment_id = create_assignment(&server, "HW1").await;
    let submission_id = submit(&server, &assignment_id).await;

    login_teacher(&server).await;
    let response = server
        .post(&format!("/teacher/submissions/{}/grade", submission_id))
        .json(&json!({ "grade": "95/100", "feedback": "Well argued" }))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["status"], "graded");
    assert_eq!(body["grade"], "95/100");
    assert_eq!(body["feedback"], "Well argued");

    let dashboard: Value = server.get("/teacher/dashboard").await.json();
    assert_eq!(dashboard["total_submissions"], 1);
    assert_eq!(dashboard["graded"], 1);
    assert_eq!(dashboard["pending_review"], 0);
}

#[tokio::test]
async fn test_graded_submission_cannot_go_back_to_reviewed() {
    let server = create_test_server().await;
    let assignment_id = create_assignment(&server, "HW1").await;
    let submission_id = submit(&server, &assignment_id).await;

    login_teacher(&server).await;
    let reviewed = server
        .post(&format!("/teacher/submissions/{}/review", submission_id))
        .await;
    assert_eq!(reviewed.status_code(), 200);
    let body: Value = reviewed.json();
    assert_eq!(body["status"], "reviewed");

    server
        .post(&format!("/teacher/submissions/{}/grade", submission_id))
        .json(&json!({ "grade": "A" }))
        .await;

    let regress = server
        .post(&format!("/teacher/submissions/{}/review", submission_id))
        .await;
    assert_eq!(regress.status_code(), 409);
}

#[tokio::test]
async fn test_grade_requires_text() {
    let server = create_test_server().await;
    let assignment_id = create_assignment(&server, "HW1").await;
    let submission_id = submit(&server, &assignment_id).await;

    login_teacher(&server).await;
    let response = server
        .post(&format!("/teacher/submissions/{}/grade", submission_id))
        .json(&json!({ "grade": "" }))
        .await;
    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn test_deleting_an_assignment_leaves_its_submissions() {
    let server = create_test_server().await;
    let assignment_id = create_assignment(&server, "HW1").await;
    let submission_id = submit(&server, &assignment_id).await;

    login_teacher(&server).await;
    let response = server
        .delete(&format!("/teacher/assignments/{}", assignment_id))
        .await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["orphaned_submissions"], 1);

    let detail: Value = server
        .get(&format!("/teacher/submissions/{}", submission_id))
        .await
        .json();
    assert!(detail["assignment"].is_null());
    assert!(detail["submission"]["assignment_title"].is_null());
}

#[tokio::test]
async fn test_teacher_downloads_the_submitted_file() {
    let server = create_test_server().await;
    let assignment_id = create_assignment(&server, "HW1").await;
    let submission_id = submit(&server, &assignment_id).await;

    login_teacher(&server).await;
    let response = server
        .get(&format!("/teacher/submissions/{}/download", submission_id))
        .await;

    assert_eq!(response.status_code(), 200);
    assert_eq!(response.as_bytes().as_ref(), b"%PDF-1.4 essay");
    let disposition = response.header("content-disposition");
    assert_eq!(
        disposition.to_str().unwrap(),
        "attachment; filename=\"essay.pdf\""
    );
}
