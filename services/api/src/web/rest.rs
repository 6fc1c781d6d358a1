//! services/api/src/web/rest.rs
//!
//! The view payloads shared by the teacher and student pages, a few shared
//! handlers, and the master definition for the OpenAPI specification.

use crate::web::{auth, state::AppState, student, teacher};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use portal_core::domain::{Assignment, FileBlob, Identity, Notice, NoticeKind, Submission};
use portal_core::views::{self, StatusCounts};
use serde::Serialize;
use std::sync::Arc;
use utoipa::{OpenApi, ToSchema};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::login_handler,
        auth::register_handler,
        auth::logout_handler,
        auth::session_context_handler,
        toast_handler,
        teacher::dashboard_handler,
        teacher::list_assignments_handler,
        teacher::create_assignment_handler,
        teacher::update_assignment_handler,
        teacher::delete_assignment_handler,
        teacher::assignment_submissions_handler,
        teacher::submission_detail_handler,
        teacher::mark_reviewed_handler,
        teacher::grade_handler,
        teacher::download_handler,
        student::dashboard_handler,
        student::list_assignments_handler,
        student::submit_handler,
        student::list_submissions_handler,
        student::submission_detail_handler,
        student::download_handler,
    ),
    components(
        schemas(
            IdentityView, AssignmentView, SubmissionView, StatusCountsView, ToastView,
            auth::LoginRequest, auth::RegisterRequest, auth::SessionContext,
            teacher::TeacherDashboard, teacher::TeacherAssignmentRow,
            teacher::CreateAssignmentRequest, teacher::UpdateAssignmentRequest,
            teacher::AssignmentSubmissions, teacher::SubmissionDetail, teacher::GradeRequest,
            student::StudentDashboard, student::StudentAssignments,
            student::SubmittedAssignmentRow, student::StudentSubmissions,
        )
    ),
    tags(
        (name = "Assignment Portal API", description = "Assignment and submission pages for teachers and students.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// View Payloads
//=========================================================================================

#[derive(Serialize, ToSchema, Debug, Clone, PartialEq)]
pub struct IdentityView {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: String,
}

impl From<&Identity> for IdentityView {
    fn from(identity: &Identity) -> Self {
        Self {
            id: identity.id.clone(),
            email: identity.email.clone(),
            name: identity.name.clone(),
            role: identity.role.to_string(),
        }
    }
}

#[derive(Serialize, ToSchema, Debug, Clone)]
pub struct AssignmentView {
    pub id: String,
    pub title: String,
    pub description: String,
    pub deadline: DateTime<Utc>,
    pub allowed_file_types: String,
    pub max_points: Option<u32>,
    pub created_at: DateTime<Utc>,
    pub overdue: bool,
    /// e.g. "3 days remaining", "Due soon", "Overdue".
    pub time_remaining: String,
}

impl AssignmentView {
    pub fn new(assignment: &Assignment, now: DateTime<Utc>) -> Self {
        Self {
            id: assignment.id.clone(),
            title: assignment.title.clone(),
            description: assignment.description.clone(),
            deadline: assignment.deadline,
            allowed_file_types: assignment.allowed_file_types.clone(),
            max_points: assignment.max_points,
            created_at: assignment.created_at,
            overdue: views::is_overdue(assignment.deadline, now),
            time_remaining: views::time_remaining(assignment.deadline, now),
        }
    }
}

#[derive(Serialize, ToSchema, Debug, Clone)]
pub struct SubmissionView {
    pub id: String,
    pub assignment_id: String,
    /// `None` once the assignment has been deleted.
    pub assignment_title: Option<String>,
    pub student_id: String,
    pub student_name: String,
    pub file_name: String,
    pub file_size: u64,
    pub file_type: String,
    pub comment: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub status: String,
    pub grade: Option<String>,
    pub feedback: Option<String>,
}

impl SubmissionView {
    /// Joins the submission with its assignment, if that still exists.
    pub fn new(submission: &Submission, assignments: &[Assignment]) -> Self {
        let assignment_title = assignments
            .iter()
            .find(|a| a.id == submission.assignment_id)
            .map(|a| a.title.clone());
        Self {
            id: submission.id.clone(),
            assignment_id: submission.assignment_id.clone(),
            assignment_title,
            student_id: submission.student_id.clone(),
            student_name: submission.student_name.clone(),
            file_name: submission.file_name.clone(),
            file_size: submission.file_size,
            file_type: submission.file_type.clone(),
            comment: submission.comment.clone(),
            submitted_at: submission.submitted_at,
            status: submission.status.to_string(),
            grade: submission.grade.clone(),
            feedback: submission.feedback.clone(),
        }
    }
}

#[derive(Serialize, ToSchema, Debug, Clone, Copy)]
pub struct StatusCountsView {
    pub submitted: usize,
    pub reviewed: usize,
    pub graded: usize,
    pub total: usize,
}

impl From<StatusCounts> for StatusCountsView {
    fn from(counts: StatusCounts) -> Self {
        Self {
            submitted: counts.submitted,
            reviewed: counts.reviewed,
            graded: counts.graded,
            total: counts.total(),
        }
    }
}

#[derive(Serialize, ToSchema, Debug, Clone)]
pub struct ToastView {
    pub message: String,
    /// "success" or "error".
    pub kind: String,
}

impl From<Notice> for ToastView {
    fn from(notice: Notice) -> Self {
        let kind = match notice.kind {
            NoticeKind::Success => "success",
            NoticeKind::Error => "error",
        };
        Self {
            message: notice.message,
            kind: kind.to_string(),
        }
    }
}

//=========================================================================================
// Shared Handlers and Helpers
//=========================================================================================

/// The notice currently on screen.
#[utoipa::path(
    get,
    path = "/toast",
    responses(
        (status = 200, description = "A notice is visible", body = ToastView),
        (status = 204, description = "Nothing to show")
    )
)]
pub async fn toast_handler(State(state): State<Arc<AppState>>) -> Response {
    match state.toasts.current(Utc::now()) {
        Some(notice) => Json(ToastView::from(notice)).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

/// Turns a downloaded file into a save-as response.
pub fn attachment(blob: FileBlob) -> Response {
    let disposition = format!(
        "attachment; filename=\"{}\"",
        blob.file_name.replace('"', "")
    );
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, blob.content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        blob.bytes,
    )
        .into_response()
}
