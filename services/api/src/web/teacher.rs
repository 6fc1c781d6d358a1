//! services/api/src/web/teacher.rs
//!
//! Handlers behind `/teacher/*`. The role gate has already run, so every
//! handler here can rely on a signed-in teacher.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use portal_core::domain::{AssignmentPatch, Identity, NewAssignment};
use portal_core::views::{self, StatusCounts};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::web::rest::{attachment, AssignmentView, StatusCountsView, SubmissionView};
use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Serialize, ToSchema)]
pub struct TeacherDashboard {
    pub name: String,
    pub total_assignments: usize,
    pub total_submissions: usize,
    pub pending_review: usize,
    pub reviewed: usize,
    pub graded: usize,
    /// Newest first.
    pub recent: Vec<SubmissionView>,
    /// Submissions whose assignment has been deleted.
    pub orphaned_submissions: Vec<SubmissionView>,
}

#[derive(Serialize, ToSchema)]
pub struct TeacherAssignmentRow {
    pub assignment: AssignmentView,
    pub submission_count: usize,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateAssignmentRequest {
    pub title: String,
    pub description: String,
    pub deadline: DateTime<Utc>,
    pub allowed_file_types: String,
    pub max_points: Option<u32>,
}

#[derive(Deserialize, ToSchema, Default)]
pub struct UpdateAssignmentRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
    pub allowed_file_types: Option<String>,
    pub max_points: Option<u32>,
}

#[derive(Serialize, ToSchema)]
pub struct AssignmentSubmissions {
    pub assignment: AssignmentView,
    pub submissions: Vec<SubmissionView>,
    pub counts: StatusCountsView,
}

#[derive(Serialize, ToSchema)]
pub struct SubmissionDetail {
    pub submission: SubmissionView,
    /// `None` when the assignment was deleted after the submission came in.
    pub assignment: Option<AssignmentView>,
}

#[derive(Deserialize, ToSchema)]
pub struct GradeRequest {
    pub grade: String,
    #[serde(default)]
    pub feedback: Option<String>,
}

fn require_text(value: &str, field: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::validation(format!("{} is required", field)));
    }
    Ok(())
}

fn submission_not_found() -> ApiError {
    ApiError::not_found("Submission not found")
}

//=========================================================================================
// Handlers
//=========================================================================================

/// GET /teacher/dashboard - Totals, status breakdown and the latest submissions
#[utoipa::path(
    get,
    path = "/teacher/dashboard",
    responses(
        (status = 200, description = "Teacher dashboard", body = TeacherDashboard),
        (status = 303, description = "Not signed in as a teacher")
    )
)]
pub async fn dashboard_handler(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
) -> Json<TeacherDashboard> {
    let portal = state.portal.lock().await;
    let assignments = portal.store.assignments();
    let overview = views::teacher_overview(assignments, portal.store.submissions());

    Json(TeacherDashboard {
        name: identity.name,
        total_assignments: overview.total_assignments,
        total_submissions: overview.total_submissions,
        pending_review: overview.counts.submitted,
        reviewed: overview.counts.reviewed,
        graded: overview.counts.graded,
        recent: overview
            .recent
            .into_iter()
            .map(|s| SubmissionView::new(s, assignments))
            .collect(),
        orphaned_submissions: overview
            .orphaned
            .into_iter()
            .map(|s| SubmissionView::new(s, assignments))
            .collect(),
    })
}

/// GET /teacher/assignments - Every assignment with its submission count
#[utoipa::path(
    get,
    path = "/teacher/assignments",
    responses(
        (status = 200, description = "All assignments", body = [TeacherAssignmentRow])
    )
)]
pub async fn list_assignments_handler(
    State(state): State<Arc<AppState>>,
) -> Json<Vec<TeacherAssignmentRow>> {
    let (assignments, submissions) = {
        let portal = state.portal.lock().await;
        (
            portal.store.assignments_snapshot(),
            portal.store.submissions_snapshot(),
        )
    };
    let now = Utc::now();

    Json(
        assignments
            .iter()
            .map(|a| TeacherAssignmentRow {
                assignment: AssignmentView::new(a, now),
                submission_count: views::submission_count(&submissions, &a.id),
            })
            .collect(),
    )
}

/// POST /teacher/assignments - Create an assignment
#[utoipa::path(
    post,
    path = "/teacher/assignments",
    request_body = CreateAssignmentRequest,
    responses(
        (status = 201, description = "Assignment created", body = AssignmentView),
        (status = 400, description = "Missing fields or a deadline in the past")
    )
)]
pub async fn create_assignment_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateAssignmentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    require_text(&req.title, "Title")?;
    require_text(&req.description, "Description")?;
    require_text(&req.allowed_file_types, "Allowed file types")?;
    let now = Utc::now();
    if req.deadline <= now {
        return Err(ApiError::validation("Deadline must be in the future"));
    }

    let mut portal = state.portal.lock().await;
    let assignment = portal
        .store
        .create_assignment(NewAssignment {
            title: req.title.trim().to_string(),
            description: req.description,
            deadline: req.deadline,
            allowed_file_types: req.allowed_file_types,
            max_points: req.max_points,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(AssignmentView::new(&assignment, now))))
}

/// PUT /teacher/assignments/{id} - Change some fields of an assignment
#[utoipa::path(
    put,
    path = "/teacher/assignments/{id}",
    request_body = UpdateAssignmentRequest,
    params(("id" = String, Path, description = "Assignment id")),
    responses(
        (status = 200, description = "Assignment updated", body = AssignmentView),
        (status = 404, description = "Assignment not found")
    )
)]
pub async fn update_assignment_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateAssignmentRequest>,
) -> Result<Json<AssignmentView>, ApiError> {
    for (value, field) in [
        (&req.title, "Title"),
        (&req.description, "Description"),
        (&req.allowed_file_types, "Allowed file types"),
    ] {
        if let Some(value) = value {
            require_text(value, field)?;
        }
    }

    let mut portal = state.portal.lock().await;
    if portal.store.assignment(&id).is_none() {
        return Err(ApiError::not_found("Assignment not found"));
    }
    portal
        .store
        .update_assignment(
            &id,
            AssignmentPatch {
                title: req.title,
                description: req.description,
                deadline: req.deadline,
                allowed_file_types: req.allowed_file_types,
                max_points: req.max_points,
            },
        )
        .await?;

    let updated = portal
        .store
        .assignment(&id)
        .ok_or_else(|| ApiError::not_found("Assignment not found"))?;
    Ok(Json(AssignmentView::new(updated, Utc::now())))
}

/// DELETE /teacher/assignments/{id} - Remove an assignment; its submissions remain
#[utoipa::path(
    delete,
    path = "/teacher/assignments/{id}",
    params(("id" = String, Path, description = "Assignment id")),
    responses(
        (status = 200, description = "Assignment deleted"),
        (status = 404, description = "Assignment not found")
    )
)]
pub async fn delete_assignment_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let mut portal = state.portal.lock().await;
    if portal.store.assignment(&id).is_none() {
        return Err(ApiError::not_found("Assignment not found"));
    }
    portal.store.delete_assignment(&id).await?;

    let orphaned = portal.store.submissions_for_assignment(&id).len();
    if orphaned > 0 {
        info!("{} submission(s) now reference deleted assignment {}", orphaned, id);
    }
    Ok(Json(json!({ "success": true, "orphaned_submissions": orphaned })))
}

/// GET /teacher/assignments/{id}/submissions - One assignment and everything handed in for it
#[utoipa::path(
    get,
    path = "/teacher/assignments/{id}/submissions",
    params(("id" = String, Path, description = "Assignment id")),
    responses(
        (status = 200, description = "Submissions for the assignment",
            body = AssignmentSubmissions),
        (status = 404, description = "Assignment not found")
    )
)]
pub async fn assignment_submissions_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<AssignmentSubmissions>, ApiError> {
    let portal = state.portal.lock().await;
    let assignment = portal
        .store
        .assignment(&id)
        .ok_or_else(|| ApiError::not_found("Assignment not found"))?;
    let submissions = portal.store.submissions_for_assignment(&id);
    let assignments = portal.store.assignments();

    Ok(Json(AssignmentSubmissions {
        assignment: AssignmentView::new(assignment, Utc::now()),
        counts: StatusCounts::tally(submissions.iter().copied()).into(),
        submissions: submissions
            .into_iter()
            .map(|s| SubmissionView::new(s, assignments))
            .collect(),
    }))
}

/// GET /teacher/submissions/{id} - A single submission
#[utoipa::path(
    get,
    path = "/teacher/submissions/{id}",
    params(("id" = String, Path, description = "Submission id")),
    responses(
        (status = 200, description = "Submission detail", body = SubmissionDetail),
        (status = 404, description = "Submission not found")
    )
)]
pub async fn submission_detail_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SubmissionDetail>, ApiError> {
    let portal = state.portal.lock().await;
    let submission = portal.store.submission(&id).ok_or_else(submission_not_found)?;
    let assignments = portal.store.assignments();

    Ok(Json(SubmissionDetail {
        submission: SubmissionView::new(submission, assignments),
        assignment: portal
            .store
            .assignment(&submission.assignment_id)
            .map(|a| AssignmentView::new(a, Utc::now())),
    }))
}

/// POST /teacher/submissions/{id}/review - Mark a submission as reviewed
#[utoipa::path(
    post,
    path = "/teacher/submissions/{id}/review",
    params(("id" = String, Path, description = "Submission id")),
    responses(
        (status = 200, description = "Submission reviewed", body = SubmissionView),
        (status = 404, description = "Submission not found"),
        (status = 409, description = "Submission is already graded")
    )
)]
pub async fn mark_reviewed_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SubmissionView>, ApiError> {
    let mut portal = state.portal.lock().await;
    if portal.store.submission(&id).is_none() {
        return Err(submission_not_found());
    }
    portal.store.mark_reviewed(&id).await?;

    let submission = portal.store.submission(&id).ok_or_else(submission_not_found)?;
    Ok(Json(SubmissionView::new(submission, portal.store.assignments())))
}

/// POST /teacher/submissions/{id}/grade - Grade a submission
#[utoipa::path(
    post,
    path = "/teacher/submissions/{id}/grade",
    request_body = GradeRequest,
    params(("id" = String, Path, description = "Submission id")),
    responses(
        (status = 200, description = "Submission graded", body = SubmissionView),
        (status = 400, description = "Grade missing"),
        (status = 404, description = "Submission not found")
    )
)]
pub async fn grade_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<GradeRequest>,
) -> Result<Json<SubmissionView>, ApiError> {
    require_text(&req.grade, "Grade")?;

    let mut portal = state.portal.lock().await;
    if portal.store.submission(&id).is_none() {
        return Err(submission_not_found());
    }
    portal
        .store
        .grade(&id, req.grade.trim(), req.feedback.as_deref().unwrap_or_default())
        .await?;

    let submission = portal.store.submission(&id).ok_or_else(submission_not_found)?;
    Ok(Json(SubmissionView::new(submission, portal.store.assignments())))
}

/// GET /teacher/submissions/{id}/download - The submitted file
#[utoipa::path(
    get,
    path = "/teacher/submissions/{id}/download",
    params(("id" = String, Path, description = "Submission id")),
    responses(
        (status = 200, description = "File contents", content_type = "application/octet-stream"),
        (status = 404, description = "Submission or file not found")
    )
)]
pub async fn download_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let (file_url, file_name) = {
        let portal = state.portal.lock().await;
        let submission = portal.store.submission(&id).ok_or_else(submission_not_found)?;
        (submission.file_url.clone(), submission.file_name.clone())
    };

    let blob = state.files.download(&file_url, &file_name).await?;
    Ok(attachment(blob))
}
