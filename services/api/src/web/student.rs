//! services/api/src/web/student.rs
//!
//! Handlers behind `/student/*`: the student's dashboard, the assignment
//! list, the submit form and the student's own submissions.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use chrono::Utc;
use portal_core::domain::{Identity, NewSubmission, UploadedFile};
use portal_core::views::{self, StatusCounts};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::web::rest::{attachment, AssignmentView, SubmissionView};
use crate::web::state::AppState;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Serialize, ToSchema)]
pub struct StudentDashboard {
    pub name: String,
    pub total_assignments: usize,
    pub submitted: usize,
    pub pending: usize,
    pub graded: usize,
    /// Own submissions whose assignment has been deleted.
    pub orphaned_submissions: usize,
    pub overdue: Vec<AssignmentView>,
    /// Soonest deadline first.
    pub upcoming: Vec<AssignmentView>,
    pub recent_submissions: Vec<SubmissionView>,
}

#[derive(Serialize, ToSchema)]
pub struct SubmittedAssignmentRow {
    pub assignment: AssignmentView,
    pub submission: SubmissionView,
}

#[derive(Serialize, ToSchema)]
pub struct StudentAssignments {
    pub overdue: Vec<AssignmentView>,
    pub upcoming: Vec<AssignmentView>,
    pub submitted: Vec<SubmittedAssignmentRow>,
}

#[derive(Serialize, ToSchema)]
pub struct StudentSubmissions {
    pub graded: usize,
    pub awaiting_grade: usize,
    pub submissions: Vec<SubmissionView>,
}

/// The parsed submit form.
struct SubmitForm {
    file: Option<UploadedFile>,
    comment: Option<String>,
}

impl SubmitForm {
    async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = SubmitForm {
            file: None,
            comment: None,
        };

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "file" => {
                    let file_name = field.file_name().unwrap_or_default().to_string();
                    let content_type = field
                        .content_type()
                        .filter(|ct| !ct.is_empty())
                        .unwrap_or(DEFAULT_CONTENT_TYPE)
                        .to_string();
                    let bytes = field.bytes().await?;
                    if !file_name.is_empty() {
                        form.file = Some(UploadedFile {
                            name: file_name,
                            content_type,
                            bytes: bytes.to_vec(),
                        });
                    }
                }
                "comment" => {
                    let text = field.text().await?;
                    form.comment = Some(text).filter(|t| !t.trim().is_empty());
                }
                other => debug!("Ignoring unexpected form field '{}'", other),
            }
        }
        Ok(form)
    }
}

fn upload_limit_message(max_upload_bytes: usize) -> String {
    format!(
        "File size must be less than {}MB",
        max_upload_bytes / (1024 * 1024)
    )
}

async fn discard_upload(state: &AppState, file_url: &str) {
    if let Err(e) = state.files.discard(file_url).await {
        warn!("Failed to discard upload {}: {}", file_url, e);
    }
}

fn already_submitted() -> ApiError {
    ApiError::Conflict("You have already submitted this assignment".to_string())
}

//=========================================================================================
// Handlers
//=========================================================================================

/// GET /student/dashboard - Counts, open deadlines and recent submissions
#[utoipa::path(
    get,
    path = "/student/dashboard",
    responses(
        (status = 200, description = "Student dashboard", body = StudentDashboard),
        (status = 303, description = "Not signed in as a student")
    )
)]
pub async fn dashboard_handler(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
) -> Json<StudentDashboard> {
    let portal = state.portal.lock().await;
    let now = Utc::now();
    let assignments = portal.store.assignments();
    let overview =
        views::student_overview(assignments, portal.store.submissions(), &identity.id, now);

    Json(StudentDashboard {
        name: identity.name.clone(),
        total_assignments: overview.total_assignments,
        submitted: overview.submitted,
        pending: overview.pending,
        graded: overview.graded,
        orphaned_submissions: overview.orphaned,
        overdue: overview
            .overdue
            .into_iter()
            .map(|a| AssignmentView::new(a, now))
            .collect(),
        upcoming: overview
            .upcoming
            .into_iter()
            .map(|a| AssignmentView::new(a, now))
            .collect(),
        recent_submissions: overview
            .recent
            .into_iter()
            .map(|s| SubmissionView::new(s, assignments))
            .collect(),
    })
}

/// GET /student/assignments - Open work split by deadline, plus what is already handed in
#[utoipa::path(
    get,
    path = "/student/assignments",
    responses(
        (status = 200, description = "Assignments for the student", body = StudentAssignments)
    )
)]
pub async fn list_assignments_handler(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
) -> Json<StudentAssignments> {
    let portal = state.portal.lock().await;
    let now = Utc::now();
    let assignments = portal.store.assignments();
    let submissions = portal.store.submissions();

    let split = views::split_by_deadline(
        views::pending_assignments(assignments, submissions, &identity.id),
        now,
    );
    let submitted = views::submitted_assignments(assignments, submissions, &identity.id)
        .into_iter()
        .filter_map(|a| {
            views::submission_of(submissions, &identity.id, &a.id).map(|s| SubmittedAssignmentRow {
                assignment: AssignmentView::new(a, now),
                submission: SubmissionView::new(s, assignments),
            })
        })
        .collect();

    Json(StudentAssignments {
        overdue: split
            .overdue
            .into_iter()
            .map(|a| AssignmentView::new(a, now))
            .collect(),
        upcoming: split
            .upcoming
            .into_iter()
            .map(|a| AssignmentView::new(a, now))
            .collect(),
        submitted,
    })
}

/// POST /student/assignments/{id}/submit - Upload a file for an assignment
#[utoipa::path(
    post,
    path = "/student/assignments/{id}/submit",
    params(("id" = String, Path, description = "Assignment id")),
    request_body(
        content_type = "multipart/form-data",
        description = "Fields `file` and optional `comment`"
    ),
    responses(
        (status = 201, description = "Submission accepted", body = SubmissionView),
        (status = 400, description = "No file, or the file is too large"),
        (status = 404, description = "Assignment not found"),
        (status = 409, description = "Already submitted")
    )
)]
pub async fn submit_handler(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(assignment_id): Path<String>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    // 1. Gate the flow before reading the upload
    {
        let portal = state.portal.lock().await;
        if portal.store.assignment(&assignment_id).is_none() {
            return Err(ApiError::not_found("Assignment not found"));
        }
        if views::has_submitted(portal.store.submissions(), &identity.id, &assignment_id) {
            return Err(already_submitted());
        }
    }

    // 2. Validate the form
    let form = SubmitForm::read(multipart).await?;
    let file = form
        .file
        .ok_or_else(|| ApiError::validation("Please select a file to upload"))?;
    if file.bytes.len() > state.config.max_upload_bytes {
        return Err(ApiError::validation(upload_limit_message(
            state.config.max_upload_bytes,
        )));
    }

    // 3. Transfer the file without holding the portal
    let descriptor = state.files.upload(file).await?;

    // 4. Record the submission, re-checking in case another upload won the race.
    //    A file no submission ends up referencing is discarded.
    let file_url = descriptor.file_url.clone();
    let mut portal = state.portal.lock().await;
    if views::has_submitted(portal.store.submissions(), &identity.id, &assignment_id) {
        drop(portal);
        discard_upload(&state, &file_url).await;
        return Err(already_submitted());
    }
    let created = portal
        .store
        .create_submission(NewSubmission {
            assignment_id,
            student_id: identity.id.clone(),
            student_name: identity.name.clone(),
            file: descriptor,
            comment: form.comment,
        })
        .await;
    let submission = match created {
        Ok(submission) => submission,
        Err(e) => {
            drop(portal);
            discard_upload(&state, &file_url).await;
            return Err(e.into());
        }
    };
    info!(
        "Student {} submitted '{}' for assignment {}",
        identity.id, submission.file_name, submission.assignment_id
    );

    let view = SubmissionView::new(&submission, portal.store.assignments());
    Ok((StatusCode::CREATED, Json(view)))
}

/// GET /student/submissions - The student's own submissions
#[utoipa::path(
    get,
    path = "/student/submissions",
    responses(
        (status = 200, description = "Own submissions", body = StudentSubmissions)
    )
)]
pub async fn list_submissions_handler(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
) -> Json<StudentSubmissions> {
    let portal = state.portal.lock().await;
    let mine = portal.store.submissions_for_student(&identity.id);
    let counts = StatusCounts::tally(mine.iter().copied());
    let assignments = portal.store.assignments();

    Json(StudentSubmissions {
        graded: counts.graded,
        awaiting_grade: counts.awaiting_grade(),
        submissions: mine
            .into_iter()
            .map(|s| SubmissionView::new(s, assignments))
            .collect(),
    })
}

/// GET /student/submissions/{id} - One of the student's own submissions
#[utoipa::path(
    get,
    path = "/student/submissions/{id}",
    params(("id" = String, Path, description = "Submission id")),
    responses(
        (status = 200, description = "Submission detail", body = SubmissionView),
        (status = 404, description = "No such submission for this student")
    )
)]
pub async fn submission_detail_handler(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<Json<SubmissionView>, ApiError> {
    let portal = state.portal.lock().await;
    let submission = portal
        .store
        .submission(&id)
        .filter(|s| s.student_id == identity.id)
        .ok_or_else(|| ApiError::not_found("Submission not found"))?;

    Ok(Json(SubmissionView::new(submission, portal.store.assignments())))
}

/// GET /student/submissions/{id}/download - Download a file the student submitted
#[utoipa::path(
    get,
    path = "/student/submissions/{id}/download",
    params(("id" = String, Path, description = "Submission id")),
    responses(
        (status = 200, description = "File contents", content_type = "application/octet-stream"),
        (status = 404, description = "No such submission or file")
    )
)]
pub async fn download_handler(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let (file_url, file_name) = {
        let portal = state.portal.lock().await;
        let submission = portal
            .store
            .submission(&id)
            .filter(|s| s.student_id == identity.id)
            .ok_or_else(|| ApiError::not_found("Submission not found"))?;
        (submission.file_url.clone(), submission.file_name.clone())
    };

    let blob = state.files.download(&file_url, &file_name).await?;
    Ok(attachment(blob))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_limit_is_reported_in_megabytes() {
        assert_eq!(
            upload_limit_message(10 * 1024 * 1024),
            "File size must be less than 10MB"
        );
    }
}
