//! crates/portal_core/src/domain.rs
//!
//! Defines the core data structures for the portal: identities, assignments,
//! submissions and the file descriptors that travel with them.
//!
//! The serde layout (camelCase keys, lowercase enum tags) is the persisted
//! format, so records written by one run load unchanged in the next.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ports::PortError;

//=========================================================================================
// Identity
//=========================================================================================

/// The two kinds of portal user. Every role-dependent decision matches on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Teacher,
    Student,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Teacher => "teacher",
            Role::Student => "student",
        }
    }

    /// The landing page a freshly signed-in user of this role is sent to.
    pub fn dashboard_path(self) -> &'static str {
        match self {
            Role::Teacher => "/teacher/dashboard",
            Role::Student => "/student/dashboard",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = PortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "teacher" => Ok(Role::Teacher),
            "student" => Ok(Role::Student),
            other => Err(PortError::Validation(format!("Unknown role '{}'", other))),
        }
    }
}

/// The signed-in user as seen by the rest of the system. Never carries a password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
}

/// A directory record. Only used internally for login/registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub password_hash: String,
}

impl Account {
    pub fn identity(&self) -> Identity {
        Identity {
            id: self.id.clone(),
            email: self.email.clone(),
            name: self.name.clone(),
            role: self.role,
        }
    }
}

/// Registration input, as typed into the sign-up form.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

//=========================================================================================
// Assignments
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: String,
    pub title: String,
    pub description: String,
    pub deadline: DateTime<Utc>,
    /// Free-text descriptor shown to students, e.g. "PDF, DOCX".
    pub allowed_file_types: String,
    #[serde(default)]
    pub max_points: Option<u32>,
    pub created_at: DateTime<Utc>,
}

/// Everything a teacher supplies when creating an assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAssignment {
    pub title: String,
    pub description: String,
    pub deadline: DateTime<Utc>,
    pub allowed_file_types: String,
    pub max_points: Option<u32>,
}

impl NewAssignment {
    pub(crate) fn into_assignment(self, id: String, created_at: DateTime<Utc>) -> Assignment {
        Assignment {
            id,
            title: self.title,
            description: self.description,
            deadline: self.deadline,
            allowed_file_types: self.allowed_file_types,
            max_points: self.max_points,
            created_at,
        }
    }
}

/// A shallow patch: every `Some` field replaces the stored value, `None` keeps it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
    pub allowed_file_types: Option<String>,
    pub max_points: Option<u32>,
}

impl AssignmentPatch {
    pub fn apply(self, assignment: &mut Assignment) {
        if let Some(title) = self.title {
            assignment.title = title;
        }
        if let Some(description) = self.description {
            assignment.description = description;
        }
        if let Some(deadline) = self.deadline {
            assignment.deadline = deadline;
        }
        if let Some(allowed_file_types) = self.allowed_file_types {
            assignment.allowed_file_types = allowed_file_types;
        }
        if let Some(max_points) = self.max_points {
            assignment.max_points = Some(max_points);
        }
    }
}

//=========================================================================================
// Submissions
//=========================================================================================

/// Review progress of a submission. Variants are declared in lifecycle order,
/// so the derived `Ord` is the direction status is allowed to move in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    Submitted,
    Reviewed,
    Graded,
}

impl SubmissionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SubmissionStatus::Submitted => "submitted",
            SubmissionStatus::Reviewed => "reviewed",
            SubmissionStatus::Graded => "graded",
        }
    }

    /// Whether moving from `self` to `next` keeps the lifecycle monotonic.
    /// Staying put is allowed.
    pub fn can_advance_to(self, next: SubmissionStatus) -> bool {
        next >= self
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: String,
    pub assignment_id: String,
    pub student_id: String,
    pub student_name: String,
    pub file_name: String,
    pub file_size: u64,
    pub file_type: String,
    /// Ephemeral reference handed out by the file transfer service.
    pub file_url: String,
    #[serde(default)]
    pub comment: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub status: SubmissionStatus,
    pub grade: Option<String>,
    pub feedback: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewSubmission {
    pub assignment_id: String,
    pub student_id: String,
    pub student_name: String,
    pub file: FileDescriptor,
    pub comment: Option<String>,
}

impl NewSubmission {
    pub(crate) fn into_submission(self, id: String, submitted_at: DateTime<Utc>) -> Submission {
        Submission {
            id,
            assignment_id: self.assignment_id,
            student_id: self.student_id,
            student_name: self.student_name,
            file_name: self.file.file_name,
            file_size: self.file.file_size,
            file_type: self.file.file_type,
            file_url: self.file.file_url,
            comment: self.comment,
            submitted_at,
            status: SubmissionStatus::Submitted,
            grade: None,
            feedback: None,
        }
    }
}

/// Shallow patch over the editable parts of a submission. Status and grade
/// only move through `mark_reviewed` and `grade` on the store.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPatch {
    pub file_name: Option<String>,
    pub file_size: Option<u64>,
    pub file_type: Option<String>,
    pub file_url: Option<String>,
    pub comment: Option<String>,
    pub feedback: Option<String>,
}

impl SubmissionPatch {
    pub fn apply(self, submission: &mut Submission) {
        if let Some(file_name) = self.file_name {
            submission.file_name = file_name;
        }
        if let Some(file_size) = self.file_size {
            submission.file_size = file_size;
        }
        if let Some(file_type) = self.file_type {
            submission.file_type = file_type;
        }
        if let Some(file_url) = self.file_url {
            submission.file_url = file_url;
        }
        if let Some(comment) = self.comment {
            submission.comment = Some(comment);
        }
        if let Some(feedback) = self.feedback {
            submission.feedback = Some(feedback);
        }
    }
}

//=========================================================================================
// File transfer
//=========================================================================================

/// A file as it arrives from the upload form.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// What the transfer service hands back after an upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDescriptor {
    pub file_name: String,
    pub file_size: u64,
    pub file_type: String,
    pub file_url: String,
    pub uploaded_at: DateTime<Utc>,
}

/// A downloaded file, ready to be saved under `file_name`.
#[derive(Debug, Clone)]
pub struct FileBlob {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

//=========================================================================================
// Notifications
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Success,
    Error,
}

/// A short user-visible message raised after a mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub message: String,
    pub kind: NoticeKind,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: NoticeKind::Success,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: NoticeKind::Error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_only_moves_forward() {
        use SubmissionStatus::*;
        assert!(Submitted.can_advance_to(Reviewed));
        assert!(Submitted.can_advance_to(Graded));
        assert!(Reviewed.can_advance_to(Reviewed));
        assert!(Graded.can_advance_to(Graded));
        assert!(!Graded.can_advance_to(Reviewed));
        assert!(!Reviewed.can_advance_to(Submitted));
    }

    #[test]
    fn role_parses_case_insensitively() {
        assert_eq!("Teacher".parse::<Role>().unwrap(), Role::Teacher);
        assert_eq!(" student ".parse::<Role>().unwrap(), Role::Student);
        assert!(matches!("admin".parse::<Role>(), Err(PortError::Validation(_))));
    }

    #[test]
    fn assignment_patch_touches_only_given_fields() {
        let now = Utc::now();
        let mut assignment = NewAssignment {
            title: "HW1".to_string(),
            description: "Read chapter one".to_string(),
            deadline: now,
            allowed_file_types: "PDF".to_string(),
            max_points: None,
        }
        .into_assignment("1".to_string(), now);
        let before = assignment.clone();

        AssignmentPatch {
            title: Some("HW1 (revised)".to_string()),
            ..Default::default()
        }
        .apply(&mut assignment);

        assert_eq!(assignment.title, "HW1 (revised)");
        assert_eq!(assignment.description, before.description);
        assert_eq!(assignment.deadline, before.deadline);
        assert_eq!(assignment.allowed_file_types, before.allowed_file_types);
        assert_eq!(assignment.created_at, before.created_at);
    }

    #[test]
    fn persisted_layout_uses_camel_case() {
        let json = serde_json::json!({
            "id": "17",
            "assignmentId": "3",
            "studentId": "2",
            "studentName": "Jane Doe",
            "fileName": "essay.pdf",
            "fileSize": 2048,
            "fileType": "application/pdf",
            "fileUrl": "blob:portal/abc",
            "submittedAt": "2026-01-01T10:00:00Z",
            "status": "reviewed",
            "grade": null,
            "feedback": null
        });
        let submission: Submission = serde_json::from_value(json).unwrap();
        assert_eq!(submission.status, SubmissionStatus::Reviewed);
        assert_eq!(submission.comment, None);
        assert_eq!(submission.file_size, 2048);
    }
}
