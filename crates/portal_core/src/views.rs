//! crates/portal_core/src/views.rs
//!
//! Derived-view queries: pure functions over the current collections. Nothing
//! here is cached; every page recomputes what it shows.

use chrono::{DateTime, Utc};

use crate::domain::{Assignment, Submission, SubmissionStatus};

/// How many recent submissions the teacher dashboard lists.
pub const TEACHER_RECENT_LIMIT: usize = 5;
/// How many upcoming assignments and recent submissions a student sees.
pub const STUDENT_PREVIEW_LIMIT: usize = 3;

//=========================================================================================
// Deadlines
//=========================================================================================

/// True iff the deadline is strictly before `now`.
pub fn is_overdue(deadline: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    deadline < now
}

/// Human-readable countdown: "N days remaining", "N hours remaining",
/// "Due soon" under an hour, "Overdue" once the deadline is reached.
pub fn time_remaining(deadline: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = deadline - now;
    if diff <= chrono::Duration::zero() {
        return "Overdue".to_string();
    }

    let days = diff.num_days();
    let hours = diff.num_hours() % 24;
    if days > 0 {
        format!("{} day{} remaining", days, plural(days))
    } else if hours > 0 {
        format!("{} hour{} remaining", hours, plural(hours))
    } else {
        "Due soon".to_string()
    }
}

fn plural(n: i64) -> &'static str {
    if n > 1 {
        "s"
    } else {
        ""
    }
}

#[derive(Debug, Default, PartialEq)]
pub struct DeadlineSplit<'a> {
    pub overdue: Vec<&'a Assignment>,
    pub upcoming: Vec<&'a Assignment>,
}

/// Partitions assignments by deadline, keeping their relative order.
pub fn split_by_deadline<'a, I>(assignments: I, now: DateTime<Utc>) -> DeadlineSplit<'a>
where
    I: IntoIterator<Item = &'a Assignment>,
{
    let (overdue, upcoming) = assignments
        .into_iter()
        .partition(|a| is_overdue(a.deadline, now));
    DeadlineSplit { overdue, upcoming }
}

/// Sorts by deadline, earliest first, and keeps at most `limit`.
pub fn soonest_first(mut assignments: Vec<&Assignment>, limit: usize) -> Vec<&Assignment> {
    assignments.sort_by_key(|a| a.deadline);
    assignments.truncate(limit);
    assignments
}

//=========================================================================================
// Per-student and per-assignment partitions
//=========================================================================================

pub fn submission_of<'a>(
    submissions: &'a [Submission],
    student_id: &str,
    assignment_id: &str,
) -> Option<&'a Submission> {
    submissions
        .iter()
        .find(|s| s.student_id == student_id && s.assignment_id == assignment_id)
}

/// The one-submission-per-assignment check callers run before accepting an upload.
pub fn has_submitted(submissions: &[Submission], student_id: &str, assignment_id: &str) -> bool {
    submission_of(submissions, student_id, assignment_id).is_some()
}

/// Assignments the student has not submitted anything for yet.
pub fn pending_assignments<'a>(
    assignments: &'a [Assignment],
    submissions: &[Submission],
    student_id: &str,
) -> Vec<&'a Assignment> {
    assignments
        .iter()
        .filter(|a| !has_submitted(submissions, student_id, &a.id))
        .collect()
}

pub fn submitted_assignments<'a>(
    assignments: &'a [Assignment],
    submissions: &[Submission],
    student_id: &str,
) -> Vec<&'a Assignment> {
    assignments
        .iter()
        .filter(|a| has_submitted(submissions, student_id, &a.id))
        .collect()
}

pub fn submissions_for_assignment<'a>(
    submissions: &'a [Submission],
    assignment_id: &str,
) -> Vec<&'a Submission> {
    submissions
        .iter()
        .filter(|s| s.assignment_id == assignment_id)
        .collect()
}

pub fn submissions_for_student<'a>(
    submissions: &'a [Submission],
    student_id: &str,
) -> Vec<&'a Submission> {
    submissions
        .iter()
        .filter(|s| s.student_id == student_id)
        .collect()
}

pub fn submission_count(submissions: &[Submission], assignment_id: &str) -> usize {
    submissions
        .iter()
        .filter(|s| s.assignment_id == assignment_id)
        .count()
}

/// Submissions whose assignment has been deleted.
pub fn orphaned_submissions<'a>(
    assignments: &[Assignment],
    submissions: &'a [Submission],
) -> Vec<&'a Submission> {
    submissions
        .iter()
        .filter(|s| !assignments.iter().any(|a| a.id == s.assignment_id))
        .collect()
}

/// Newest first by submission time, at most `limit`.
pub fn most_recent(submissions: &[Submission], limit: usize) -> Vec<&Submission> {
    let mut recent: Vec<&Submission> = submissions.iter().collect();
    recent.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
    recent.truncate(limit);
    recent
}

//=========================================================================================
// Statistics
//=========================================================================================

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StatusCounts {
    pub submitted: usize,
    pub reviewed: usize,
    pub graded: usize,
}

impl StatusCounts {
    pub fn tally<'a, I>(submissions: I) -> Self
    where
        I: IntoIterator<Item = &'a Submission>,
    {
        submissions
            .into_iter()
            .fold(Self::default(), |mut counts, s| {
                match s.status {
                    SubmissionStatus::Submitted => counts.submitted += 1,
                    SubmissionStatus::Reviewed => counts.reviewed += 1,
                    SubmissionStatus::Graded => counts.graded += 1,
                }
                counts
            })
    }

    pub fn total(&self) -> usize {
        self.submitted + self.reviewed + self.graded
    }

    /// Handed in but not graded yet.
    pub fn awaiting_grade(&self) -> usize {
        self.submitted + self.reviewed
    }
}

#[derive(Debug)]
pub struct TeacherOverview<'a> {
    pub total_assignments: usize,
    pub total_submissions: usize,
    pub counts: StatusCounts,
    pub recent: Vec<&'a Submission>,
    /// Submissions left behind by deleted assignments.
    pub orphaned: Vec<&'a Submission>,
}

pub fn teacher_overview<'a>(
    assignments: &[Assignment],
    submissions: &'a [Submission],
) -> TeacherOverview<'a> {
    TeacherOverview {
        total_assignments: assignments.len(),
        total_submissions: submissions.len(),
        counts: StatusCounts::tally(submissions),
        recent: most_recent(submissions, TEACHER_RECENT_LIMIT),
        orphaned: orphaned_submissions(assignments, submissions),
    }
}

/// Counts only cover assignments that still exist; submissions whose
/// assignment was deleted are reported under `orphaned`.
#[derive(Debug)]
pub struct StudentOverview<'a> {
    pub total_assignments: usize,
    pub submitted: usize,
    pub pending: usize,
    pub graded: usize,
    pub orphaned: usize,
    /// Not submitted and past the deadline.
    pub overdue: Vec<&'a Assignment>,
    /// Not submitted, still open, soonest first.
    pub upcoming: Vec<&'a Assignment>,
    pub recent: Vec<&'a Submission>,
}

pub fn student_overview<'a>(
    assignments: &'a [Assignment],
    submissions: &'a [Submission],
    student_id: &str,
    now: DateTime<Utc>,
) -> StudentOverview<'a> {
    let mine = submissions_for_student(submissions, student_id);
    let (live, orphaned): (Vec<&Submission>, Vec<&Submission>) = mine
        .iter()
        .copied()
        .partition(|s| assignments.iter().any(|a| a.id == s.assignment_id));
    let pending = pending_assignments(assignments, submissions, student_id);
    let pending_count = pending.len();
    let split = split_by_deadline(pending, now);

    StudentOverview {
        total_assignments: assignments.len(),
        submitted: submitted_assignments(assignments, submissions, student_id).len(),
        pending: pending_count,
        graded: StatusCounts::tally(live).graded,
        orphaned: orphaned.len(),
        overdue: split.overdue,
        upcoming: soonest_first(split.upcoming, STUDENT_PREVIEW_LIMIT),
        recent: mine.into_iter().take(STUDENT_PREVIEW_LIMIT).collect(),
    }
}
