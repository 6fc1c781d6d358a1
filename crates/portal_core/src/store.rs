//! crates/portal_core/src/store.rs
//!
//! The domain store: the in-memory assignment and submission collections and
//! the mutation API over them.
//!
//! Every mutation replaces the affected collection with a new `Arc`, writes
//! the whole collection through the persistent store and raises a notice.
//! Snapshots handed out earlier keep the old contents, so callers can detect
//! change with `Arc::ptr_eq`.
//!
//! The store does no authorization and does not enforce one submission per
//! student per assignment; both are checked by the callers that gate access.

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};

use crate::domain::{
    Assignment, AssignmentPatch, Notice, NewAssignment, NewSubmission, Submission,
    SubmissionPatch, SubmissionStatus,
};
use crate::ids::IdGenerator;
use crate::persistence::{keys, Persistence};
use crate::ports::{Notifier, PortError, PortResult};

pub struct DomainStore {
    assignments: Arc<Vec<Assignment>>,
    submissions: Arc<Vec<Submission>>,
    persistence: Persistence,
    notifier: Arc<dyn Notifier>,
    ids: IdGenerator,
}

impl DomainStore {
    /// Loads both collections once. Absent or unreadable snapshots start empty.
    pub async fn load(persistence: Persistence, notifier: Arc<dyn Notifier>) -> Self {
        let assignments: Vec<Assignment> = persistence.load(keys::ASSIGNMENTS).await;
        let submissions: Vec<Submission> = persistence.load(keys::SUBMISSIONS).await;

        let mut ids = IdGenerator::default();
        assignments.iter().for_each(|a| ids.observe(&a.id));
        submissions.iter().for_each(|s| ids.observe(&s.id));

        info!(
            "Domain store loaded: {} assignment(s), {} submission(s)",
            assignments.len(),
            submissions.len()
        );
        Self {
            assignments: Arc::new(assignments),
            submissions: Arc::new(submissions),
            persistence,
            notifier,
            ids,
        }
    }

    /// Writes both collections, regardless of pending changes.
    pub async fn flush(&self) -> PortResult<()> {
        self.persistence
            .save(keys::ASSIGNMENTS, self.assignments.as_slice())
            .await?;
        self.persistence
            .save(keys::SUBMISSIONS, self.submissions.as_slice())
            .await
    }

    //=====================================================================================
    // Assignments
    //=====================================================================================

    pub async fn create_assignment(&mut self, new: NewAssignment) -> PortResult<Assignment> {
        let now = Utc::now();
        let assignment = new.into_assignment(self.ids.next(now), now);

        let mut next = self.assignments.as_ref().clone();
        next.push(assignment.clone());
        self.commit_assignments(next).await?;

        info!("Created assignment {} ({})", assignment.id, assignment.title);
        self.notifier
            .notify(Notice::success("Assignment created successfully!"));
        Ok(assignment)
    }

    /// Shallow-merges `patch` over the assignment. An unknown id is a no-op.
    pub async fn update_assignment(&mut self, id: &str, patch: AssignmentPatch) -> PortResult<()> {
        let Some(index) = self.assignments.iter().position(|a| a.id == id) else {
            debug!("Ignoring update for unknown assignment {}", id);
            return Ok(());
        };

        let mut next = self.assignments.as_ref().clone();
        patch.apply(&mut next[index]);
        self.commit_assignments(next).await?;

        info!("Updated assignment {}", id);
        self.notifier
            .notify(Notice::success("Assignment updated successfully!"));
        Ok(())
    }

    /// Removes the assignment. Its submissions stay behind, see
    /// `views::orphaned_submissions`.
    pub async fn delete_assignment(&mut self, id: &str) -> PortResult<()> {
        if !self.assignments.iter().any(|a| a.id == id) {
            debug!("Ignoring delete for unknown assignment {}", id);
            return Ok(());
        }

        let next: Vec<Assignment> = self
            .assignments
            .iter()
            .filter(|a| a.id != id)
            .cloned()
            .collect();
        self.commit_assignments(next).await?;

        info!("Deleted assignment {}", id);
        self.notifier
            .notify(Notice::success("Assignment deleted successfully!"));
        Ok(())
    }

    pub fn assignment(&self, id: &str) -> Option<&Assignment> {
        self.assignments.iter().find(|a| a.id == id)
    }

    /// All assignments in insertion order.
    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    pub fn assignments_snapshot(&self) -> Arc<Vec<Assignment>> {
        Arc::clone(&self.assignments)
    }

    //=====================================================================================
    // Submissions
    //=====================================================================================

    /// Records a new submission with status `submitted` and no grade.
    pub async fn create_submission(&mut self, new: NewSubmission) -> PortResult<Submission> {
        let now = Utc::now();
        let submission = new.into_submission(self.ids.next(now), now);

        let mut next = self.submissions.as_ref().clone();
        next.push(submission.clone());
        self.commit_submissions(next).await?;

        info!(
            "Student {} submitted {} for assignment {}",
            submission.student_id, submission.file_name, submission.assignment_id
        );
        self.notifier
            .notify(Notice::success("Assignment submitted successfully!"));
        Ok(submission)
    }

    /// Shallow-merges `patch` over the submission. An unknown id is a no-op.
    pub async fn update_submission(&mut self, id: &str, patch: SubmissionPatch) -> PortResult<()> {
        let Some(index) = self.submission_index(id) else {
            debug!("Ignoring update for unknown submission {}", id);
            return Ok(());
        };

        let mut next = self.submissions.as_ref().clone();
        patch.apply(&mut next[index]);
        self.commit_submissions(next).await?;

        info!("Updated submission {}", id);
        self.notifier
            .notify(Notice::success("Submission updated successfully!"));
        Ok(())
    }

    /// Moves a submission to `reviewed`. Already reviewed is a no-op; a graded
    /// submission cannot go back.
    pub async fn mark_reviewed(&mut self, id: &str) -> PortResult<()> {
        let Some(index) = self.submission_index(id) else {
            debug!("Ignoring review for unknown submission {}", id);
            return Ok(());
        };

        let current = self.submissions[index].status;
        if !current.can_advance_to(SubmissionStatus::Reviewed) {
            return Err(PortError::InvalidTransition {
                from: current,
                to: SubmissionStatus::Reviewed,
            });
        }
        if current == SubmissionStatus::Reviewed {
            return Ok(());
        }

        let mut next = self.submissions.as_ref().clone();
        next[index].status = SubmissionStatus::Reviewed;
        self.commit_submissions(next).await?;

        info!("Submission {} marked as reviewed", id);
        self.notifier
            .notify(Notice::success("Submission marked as reviewed!"));
        Ok(())
    }

    /// Sets grade and feedback and forces the status to `graded`, whatever it
    /// was before. Re-grading replaces the previous grade.
    pub async fn grade(&mut self, id: &str, grade: &str, feedback: &str) -> PortResult<()> {
        let Some(index) = self.submission_index(id) else {
            debug!("Ignoring grade for unknown submission {}", id);
            return Ok(());
        };

        let mut next = self.submissions.as_ref().clone();
        let submission = &mut next[index];
        submission.grade = Some(grade.to_string());
        submission.feedback = Some(feedback.to_string());
        submission.status = SubmissionStatus::Graded;
        self.commit_submissions(next).await?;

        info!("Submission {} graded {}", id, grade);
        self.notifier
            .notify(Notice::success("Grade submitted successfully!"));
        Ok(())
    }

    pub fn submission(&self, id: &str) -> Option<&Submission> {
        self.submissions.iter().find(|s| s.id == id)
    }

    /// All submissions in insertion order.
    pub fn submissions(&self) -> &[Submission] {
        &self.submissions
    }

    pub fn submissions_snapshot(&self) -> Arc<Vec<Submission>> {
        Arc::clone(&self.submissions)
    }

    fn submissions_where<P>(&self, predicate: P) -> Vec<&Submission>
    where
        P: Fn(&Submission) -> bool,
    {
        self.submissions.iter().filter(|s| predicate(s)).collect()
    }

    pub fn submissions_for_assignment(&self, assignment_id: &str) -> Vec<&Submission> {
        self.submissions_where(|s| s.assignment_id == assignment_id)
    }

    pub fn submissions_for_student(&self, student_id: &str) -> Vec<&Submission> {
        self.submissions_where(|s| s.student_id == student_id)
    }

    //=====================================================================================
    // Internals
    //=====================================================================================

    fn submission_index(&self, id: &str) -> Option<usize> {
        self.submissions.iter().position(|s| s.id == id)
    }

    /// Persists first, so a failed write leaves memory and storage in agreement.
    async fn commit_assignments(&mut self, next: Vec<Assignment>) -> PortResult<()> {
        self.persistence
            .save(keys::ASSIGNMENTS, next.as_slice())
            .await
            .inspect_err(|_| self.notify_save_failure())?;
        self.assignments = Arc::new(next);
        Ok(())
    }

    async fn commit_submissions(&mut self, next: Vec<Submission>) -> PortResult<()> {
        self.persistence
            .save(keys::SUBMISSIONS, next.as_slice())
            .await
            .inspect_err(|_| self.notify_save_failure())?;
        self.submissions = Arc::new(next);
        Ok(())
    }

    fn notify_save_failure(&self) {
        self.notifier
            .notify(Notice::error("Failed to save changes. Please try again."));
    }
}
