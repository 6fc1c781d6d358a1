//! crates/portal_core/src/gate.rs
//!
//! The access control gate: decides, before a protected page is produced,
//! whether the current identity may see it. This is a presentation gate over
//! a local store, not a security boundary.

use crate::domain::{Identity, Role};

/// Where every refused visitor is sent.
pub const LOGIN_PATH: &str = "/login";

const TEACHER_ONLY: &[Role] = &[Role::Teacher];
const STUDENT_ONLY: &[Role] = &[Role::Student];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision<'a> {
    Allow(&'a Identity),
    RedirectToLogin,
}

/// Lets `identity` through only if it is present and holds one of `allowed`.
/// A signed-in user with the wrong role goes to the login page as well.
pub fn authorize<'a>(identity: Option<&'a Identity>, allowed: &[Role]) -> GateDecision<'a> {
    match identity {
        Some(identity) if allowed.contains(&identity.role) => GateDecision::Allow(identity),
        _ => GateDecision::RedirectToLogin,
    }
}

/// The roles a path requires, or `None` for public paths.
pub fn required_roles(path: &str) -> Option<&'static [Role]> {
    let mut segments = path.trim_start_matches('/').split('/');
    match segments.next() {
        Some("teacher") => Some(TEACHER_ONLY),
        Some("student") => Some(STUDENT_ONLY),
        _ => None,
    }
}

/// Runs the gate for a concrete path. Public paths always pass, with or
/// without an identity.
pub fn check_path<'a>(identity: Option<&'a Identity>, path: &str) -> PathDecision<'a> {
    match required_roles(path) {
        None => PathDecision::Public,
        Some(roles) => match authorize(identity, roles) {
            GateDecision::Allow(identity) => PathDecision::Allow(identity),
            GateDecision::RedirectToLogin => PathDecision::RedirectToLogin,
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathDecision<'a> {
    Public,
    Allow(&'a Identity),
    RedirectToLogin,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn someone(role: Role) -> Identity {
        Identity {
            id: "1".to_string(),
            email: "someone@example.com".to_string(),
            name: "Someone".to_string(),
            role,
        }
    }

    #[test]
    fn missing_identity_is_redirected() {
        assert_eq!(authorize(None, TEACHER_ONLY), GateDecision::RedirectToLogin);
    }

    #[test]
    fn wrong_role_is_redirected_to_login() {
        let student = someone(Role::Student);
        assert_eq!(
            authorize(Some(&student), TEACHER_ONLY),
            GateDecision::RedirectToLogin
        );
    }

    #[test]
    fn matching_role_is_allowed() {
        let teacher = someone(Role::Teacher);
        assert_eq!(
            authorize(Some(&teacher), TEACHER_ONLY),
            GateDecision::Allow(&teacher)
        );
        assert_eq!(
            authorize(Some(&teacher), &[Role::Student, Role::Teacher]),
            GateDecision::Allow(&teacher)
        );
    }

    #[test]
    fn paths_map_to_roles() {
        assert_eq!(required_roles("/teacher/dashboard"), Some(TEACHER_ONLY));
        assert_eq!(
            required_roles("/teacher/assignments/17/submissions"),
            Some(TEACHER_ONLY)
        );
        assert_eq!(required_roles("/student/submissions/4"), Some(STUDENT_ONLY));
        assert_eq!(required_roles("/login"), None);
        assert_eq!(required_roles("/teachers"), None);
        assert_eq!(required_roles("/"), None);
    }

    #[test]
    fn student_cannot_open_teacher_pages() {
        let student = someone(Role::Student);
        assert_eq!(
            check_path(Some(&student), "/teacher/assignments"),
            PathDecision::RedirectToLogin
        );
        assert_eq!(
            check_path(Some(&student), "/student/assignments"),
            PathDecision::Allow(&student)
        );
        assert_eq!(check_path(None, "/login"), PathDecision::Public);
    }
}
