//! services/api/src/web/router.rs
//!
//! Assembles every route of the portal behind the role gate.

use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{ACCEPT, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware as axum_middleware,
    response::Redirect,
    routing::{get, post, put},
    Router,
};
use portal_core::gate::LOGIN_PATH;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::warn;

use crate::web::{auth, middleware::require_role, rest, state::AppState, student, teacher};

/// Room for multipart framing on top of the largest accepted file.
const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Builds the application router.
///
/// Every request passes through [`require_role`], which lets public paths
/// through and redirects wrong-role or signed-out visitors to `/login`.
pub fn create_router(state: Arc<AppState>) -> Router {
    let public_routes = Router::new()
        .route("/auth/login", post(auth::login_handler))
        .route("/auth/register", post(auth::register_handler))
        .route("/auth/logout", post(auth::logout_handler))
        .route("/auth/me", get(auth::session_context_handler))
        .route(LOGIN_PATH, get(auth::session_context_handler))
        .route("/toast", get(rest::toast_handler))
        .route("/", get(|| async { Redirect::to(LOGIN_PATH) }));

    let teacher_routes = Router::new()
        .route("/teacher/dashboard", get(teacher::dashboard_handler))
        .route(
            "/teacher/assignments",
            get(teacher::list_assignments_handler).post(teacher::create_assignment_handler),
        )
        .route(
            "/teacher/assignments/{id}",
            put(teacher::update_assignment_handler).delete(teacher::delete_assignment_handler),
        )
        .route(
            "/teacher/assignments/{id}/submissions",
            get(teacher::assignment_submissions_handler),
        )
        .route("/teacher/submissions/{id}", get(teacher::submission_detail_handler))
        .route("/teacher/submissions/{id}/review", post(teacher::mark_reviewed_handler))
        .route("/teacher/submissions/{id}/grade", post(teacher::grade_handler))
        .route("/teacher/submissions/{id}/download", get(teacher::download_handler));

    let student_routes = Router::new()
        .route("/student/dashboard", get(student::dashboard_handler))
        .route("/student/assignments", get(student::list_assignments_handler))
        .route("/student/assignments/{id}/submit", post(student::submit_handler))
        .route("/student/submissions", get(student::list_submissions_handler))
        .route("/student/submissions/{id}", get(student::submission_detail_handler))
        .route("/student/submissions/{id}/download", get(student::download_handler));

    let mut router = Router::new()
        .merge(public_routes)
        .merge(teacher_routes)
        .merge(student_routes)
        .fallback(|| async { Redirect::to(LOGIN_PATH) })
        .layer(axum_middleware::from_fn_with_state(state.clone(), require_role))
        .layer(DefaultBodyLimit::max(
            state.config.max_upload_bytes.saturating_add(FORM_OVERHEAD_BYTES),
        ));

    match state.config.cors_origin.parse::<HeaderValue>() {
        Ok(origin) => {
            let cors = CorsLayer::new()
                .allow_origin(origin)
                .allow_credentials(true)
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([CONTENT_TYPE, ACCEPT]);
            router = router.layer(cors);
        }
        Err(_) => warn!(
            "CORS_ORIGIN '{}' is not a valid header value; CORS disabled",
            state.config.cors_origin
        ),
    }

    router.with_state(state)
}
