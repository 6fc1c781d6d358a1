//! services/api/src/web/middleware.rs
//!
//! The role gate in front of every route.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use portal_core::gate::{check_path, PathDecision, LOGIN_PATH};
use std::sync::Arc;
use tracing::debug;

use crate::web::state::AppState;

/// Middleware that checks the active identity against the roles the path requires.
///
/// Public paths pass untouched. On gated paths an allowed identity is inserted
/// into the request extensions for handlers to use; anyone else is redirected
/// to the login page.
pub async fn require_role(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Response {
    // The portal lock is released before the handler runs.
    let allowed = {
        let portal = state.portal.lock().await;
        match check_path(portal.session.current(), req.uri().path()) {
            PathDecision::Public => None,
            PathDecision::Allow(identity) => Some(identity.clone()),
            PathDecision::RedirectToLogin => {
                debug!("Gate redirected {} to {}", req.uri().path(), LOGIN_PATH);
                return Redirect::to(LOGIN_PATH).into_response();
            }
        }
    };

    if let Some(identity) = allowed {
        req.extensions_mut().insert(identity);
    }
    next.run(req).await
}
