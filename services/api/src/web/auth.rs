//! services/api/src/web/auth.rs
//!
//! Authentication endpoints for registration, login, logout and the current
//! session. There is one active identity for the whole portal: logging in
//! replaces it and logging out clears it.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use portal_core::domain::{Identity, NewAccount, Role};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, OnceLock};
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::web::{rest::IdentityView, state::AppState};

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    /// "teacher" or "student".
    pub role: String,
}

/// Who is signed in, and where they should land.
#[derive(Serialize, ToSchema, Debug)]
pub struct SessionContext {
    pub authenticated: bool,
    pub identity: Option<IdentityView>,
    pub dashboard: Option<String>,
}

impl SessionContext {
    fn of(identity: Option<&Identity>) -> Self {
        Self {
            authenticated: identity.is_some(),
            identity: identity.map(IdentityView::from),
            dashboard: identity.map(|i| i.role.dashboard_path().to_string()),
        }
    }
}

fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email pattern"))
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /auth/login - Sign in with an account from the directory
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = SessionContext),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let mut portal = state.portal.lock().await;
    let identity = portal.directory.authenticate(&req.email, &req.password)?;
    portal.session.login(identity).await?;

    Ok((StatusCode::OK, Json(SessionContext::of(portal.session.current()))))
}

/// POST /auth/register - Create an account and sign in with it
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = SessionContext),
        (status = 400, description = "Invalid registration form"),
        (status = 401, description = "Email already registered")
    )
)]
pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    // 1. Validate the form before touching the directory
    if req.name.trim().is_empty() {
        return Err(ApiError::validation("Name is required"));
    }
    if !email_pattern().is_match(req.email.trim()) {
        return Err(ApiError::validation("Invalid email address"));
    }
    if req.password.is_empty() {
        return Err(ApiError::validation("Password is required"));
    }
    let role: Role = req.role.parse()?;

    // 2. Register and sign in
    let mut portal = state.portal.lock().await;
    let identity = portal
        .directory
        .register(NewAccount {
            name: req.name,
            email: req.email,
            password: req.password,
            role,
        })
        .await?;
    portal.session.login(identity).await?;

    Ok((
        StatusCode::CREATED,
        Json(SessionContext::of(portal.session.current())),
    ))
}

/// POST /auth/logout - Clear the active identity
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 200, description = "Logout successful", body = SessionContext)
    )
)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let mut portal = state.portal.lock().await;
    portal.session.logout().await?;
    Ok(Json(SessionContext::of(None)))
}

/// GET /auth/me - The active identity, also served as the login landing page
#[utoipa::path(
    get,
    path = "/auth/me",
    responses(
        (status = 200, description = "Current session", body = SessionContext)
    )
)]
pub async fn session_context_handler(State(state): State<Arc<AppState>>) -> Json<SessionContext> {
    let portal = state.portal.lock().await;
    Json(SessionContext::of(portal.session.current()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shape_is_checked() {
        assert!(email_pattern().is_match("sam@example.com"));
        assert!(!email_pattern().is_match("sam@example"));
        assert!(!email_pattern().is_match("not an email"));
    }
}
