use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::extractor::AuthUser;
use crate::auth::password::{hash_password, verify_password, MIN_PASSWORD_LEN};
use crate::errors::AppError;
use crate::models::user::{NewUser, Role, UserView};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub role: Role,
    pub company: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: UserView,
}

#[derive(Debug, Serialize)]
pub struct LoggedInUser {
    #[serde(flatten)]
    pub user: UserView,
    pub logged_in_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: LoggedInUser,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Lowercases and trims; emails compare case-insensitively.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Minimal shape check: one `@` with something on both sides and a dot in the domain.
pub fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

/// Trims; blank strings become `None`.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// POST /api/auth/signup
pub async fn handle_signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let name = req.name.trim().to_string();
    let email = normalize_email(&req.email);

    if name.is_empty() || email.is_empty() || req.password.is_empty() {
        return Err(AppError::Validation(
            "name, email and password are required".to_string(),
        ));
    }
    if !is_plausible_email(&email) {
        return Err(AppError::Validation(format!("'{email}' is not a valid email")));
    }
    if req.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    let company = match req.role {
        Role::Recruiter => Some(non_blank(req.company).ok_or_else(|| {
            AppError::Validation("company is required for recruiters".to_string())
        })?),
        Role::Candidate => None,
    };

    if state.store.get_user_by_email(&email).await?.is_some() {
        return Err(AppError::Conflict(
            "A user with this email already exists. Please use a different email address."
                .to_string(),
        ));
    }

    let password_hash = hash_password(&req.password)?;
    let user = state
        .store
        .create_user(NewUser {
            name,
            email,
            password_hash,
            role: req.role,
            company,
        })
        .await?;

    info!("New {} signed up: {}", user.role, user.id);
    Ok((
        StatusCode::CREATED,
        Json(UserResponse {
            user: UserView::from(&user),
        }),
    ))
}

/// POST /api/auth/login
///
/// The account must exist under the requested role; a candidate cannot log
/// in through the recruiter form and vice versa.
pub async fn handle_login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let email = normalize_email(&req.email);

    let user = state
        .store
        .get_user_by_email(&email)
        .await?
        .filter(|u| u.role == req.role)
        .ok_or_else(|| {
            AppError::NotFound("User not found. Please check your email or sign up.".to_string())
        })?;

    if !verify_password(&req.password, &user.password_hash)? {
        warn!("Failed login for user {}", user.id);
        return Err(AppError::Unauthorized(
            "Invalid password. Please try again.".to_string(),
        ));
    }

    let session = state
        .sessions
        .create(user.id, state.config.session_ttl_secs)
        .await?;

    info!("User {} logged in", user.id);
    Ok(Json(LoginResponse {
        user: LoggedInUser {
            user: UserView::from(&user),
            logged_in_at: Utc::now(),
        },
        token: session.token,
        expires_at: session.expires_at,
    }))
}

/// POST /api/auth/logout
pub async fn handle_logout(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<StatusCode, AppError> {
    state.sessions.revoke(&auth.token).await?;
    info!("User {} logged out", auth.user.id);
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/auth/me
pub async fn handle_me(auth: AuthUser) -> Json<UserResponse> {
    Json(UserResponse {
        user: UserView::from(&auth.user),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_normalization_trims_and_lowercases() {
        assert_eq!(normalize_email("  Ada@Example.COM "), "ada@example.com");
    }

    #[test]
    fn email_shape_check() {
        assert!(is_plausible_email("ada@example.com"));
        assert!(!is_plausible_email("ada.example.com"));
        assert!(!is_plausible_email("@example.com"));
        assert!(!is_plausible_email("ada@localhost"));
        assert!(!is_plausible_email("ada@@example.com"));
        assert!(!is_plausible_email("ada@example."));
    }
}
