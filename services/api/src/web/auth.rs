//! services/api/src/web/auth.rs
//!
//! Authentication endpoints for account signup, login, and logout, plus the
//! public profile lookup that powers the per-user card page.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use cardex_core::domain::NewUser;
use cardex_core::ports::PortError;

use crate::web::state::AppState;

const SESSION_DAYS: i64 = 30;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub slug: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub title: Option<String>,
    pub linkedin: Option<String>,
    pub bio: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, ToSchema)]
pub struct AuthResponse {
    pub user_id: Uuid,
    pub email: String,
    pub slug: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct SlugCheckResponse {
    pub available: bool,
}

/// The subset of a user profile shown on the public card page.
#[derive(Serialize, ToSchema)]
pub struct PublicProfile {
    pub name: String,
    pub title: Option<String>,
    pub company: Option<String>,
    pub bio: Option<String>,
    pub linkedin: Option<String>,
    pub photo_url: Option<String>,
    pub slug: String,
}

//=========================================================================================
// Slug Rules
//=========================================================================================

/// Profile slugs are 3-50 chars of lowercase letters, digits and hyphens.
fn slug_is_valid(slug: &str) -> bool {
    (3..=50).contains(&slug.len())
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

fn session_cookie(session_id: &str) -> String {
    format!(
        "session={}; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age={}",
        session_id,
        Duration::days(SESSION_DAYS).num_seconds()
    )
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /auth/signup - Create a new account with its public profile slug
#[utoipa::path(
    post,
    path = "/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "User created successfully", body = AuthResponse),
        (status = 400, description = "Invalid slug or profile data"),
        (status = 409, description = "Email or slug already taken"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn signup_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SignupRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    // 1. Validate the slug before anything touches the database
    if !slug_is_valid(&req.slug) {
        return Err((
            StatusCode::BAD_REQUEST,
            "Slug must be 3-50 lowercase letters, digits or hyphens".to_string(),
        ));
    }
    if req.name.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Name is required".to_string()));
    }

    // 2. Hash the password
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(req.password.as_bytes(), &salt)
        .map_err(|e| {
            error!("Failed to hash password: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to hash password".to_string(),
            )
        })?
        .to_string();

    // 3. Create user in database (unique indexes reject duplicates)
    let user = state
        .users
        .create_user(NewUser {
            name: req.name.trim().to_string(),
            email: req.email,
            phone: req.phone,
            company: req.company,
            title: req.title,
            linkedin: req.linkedin,
            bio: req.bio,
            photo_url: None,
            slug: req.slug,
            hashed_password: password_hash,
        })
        .await
        .map_err(|e| match e {
            PortError::Conflict(m) => (StatusCode::CONFLICT, m),
            other => {
                error!("Failed to create user: {:?}", other);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to create user".to_string(),
                )
            }
        })?;

    // 4. Create auth session
    let auth_session_id = Uuid::new_v4().to_string();
    let expires_at = Utc::now() + Duration::days(SESSION_DAYS);
    state
        .users
        .create_auth_session(&auth_session_id, user.id, expires_at)
        .await
        .map_err(|e| {
            error!("Failed to create auth session: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to create session".to_string(),
            )
        })?;

    // 5. Fire-and-forget: text the new owner their profile link
    if let Some(phone) = user.phone.clone() {
        let sms = state.sms.clone();
        let link = format!("{}/u/{}", state.config.app_url, user.slug);
        let first = user
            .name
            .split_whitespace()
            .next()
            .unwrap_or(&user.name)
            .to_string();
        tokio::spawn(async move {
            let body = format!(
                "Welcome aboard, {}! Your card page is live: {}",
                first, link
            );
            let outcome = sms.send_sms(&phone, &body).await;
            if !outcome.success {
                warn!(
                    "Signup SMS failed: {}",
                    outcome.error.as_deref().unwrap_or("unknown error")
                );
            }
        });
    }

    let response = AuthResponse {
        user_id: user.id,
        email: user.email,
        slug: Some(user.slug),
    };

    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, session_cookie(&auth_session_id))],
        Json(response),
    ))
}

/// POST /auth/login - Login with existing account
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    // 1. Get user by email. Only a missing account reads as bad
    //    credentials; a store failure must not masquerade as a 401.
    let user_creds = state
        .users
        .get_user_by_email(&req.email)
        .await
        .map_err(|e| match e {
            PortError::NotFound(_) => (
                StatusCode::UNAUTHORIZED,
                "Invalid email or password".to_string(),
            ),
            other => {
                error!("Failed to get user: {:?}", other);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Authentication error".to_string(),
                )
            }
        })?;

    // 2. Verify password
    let parsed_hash = PasswordHash::new(&user_creds.hashed_password).map_err(|e| {
        error!("Failed to parse password hash: {:?}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Authentication error".to_string(),
        )
    })?;

    let valid = Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .is_ok();

    if !valid {
        return Err((
            StatusCode::UNAUTHORIZED,
            "Invalid email or password".to_string(),
        ));
    }

    // 3. Create auth session
    let auth_session_id = Uuid::new_v4().to_string();
    let expires_at = Utc::now() + Duration::days(SESSION_DAYS);
    state
        .users
        .create_auth_session(&auth_session_id, user_creds.user_id, expires_at)
        .await
        .map_err(|e| {
            error!("Failed to create auth session: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to create session".to_string(),
            )
        })?;

    let response = AuthResponse {
        user_id: user_creds.user_id,
        email: user_creds.email,
        slug: None,
    };

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, session_cookie(&auth_session_id))],
        Json(response),
    ))
}

/// POST /auth/logout - Logout and invalidate session
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 200, description = "Logout successful"),
        (status = 401, description = "No active session")
    )
)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    headers: axum::http::HeaderMap,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    // 1. Extract session cookie
    let cookie_header = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .ok_or((StatusCode::UNAUTHORIZED, "No session found".to_string()))?;

    // 2. Parse session ID from cookie
    let auth_session_id = cookie_header
        .split(';')
        .find_map(|c| {
            let c = c.trim();
            c.strip_prefix("session=")
        })
        .ok_or((StatusCode::UNAUTHORIZED, "No session found".to_string()))?;

    // 3. Delete auth session from database
    state
        .users
        .delete_auth_session(auth_session_id)
        .await
        .map_err(|e| {
            error!("Failed to delete auth session: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to logout".to_string(),
            )
        })?;

    // 4. Clear cookie
    let cookie = "session=; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age=0";

    Ok((StatusCode::OK, [(header::SET_COOKIE, cookie.to_string())]))
}

/// GET /auth/check-slug/{slug} - Whether a slug is free to claim
#[utoipa::path(
    get,
    path = "/auth/check-slug/{slug}",
    params(("slug" = String, Path, description = "The slug to check")),
    responses(
        (status = 200, description = "Availability of the slug", body = SlugCheckResponse),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn check_slug_handler(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    // An invalid slug is simply not available
    if !slug_is_valid(&slug) {
        return Ok(Json(SlugCheckResponse { available: false }));
    }

    let taken = state.users.slug_taken(&slug).await.map_err(|e| {
        error!("Failed to check slug: {:?}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to check slug".to_string(),
        )
    })?;

    Ok(Json(SlugCheckResponse { available: !taken }))
}

/// GET /u/{slug} - Public profile for a user's card page
#[utoipa::path(
    get,
    path = "/u/{slug}",
    params(("slug" = String, Path, description = "The profile slug")),
    responses(
        (status = 200, description = "The public profile", body = PublicProfile),
        (status = 404, description = "No active profile with this slug")
    )
)]
pub async fn public_profile_handler(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let user = state.users.get_user_by_slug(&slug).await.map_err(|e| match e {
        PortError::NotFound(m) => (StatusCode::NOT_FOUND, m),
        other => {
            error!("Failed to load profile: {:?}", other);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to load profile".to_string(),
            )
        }
    })?;

    // Deactivated accounts disappear from the public surface
    if !user.active {
        return Err((StatusCode::NOT_FOUND, "Profile not found".to_string()));
    }

    Ok(Json(PublicProfile {
        name: user.name,
        title: user.title,
        company: user.company,
        bio: user.bio,
        linkedin: user.linkedin,
        photo_url: user.photo_url,
        slug: user.slug,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::testutil::{mem_state, seed_user};
    use cardex_core::ports::UserStore;
    use std::sync::atomic::Ordering;

    #[test]
    fn slug_rules() {
        assert!(slug_is_valid("jane-doe"));
        assert!(slug_is_valid("abc"));
        assert!(!slug_is_valid("ab"));
        assert!(!slug_is_valid("Jane"));
        assert!(!slug_is_valid("jane_doe"));
        assert!(!slug_is_valid("jane doe"));
        assert!(!slug_is_valid(&"x".repeat(51)));
    }

    #[test]
    fn cookie_carries_session_id_and_expiry() {
        let cookie = session_cookie("abc123");
        assert!(cookie.starts_with("session=abc123;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Max-Age=2592000"));
    }

    #[tokio::test]
    async fn login_with_unknown_email_is_unauthorized() {
        let (state, _, _) = mem_state();
        let (status, _) = login_handler(
            State(state),
            Json(LoginRequest {
                email: "nobody@example.com".to_string(),
                password: "pw".to_string(),
            }),
        )
        .await
        .err()
        .unwrap();
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn login_store_outage_is_a_server_error_not_a_401() {
        let (state, users, _) = mem_state();
        users.fail_lookup.store(true, Ordering::SeqCst);

        let (status, message) = login_handler(
            State(state),
            Json(LoginRequest {
                email: "ann-chen@example.com".to_string(),
                password: "pw".to_string(),
            }),
        )
        .await
        .err()
        .unwrap();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(message, "Authentication error");
    }

    #[tokio::test]
    async fn expired_sessions_fail_validation_and_are_swept() {
        let (_, users, _) = mem_state();
        let user = seed_user(&users, "Ann Chen", "ann-chen").await;
        users
            .create_auth_session("stale", user.id, Utc::now() - Duration::days(1))
            .await
            .unwrap();

        let err = users.validate_auth_session("stale").await.unwrap_err();
        assert!(matches!(err, cardex_core::ports::PortError::Unauthorized));
        assert!(users.sessions.lock().unwrap().is_empty());
    }
}
