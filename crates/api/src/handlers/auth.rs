//! Handlers for the `/auth` resource: accounts, sessions and password reset.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::{Duration, Utc};
use forge_core::account::{
    normalize_email, reset_link, validate_new_password, validate_registration, Registration,
    DEFAULT_PROFILE_IMAGE, MSG_EMAIL_TAKEN, MSG_INVALID_CREDENTIALS, MSG_INVALID_RESET_TOKEN,
    MSG_MISSING_CREDENTIALS, MSG_MISSING_FIELDS,
};
use forge_core::error::CoreError;
use forge_db::models::password_reset::CreatePasswordResetToken;
use forge_db::models::session::CreateSession;
use forge_db::models::user::{CreateUser, User, UserResponse};
use forge_db::repositories::{PasswordResetRepo, SessionRepo, UserRepo};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::auth::jwt::{generate_access_token, generate_opaque_token, hash_token};
use crate::auth::password::{hash_password, verify_password};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/register`. Missing fields read as blank.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub password: String,
    pub confirm_password: String,
}

/// Returned by register, login and refresh.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserResponse,
}

// ---------------------------------------------------------------------------
// Accounts and sessions
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/register
///
/// Create an account and log it in.
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    let form_data = json!({ "username": input.username, "email": input.email });

    validate_registration(&Registration {
        username: &input.username,
        email: &input.email,
        password: &input.password,
        confirm_password: &input.confirm_password,
    })
    .map_err(|e| AppError::form(e, form_data.clone()))?;

    let email = normalize_email(&input.email);
    let email_taken =
        || AppError::form(CoreError::Conflict(MSG_EMAIL_TAKEN.into()), form_data.clone());

    if UserRepo::find_by_email(&state.pool, &email).await?.is_some() {
        return Err(email_taken());
    }

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let create = CreateUser {
        username: input.username.trim().to_string(),
        email,
        password_hash,
    };
    // A concurrent registration can still win the race to the constraint.
    let user = match UserRepo::create(&state.pool, &create).await {
        Ok(user) => user,
        Err(e) if is_unique_violation(&e, "uq_users_email") => return Err(email_taken()),
        Err(e) => return Err(e.into()),
    };

    tracing::info!(user_id = user.id, "Registered new user");

    let response = create_auth_response(&state, user).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/v1/auth/login
///
/// Authenticate with email + password.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let form_data = json!({ "email": input.email });

    if input.email.trim().is_empty() || input.password.is_empty() {
        return Err(AppError::form(
            CoreError::validation(MSG_MISSING_CREDENTIALS),
            form_data,
        ));
    }

    let invalid = || {
        AppError::form(
            CoreError::Unauthorized(MSG_INVALID_CREDENTIALS.into()),
            form_data.clone(),
        )
    };

    let user = UserRepo::find_by_email(&state.pool, &normalize_email(&input.email))
        .await?
        .ok_or_else(invalid)?;

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        tracing::info!(user_id = user.id, "Failed login attempt");
        return Err(invalid());
    }

    let user = if user.profile_image.is_none() {
        UserRepo::set_profile_image(&state.pool, user.id, DEFAULT_PROFILE_IMAGE)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "User",
                id: user.id,
            }))?
    } else {
        user
    };

    let response = create_auth_response(&state, user).await?;
    Ok(Json(response))
}

/// POST /api/v1/auth/refresh
///
/// Exchange a live refresh token for a new token pair. The old session is
/// revoked.
pub async fn refresh(
    State(state): State<AppState>,
    Json(input): Json<RefreshRequest>,
) -> AppResult<Json<AuthResponse>> {
    let token_hash = hash_token(&input.refresh_token);

    let session = SessionRepo::find_by_refresh_token_hash(&state.pool, &token_hash)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid or expired refresh token".into(),
            ))
        })?;

    SessionRepo::revoke(&state.pool, session.id).await?;

    let user = UserRepo::find_by_id(&state.pool, session.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("User no longer exists".into())))?;

    let response = create_auth_response(&state, user).await?;
    Ok(Json(response))
}

/// POST /api/v1/auth/logout
///
/// Revoke all sessions of the caller. Returns 204 No Content.
pub async fn logout(State(state): State<AppState>, auth: AuthUser) -> AppResult<StatusCode> {
    let revoked = SessionRepo::revoke_all_for_user(&state.pool, auth.user_id).await?;
    tracing::debug!(user_id = auth.user_id, revoked, "Logged out");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/auth/me
pub async fn me(State(state): State<AppState>, auth: AuthUser) -> AppResult<Json<UserResponse>> {
    let user = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: auth.user_id,
        }))?;
    Ok(Json(user.into()))
}

// ---------------------------------------------------------------------------
// Password reset
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/forgot-password
///
/// Always answers 202 so the response does not reveal whether an account
/// exists. The email is sent in the background.
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(input): Json<ForgotPasswordRequest>,
) -> AppResult<StatusCode> {
    let email = normalize_email(&input.email);
    if email.is_empty() {
        return Ok(StatusCode::ACCEPTED);
    }

    let Some(user) = UserRepo::find_by_email(&state.pool, &email).await? else {
        tracing::debug!("Password reset requested for unknown email");
        return Ok(StatusCode::ACCEPTED);
    };

    let (token, token_hash) = generate_opaque_token();
    let expiry_mins = state.config.password_reset_expiry_mins;
    PasswordResetRepo::create(
        &state.pool,
        &CreatePasswordResetToken {
            user_id: user.id,
            token_hash,
            expires_at: Utc::now() + Duration::minutes(expiry_mins),
        },
    )
    .await?;

    let Some(mailer) = state.mailer.clone() else {
        tracing::warn!(user_id = user.id, "SMTP not configured, skipping password reset email");
        return Ok(StatusCode::ACCEPTED);
    };

    let link = reset_link(&state.config.app_base_url, &token);
    let email_body = forge_mail::password_reset_email(&user.username, &link, expiry_mins);
    tokio::spawn(async move {
        if let Err(e) = mailer.send(&user.email, &email_body).await {
            tracing::error!(user_id = user.id, error = %e, "Failed to send password reset email");
        }
    });

    Ok(StatusCode::ACCEPTED)
}

/// POST /api/v1/auth/reset-password
///
/// Redeem a reset token: replace the password and revoke every session.
pub async fn reset_password(
    State(state): State<AppState>,
    Json(input): Json<ResetPasswordRequest>,
) -> AppResult<StatusCode> {
    if input.password.trim().is_empty() || input.confirm_password.trim().is_empty() {
        return Err(CoreError::validation(MSG_MISSING_FIELDS).into());
    }
    validate_new_password(&input.password, &input.confirm_password)?;

    let invalid_token = || AppError::Core(CoreError::validation(MSG_INVALID_RESET_TOKEN));

    let reset = PasswordResetRepo::find_active_by_hash(&state.pool, &hash_token(&input.token))
        .await?
        .ok_or_else(invalid_token)?;

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    if !PasswordResetRepo::mark_used(&state.pool, reset.id).await? {
        return Err(invalid_token());
    }
    UserRepo::update_password(&state.pool, reset.user_id, &password_hash).await?;
    let revoked = SessionRepo::revoke_all_for_user(&state.pool, reset.user_id).await?;

    tracing::info!(user_id = reset.user_id, revoked, "Password reset");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Issue an access + refresh token pair, persist the session, and build the
/// response.
async fn create_auth_response(state: &AppState, user: User) -> AppResult<AuthResponse> {
    let jwt = &state.config.jwt;
    let access_token = generate_access_token(user.id, jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    let (refresh_plaintext, refresh_hash) = generate_opaque_token();
    SessionRepo::create(
        &state.pool,
        &CreateSession {
            user_id: user.id,
            refresh_token_hash: refresh_hash,
            expires_at: Utc::now() + Duration::days(jwt.refresh_token_expiry_days),
        },
    )
    .await?;

    Ok(AuthResponse {
        access_token,
        refresh_token: refresh_plaintext,
        expires_in: jwt.access_token_expiry_mins * 60,
        user: user.into(),
    })
}

fn is_unique_violation(err: &sqlx::Error, constraint: &str) -> bool {
    err.as_database_error().is_some_and(|db_err| {
        db_err.code().as_deref() == Some("23505") && db_err.constraint() == Some(constraint)
    })
}
