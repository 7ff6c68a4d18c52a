pub mod auth;
pub mod character;
pub mod health;
pub mod profile;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /auth/register                 register (public)
/// /auth/login                    login (public)
/// /auth/refresh                  refresh (public)
/// /auth/logout                   logout (requires auth)
/// /auth/me                       current user (requires auth)
/// /auth/forgot-password          request reset email (public)
/// /auth/reset-password           redeem reset token (public)
///
/// /profile/picture               upload profile picture (requires auth)
///
/// /characters                    list (public), create (requires auth)
/// /characters/{id}               get (public), update, delete (requires auth)
/// /characters/{id}/gallery       gallery initial state (public)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/profile", profile::router())
        .nest("/characters", character::router())
}
