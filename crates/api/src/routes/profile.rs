use axum::routing::post;
use axum::Router;

use crate::handlers::profile;
use crate::state::AppState;

/// Routes mounted at `/profile`.
///
/// ```text
/// POST /picture  -> upload_picture (requires auth)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/picture", post(profile::upload_picture))
}
