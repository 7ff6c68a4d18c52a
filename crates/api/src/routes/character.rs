//! Route definitions for the `/characters` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::character;
use crate::state::AppState;

/// Routes mounted at `/characters`.
///
/// ```text
/// GET    /               -> list
/// POST   /               -> create (requires auth)
/// GET    /{id}           -> get_by_id
/// PUT    /{id}           -> update (requires auth)
/// DELETE /{id}           -> delete (requires auth)
/// GET    /{id}/gallery   -> gallery
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(character::list).post(character::create))
        .route(
            "/{id}",
            get(character::get_by_id)
                .put(character::update)
                .delete(character::delete),
        )
        .route("/{id}/gallery", get(character::gallery))
}
