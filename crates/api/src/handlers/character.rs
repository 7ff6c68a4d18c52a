//! Handlers for the `/characters` resource.
//!
//! Create and update accept the sheet fields plus an optional `portraits`
//! field: the gallery's JSON array of kept URLs and inline images.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use forge_core::error::CoreError;
use forge_core::portraits::{build_portrait_list, encode_gallery_state, PortraitError};
use forge_core::sheet::CharacterSheet;
use forge_core::types::DbId;
use forge_db::models::character::{Character, CreateCharacter, UpdateCharacter};
use forge_db::repositories::CharacterRepo;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Body of a create or update submission.
#[derive(Debug, Deserialize)]
pub struct CharacterForm {
    #[serde(flatten)]
    pub sheet: CharacterSheet,
    /// Raw hidden-field value. Absent means "leave portraits unchanged".
    #[serde(default)]
    pub portraits: Option<String>,
}

/// Initial state for the gallery widget on the edit page.
#[derive(Debug, Serialize)]
pub struct GalleryState {
    /// URL-escaped JSON array of portrait URLs.
    pub initial_images: String,
}

/// Validation failures echo the submitted sheet so the form can be re-filled.
fn portrait_error(err: PortraitError, sheet: &CharacterSheet) -> AppError {
    match err {
        PortraitError::Core(source @ CoreError::Validation(_)) => {
            AppError::form(source, serde_json::to_value(sheet).unwrap_or_default())
        }
        other => other.into(),
    }
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Character",
        id,
    })
}

/// GET /api/v1/characters
pub async fn list(State(state): State<AppState>) -> AppResult<Json<DataResponse<Vec<Character>>>> {
    let characters = CharacterRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: characters }))
}

/// GET /api/v1/characters/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Character>> {
    let character = CharacterRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(character))
}

/// GET /api/v1/characters/{id}/gallery
pub async fn gallery(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<GalleryState>>> {
    let character = CharacterRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse {
        data: GalleryState {
            initial_images: encode_gallery_state(&character.portraits),
        },
    }))
}

/// POST /api/v1/characters
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(form): Json<CharacterForm>,
) -> AppResult<(StatusCode, Json<Character>)> {
    let portraits = build_portrait_list(&state.uploads, form.portraits.as_deref(), &[])
        .await
        .map_err(|e| portrait_error(e, &form.sheet))?;

    let character = CharacterRepo::create(
        &state.pool,
        &CreateCharacter {
            sheet: form.sheet,
            portraits,
            created_by: Some(auth.user_id),
        },
    )
    .await?;

    tracing::info!(
        character_id = character.id,
        user_id = auth.user_id,
        portraits = character.portraits.len(),
        "Character created"
    );
    Ok((StatusCode::CREATED, Json(character)))
}

/// PUT /api/v1/characters/{id}
///
/// Replaces the whole sheet. Portraits are rebuilt against the stored list.
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(form): Json<CharacterForm>,
) -> AppResult<Json<Character>> {
    let existing = CharacterRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    let portraits =
        build_portrait_list(&state.uploads, form.portraits.as_deref(), &existing.portraits)
            .await
            .map_err(|e| portrait_error(e, &form.sheet))?;

    let character = CharacterRepo::update(
        &state.pool,
        id,
        &UpdateCharacter {
            sheet: form.sheet,
            portraits,
        },
    )
    .await?
    .ok_or_else(|| not_found(id))?;

    tracing::info!(character_id = id, user_id = auth.user_id, "Character updated");
    Ok(Json(character))
}

/// DELETE /api/v1/characters/{id}
///
/// Stored portrait files are left in place.
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if CharacterRepo::delete(&state.pool, id).await? {
        tracing::info!(character_id = id, user_id = auth.user_id, "Character deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}
