//! Handlers for the `/profile` resource.

use axum::extract::State;
use axum::Json;
use forge_core::data_url::InlineImage;
use forge_core::error::CoreError;
use forge_core::storage::UploadNamespace;
use forge_db::repositories::UserRepo;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

pub const MSG_NO_IMAGE: &str = "No image provided.";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProfilePictureRequest {
    /// Inline `data:image/...;base64,...` URL. Kept loose so a value of the
    /// wrong type is reported as a missing image rather than a decode error.
    pub image_data: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct ProfilePictureResponse {
    pub image_url: String,
}

/// POST /api/v1/profile/picture
///
/// Store a new profile picture for the caller and return its URL.
pub async fn upload_picture(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<ProfilePictureRequest>,
) -> AppResult<Json<ProfilePictureResponse>> {
    let image_data = match &input.image_data {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim(),
        _ => return Err(CoreError::validation(MSG_NO_IMAGE).into()),
    };

    UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: auth.user_id,
        }))?;

    let image = InlineImage::parse(image_data).map_err(CoreError::from)?;
    image.ensure_within_limit()?;

    let owner = auth.user_id.to_string();
    let image_url = state
        .uploads
        .write_image(
            UploadNamespace::ProfilePictures,
            Some(&owner),
            &image.extension(),
            &image.bytes,
        )
        .await?;

    UserRepo::set_profile_image(&state.pool, auth.user_id, &image_url)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: auth.user_id,
        }))?;

    tracing::info!(user_id = auth.user_id, %image_url, "Profile picture updated");
    Ok(Json(ProfilePictureResponse { image_url }))
}
