//! Character entity model and DTOs.

use forge_core::sheet::CharacterSheet;
use forge_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;

/// A character row from the `characters` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Character {
    pub id: DbId,
    /// Denormalized from the sheet for ordering.
    pub character_name: String,
    pub sheet: Json<CharacterSheet>,
    /// Persisted portrait URLs in display order.
    pub portraits: Vec<String>,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a character. Portraits are already persisted URLs.
#[derive(Debug, Clone)]
pub struct CreateCharacter {
    pub sheet: CharacterSheet,
    pub portraits: Vec<String>,
    pub created_by: Option<DbId>,
}

/// DTO for a full replacement of a character's sheet and portraits.
#[derive(Debug, Clone)]
pub struct UpdateCharacter {
    pub sheet: CharacterSheet,
    pub portraits: Vec<String>,
}
