//! The D&D character sheet as submitted by the character form.
//!
//! Ability modifiers, saves and skills are free-form strings so players can
//! enter signed values such as `+3` or `-1`. Field names on the wire are the
//! camelCase form field names.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CharacterSheet {
    // Basic info
    pub character_name: Option<String>,
    pub class_level: Option<String>,
    pub background: Option<String>,
    pub race: Option<String>,
    pub alignment: Option<String>,

    pub inspiration: bool,
    pub proficiency_bonus: Option<i32>,

    // Ability scores and modifiers
    pub strength_score: Option<i32>,
    pub strength_mod: Option<String>,
    pub dexterity_score: Option<i32>,
    pub dexterity_mod: Option<String>,
    pub constitution_score: Option<i32>,
    pub constitution_mod: Option<String>,
    pub intelligence_score: Option<i32>,
    pub intelligence_mod: Option<String>,
    pub wisdom_score: Option<i32>,
    pub wisdom_mod: Option<String>,
    pub charisma_score: Option<i32>,
    pub charisma_mod: Option<String>,

    // Saving throws
    pub save_strength: Option<String>,
    pub save_dexterity: Option<String>,
    pub save_constitution: Option<String>,
    pub save_intelligence: Option<String>,
    pub save_wisdom: Option<String>,
    pub save_charisma: Option<String>,

    // Skills
    pub skill_acrobatics: Option<String>,
    pub skill_animal_handling: Option<String>,
    pub skill_arcana: Option<String>,
    pub skill_athletics: Option<String>,
    pub skill_deception: Option<String>,
    pub skill_history: Option<String>,
    pub skill_insight: Option<String>,
    pub skill_intimidation: Option<String>,
    pub skill_investigation: Option<String>,
    pub skill_medicine: Option<String>,
    pub skill_nature: Option<String>,
    pub skill_perception: Option<String>,
    pub skill_performance: Option<String>,
    pub skill_persuasion: Option<String>,
    pub skill_religion: Option<String>,
    pub skill_sleight_of_hand: Option<String>,
    pub skill_stealth: Option<String>,
    pub skill_survival: Option<String>,

    pub passive_perception: Option<i32>,
    pub passive_investigation: Option<i32>,
    pub passive_insight: Option<i32>,

    pub armor: Option<String>,
    pub weapons: Option<String>,
    pub languages: Option<String>,

    // Combat
    pub armor_class: Option<i32>,
    pub initiative: Option<String>,
    #[serde(rename = "maxHP")]
    pub max_hp: Option<i32>,
    #[serde(rename = "currentHP")]
    pub current_hp: Option<i32>,
    #[serde(rename = "tempHP")]
    pub temp_hp: Option<i32>,
}

impl CharacterSheet {
    /// Trimmed character name, empty when unset. Used as the sort key.
    pub fn display_name(&self) -> &str {
        self.character_name.as_deref().map(str::trim).unwrap_or("")
    }
}
