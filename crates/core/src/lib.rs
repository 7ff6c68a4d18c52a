//! Domain layer for Forge My Hero.
//!
//! Holds everything that is independent of HTTP and SQL: the character sheet
//! shape, account rules, the inline-image (data URL) codec, and the portrait
//! persistence pipeline with its on-disk upload store.

pub mod account;
pub mod data_url;
pub mod error;
pub mod portraits;
pub mod sheet;
pub mod storage;
pub mod types;
