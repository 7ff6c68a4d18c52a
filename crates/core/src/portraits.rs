//! Character portrait persistence pipeline.
//!
//! A character form submits its gallery as one `portraits` field holding a
//! JSON array. Each entry is either a URL that was persisted earlier (kept)
//! or an inline `data:image/...;base64,...` image chosen in this session
//! (incoming). [`build_portrait_list`] turns that field into the URL list
//! stored on the character.

use std::collections::HashSet;

use serde_json::Value;

use crate::data_url::{is_inline_image, InlineImage};
use crate::error::CoreError;
use crate::storage::{StorageError, UploadNamespace, UploadStore};

/// Failure while building a portrait list.
#[derive(Debug, thiserror::Error)]
pub enum PortraitError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Submitted entries split by shape.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ClassifiedPortraits {
    /// Previously persisted URLs, in submitted order.
    pub kept: Vec<String>,
    /// Inline data URLs still to be written.
    pub incoming: Vec<String>,
}

/// Parse the raw field value. Anything but a JSON array yields an empty list.
pub fn parse_portraits(raw: &str) -> Vec<Value> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(entries)) => entries,
        Ok(_) | Err(_) => Vec::new(),
    }
}

/// Split entries into kept URLs and incoming inline images.
///
/// Non-string entries and strings of neither shape are dropped, as are kept
/// URLs with a `..` segment.
pub fn classify(entries: Vec<Value>) -> ClassifiedPortraits {
    let kept_prefix = UploadNamespace::Characters.url_prefix();
    let mut out = ClassifiedPortraits::default();

    for entry in entries {
        let Value::String(s) = entry else { continue };
        if s.starts_with(kept_prefix) && !s.split('/').any(|segment| segment == "..") {
            out.kept.push(s);
        } else if is_inline_image(&s) {
            out.incoming.push(s);
        } else {
            tracing::debug!(entry = %truncate(&s), "Dropping unrecognised portrait entry");
        }
    }

    out
}

/// Decode incoming entries and enforce the size ceiling on every one.
///
/// An entry that fails to decode is skipped without affecting the others.
/// A single oversize entry rejects the whole submission, before anything is
/// written.
pub fn decode_incoming(incoming: &[String]) -> Result<Vec<InlineImage>, CoreError> {
    let mut images = Vec::with_capacity(incoming.len());
    for (index, entry) in incoming.iter().enumerate() {
        match InlineImage::parse(entry) {
            Ok(image) => {
                image.ensure_within_limit()?;
                images.push(image);
            }
            Err(e) => {
                tracing::warn!(index, error = %e, "Skipping undecodable portrait");
            }
        }
    }
    Ok(images)
}

/// Write each image to the characters namespace and return the new URLs in
/// input order.
///
/// Every image is attempted even if an earlier one failed; the first failure
/// is returned after the loop. Files written before or after a failure stay
/// intact.
pub async fn persist_incoming(
    store: &UploadStore,
    images: &[InlineImage],
) -> Result<Vec<String>, StorageError> {
    let mut urls = Vec::with_capacity(images.len());
    let mut first_error = None;

    for image in images {
        match store
            .write_image(
                UploadNamespace::Characters,
                None,
                &image.extension(),
                &image.bytes,
            )
            .await
        {
            Ok(url) => urls.push(url),
            Err(e) => {
                tracing::error!(error = %e, "Failed to persist portrait");
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(urls),
    }
}

/// Resolve the portrait list for a create or update submission.
///
/// - `raw == None` (field absent): `current` is returned unchanged.
/// - otherwise: kept URLs in submitted order, followed by the URLs of newly
///   written images, with exact duplicates removed.
pub async fn build_portrait_list(
    store: &UploadStore,
    raw: Option<&str>,
    current: &[String],
) -> Result<Vec<String>, PortraitError> {
    let Some(raw) = raw else {
        return Ok(current.to_vec());
    };

    let ClassifiedPortraits { kept, incoming } = classify(parse_portraits(raw));
    let images = decode_incoming(&incoming)?;
    let saved = persist_incoming(store, &images).await?;

    let mut seen = HashSet::new();
    let merged = kept
        .into_iter()
        .chain(saved)
        .filter(|url| seen.insert(url.clone()))
        .collect();
    Ok(merged)
}

/// URL-escaped JSON array of portrait URLs, embedded by the server as the
/// gallery widget's initial state.
pub fn encode_gallery_state(portraits: &[String]) -> String {
    let json = serde_json::to_string(portraits).unwrap_or_else(|_| "[]".to_string());
    urlencoding::encode(&json).into_owned()
}

fn truncate(s: &str) -> &str {
    match s.char_indices().nth(48) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
