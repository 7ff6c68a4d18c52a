//! Inline image codec for `data:image/<subtype>;base64,<payload>` URLs.
//!
//! Browsers produce these when a selected file is read for preview; the
//! server decodes them back to bytes before writing them to the upload store.

use std::sync::LazyLock;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use regex::Regex;

use crate::error::CoreError;

/// Hard ceiling on a single decoded inline image (5 MiB).
pub const MAX_INLINE_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Extension used when the declared subtype is missing or unusable.
pub const DEFAULT_EXTENSION: &str = "png";

/// Shown when an image exceeds [`MAX_INLINE_IMAGE_BYTES`].
pub const TOO_LARGE_MESSAGE: &str = "Image is too large. Please upload a file under 5MB.";

/// Shown when a value is not an inline image at all.
pub const INVALID_FORMAT_MESSAGE: &str = "Invalid image format.";

/// Regex pattern for an inline image. Group 1 is the subtype (may be empty),
/// group 2 the base64 payload.
pub const INLINE_IMAGE_PATTERN: &str = r"^data:image/([\w.+-]*);base64,(.+)$";

static INLINE_IMAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(INLINE_IMAGE_PATTERN).expect("valid regex"));

/// Why a string could not be turned into an [`InlineImage`].
#[derive(Debug, thiserror::Error)]
pub enum DataUrlError {
    #[error("value is not a data:image/...;base64 URL")]
    NotInlineImage,

    #[error("invalid base64 payload: {0}")]
    InvalidBase64(#[from] base64::DecodeError),
}

impl From<DataUrlError> for CoreError {
    fn from(_: DataUrlError) -> Self {
        CoreError::validation(INVALID_FORMAT_MESSAGE)
    }
}

/// A decoded inline image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    /// Declared media subtype (`png`, `jpeg`, `svg+xml`, ...), if any.
    pub subtype: Option<String>,
    pub bytes: Vec<u8>,
}

impl InlineImage {
    /// Parse and decode a `data:image/...;base64,...` string.
    pub fn parse(value: &str) -> Result<Self, DataUrlError> {
        let caps = INLINE_IMAGE_RE
            .captures(value)
            .ok_or(DataUrlError::NotInlineImage)?;

        let subtype = caps
            .get(1)
            .map(|m| m.as_str())
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        let bytes = STANDARD.decode(caps[2].trim())?;

        Ok(Self { subtype, bytes })
    }

    /// File extension derived from the subtype.
    ///
    /// Structured suffixes are dropped (`svg+xml` -> `svg`) and only ASCII
    /// alphanumerics and `-` survive. Falls back to [`DEFAULT_EXTENSION`].
    pub fn extension(&self) -> String {
        let ext: String = self
            .subtype
            .as_deref()
            .and_then(|s| s.split('+').next())
            .unwrap_or_default()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
            .collect::<String>()
            .to_ascii_lowercase();

        if ext.is_empty() {
            DEFAULT_EXTENSION.to_string()
        } else {
            ext
        }
    }

    /// Reject images whose decoded size exceeds [`MAX_INLINE_IMAGE_BYTES`].
    pub fn ensure_within_limit(&self) -> Result<(), CoreError> {
        if self.bytes.len() > MAX_INLINE_IMAGE_BYTES {
            return Err(CoreError::validation(TOO_LARGE_MESSAGE));
        }
        Ok(())
    }
}

/// Whether `value` has the shape of an inline image (without decoding it).
pub fn is_inline_image(value: &str) -> bool {
    INLINE_IMAGE_RE.is_match(value)
}

/// Encode raw bytes as a `data:<media_type>;base64,<payload>` URL.
pub fn encode(media_type: &str, bytes: &[u8]) -> String {
    format!("data:{media_type};base64,{}", STANDARD.encode(bytes))
}
