//! Input validation for untrusted data.
//!
//! Every request body is checked here before it reaches the composer, so a
//! rejected request never changes the scene.

use thiserror::Error;

/// Maximum caption length in characters.
pub const MAX_CAPTION_LEN: usize = 1024;
/// Maximum upload size in bytes.
pub const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024; // 16 MiB
/// Maximum number of layers in one scene.
pub const MAX_LAYERS: usize = 256;
/// Maximum length of a synthesis prompt in characters.
pub const MAX_PROMPT_LEN: usize = 4096;

/// Validation error types.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Caption exceeds maximum length.
    #[error("caption too long (max {MAX_CAPTION_LEN} chars)")]
    CaptionTooLong,
    /// Upload body was empty.
    #[error("upload is empty")]
    EmptyUpload,
    /// Upload body exceeds maximum size.
    #[error("upload too large (max {MAX_UPLOAD_BYTES} bytes)")]
    UploadTooLarge,
    /// Scene already holds the maximum number of layers.
    #[error("too many layers (max {MAX_LAYERS})")]
    TooManyLayers,
    /// Prompt exceeds maximum length.
    #[error("prompt too long (max {MAX_PROMPT_LEN} chars)")]
    PromptTooLong,
}

impl ValidationError {
    /// Short label used for metrics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CaptionTooLong => "caption",
            Self::EmptyUpload | Self::UploadTooLarge => "upload",
            Self::TooManyLayers => "layer_count",
            Self::PromptTooLong => "prompt",
        }
    }
}

/// Validate a caption.
///
/// Length is counted in characters, not bytes. Empty captions are valid.
///
/// # Errors
///
/// Returns [`ValidationError::CaptionTooLong`] if the caption exceeds 1024 characters.
pub fn validate_caption(caption: &str) -> Result<(), ValidationError> {
    if caption.chars().count() > MAX_CAPTION_LEN {
        return Err(ValidationError::CaptionTooLong);
    }
    Ok(())
}

/// Validate the size of an upload body.
///
/// # Errors
///
/// Returns [`ValidationError::EmptyUpload`] for an empty body and
/// [`ValidationError::UploadTooLarge`] if it exceeds 16 MiB.
pub fn validate_upload_size(size: usize) -> Result<(), ValidationError> {
    if size == 0 {
        return Err(ValidationError::EmptyUpload);
    }
    if size > MAX_UPLOAD_BYTES {
        return Err(ValidationError::UploadTooLarge);
    }
    Ok(())
}

/// Validate that one more layer fits in the scene.
///
/// # Errors
///
/// Returns [`ValidationError::TooManyLayers`] if the count reaches the limit.
pub fn validate_layer_count(count: usize) -> Result<(), ValidationError> {
    if count >= MAX_LAYERS {
        return Err(ValidationError::TooManyLayers);
    }
    Ok(())
}

/// Validate a synthesis prompt.
///
/// # Errors
///
/// Returns [`ValidationError::PromptTooLong`] if the prompt exceeds 4096 characters.
pub fn validate_prompt(prompt: &str) -> Result<(), ValidationError> {
    if prompt.chars().count() > MAX_PROMPT_LEN {
        return Err(ValidationError::PromptTooLong);
    }
    Ok(())
}
