use serde_json::Value;
use thiserror::Error;

pub const MAX_INPUT_LEN: usize = 100;

/// Client-caused rejection. `Display` is the exact message sent back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Input is required and must be a string")]
    MissingOrWrongType,
    #[error("Input cannot be empty")]
    Empty,
    #[error("Input is too long (max 100 characters)")]
    TooLong,
}

/// Trimmed user text, 1..=100 characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedInput(String);

impl ValidatedInput {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Pull `input` out of a parsed request body and validate it.
///
/// An empty string is reported as missing rather than empty. Length is
/// counted in UTF-16 units so it agrees with the browser-side check.
pub fn validate_input(body: &Value) -> Result<ValidatedInput, ValidationError> {
    let raw = match body.get("input") {
        Some(Value::String(s)) if !s.is_empty() => s,
        _ => return Err(ValidationError::MissingOrWrongType),
    };

    let trimmed = trim_js_whitespace(raw);
    if trimmed.is_empty() {
        return Err(ValidationError::Empty);
    }

    if trimmed.encode_utf16().count() > MAX_INPUT_LEN {
        return Err(ValidationError::TooLong);
    }

    Ok(ValidatedInput(trimmed.to_string()))
}

/// `String.prototype.trim` semantics: Unicode whitespace plus BOM, but not NEL.
fn trim_js_whitespace(s: &str) -> &str {
    s.trim_matches(|c: char| (c.is_whitespace() && c != '\u{85}') || c == '\u{feff}')
}
