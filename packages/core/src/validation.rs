// ABOUTME: Request field validation helpers
// ABOUTME: Missing identifiers and blank fields are reported, never retried

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    Missing(&'static str),
    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Return the trimmed value of a required text field.
pub fn require_text<'a>(
    field: &'static str,
    value: Option<&'a str>,
) -> Result<&'a str, ValidationError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ValidationError::Missing(field)),
    }
}

/// Return the list when present and non-empty.
pub fn require_non_empty<'a, T>(
    field: &'static str,
    values: Option<&'a [T]>,
) -> Result<&'a [T], ValidationError> {
    match values {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ValidationError::Missing(field)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_text_trims() {
        assert_eq!(require_text("name", Some("  tab  ")), Ok("tab"));
    }

    #[test]
    fn require_text_rejects_blank_and_absent() {
        assert_eq!(
            require_text("name", Some("   ")),
            Err(ValidationError::Missing("name"))
        );
        assert_eq!(
            require_text("name", None),
            Err(ValidationError::Missing("name"))
        );
    }

    #[test]
    fn require_non_empty_lists() {
        let ids = vec!["a".to_string()];
        assert!(require_non_empty("ids", Some(ids.as_slice())).is_ok());

        let empty: Vec<String> = Vec::new();
        assert_eq!(
            require_non_empty("ids", Some(empty.as_slice())),
            Err(ValidationError::Missing("ids"))
        );
        assert_eq!(
            require_non_empty::<String>("ids", None),
            Err(ValidationError::Missing("ids"))
        );
    }
}
