//! Typed id parsing helpers for path segments and body fields.

use uuid::Uuid;

use starry_core::error::AppError;

/// Parses a UUID, naming the offending field on failure.
pub fn parse_uuid(s: &str, field: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(s.trim())
        .map_err(|_| AppError::validation(format!("Invalid UUID format in {field}.")))
}

/// Parses an optional UUID. Absent, null and empty values are `None`.
pub fn parse_optional_uuid(s: Option<&str>, field: &str) -> Result<Option<Uuid>, AppError> {
    match s.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_uuid(value, field).map(Some),
    }
}
