//! JSON body handling with validation.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use validator::{Validate, ValidationErrors};

use starry_core::error::AppError;

use crate::dto::request::NOT_FOUND_CODE;
use crate::error::ApiError;

/// Unwraps a JSON body extracted as `Result<Json<T>, JsonRejection>` and
/// runs its `validator` rules. Malformed bodies, missing fields and rule
/// violations become validation errors (400), except rules tagged with
/// [`NOT_FOUND_CODE`], which answer 404.
pub fn validated<T: Validate>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    let Json(body) = payload?;
    body.validate().map_err(rule_violation)?;
    Ok(body)
}

fn rule_violation(errors: ValidationErrors) -> AppError {
    let not_found = errors
        .field_errors()
        .values()
        .flat_map(|errs| errs.iter())
        .find(|err| err.code == NOT_FOUND_CODE)
        .map(|err| err.message.as_deref().unwrap_or("Not found").to_string());

    match not_found {
        Some(message) => AppError::not_found(message),
        None => AppError::validation(errors.to_string()),
    }
}
