//! Validated JSON extractor - Combines deserialization with validation.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use crate::errors::AppError;

/// JSON body that has passed its `validator` rules.
///
/// Malformed bodies and rule violations both surface as `400 VALIDATION_ERROR`.
///
/// ```rust,ignore
/// async fn book(ValidatedJson(payload): ValidatedJson<CreateAppointment>) {
///     // payload.discount_cents is already known to be non-negative
/// }
/// ```
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| AppError::validation(e.body_text()))?;

        value.validate().map_err(|e| validation_error(&e))?;

        Ok(ValidatedJson(value))
    }
}

/// Collapse field errors into one message, sorted by field for stable output.
pub fn validation_error(errors: &ValidationErrors) -> AppError {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    let message = fields
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field))
            })
        })
        .collect::<Vec<_>>()
        .join(", ");

    AppError::validation(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CancelAppointment;

    #[test]
    fn test_validation_error_uses_field_messages() {
        let input = CancelAppointment {
            reason: Some("x".repeat(600)),
        };
        let errors = input.validate().unwrap_err();

        match validation_error(&errors) {
            AppError::Validation(message) => assert_eq!(message, "Reason is too long"),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
