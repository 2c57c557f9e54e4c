use crate::error::AppError;
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use serde::Serialize;
use std::collections::HashMap;
use validator::Validate;

/// Single error body shape for every endpoint: `message` is what the
/// registration form shows verbatim, `code` is what the submission form
/// switches on, and `errors` carries field-level schema failures.
#[derive(Debug, Serialize, Clone)]
pub struct ErrorResponse {
    pub status: &'static str,
    pub code: String,
    pub message: String,
    pub errors: HashMap<String, Vec<String>>,
}

impl ErrorResponse {
    pub fn new(code: &str, message: &str) -> Self {
        Self {
            status: "error",
            code: code.to_string(),
            message: message.to_string(),
            errors: HashMap::new(),
        }
    }

    pub fn from_fields(errors: HashMap<String, Vec<String>>) -> Self {
        Self {
            status: "error",
            code: "VALIDATION".to_string(),
            message: "Validation failed".to_string(),
            errors,
        }
    }
}

pub trait ToErrorResponse {
    fn to_error_response(self) -> Custom<Json<ErrorResponse>>;
}

impl ToErrorResponse for AppError {
    fn to_error_response(self) -> Custom<Json<ErrorResponse>> {
        self.log_and_record("API error");
        let status = self.status_code();

        Custom(
            status,
            Json(ErrorResponse::new(self.code(), &self.to_string())),
        )
    }
}

impl ToErrorResponse for validator::ValidationErrors {
    fn to_error_response(self) -> Custom<Json<ErrorResponse>> {
        let mut error_map = HashMap::new();

        for (field, field_errors) in self.field_errors() {
            let error_messages: Vec<String> = field_errors
                .iter()
                .map(|error| {
                    error
                        .message
                        .clone()
                        .unwrap_or_else(|| "Invalid value".into())
                        .to_string()
                })
                .collect();

            error_map.insert(field.to_string(), error_messages);
        }

        Custom(
            Status::UnprocessableEntity,
            Json(ErrorResponse::from_fields(error_map)),
        )
    }
}

pub trait JsonValidateExt<T> {
    /// Runs the validator-derive checks and hands back the inner value,
    /// or the uniform 422 body.
    fn validate_custom(self) -> Result<T, Custom<Json<ErrorResponse>>>;
}

impl<T: Validate> JsonValidateExt<T> for Json<T> {
    fn validate_custom(self) -> Result<T, Custom<Json<ErrorResponse>>> {
        let inner = self.into_inner();
        match inner.validate() {
            Ok(()) => Ok(inner),
            Err(errors) => Err(errors.to_error_response()),
        }
    }
}

pub trait AppErrorExt<T> {
    fn validate_custom(self) -> Result<T, Custom<Json<ErrorResponse>>>;
}

impl<T> AppErrorExt<T> for Result<T, AppError> {
    fn validate_custom(self) -> Result<T, Custom<Json<ErrorResponse>>> {
        self.map_err(ToErrorResponse::to_error_response)
    }
}
