use opentelemetry_semantic_conventions::{attribute::OTEL_STATUS_CODE, trace::ERROR_TYPE};
use rocket::http::Status;
use thiserror::Error;
use tracing::{Span, error, warn};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Competition not found")]
    CompetitionNotFound,

    #[error("Registrations are closed for this competition")]
    RegistrationsClosed,

    #[error("Already registered with this class index")]
    DuplicateRoll,

    #[error("Email already used for this competition")]
    DuplicateEmail,

    #[error("Registration cap reached")]
    CapacityReached,

    #[error("No registration found for this index number")]
    RegistrationNotFound,

    #[error("Multiple registrations share this index number; grade and class are required")]
    RegistrationAmbiguous,

    #[error("Submission link must be a Google Drive or Docs URL")]
    InvalidDriveUrl,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Machine-readable code surfaced in API error bodies; the frontend maps
    /// these to display text.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Database(_) => "DB_ERROR",
            AppError::CompetitionNotFound => "COMP_NOT_FOUND",
            AppError::RegistrationsClosed => "REGISTRATIONS_CLOSED",
            AppError::DuplicateRoll => "DUPLICATE_ROLL",
            AppError::DuplicateEmail => "DUPLICATE_EMAIL",
            AppError::CapacityReached => "CAP_REACHED",
            AppError::RegistrationNotFound => "REG_NOT_FOUND",
            AppError::RegistrationAmbiguous => "REG_AMBIGUOUS",
            AppError::InvalidDriveUrl => "INVALID_DRIVE_URL",
            AppError::Internal(_) => "INTERNAL",
        }
    }

    pub fn log_and_record(&self, ctx: &str) {
        let current_span = Span::current();
        let is_valid_span = !current_span.is_none();

        let message = self.to_string();
        let error_kind = match self {
            AppError::Database(err) => {
                error!(error = %message, context = %ctx, db_error = %err, "Database error");
                "database_error"
            }
            AppError::CompetitionNotFound | AppError::RegistrationNotFound => {
                warn!(message = %message, context = %ctx, "Not found");
                "not_found_error"
            }
            AppError::RegistrationsClosed => {
                warn!(message = %message, context = %ctx, "Registrations closed");
                "closed_error"
            }
            AppError::DuplicateRoll | AppError::DuplicateEmail | AppError::CapacityReached => {
                warn!(message = %message, context = %ctx, "Registration conflict");
                "conflict_error"
            }
            AppError::RegistrationAmbiguous => {
                warn!(message = %message, context = %ctx, "Ambiguous registration lookup");
                "ambiguous_error"
            }
            AppError::InvalidDriveUrl => {
                warn!(message = %message, context = %ctx, "Validation error");
                "validation_error"
            }
            AppError::Internal(msg) => {
                error!(message = %msg, context = %ctx, "Internal server error");
                "internal_error"
            }
        };

        if is_valid_span {
            current_span.record("error", tracing::field::display(true));
            current_span.record(ERROR_TYPE, tracing::field::display(error_kind));
            current_span.record("error.message", tracing::field::display(&message));

            match self {
                AppError::Database(_) | AppError::Internal(_) => {
                    current_span.record(OTEL_STATUS_CODE, tracing::field::display("ERROR"));
                }
                _ => {}
            }
        }
    }

    pub fn status_code(&self) -> Status {
        match self {
            AppError::Database(_) => Status::InternalServerError,
            AppError::CompetitionNotFound => Status::NotFound,
            AppError::RegistrationsClosed => Status::Forbidden,
            AppError::DuplicateRoll => Status::Conflict,
            AppError::DuplicateEmail => Status::Conflict,
            AppError::CapacityReached => Status::Conflict,
            AppError::RegistrationNotFound => Status::NotFound,
            AppError::RegistrationAmbiguous => Status::Conflict,
            AppError::InvalidDriveUrl => Status::BadRequest,
            AppError::Internal(_) => Status::InternalServerError,
        }
    }

}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(error: sqlx::migrate::MigrateError) -> Self {
        AppError::Internal(format!("Migration error: {}", error))
    }
}
