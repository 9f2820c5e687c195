use crate::config::ConfigError;
use crate::register::{NotificationError, OwnerServiceError, RepositoryError};
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Storage(RepositoryError),
    Owner(OwnerServiceError),
    Notification(NotificationError),
    UnknownPropertyType(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Storage(err) => write!(f, "storage error: {}", err),
            AppError::Owner(err) => write!(f, "owner error: {}", err),
            AppError::Notification(err) => write!(f, "notification error: {}", err),
            AppError::UnknownPropertyType(raw) => write!(f, "unknown property type '{}'", raw),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Storage(err) => Some(err),
            AppError::Owner(err) => Some(err),
            AppError::Notification(err) => Some(err),
            AppError::UnknownPropertyType(_) => None,
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Storage(RepositoryError::NoSuchOwner(_))
            | AppError::Owner(OwnerServiceError::Repository(RepositoryError::NoSuchOwner(_)))
            | AppError::Owner(OwnerServiceError::UpdateFailed(_))
            | AppError::Notification(NotificationError::NoSuchOwner(_))
            | AppError::UnknownPropertyType(_) => StatusCode::NOT_FOUND,
            AppError::Owner(OwnerServiceError::Validation(_))
            | AppError::Owner(OwnerServiceError::Rate(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Notification(NotificationError::NoTaxDebt(_))
            | AppError::Notification(NotificationError::NoDebtorsInList) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<RepositoryError> for AppError {
    fn from(value: RepositoryError) -> Self {
        Self::Storage(value)
    }
}

impl From<OwnerServiceError> for AppError {
    fn from(value: OwnerServiceError) -> Self {
        Self::Owner(value)
    }
}

impl From<NotificationError> for AppError {
    fn from(value: NotificationError) -> Self {
        Self::Notification(value)
    }
}
