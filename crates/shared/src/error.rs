use std::{backtrace::BacktraceStatus, fmt::Display};

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;

#[derive(Debug)]
pub struct AppError {
  err: anyhow::Error,
  status_code: StatusCode,
}

impl AppError {
  /// Create with 500 status
  pub fn new<E: Into<anyhow::Error>>(err: E) -> Self {
    Self {
      err: err.into(),
      status_code: StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  /// Create with custom status
  pub fn with_status<E: Into<anyhow::Error>>(status: StatusCode, err: E) -> Self {
    Self {
      err: err.into(),
      status_code: status,
    }
  }

  #[must_use]
  pub const fn status_code(&self) -> StatusCode {
    self.status_code
  }

  fn message(&self) -> String {
    if !cfg!(debug_assertions) {
      return self.err.to_string();
    }

    let bt = self.err.backtrace();
    if bt.status() == BacktraceStatus::Captured {
      format!("{}\nBacktrace:\n{}", self.err, bt)
    } else {
      format!(
        "{}\n(hint: set RUST_BACKTRACE=1 to enable backtrace)",
        self.err
      )
    }
  }
}

impl IntoResponse for AppError {
  fn into_response(self) -> Response {
    if self.status_code.is_server_error() {
      tracing::error!(status = %self.status_code, error = %self.err, "request failed");
    }
    let body = json!({ "error": self.message() });
    (self.status_code, Json(body)).into_response()
  }
}

impl Display for AppError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "[{}] {}", self.status_code, self.err)
  }
}

impl<E> From<E> for AppError
where
  E: Into<anyhow::Error>,
{
  fn from(err: E) -> Self {
    Self::new(err)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults_to_internal_server_error() {
    let err = AppError::new(anyhow::anyhow!("boom"));
    assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(err.to_string().contains("boom"));
  }

  #[test]
  fn keeps_custom_status() {
    let err = AppError::with_status(StatusCode::SERVICE_UNAVAILABLE, anyhow::anyhow!("loading"));
    assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(
      err.into_response().status(),
      StatusCode::SERVICE_UNAVAILABLE
    );
  }

  #[test]
  fn converts_from_std_errors() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
    let err: AppError = io.into();
    assert!(err.to_string().contains("missing"));
  }
}
