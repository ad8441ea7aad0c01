use std::sync::Arc;

use analogist_core::{Field, NotFoundReason, QueryOutcome, UncheckedRequest, ValidationError};
use analogist_shared::AppError;
use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Map, Value};
use utoipa::ToSchema;

use crate::utils::AppState;

const NO_WORD_FOUND: &str = "No word found";
const INVALID_DATA: &str = "Invalid Data";

/// Analogy query: `word1 sign1 word2 sign2 word3`.
///
/// The handler accepts any JSON object so that every malformed field can be
/// reported in one response.
#[derive(ToSchema)]
pub struct SelectWord {
  /// Base word, 1-100 characters
  pub word1: String,
  /// -1 or 1, applied to `word2`
  pub sign1: i64,
  /// 1-100 characters
  pub word2: String,
  /// -1 or 1, applied to `word3`
  pub sign2: i64,
  /// 1-100 characters
  pub word3: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SelectWordResponse {
  /// Null when no qualifying word exists
  pub predicted_word: Option<String>,
  /// `unknown_word`, `degenerate_vector` or `no_candidate`
  #[serde(skip_serializing_if = "Option::is_none")]
  pub reason: Option<String>,
  /// Input word responsible for `unknown_word` / `degenerate_vector`
  #[serde(skip_serializing_if = "Option::is_none")]
  pub word: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub message: Option<String>,
}

impl SelectWordResponse {
  fn found(word: String) -> Self {
    Self {
      predicted_word: Some(word),
      reason: None,
      word: None,
      message: None,
    }
  }

  fn no_result(reason: &NotFoundReason) -> Self {
    let word = match reason {
      NotFoundReason::UnknownWord(word) | NotFoundReason::DegenerateVector(word) => {
        Some(word.clone())
      }
      NotFoundReason::Exhausted => None,
    };
    Self {
      predicted_word: None,
      reason: Some(reason.code().to_owned()),
      word,
      message: Some(NO_WORD_FOUND.to_owned()),
    }
  }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct InvalidRequestResponse {
  pub error: String,
  /// One message per violated field
  pub details: Vec<String>,
}

impl From<&ValidationError> for InvalidRequestResponse {
  fn from(err: &ValidationError) -> Self {
    Self {
      error: INVALID_DATA.to_owned(),
      details: err.messages(),
    }
  }
}

/// Map a JSON body onto unchecked request fields; type errors become `WrongType`.
pub fn unchecked_request(body: &Value) -> Result<UncheckedRequest, ValidationError> {
  let Value::Object(body) = body else {
    return Err(ValidationError::NotAnObject);
  };

  Ok(UncheckedRequest {
    word1: word_field(body, "word1"),
    sign1: sign_field(body, "sign1"),
    word2: word_field(body, "word2"),
    sign2: sign_field(body, "sign2"),
    word3: word_field(body, "word3"),
  })
}

fn word_field(body: &Map<String, Value>, key: &str) -> Field<String> {
  match body.get(key) {
    None => Field::Missing,
    Some(Value::String(word)) => Field::Value(word.clone()),
    Some(_) => Field::WrongType,
  }
}

fn sign_field(body: &Map<String, Value>, key: &str) -> Field<i64> {
  match body.get(key) {
    None => Field::Missing,
    Some(Value::Number(number)) => match number.as_i64() {
      Some(sign) => Field::Value(sign),
      // Past `i64::MAX` it is still an integer, just never a valid sign.
      None if number.is_u64() => Field::Value(i64::MAX),
      None => Field::WrongType,
    },
    Some(_) => Field::WrongType,
  }
}

fn invalid(err: &ValidationError) -> Response {
  (
    StatusCode::BAD_REQUEST,
    Json(InvalidRequestResponse::from(err)),
  )
    .into_response()
}

/// Predict the word completing an analogy
#[utoipa::path(
  post,
  path = "/select-word",
  request_body = SelectWord,
  responses(
    (status = 200, description = "Predicted word, or null with a reason", body = SelectWordResponse),
    (status = 400, description = "Invalid request, every violation listed", body = InvalidRequestResponse)
  )
)]
#[axum::debug_handler]
pub async fn select_word(
  State(state): State<AppState>,
  Json(payload): Json<Value>,
) -> Result<Response, AppError> {
  let request = match unchecked_request(&payload) {
    Ok(request) => request,
    Err(err) => return Ok(invalid(&err)),
  };

  // Nearest-neighbor search is a CPU-bound scan over the whole vocabulary.
  let service = Arc::clone(&state.service);
  let outcome = tokio::task::spawn_blocking(move || service.handle(request)).await?;

  let response = match outcome {
    QueryOutcome::Found(word) => {
      (StatusCode::OK, Json(SelectWordResponse::found(word))).into_response()
    }
    QueryOutcome::NoResult(reason) => (
      StatusCode::OK,
      Json(SelectWordResponse::no_result(&reason)),
    )
      .into_response(),
    QueryOutcome::Invalid(err) => invalid(&err),
  };

  Ok(response)
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn maps_json_types_onto_fields() {
    let request = unchecked_request(&json!({
      "word1": "king",
      "sign1": -1,
      "word2": 7,
      "sign2": "1",
    }))
    .unwrap();

    assert_eq!(request.word1, Field::Value("king".to_owned()));
    assert_eq!(request.sign1, Field::Value(-1));
    assert_eq!(request.word2, Field::WrongType);
    assert_eq!(request.sign2, Field::WrongType);
    assert_eq!(request.word3, Field::Missing);
  }

  #[test]
  fn floats_booleans_and_null_are_not_signs() {
    for value in [json!(1.0), json!(true), Value::Null] {
      let request = unchecked_request(&json!({ "sign1": value })).unwrap();
      assert_eq!(request.sign1, Field::WrongType);
    }
  }

  #[test]
  fn integers_past_i64_are_out_of_range_signs() {
    let request = unchecked_request(&json!({
      "word1": "king",
      "sign1": u64::MAX,
      "word2": "man",
      "sign2": 1,
      "word3": "woman",
    }))
    .unwrap();
    assert_eq!(request.sign1, Field::Value(i64::MAX));
    assert_eq!(
      request.validate().unwrap_err().messages(),
      ["sign1 must be one of [-1, 1]."]
    );
  }

  #[test]
  fn non_object_body_is_malformed() {
    let err = unchecked_request(&json!(["king", -1, "man", 1, "woman"])).unwrap_err();
    assert_eq!(err, ValidationError::NotAnObject);
  }

  #[test]
  fn no_result_response_carries_reason() {
    let body = serde_json::to_value(SelectWordResponse::no_result(&NotFoundReason::UnknownWord(
      "xyzzy".to_owned(),
    )))
    .unwrap();
    assert_eq!(
      body,
      json!({
        "predicted_word": null,
        "reason": "unknown_word",
        "word": "xyzzy",
        "message": "No word found",
      })
    );

    let body = serde_json::to_value(SelectWordResponse::no_result(&NotFoundReason::Exhausted)).unwrap();
    assert_eq!(body["reason"], "no_candidate");
    assert!(body.get("word").is_none());
  }
}
