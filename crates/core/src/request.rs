use std::fmt::{self, Display};

use thiserror::Error;

/// Longest accepted word, counted in characters.
pub const MAX_WORD_LENGTH: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sign {
  Negative,
  Positive,
}

impl Sign {
  pub(crate) const fn factor(self) -> f32 {
    match self {
      Self::Negative => -1.0,
      Self::Positive => 1.0,
    }
  }
}

impl TryFrom<i64> for Sign {
  type Error = i64;

  fn try_from(value: i64) -> Result<Self, Self::Error> {
    match value {
      -1 => Ok(Self::Negative),
      1 => Ok(Self::Positive),
      other => Err(other),
    }
  }
}

impl Display for Sign {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::Negative => "-",
      Self::Positive => "+",
    })
  }
}

/// A validated query: `word1 sign1 word2 sign2 word3`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalogyRequest {
  pub word1: String,
  pub sign1: Sign,
  pub word2: String,
  pub sign2: Sign,
  pub word3: String,
}

impl AnalogyRequest {
  #[must_use]
  pub fn words(&self) -> [&str; 3] {
    [&self.word1, &self.word2, &self.word3]
  }
}

impl Display for AnalogyRequest {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "{} {} {} {} {}",
      self.word1, self.sign1, self.word2, self.sign2, self.word3
    )
  }
}

// ──────────────────────────────────────────────────
// Unchecked input
// ──────────────────────────────────────────────────

/// One field of a request as the boundary found it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Field<T> {
  #[default]
  Missing,
  /// Present but of the wrong type.
  WrongType,
  Value(T),
}

impl<T> From<T> for Field<T> {
  fn from(value: T) -> Self {
    Self::Value(value)
  }
}

impl From<&str> for Field<String> {
  fn from(value: &str) -> Self {
    Self::Value(value.to_owned())
  }
}

/// Request fields before validation, independent of any wire format.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UncheckedRequest {
  pub word1: Field<String>,
  pub sign1: Field<i64>,
  pub word2: Field<String>,
  pub sign2: Field<i64>,
  pub word3: Field<String>,
}

impl UncheckedRequest {
  pub fn new(
    word1: impl Into<Field<String>>,
    sign1: impl Into<Field<i64>>,
    word2: impl Into<Field<String>>,
    sign2: impl Into<Field<i64>>,
    word3: impl Into<Field<String>>,
  ) -> Self {
    Self {
      word1: word1.into(),
      sign1: sign1.into(),
      word2: word2.into(),
      sign2: sign2.into(),
      word3: word3.into(),
    }
  }

  /// Check every field and report all violations at once.
  pub fn validate(self) -> Result<AnalogyRequest, ValidationError> {
    let mut violations = Vec::new();

    let word1 = check_word("word1", self.word1, &mut violations);
    let sign1 = check_sign("sign1", self.sign1, &mut violations);
    let word2 = check_word("word2", self.word2, &mut violations);
    let sign2 = check_sign("sign2", self.sign2, &mut violations);
    let word3 = check_word("word3", self.word3, &mut violations);

    match (word1, sign1, word2, sign2, word3) {
      (Some(word1), Some(sign1), Some(word2), Some(sign2), Some(word3)) => Ok(AnalogyRequest {
        word1,
        sign1,
        word2,
        sign2,
        word3,
      }),
      _ => Err(ValidationError::Fields(violations)),
    }
  }
}

fn check_word(
  field: &'static str,
  value: Field<String>,
  violations: &mut Vec<FieldViolation>,
) -> Option<String> {
  let kind = match value {
    Field::Missing => ViolationKind::Missing,
    Field::WrongType => ViolationKind::NotAString,
    Field::Value(word) if word.is_empty() => ViolationKind::Empty,
    Field::Value(word) if word.chars().count() > MAX_WORD_LENGTH => ViolationKind::TooLong,
    Field::Value(word) => return Some(word),
  };
  violations.push(FieldViolation { field, kind });
  None
}

fn check_sign(
  field: &'static str,
  value: Field<i64>,
  violations: &mut Vec<FieldViolation>,
) -> Option<Sign> {
  let kind = match value {
    Field::Missing => ViolationKind::Missing,
    Field::WrongType => ViolationKind::NotAnInteger,
    Field::Value(sign) => match Sign::try_from(sign) {
      Ok(sign) => return Some(sign),
      Err(_) => ViolationKind::NotASign,
    },
  };
  violations.push(FieldViolation { field, kind });
  None
}

// ──────────────────────────────────────────────────
// Violations
// ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
  Missing,
  NotAString,
  NotAnInteger,
  Empty,
  TooLong,
  NotASign,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
  pub field: &'static str,
  pub kind: ViolationKind,
}

impl Display for FieldViolation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let field = self.field;
    match self.kind {
      ViolationKind::Missing => write!(f, "{field} is missing."),
      ViolationKind::NotAString => write!(f, "{field} must be a string."),
      ViolationKind::NotAnInteger => write!(f, "{field} must be an integer."),
      ViolationKind::Empty => write!(f, "{field} cannot be empty."),
      ViolationKind::TooLong => {
        write!(f, "{field} cannot be longer than {MAX_WORD_LENGTH} characters.")
      }
      ViolationKind::NotASign => write!(f, "{field} must be one of [-1, 1]."),
    }
  }
}

/// Why a request was rejected before reaching the resolver.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
  /// Every violated field, in field order.
  #[error("invalid request: {}", join_messages(.0))]
  Fields(Vec<FieldViolation>),
  /// The request is not a record of fields at all.
  #[error("request body must be a JSON object.")]
  NotAnObject,
}

impl ValidationError {
  /// Field violations; empty when the body itself is the problem.
  #[must_use]
  pub fn violations(&self) -> &[FieldViolation] {
    match self {
      Self::Fields(violations) => violations.as_slice(),
      Self::NotAnObject => &[],
    }
  }

  #[must_use]
  pub fn fields(&self) -> Vec<&'static str> {
    self.violations().iter().map(|v| v.field).collect()
  }

  /// One human-readable message per problem.
  #[must_use]
  pub fn messages(&self) -> Vec<String> {
    match self {
      Self::Fields(violations) => violations.iter().map(ToString::to_string).collect(),
      Self::NotAnObject => vec![self.to_string()],
    }
  }
}

fn join_messages(violations: &[FieldViolation]) -> String {
  violations
    .iter()
    .map(ToString::to_string)
    .collect::<Vec<_>>()
    .join(" ")
}

#[cfg(test)]
mod tests {
  use super::*;

  fn valid() -> UncheckedRequest {
    UncheckedRequest::new("king", -1_i64, "man", 1_i64, "woman")
  }

  #[test]
  fn accepts_well_formed_request() {
    let request = valid().validate().unwrap();
    assert_eq!(request.word1, "king");
    assert_eq!(request.sign1, Sign::Negative);
    assert_eq!(request.sign2, Sign::Positive);
    assert_eq!(request.words(), ["king", "man", "woman"]);
    assert_eq!(request.to_string(), "king - man + woman");
  }

  #[test]
  fn reports_every_violation_at_once() {
    let request = UncheckedRequest {
      word1: "a".repeat(MAX_WORD_LENGTH + 1).into(),
      sign1: 2_i64.into(),
      ..valid()
    };

    let err = request.validate().unwrap_err();
    assert_eq!(err.fields(), ["word1", "sign1"]);
    assert_eq!(
      err.messages(),
      [
        "word1 cannot be longer than 100 characters.",
        "sign1 must be one of [-1, 1].",
      ]
    );
  }

  #[test]
  fn reports_missing_and_wrong_types() {
    let request = UncheckedRequest {
      word1: Field::Missing,
      sign1: Field::WrongType,
      word2: Field::WrongType,
      sign2: Field::Missing,
      word3: "".into(),
    };

    let err = request.validate().unwrap_err();
    assert_eq!(
      err.messages(),
      [
        "word1 is missing.",
        "sign1 must be an integer.",
        "word2 must be a string.",
        "sign2 is missing.",
        "word3 cannot be empty.",
      ]
    );
  }

  #[test]
  fn word_length_counts_characters() {
    let at_limit = UncheckedRequest {
      word3: "é".repeat(MAX_WORD_LENGTH).into(),
      ..valid()
    };
    assert!(at_limit.validate().is_ok());
  }

  #[test]
  fn sign_accepts_only_unit_values() {
    for sign in [0_i64, 2, -2, i64::MAX] {
      let request = UncheckedRequest {
        sign2: sign.into(),
        ..valid()
      };
      assert_eq!(request.validate().unwrap_err().fields(), ["sign2"]);
    }
  }

  #[test]
  fn non_object_request_names_no_field() {
    let err = ValidationError::NotAnObject;
    assert!(err.violations().is_empty());
    assert!(err.fields().is_empty());
    assert_eq!(err.messages(), ["request body must be a JSON object."]);
    assert_eq!(err.to_string(), "request body must be a JSON object.");
  }

  #[test]
  fn field_errors_display_every_message() {
    let err = UncheckedRequest {
      sign1: 0_i64.into(),
      word3: Field::Missing,
      ..valid()
    }
    .validate()
    .unwrap_err();
    assert_eq!(
      err.to_string(),
      "invalid request: sign1 must be one of [-1, 1]. word3 is missing."
    );
  }
}
