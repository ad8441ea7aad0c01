use std::sync::Arc;

use analogist_shared::similarity::l2_norm;
use thiserror::Error;

use crate::{
  AnalogyRequest, LookupError,
  store::{DEFAULT_NEIGHBORS, VectorStore},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalogyResult {
  Found(String),
  NotFound(NotFoundReason),
}

/// Why a well-formed query produced no word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotFoundReason {
  /// An input word is not in the vocabulary.
  UnknownWord(String),
  /// An input word that is used as a divisor has a zero vector.
  DegenerateVector(String),
  /// Every neighbor was one of the inputs or contained one of them.
  Exhausted,
}

impl NotFoundReason {
  /// Stable machine-readable identifier.
  #[must_use]
  pub const fn code(&self) -> &'static str {
    match self {
      Self::UnknownWord(_) => "unknown_word",
      Self::DegenerateVector(_) => "degenerate_vector",
      Self::Exhausted => "no_candidate",
    }
  }
}

#[derive(Debug, Error)]
enum CombineError {
  #[error(transparent)]
  Lookup(#[from] LookupError),
  #[error("zero vector for {0:?}")]
  DegenerateVector(String),
}

/// Resolves "word1 ± word2 ± word3" against a shared store.
#[derive(Debug, Clone)]
pub struct AnalogyResolver {
  store: Arc<VectorStore>,
  neighbors: usize,
}

impl AnalogyResolver {
  #[must_use]
  pub const fn new(store: Arc<VectorStore>) -> Self {
    Self {
      store,
      neighbors: DEFAULT_NEIGHBORS,
    }
  }

  #[must_use]
  pub fn store(&self) -> &VectorStore {
    &self.store
  }

  /// Run one nearest-neighbor query and return the first neighbor that is not
  /// a trivial match for an input word.
  ///
  /// Unknown words and zero vectors are ordinary outcomes, not errors.
  #[must_use]
  pub fn resolve(&self, request: &AnalogyRequest) -> AnalogyResult {
    let combined = match self.combine(request) {
      Ok(combined) => combined,
      Err(CombineError::Lookup(LookupError::UnknownWord(word))) => {
        tracing::debug!(word = %word, "Word not in vocabulary");
        return AnalogyResult::NotFound(NotFoundReason::UnknownWord(word));
      }
      Err(CombineError::Lookup(err)) => {
        // Vectors come from the store itself, so their dimension always matches.
        tracing::warn!(error = %err, "Unexpected lookup failure");
        return AnalogyResult::NotFound(NotFoundReason::Exhausted);
      }
      Err(CombineError::DegenerateVector(word)) => {
        tracing::debug!(word = %word, "Zero vector, cannot rescale");
        return AnalogyResult::NotFound(NotFoundReason::DegenerateVector(word));
      }
    };

    let neighbors = match self.store.nearest_neighbors(&combined, self.neighbors) {
      Ok(neighbors) => neighbors,
      Err(err) => {
        tracing::warn!(error = %err, "Nearest-neighbor search failed");
        return AnalogyResult::NotFound(NotFoundReason::Exhausted);
      }
    };

    let inputs = request.words();
    let found = neighbors
      .into_iter()
      .find(|candidate| !is_trivial_match(candidate.word, &inputs));

    match found {
      Some(candidate) => {
        tracing::debug!(
          query = %request,
          result = candidate.word,
          similarity = candidate.similarity,
          "Analogy resolved"
        );
        AnalogyResult::Found(candidate.word.to_owned())
      }
      None => {
        tracing::debug!(
          query = %request,
          neighbors = self.neighbors,
          "Every neighbor matched an input word"
        );
        AnalogyResult::NotFound(NotFoundReason::Exhausted)
      }
    }
  }

  /// `vec1 + sign1 * (|vec1| / |vec2|) * vec2 + sign2 * (|vec1| / |vec3|) * vec3`
  fn combine(&self, request: &AnalogyRequest) -> Result<Vec<f32>, CombineError> {
    let vec1 = self.store.lookup(&request.word1)?;
    let vec2 = self.store.lookup(&request.word2)?;
    let vec3 = self.store.lookup(&request.word3)?;

    let n1 = l2_norm(vec1);
    let n2 = l2_norm(vec2);
    let n3 = l2_norm(vec3);

    if n2 == 0.0 {
      return Err(CombineError::DegenerateVector(request.word2.clone()));
    }
    if n3 == 0.0 {
      return Err(CombineError::DegenerateVector(request.word3.clone()));
    }

    let scale2 = request.sign1.factor() * n1 / n2;
    let scale3 = request.sign2.factor() * n1 / n3;

    Ok(
      vec1
        .iter()
        .zip(vec2)
        .zip(vec3)
        .map(|((&a, &b), &c)| scale3.mul_add(c, scale2.mul_add(b, a)))
        .collect(),
    )
  }
}

/// `candidate` is a substring of an input, or an input is a substring of it.
///
/// Case-sensitive on purpose: "King" is not a trivial match for "king".
#[must_use]
pub fn is_trivial_match(candidate: &str, inputs: &[&str]) -> bool {
  inputs
    .iter()
    .any(|input| input.contains(candidate) || candidate.contains(input))
}
