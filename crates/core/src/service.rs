use std::sync::Arc;

use crate::{
  AnalogyResolver, AnalogyResult, NotFoundReason, UncheckedRequest, ValidationError,
  store::VectorStore,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
  Found(String),
  /// Well-formed request, no qualifying word.
  NoResult(NotFoundReason),
  /// The request never reached the resolver.
  Invalid(ValidationError),
}

/// Entry point for the request boundary: validate, then resolve.
#[derive(Debug, Clone)]
pub struct QueryService {
  resolver: AnalogyResolver,
}

impl QueryService {
  #[must_use]
  pub const fn new(store: Arc<VectorStore>) -> Self {
    Self {
      resolver: AnalogyResolver::new(store),
    }
  }

  #[must_use]
  pub fn store(&self) -> &VectorStore {
    self.resolver.store()
  }

  #[must_use]
  pub fn handle(&self, request: UncheckedRequest) -> QueryOutcome {
    let request = match request.validate() {
      Ok(request) => request,
      Err(err) => {
        tracing::debug!(fields = ?err.fields(), "Rejected invalid request");
        return QueryOutcome::Invalid(err);
      }
    };

    match self.resolver.resolve(&request) {
      AnalogyResult::Found(word) => QueryOutcome::Found(word),
      AnalogyResult::NotFound(reason) => QueryOutcome::NoResult(reason),
    }
  }
}
