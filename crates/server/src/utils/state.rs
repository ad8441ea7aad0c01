use std::sync::Arc;

use analogist_core::QueryService;

#[derive(Clone)]
pub struct AppState {
  pub service: Arc<QueryService>,
}

impl AppState {
  #[must_use]
  pub const fn new(service: Arc<QueryService>) -> Self {
    Self { service }
  }
}
