use std::sync::Arc;

use analogist_core::QueryService;
use analogist_shared::AppError;
use axum::{Router, response::Html, routing::get};
use tokio::net::TcpListener;

use crate::{
  api,
  utils::{AppState, shutdown_signal},
};

#[axum::debug_handler]
async fn handler() -> Html<&'static str> {
  Html("<h1>Analogist</h1>")
}

/// Full application router over an already loaded store.
pub fn router(service: Arc<QueryService>) -> Router {
  Router::new()
    .route("/", get(handler))
    .merge(api::app())
    .with_state(AppState::new(service))
}

pub async fn server(service: Arc<QueryService>, addr: &str) -> Result<(), AppError> {
  let words = service.store().len();
  let app = router(service);

  let listener = TcpListener::bind(addr).await?;

  tracing::info!(words, "server started at http://{addr}");

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;

  Ok(())
}
