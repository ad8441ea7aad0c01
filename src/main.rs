use std::sync::Arc;

use analogist_core::{LoadOptions, ModelFormat, QueryService, VectorStore};
use analogist_server::server;
use analogist_shared::{APP_ENV, AppError};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), AppError> {
  dotenvy::dotenv().ok();

  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
          "{}=debug,analogist_core=debug,analogist_server=debug,analogist_shared=debug",
          env!("CARGO_CRATE_NAME")
        )
        .into()
      }),
    )
    .with(tracing_subscriber::fmt::layer())
    .with(tracing_error::ErrorLayer::default())
    .init();

  let options = LoadOptions {
    format: if APP_ENV.model_binary {
      ModelFormat::Binary
    } else {
      ModelFormat::Text
    },
    limit: APP_ENV.model_limit,
  };

  // The store must be complete before the listener binds; a load failure ends the process.
  let store =
    tokio::task::spawn_blocking(move || VectorStore::load(&APP_ENV.model_path, options)).await??;
  if store.is_empty() {
    tracing::warn!("Model has no words, every query will come back empty");
  }

  let service = Arc::new(QueryService::new(Arc::new(store)));
  server(service, &APP_ENV.listen_addr).await
}
