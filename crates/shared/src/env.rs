use std::env;
use std::path::PathBuf;
use std::sync::LazyLock;

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";

pub struct AppEnv {
  /// Path to the word2vec model file.
  pub model_path: PathBuf,
  /// `true` for the binary word2vec layout, `false` for the text layout.
  pub model_binary: bool,
  /// Read at most this many entries from the model.
  pub model_limit: Option<usize>,
  pub listen_addr: String,
}

impl AppEnv {
  fn new() -> Self {
    Self {
      model_path: env::var("MODEL_PATH")
        .expect("MODEL_PATH must be set")
        .into(),
      model_binary: env::var("MODEL_BINARY").map_or(true, |v| parse_bool(&v)),
      model_limit: env::var("MODEL_LIMIT").ok().map(|v| {
        v.parse()
          .expect("MODEL_LIMIT must be a non-negative integer")
      }),
      listen_addr: env::var("LISTEN_ADDR").unwrap_or_else(|_| DEFAULT_LISTEN_ADDR.to_owned()),
    }
  }
}

fn parse_bool(value: &str) -> bool {
  !matches!(
    value.trim().to_ascii_lowercase().as_str(),
    "0" | "false" | "no" | "off"
  )
}

pub static APP_ENV: LazyLock<AppEnv> = LazyLock::new(AppEnv::new);
