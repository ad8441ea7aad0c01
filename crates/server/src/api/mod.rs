use axum::{
  Json, Router,
  routing::{get, post},
};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::utils::AppState;

mod select_word;

pub use select_word::{InvalidRequestResponse, SelectWord, SelectWordResponse, unchecked_request};

#[derive(OpenApi)]
#[openapi(
  info(
    title = "Analogist API",
    version = "0.0.1",
    description = "Word analogies over pretrained word2vec embeddings"
  ),
  paths(select_word::select_word),
  components(schemas(SelectWord, SelectWordResponse, InvalidRequestResponse))
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
  Json(ApiDoc::openapi())
}

pub fn app() -> Router<AppState> {
  Router::new()
    .route("/select-word", post(select_word::select_word))
    .route("/openapi.json", get(openapi_json))
    .merge(Scalar::with_url("/openapi/", ApiDoc::openapi()))
}
