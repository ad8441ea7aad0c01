mod error;
pub use error::{LoadError, LookupError};

pub mod store;
pub use store::{
  DEFAULT_NEIGHBORS, LoadOptions, MAX_DIMENSION, ModelFormat, Neighbor, VectorStore,
};

mod request;
pub use request::{
  AnalogyRequest, Field, FieldViolation, MAX_WORD_LENGTH, Sign, UncheckedRequest, ValidationError,
  ViolationKind,
};

mod analogy;
pub use analogy::{AnalogyResolver, AnalogyResult, NotFoundReason, is_trivial_match};

mod service;
pub use service::{QueryOutcome, QueryService};
