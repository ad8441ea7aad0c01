use std::{io, path::PathBuf};

use thiserror::Error;

/// The vocabulary artifact could not be turned into a store.
///
/// Fatal at startup: a process that fails to load must not serve queries.
#[derive(Debug, Error)]
pub enum LoadError {
  #[error("failed to open model file {}: {source}", path.display())]
  Open {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to read model data: {0}")]
  Read(#[from] io::Error),

  #[error("invalid model header {0:?}: expected \"<count> <dimension>\"")]
  InvalidHeader(String),

  #[error("model truncated: header declares {expected} entries, found {found}")]
  Truncated { expected: usize, found: usize },

  #[error("entry {entry} ({word:?}) has {found} components, expected {expected}")]
  DimensionMismatch {
    entry: usize,
    word: String,
    expected: usize,
    found: usize,
  },

  #[error("entry {entry} ({word:?}) has an empty vector")]
  EmptyVector { entry: usize, word: String },

  #[error("entry {entry} is not valid UTF-8")]
  InvalidWord { entry: usize },

  #[error("entry {entry} ({word:?}) has an unparsable component {token:?}")]
  InvalidComponent {
    entry: usize,
    word: String,
    token: String,
  },

  #[error("entry {entry} ({word:?}) contains a non-finite component")]
  NonFinite { entry: usize, word: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LookupError {
  #[error("word not in vocabulary: {0:?}")]
  UnknownWord(String),

  #[error("query vector has {actual} components, store dimension is {expected}")]
  DimensionMismatch { expected: usize, actual: usize },
}
