use std::{
  fs::File,
  io::{BufRead, BufReader, ErrorKind},
  path::Path,
  time::Instant,
};

use super::{StoreBuilder, VectorStore};
use crate::LoadError;

/// Rows to reserve up front; larger models grow past this normally.
const PREALLOCATE_ROWS: usize = 1 << 22;

/// Largest vector width a header may declare.
pub const MAX_DIMENSION: usize = 1 << 16;

const READ_BUFFER_BYTES: usize = 1 << 20;

/// On-disk layout of a word2vec model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ModelFormat {
  /// `word<space>` followed by `dimension` little-endian `f32`s per entry.
  #[default]
  Binary,
  /// One `word v1 v2 ... vN` line per entry.
  Text,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LoadOptions {
  pub format: ModelFormat,
  /// Read at most this many entries.
  pub limit: Option<usize>,
}

impl VectorStore {
  /// Load a word2vec model from disk.
  ///
  /// Blocking and potentially slow for multi-gigabyte models; run it before
  /// accepting queries.
  pub fn load(path: impl AsRef<Path>, options: LoadOptions) -> Result<Self, LoadError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| LoadError::Open {
      path: path.to_owned(),
      source,
    })?;

    tracing::info!(
      path = %path.display(),
      format = ?options.format,
      limit = ?options.limit,
      "Loading word vectors"
    );
    let started = Instant::now();

    let store = Self::from_reader(BufReader::with_capacity(READ_BUFFER_BYTES, file), options)?;

    tracing::info!(
      words = store.len(),
      dimension = store.dimension(),
      elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
      "Word vectors loaded"
    );

    Ok(store)
  }

  /// Parse a word2vec model from any buffered reader.
  pub fn from_reader<R: BufRead>(mut reader: R, options: LoadOptions) -> Result<Self, LoadError> {
    let (count, dimension) = read_header(&mut reader)?;
    let wanted = options.limit.map_or(count, |limit| limit.min(count));

    let mut builder = StoreBuilder::new(dimension, wanted.min(PREALLOCATE_ROWS));
    match options.format {
      ModelFormat::Binary => read_binary(&mut reader, &mut builder, wanted, count)?,
      ModelFormat::Text => read_text(&mut reader, &mut builder, wanted, count)?,
    }

    Ok(builder.finish())
  }
}

/// `"<count> <dimension>"` on the first line.
fn read_header<R: BufRead>(reader: &mut R) -> Result<(usize, usize), LoadError> {
  let mut line = String::new();
  reader.read_line(&mut line)?;

  let invalid = || LoadError::InvalidHeader(line.trim_end().to_owned());
  let mut parts = line.split_whitespace();
  let count = parts.next().and_then(|p| p.parse::<usize>().ok());
  let dimension = parts.next().and_then(|p| p.parse::<usize>().ok());

  match (count, dimension, parts.next()) {
    (Some(count), Some(dimension), None) if (1..=MAX_DIMENSION).contains(&dimension) => {
      Ok((count, dimension))
    }
    _ => Err(invalid()),
  }
}

fn read_binary<R: BufRead>(
  reader: &mut R,
  builder: &mut StoreBuilder,
  wanted: usize,
  declared: usize,
) -> Result<(), LoadError> {
  let dimension = builder.dimension();
  let mut raw = vec![0_u8; dimension * size_of::<f32>()];
  let mut vector = vec![0.0_f32; dimension];

  for entry in 0..wanted {
    let truncated = || LoadError::Truncated {
      expected: declared,
      found: entry,
    };

    let mut word = Vec::new();
    reader.read_until(b' ', &mut word)?;
    if word.pop() != Some(b' ') {
      return Err(truncated());
    }
    // Vectors may be followed by '\n', which then leads the next word.
    let start = word.iter().position(|&b| b != b'\n').unwrap_or(word.len());
    word.drain(..start);
    let word = String::from_utf8(word).map_err(|_| LoadError::InvalidWord { entry })?;

    reader.read_exact(&mut raw).map_err(|err| match err.kind() {
      ErrorKind::UnexpectedEof => truncated(),
      _ => LoadError::Read(err),
    })?;
    for (value, bytes) in vector.iter_mut().zip(raw.chunks_exact(size_of::<f32>())) {
      *value = f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    }

    if vector.iter().any(|x| !x.is_finite()) {
      return Err(LoadError::NonFinite { entry, word });
    }
    builder.push(word, &vector);
  }

  Ok(())
}

fn read_text<R: BufRead>(
  reader: &mut R,
  builder: &mut StoreBuilder,
  wanted: usize,
  declared: usize,
) -> Result<(), LoadError> {
  let dimension = builder.dimension();
  let mut line = String::new();
  let mut vector = Vec::with_capacity(dimension);

  for entry in 0..wanted {
    line.clear();
    let read = reader.read_line(&mut line).map_err(|err| match err.kind() {
      ErrorKind::InvalidData => LoadError::InvalidWord { entry },
      _ => LoadError::Read(err),
    })?;
    if read == 0 {
      return Err(LoadError::Truncated {
        expected: declared,
        found: entry,
      });
    }

    let mut tokens = line.split_whitespace();
    let word = tokens.next().unwrap_or_default();

    vector.clear();
    for token in tokens {
      let value = token
        .parse::<f32>()
        .map_err(|_| LoadError::InvalidComponent {
          entry,
          word: word.to_owned(),
          token: token.to_owned(),
        })?;
      vector.push(value);
    }

    if word.is_empty() || vector.len() != dimension {
      return Err(LoadError::DimensionMismatch {
        entry,
        word: word.to_owned(),
        expected: dimension,
        found: vector.len(),
      });
    }
    if vector.iter().any(|x| !x.is_finite()) {
      return Err(LoadError::NonFinite {
        entry,
        word: word.to_owned(),
      });
    }
    builder.push(word.to_owned(), &vector);
  }

  Ok(())
}
