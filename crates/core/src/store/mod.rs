mod word2vec;
pub use word2vec::{LoadOptions, MAX_DIMENSION, ModelFormat};

use std::{
  cmp::Ordering,
  collections::{HashMap, hash_map::Entry},
};

use analogist_shared::similarity::{dot, l2_norm};
use rayon::prelude::*;

use crate::{LoadError, LookupError};

/// Number of neighbors fetched when the caller has no reason to pick another.
pub const DEFAULT_NEIGHBORS: usize = 10;

// ──────────────────────────────────────────────────
// Domain model
// ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor<'a> {
  pub word: &'a str,
  /// Cosine similarity in [-1.0, 1.0].
  pub similarity: f32,
}

/// Immutable word → vector table.
///
/// Rows are kept in insertion order in one row-major matrix together with
/// their L2 norms, so a nearest-neighbor scan is a single pass over memory.
/// Built once, then shared read-only between any number of queries.
#[derive(Debug)]
pub struct VectorStore {
  words: Vec<String>,
  index: HashMap<String, usize>,
  dimension: usize,
  vectors: Vec<f32>,
  norms: Vec<f32>,
}

impl VectorStore {
  /// Build a store from in-memory entries.
  ///
  /// The first entry fixes the dimension. Later duplicates of a word are
  /// skipped, matching what the file loader does.
  pub fn from_entries<I, S>(entries: I) -> Result<Self, LoadError>
  where
    I: IntoIterator<Item = (S, Vec<f32>)>,
    S: Into<String>,
  {
    let mut builder: Option<StoreBuilder> = None;

    for (entry, (word, vector)) in entries.into_iter().enumerate() {
      let word: String = word.into();
      if vector.is_empty() {
        return Err(LoadError::EmptyVector { entry, word });
      }
      let rows = builder.get_or_insert_with(|| StoreBuilder::new(vector.len(), 0));
      if vector.len() != rows.dimension() {
        return Err(LoadError::DimensionMismatch {
          entry,
          word,
          expected: rows.dimension(),
          found: vector.len(),
        });
      }
      if vector.iter().any(|x| !x.is_finite()) {
        return Err(LoadError::NonFinite { entry, word });
      }
      rows.push(word, &vector);
    }

    Ok(builder.map_or_else(Self::empty, StoreBuilder::finish))
  }

  fn empty() -> Self {
    Self {
      words: Vec::new(),
      index: HashMap::new(),
      dimension: 0,
      vectors: Vec::new(),
      norms: Vec::new(),
    }
  }

  #[must_use]
  pub fn len(&self) -> usize {
    self.words.len()
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.words.is_empty()
  }

  /// Dimension shared by every vector (0 for an empty store).
  #[must_use]
  pub const fn dimension(&self) -> usize {
    self.dimension
  }

  #[must_use]
  pub fn contains(&self, word: &str) -> bool {
    self.index.contains_key(word)
  }

  /// Words in insertion order.
  pub fn words(&self) -> impl Iterator<Item = &str> {
    self.words.iter().map(String::as_str)
  }

  /// Exact, case-sensitive lookup.
  pub fn lookup(&self, word: &str) -> Result<&[f32], LookupError> {
    self
      .index
      .get(word)
      .map(|&row| self.row(row))
      .ok_or_else(|| LookupError::UnknownWord(word.to_owned()))
  }

  /// The `k` words most cosine-similar to `vector`, best first.
  ///
  /// Returns `min(k, len)` neighbors. Equal similarities keep insertion order,
  /// so the result is deterministic for a given store.
  pub fn nearest_neighbors(
    &self,
    vector: &[f32],
    k: usize,
  ) -> Result<Vec<Neighbor<'_>>, LookupError> {
    if self.is_empty() {
      return Ok(Vec::new());
    }
    if vector.len() != self.dimension {
      return Err(LookupError::DimensionMismatch {
        expected: self.dimension,
        actual: vector.len(),
      });
    }

    let k = k.min(self.len());
    if k == 0 {
      return Ok(Vec::new());
    }

    let query_norm = l2_norm(vector);
    let similarities: Vec<f32> = self
      .vectors
      .par_chunks_exact(self.dimension)
      .zip(self.norms.par_iter())
      .map(|(row, &norm)| similarity(row, norm, vector, query_norm))
      .collect();

    let mut order: Vec<usize> = (0..similarities.len()).collect();
    if k < order.len() {
      order.select_nth_unstable_by(k - 1, |a, b| by_rank(&similarities, *a, *b));
      order.truncate(k);
    }
    order.sort_unstable_by(|a, b| by_rank(&similarities, *a, *b));

    Ok(
      order
        .into_iter()
        .map(|row| Neighbor {
          word: &self.words[row],
          similarity: similarities[row],
        })
        .collect(),
    )
  }

  fn row(&self, row: usize) -> &[f32] {
    let start = row * self.dimension;
    &self.vectors[start..start + self.dimension]
  }
}

fn similarity(row: &[f32], norm: f32, query: &[f32], query_norm: f32) -> f32 {
  let denom = norm * query_norm;
  if denom <= 0.0 {
    return 0.0;
  }
  let sim = dot(row, query) / denom;
  if sim.is_nan() {
    return 0.0;
  }
  sim.clamp(-1.0, 1.0)
}

/// Higher similarity first, then lower row (earlier insertion) first.
fn by_rank(similarities: &[f32], a: usize, b: usize) -> Ordering {
  similarities[b]
    .total_cmp(&similarities[a])
    .then_with(|| a.cmp(&b))
}

// ──────────────────────────────────────────────────
// Construction
// ──────────────────────────────────────────────────

/// Accumulates rows of a fixed dimension; first occurrence of a word wins.
pub(crate) struct StoreBuilder {
  dimension: usize,
  words: Vec<String>,
  index: HashMap<String, usize>,
  vectors: Vec<f32>,
  duplicates: usize,
}

impl StoreBuilder {
  /// `capacity` is a hint; rows that cannot be reserved are grown on demand.
  pub(crate) fn new(dimension: usize, capacity: usize) -> Self {
    let mut vectors = Vec::new();
    if let Err(err) = vectors.try_reserve_exact(capacity.saturating_mul(dimension)) {
      tracing::debug!(rows = capacity, dimension, error = %err, "Skipping vector preallocation");
    }

    Self {
      dimension,
      words: Vec::with_capacity(capacity),
      index: HashMap::with_capacity(capacity),
      vectors,
      duplicates: 0,
    }
  }

  pub(crate) const fn dimension(&self) -> usize {
    self.dimension
  }

  /// Append a row. Returns `false` if the word was already present.
  pub(crate) fn push(&mut self, word: String, vector: &[f32]) -> bool {
    debug_assert_eq!(vector.len(), self.dimension);

    match self.index.entry(word) {
      Entry::Occupied(existing) => {
        tracing::warn!(
          word = %existing.key(),
          "Duplicate word in model, keeping the first occurrence"
        );
        self.duplicates += 1;
        false
      }
      Entry::Vacant(slot) => {
        self.words.push(slot.key().clone());
        slot.insert(self.words.len() - 1);
        self.vectors.extend_from_slice(vector);
        true
      }
    }
  }

  pub(crate) fn finish(self) -> VectorStore {
    let norms = self
      .vectors
      .par_chunks_exact(self.dimension)
      .map(l2_norm)
      .collect();

    if self.duplicates > 0 {
      tracing::warn!(
        duplicates = self.duplicates,
        "Skipped duplicate words while building the store"
      );
    }

    VectorStore {
      words: self.words,
      index: self.index,
      dimension: self.dimension,
      vectors: self.vectors,
      norms,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn cosine(a: &[f32], b: &[f32]) -> f32 {
    dot(a, b) / (l2_norm(a) * l2_norm(b))
  }

  fn sample_store() -> VectorStore {
    VectorStore::from_entries([
      ("east", vec![1.0, 0.0, 0.0]),
      ("north", vec![0.0, 1.0, 0.0]),
      ("northeast", vec![1.0, 1.0, 0.0]),
      ("west", vec![-1.0, 0.0, 0.0]),
      ("up", vec![0.0, 0.0, 2.0]),
    ])
    .unwrap()
  }

  #[test]
  fn lookup_returns_vectors_of_store_dimension() {
    let store = sample_store();
    assert_eq!(store.dimension(), 3);
    assert_eq!(store.len(), 5);
    for word in store.words() {
      assert_eq!(store.lookup(word).unwrap().len(), store.dimension());
    }
    assert_eq!(store.lookup("up").unwrap(), &[0.0, 0.0, 2.0]);
  }

  #[test]
  fn lookup_unknown_word_fails() {
    let store = sample_store();
    assert_eq!(
      store.lookup("south"),
      Err(LookupError::UnknownWord("south".to_owned()))
    );
  }

  #[test]
  fn lookup_is_case_and_whitespace_sensitive() {
    let store = sample_store();
    assert!(store.lookup("East").is_err());
    assert!(store.lookup(" east").is_err());
    assert!(store.contains("east"));
  }

  #[test]
  fn nearest_neighbors_ordered_by_similarity() {
    let store = sample_store();
    let neighbors = store.nearest_neighbors(&[1.0, 0.1, 0.0], 3).unwrap();

    let words: Vec<_> = neighbors.iter().map(|n| n.word).collect();
    assert_eq!(words, ["east", "northeast", "north"]);
    for pair in neighbors.windows(2) {
      assert!(pair[0].similarity >= pair[1].similarity);
    }
  }

  #[test]
  fn nearest_neighbors_matches_cosine_similarity() {
    let store = sample_store();
    let query = [0.3, -0.2, 0.9];
    for neighbor in store.nearest_neighbors(&query, DEFAULT_NEIGHBORS).unwrap() {
      let expected = cosine(store.lookup(neighbor.word).unwrap(), &query);
      assert!((neighbor.similarity - expected).abs() < 1e-5);
      assert!((-1.0..=1.0).contains(&neighbor.similarity));
    }
  }

  #[test]
  fn nearest_neighbors_returns_min_of_k_and_len() {
    let store = sample_store();
    let query = [0.5, 0.5, 0.5];
    assert_eq!(store.nearest_neighbors(&query, 2).unwrap().len(), 2);
    assert_eq!(store.nearest_neighbors(&query, DEFAULT_NEIGHBORS).unwrap().len(), 5);
    assert!(store.nearest_neighbors(&query, 0).unwrap().is_empty());
  }

  #[test]
  fn nearest_neighbors_breaks_ties_by_insertion_order() {
    let store = VectorStore::from_entries([
      ("b", vec![1.0, 0.0]),
      ("a", vec![2.0, 0.0]),
      ("c", vec![3.0, 0.0]),
      ("d", vec![0.0, 1.0]),
    ])
    .unwrap();

    let words: Vec<_> = store
      .nearest_neighbors(&[1.0, 0.0], 2)
      .unwrap()
      .into_iter()
      .map(|n| n.word)
      .collect();
    assert_eq!(words, ["b", "a"]);

    let words: Vec<_> = store
      .nearest_neighbors(&[1.0, 0.0], 4)
      .unwrap()
      .into_iter()
      .map(|n| n.word)
      .collect();
    assert_eq!(words, ["b", "a", "c", "d"]);
  }

  #[test]
  fn nearest_neighbors_rejects_wrong_dimension() {
    let store = sample_store();
    assert_eq!(
      store.nearest_neighbors(&[1.0, 0.0], 3),
      Err(LookupError::DimensionMismatch {
        expected: 3,
        actual: 2
      })
    );
  }

  #[test]
  fn zero_vectors_score_zero() {
    let store = VectorStore::from_entries([("zero", vec![0.0, 0.0]), ("one", vec![1.0, 0.0])]).unwrap();

    let neighbors = store.nearest_neighbors(&[1.0, 0.0], 2).unwrap();
    assert_eq!(neighbors[0].word, "one");
    assert_eq!(neighbors[1].similarity, 0.0);

    let neighbors = store.nearest_neighbors(&[0.0, 0.0], 2).unwrap();
    assert!(neighbors.iter().all(|n| n.similarity == 0.0));
    assert_eq!(neighbors[0].word, "zero");
  }

  #[test]
  fn from_entries_keeps_first_duplicate() {
    let store = VectorStore::from_entries([
      ("word", vec![1.0, 0.0]),
      ("other", vec![0.0, 1.0]),
      ("word", vec![5.0, 5.0]),
    ])
    .unwrap();
    assert_eq!(store.len(), 2);
    assert_eq!(store.lookup("word").unwrap(), &[1.0, 0.0]);
  }

  #[test]
  fn from_entries_rejects_inconsistent_dimensions() {
    let err = VectorStore::from_entries([("a", vec![1.0, 0.0]), ("b", vec![1.0, 0.0, 0.0])])
      .unwrap_err();
    assert!(matches!(
      err,
      LoadError::DimensionMismatch {
        entry: 1,
        expected: 2,
        found: 3,
        ..
      }
    ));
  }

  #[test]
  fn from_entries_rejects_empty_and_non_finite_vectors() {
    assert!(matches!(
      VectorStore::from_entries([("a", Vec::new())]),
      Err(LoadError::EmptyVector { entry: 0, .. })
    ));
    assert!(matches!(
      VectorStore::from_entries([("a", vec![1.0]), ("b", vec![f32::NAN])]),
      Err(LoadError::NonFinite { entry: 1, .. })
    ));
  }

  #[test]
  fn empty_store_has_no_neighbors() {
    let store = VectorStore::from_entries(Vec::<(String, Vec<f32>)>::new()).unwrap();
    assert!(store.is_empty());
    assert_eq!(store.dimension(), 0);
    assert!(store.nearest_neighbors(&[1.0], 10).unwrap().is_empty());
  }
}
