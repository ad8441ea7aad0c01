/// Dot product accumulated in `f64` to keep long (300+ dim) sums stable.
#[must_use]
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
  debug_assert_eq!(a.len(), b.len(), "embedding dimensions must match");

  let mut acc = 0.0_f64;
  for (&x, &y) in a.iter().zip(b.iter()) {
    acc = f64::from(x).mul_add(f64::from(y), acc);
  }
  acc as f32
}

/// Euclidean (L2) norm.
#[must_use]
pub fn l2_norm(v: &[f32]) -> f32 {
  let mut acc = 0.0_f64;
  for &x in v {
    let x = f64::from(x);
    acc = x.mul_add(x, acc);
  }
  acc.sqrt() as f32
}
