//! Numeric transforms turning a raw contact matrix into a displayable one.
//!
//! Every function here is pure and allocates its result. NaN marks missing
//! bins: it is skipped by all statistics and propagates through arithmetic.
//! Division by a zero or NaN expectation yields Inf/NaN, which later stages
//! accept as ordinary values.

use crate::types::ContactMatrix;
use ndarray::{Array, Array1, Array2, ArrayBase, Data, Dimension, Ix2};
use rayon::prelude::*;

/// Fraction of the data range added before taking the logarithm, so the
/// minimum itself maps to a finite value.
pub const LOG_EPSILON_FRACTION: f64 = 1.0 / 10_000.0;

/// Minimum and maximum over non-NaN entries. `None` when every entry is NaN
/// or the array is empty. Infinities take part in the comparison.
pub fn nan_min_max<S, D>(data: &ArrayBase<S, D>) -> Option<(f64, f64)>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    data.iter()
        .copied()
        .filter(|v| !v.is_nan())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((mi, ma)) => Some((mi.min(v), ma.max(v))),
        })
}

/// Min-max scaling to `[0, 1]` (NORM). A constant input gives zeros.
pub fn normalize<S, D>(data: &ArrayBase<S, D>) -> Array<f64, D>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    match nan_min_max(data) {
        None => data.to_owned(),
        Some((mi, ma)) if mi == ma => Array::zeros(data.raw_dim()),
        Some((mi, ma)) => {
            let range = ma - mi;
            data.mapv(|v| (v - mi) / range)
        }
    }
}

/// Base-10 log compression (LOG).
///
/// Values are first shifted so the minimum sits at `range / 10000`, which
/// keeps every argument strictly positive. A constant input gives zeros.
pub fn log_compress<S, D>(data: &ArrayBase<S, D>) -> Array<f64, D>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    match nan_min_max(data) {
        None => data.to_owned(),
        Some((mi, ma)) if mi == ma => Array::zeros(data.raw_dim()),
        Some((mi, ma)) => {
            let shift = -mi + (ma - mi) * LOG_EPSILON_FRACTION;
            data.mapv(|v| (v + shift).log10())
        }
    }
}

/// Mean contact per circular diagonal offset.
///
/// Entry `d` averages `data[i][(i + d) mod m]` over all rows, skipping NaN.
/// This is the "roll row i left by i, then reduce columns" construction, so
/// offsets wrap around the matrix edge rather than measuring linear distance.
/// An offset with no finite contacts gets NaN.
pub fn expected_profile<S>(data: &ArrayBase<S, Ix2>) -> Array1<f64>
where
    S: Data<Elem = f64> + Sync,
{
    let (rows, cols) = data.dim();
    if cols == 0 {
        return Array1::zeros(0);
    }

    let profile: Vec<f64> = (0..cols)
        .into_par_iter()
        .map(|offset| {
            let (sum, count) = (0..rows)
                .map(|i| data[[i, (i + offset) % cols]])
                .filter(|v| !v.is_nan())
                .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
            if count == 0 {
                f64::NAN
            } else {
                sum / count as f64
            }
        })
        .collect();

    Array1::from(profile)
}

/// Expected matrix: the offset profile broadcast to every row and rolled back
/// so that `E[i][j] = profile[(j - i) mod m]`.
pub fn expected_matrix<S>(data: &ArrayBase<S, Ix2>) -> Array2<f64>
where
    S: Data<Elem = f64> + Sync,
{
    let (rows, cols) = data.dim();
    let profile = expected_profile(data);
    Array2::from_shape_fn((rows, cols), |(i, j)| profile[(j + cols - i % cols) % cols])
}

/// Observed over expected (OE): each entry divided by the mean of its
/// circular diagonal.
pub fn observed_over_expected<S>(data: &ArrayBase<S, Ix2>) -> Array2<f64>
where
    S: Data<Elem = f64> + Sync,
{
    let expected = expected_matrix(data);
    data.to_owned() / &expected
}

/// Circular roll along both axes with numpy `roll` semantics:
/// `out[(i + offset) mod n] = data[i]`, rows first, then columns.
pub fn roll_view<S>(data: &ArrayBase<S, Ix2>, offset: isize) -> Array2<f64>
where
    S: Data<Elem = f64>,
{
    let (rows, cols) = data.dim();
    if rows == 0 || cols == 0 {
        return data.to_owned();
    }
    let row_shift = offset.rem_euclid(rows as isize) as usize;
    let col_shift = offset.rem_euclid(cols as isize) as usize;
    Array2::from_shape_fn((rows, cols), |(i, j)| {
        data[[(i + rows - row_shift) % rows, (j + cols - col_shift) % cols]]
    })
}

/// Which optional stages run before the final normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pipeline {
    pub observed_over_expected: bool,
    pub log: bool,
}

impl Pipeline {
    pub fn new(observed_over_expected: bool, log: bool) -> Self {
        Self { observed_over_expected, log }
    }

    /// raw -> [OE] -> [LOG] -> NORM. Always reads `raw`, never a previous
    /// display buffer.
    pub fn apply(&self, raw: &ContactMatrix) -> ContactMatrix {
        let oe;
        let mut current: &ContactMatrix = raw;
        if self.observed_over_expected {
            oe = observed_over_expected(current);
            current = &oe;
        }
        if self.log {
            return normalize(&log_compress(current));
        }
        normalize(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array1};
    use proptest::prelude::*;

    fn circulant(profile: &[f64]) -> Array2<f64> {
        let n = profile.len();
        Array2::from_shape_fn((n, n), |(i, j)| profile[(j + n - i) % n])
    }

    #[test]
    fn test_nan_min_max_skips_nan() {
        let a = array![[f64::NAN, 2.0], [5.0, -1.0]];
        assert_eq!(nan_min_max(&a), Some((-1.0, 5.0)));

        let all_nan = array![f64::NAN, f64::NAN];
        assert_eq!(nan_min_max(&all_nan), None);
    }

    #[test]
    fn test_normalize_range() {
        let a = array![[1.0, 3.0], [f64::NAN, 5.0]];
        let n = normalize(&a);
        assert_eq!(n[[0, 0]], 0.0);
        assert_eq!(n[[0, 1]], 0.5);
        assert!(n[[1, 0]].is_nan());
        assert_eq!(n[[1, 1]], 1.0);
    }

    #[test]
    fn test_normalize_constant_is_zero() {
        let a = Array2::from_elem((3, 3), 7.5);
        assert!(normalize(&a).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_log_constant_is_zero() {
        let a = Array1::from(vec![2.0; 5]);
        assert!(log_compress(&a).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_log_minimum_maps_to_epsilon() {
        let a = array![0.0, 10_000.0];
        let l = log_compress(&a);
        // min -> log10(range / 10000) = log10(1) = 0
        assert!((l[0] - 0.0).abs() < 1e-12);
        assert!((l[1] - 10_001.0f64.log10()).abs() < 1e-12);
    }

    #[test]
    fn test_log_keeps_nan() {
        let a = array![[1.0, f64::NAN], [3.0, 4.0]];
        let l = log_compress(&a);
        assert!(l[[0, 1]].is_nan());
        assert!(l[[0, 0]].is_finite());
    }

    #[test]
    fn test_expected_profile_offsets() {
        let a = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]];
        let p = expected_profile(&a);
        // offset 0: 1, 5, 9; offset 1: 2, 6, 7; offset 2: 3, 4, 8
        assert!((p[0] - 5.0).abs() < 1e-12);
        assert!((p[1] - 5.0).abs() < 1e-12);
        assert!((p[2] - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_expected_profile_ignores_nan() {
        let a = array![[f64::NAN, 2.0], [4.0, 6.0]];
        let p = expected_profile(&a);
        assert_eq!(p[0], 6.0);
        assert_eq!(p[1], 3.0);
    }

    #[test]
    fn test_expected_matrix_rows_are_rotations() {
        let a = circulant(&[4.0, 2.0, 1.0, 2.0]);
        let e = expected_matrix(&a);
        for i in 0..4 {
            for j in 0..4 {
                assert!((e[[i, j]] - e[[0, (j + 4 - i) % 4]]).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_oe_division_by_zero_is_tolerated() {
        let a = array![[0.0, 1.0], [1.0, 0.0]];
        let oe = observed_over_expected(&a);
        assert!(oe[[0, 0]].is_nan());
        assert_eq!(oe[[0, 1]], 1.0);
        let n = normalize(&oe);
        assert_eq!(n.dim(), (2, 2));
    }

    #[test]
    fn test_roll_view_matches_numpy_roll() {
        let a = array![[0.0, 1.0, 2.0], [3.0, 4.0, 5.0], [6.0, 7.0, 8.0]];
        let r = roll_view(&a, 1);
        assert_eq!(r, array![[8.0, 6.0, 7.0], [2.0, 0.0, 1.0], [5.0, 3.0, 4.0]]);
        let back = roll_view(&r, -1);
        assert_eq!(back, a);
        assert_eq!(roll_view(&a, 3), a);
    }

    #[test]
    fn test_pipeline_recomputes_from_raw() {
        let raw = array![[1.0, 2.0], [3.0, 4.0]];
        let plain = Pipeline::new(false, false).apply(&raw);
        let logged = Pipeline::new(false, true).apply(&raw);
        assert_ne!(plain, logged);
        assert_eq!(Pipeline::new(false, false).apply(&raw), plain);
    }

    proptest! {
        #[test]
        fn prop_normalize_spans_unit_interval(
            values in prop::collection::vec(0u32..100_000, 2..64)
        ) {
            let data = Array1::from(values.iter().map(|&v| v as f64).collect::<Vec<_>>());
            let (mi, ma) = nan_min_max(&data).unwrap();
            prop_assume!(mi != ma);
            let n = normalize(&data);
            let (nmi, nma) = nan_min_max(&n).unwrap();
            prop_assert_eq!(nmi, 0.0);
            prop_assert_eq!(nma, 1.0);
        }

        #[test]
        fn prop_log_is_finite(values in prop::collection::vec(0u32..100_000, 2..64)) {
            let data = Array1::from(values.iter().map(|&v| v as f64).collect::<Vec<_>>());
            let l = log_compress(&data);
            prop_assert!(l.iter().all(|v| v.is_finite()));
        }

        #[test]
        fn prop_oe_of_circulant_is_uniform(profile in prop::collection::vec(1u32..1_000, 2..24)) {
            let profile: Vec<f64> = profile.iter().map(|&v| v as f64).collect();
            let a = circulant(&profile);
            let oe = observed_over_expected(&a);
            prop_assert_eq!(oe.dim(), a.dim());
            prop_assert!(oe.iter().all(|v| (v - 1.0).abs() < 1e-9));
        }
    }
}
