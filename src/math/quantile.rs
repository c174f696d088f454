//! Order statistics over small in-memory samples.
//!
//! Quantiles use linear interpolation between closest ranks:
//!
//! ```text
//! pos = (n - 1) * q
//! Q(q) = x[floor(pos)] + (pos - floor(pos)) * (x[floor(pos) + 1] - x[floor(pos)])
//! ```
//!
//! which is the common spreadsheet/dataframe default. Inputs need not be sorted.

/// Quantile `q ∈ [0, 1]` of `values`.
///
/// Returns `None` for an empty sample, a `q` outside `[0, 1]`, or non-finite values.
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    let sorted = sorted_finite(values)?;
    quantile_sorted(&sorted, q)
}

/// Quantile of an already sorted, finite sample.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() || !(0.0..=1.0).contains(&q) {
        return None;
    }
    let pos = (sorted.len() - 1) as f64 * q;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + frac * (sorted[hi] - sorted[lo]))
}

/// Median (the 0.5 quantile).
pub fn median(values: &[f64]) -> Option<f64> {
    quantile(values, 0.5)
}

/// First and third quartiles.
pub fn quartiles(values: &[f64]) -> Option<(f64, f64)> {
    let sorted = sorted_finite(values)?;
    Some((quantile_sorted(&sorted, 0.25)?, quantile_sorted(&sorted, 0.75)?))
}

fn sorted_finite(values: &[f64]) -> Option<Vec<f64>> {
    if values.iter().any(|v| !v.is_finite()) {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    Some(sorted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quartiles_interpolate_linearly() {
        let (q1, q3) = quartiles(&[4.0, 1.0, 3.0, 2.0]).unwrap();
        assert!((q1 - 1.75).abs() < 1e-12);
        assert!((q3 - 3.25).abs() < 1e-12);
    }

    #[test]
    fn median_of_odd_and_even_samples() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[1.0, 2.0, 3.0, 4.0]), Some(2.5));
        assert_eq!(median(&[7.0]), Some(7.0));
    }

    #[test]
    fn degenerate_inputs_yield_none() {
        assert_eq!(median(&[]), None);
        assert_eq!(quantile(&[1.0], 1.5), None);
        assert_eq!(quantile(&[1.0, f64::NAN], 0.5), None);
    }
}
