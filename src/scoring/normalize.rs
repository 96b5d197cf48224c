use crate::config::constants::SCORE_SCALE;

/// Value range of a cohort, used for min-max normalization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinMax {
    pub min: f64,
    pub max: f64,
}

impl MinMax {
    /// Range over all non-NaN values, `None` for an empty cohort.
    pub fn from_values<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        values
            .into_iter()
            .filter(|v| !v.is_nan())
            .fold(None, |range, v| match range {
                None => Some(MinMax { min: v, max: v }),
                Some(r) => Some(MinMax {
                    min: r.min.min(v),
                    max: r.max.max(v),
                }),
            })
    }

    pub fn is_degenerate(&self) -> bool {
        self.max == self.min
    }

    /// Scale `value` into [0, SCORE_SCALE]; a degenerate range yields `default * SCORE_SCALE`.
    pub fn scale(&self, value: f64, default: f64) -> f64 {
        if self.is_degenerate() {
            default * SCORE_SCALE
        } else {
            (value - self.min) / (self.max - self.min) * SCORE_SCALE
        }
    }
}

/// Min-max score of `value` in `range`. An empty cohort behaves like a degenerate one.
pub fn min_max_score(value: f64, range: Option<MinMax>, default: f64) -> f64 {
    match range {
        Some(range) => range.scale(value, default),
        None => default * SCORE_SCALE,
    }
}

/// Arithmetic mean, `None` when there are no values.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Quantile with linear interpolation between closest ranks.
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let position = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_range_skips_nan() {
        let range = MinMax::from_values(vec![3.0, f64::NAN, 1.0, 7.0]).unwrap();
        assert_eq!(range, MinMax { min: 1.0, max: 7.0 });
    }

    #[test]
    fn test_empty_range() {
        assert_eq!(MinMax::from_values(Vec::new()), None);
    }

    #[test]
    fn test_scale_bounds() {
        let range = MinMax { min: 100.0, max: 300.0 };
        assert_abs_diff_eq!(range.scale(100.0, 1.0), 0.0);
        assert_abs_diff_eq!(range.scale(200.0, 1.0), 500.0);
        assert_abs_diff_eq!(range.scale(300.0, 1.0), 1000.0);
    }

    #[test]
    fn test_all_equal_cohort_uses_default() {
        let range = MinMax::from_values(vec![500.0, 500.0, 500.0]).unwrap();
        let score = range.scale(500.0, 1.0);
        assert!(!score.is_nan());
        assert_eq!(score, 1000.0);
        assert_eq!(min_max_score(0.0, None, 1.0), 1000.0);
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[]), None);
        assert_abs_diff_eq!(mean(&[1000.0, 2000.0]).unwrap(), 1500.0);
    }

    #[test]
    fn test_quantile_interpolates() {
        let values = [1.0, 2.0, 3.0, 4.0];
        assert_abs_diff_eq!(quantile(&values, 0.5).unwrap(), 2.5);
        assert_abs_diff_eq!(quantile(&values, 0.25).unwrap(), 1.75);
        assert_abs_diff_eq!(quantile(&values, 0.75).unwrap(), 3.25);
        assert_abs_diff_eq!(quantile(&[42.0], 0.75).unwrap(), 42.0);
        assert_eq!(quantile(&[], 0.5), None);
    }
}
