/// Pushes `value` into `[min_value, max_value]`
pub fn clamp<T: PartialOrd + Copy>(value: T, min_value: T, max_value: T) -> T {
    let upper = if value < max_value { value } else { max_value };
    if upper < min_value {
        min_value
    } else {
        upper
    }
}

/// Pushes a span of `length` starting at `start` so that it fits between
/// `min_value` and `max_value` (both inclusive pixel positions).
///
/// Starts below `min_value` snap to it. A span whose last pixel reaches
/// `max_value` is pulled back so that its last pixel sits exactly on `max_value`.
pub fn ranged_clamp(start: i32, length: i32, min_value: i32, max_value: i32) -> i32 {
    if start < min_value {
        min_value
    } else if max_value <= start + (length - 1) {
        max_value - (length - 1)
    } else {
        start
    }
}

/// Min-max normalization of a single value
pub fn normalize(value: f64, min_value: f64, max_value: f64) -> f64 {
    (value - min_value) / (max_value - min_value)
}

/// Rescales detector weights into `[0, 1]` in place.
///
/// When every weight is equal (including a single detection) there is no
/// range to scale over and all weights become `1.0`.
pub fn normalize_weights(weights: &mut [f64]) {
    let Some((min_value, max_value)) = weights.iter().fold(None, |acc, &w| match acc {
        None => Some((w, w)),
        Some((lo, hi)) => Some((f64::min(lo, w), f64::max(hi, w))),
    }) else {
        return;
    };

    if max_value - min_value <= f64::EPSILON {
        weights.iter_mut().for_each(|w| *w = 1.0);
        return;
    }

    weights
        .iter_mut()
        .for_each(|w| *w = normalize(*w, min_value, max_value));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(5, 0, 10), 5);
        assert_eq!(clamp(-3, 0, 10), 0);
        assert_eq!(clamp(42, 0, 10), 10);
        assert_eq!(clamp(0.5, 0.0, 1.0), 0.5);
    }

    #[test]
    fn test_ranged_clamp_inside() {
        assert_eq!(ranged_clamp(10, 50, 0, 199), 10);
    }

    #[test]
    fn test_ranged_clamp_negative_start() {
        assert_eq!(ranged_clamp(-7, 50, 0, 199), 0);
    }

    #[test]
    fn test_ranged_clamp_overhang() {
        // 100-long span starting at 150 on a 200-wide image ends at 249
        assert_eq!(ranged_clamp(150, 100, 0, 199), 100);
        // Exactly touching the last pixel is pulled to the same place
        assert_eq!(ranged_clamp(100, 100, 0, 199), 100);
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(5.0, 0.0, 10.0), 0.5);
        assert_eq!(normalize(2.0, 2.0, 4.0), 0.0);
    }

    #[test]
    fn test_normalize_weights() {
        let mut weights = vec![2.0, 4.0, 3.0];
        normalize_weights(&mut weights);
        assert_eq!(weights, vec![0.0, 1.0, 0.5]);
    }

    #[test]
    fn test_normalize_weights_degenerate() {
        let mut single = vec![7.5];
        normalize_weights(&mut single);
        assert_eq!(single, vec![1.0]);

        let mut equal = vec![3.0, 3.0];
        normalize_weights(&mut equal);
        assert_eq!(equal, vec![1.0, 1.0]);

        let mut empty: Vec<f64> = Vec::new();
        normalize_weights(&mut empty);
        assert!(empty.is_empty());
    }
}
