use std::cmp::Ordering;

/// Descending order with NaN sorted after every number.
fn descending(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}

/// Indices of `values` ordered from the largest value to the smallest.
///
/// Equal values keep their original relative order, so `rank(&[5.0, 5.0, 3.0], None)`
/// is `[0, 1, 2]`. With `top_n` the result is cut to `min(top_n, values.len())`
/// entries. An empty slice ranks to an empty vector.
pub fn rank(values: &[f64], top_n: Option<usize>) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..values.len()).collect();
    // sort_by is stable
    indices.sort_by(|&a, &b| descending(values[a], values[b]));
    if let Some(n) = top_n {
        indices.truncate(n);
    }
    indices
}
