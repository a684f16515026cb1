/// Number of suggestions returned per prediction.
pub const TOP_K: usize = 3;

/// Indices of the `k` most probable classes, most probable first.
/// Equal probabilities keep the lower class index first, so the top entry
/// always matches the classifier's argmax. NaN ranks below every number.
pub fn top_k(probabilities: &[f32], k: usize) -> Vec<usize> {
    let score = |i: usize| {
        let p = probabilities[i];
        if p.is_nan() {
            f32::NEG_INFINITY
        } else {
            p
        }
    };
    let mut indices: Vec<usize> = (0..probabilities.len()).collect();
    indices.sort_by(|&a, &b| score(b).total_cmp(&score(a)).then(a.cmp(&b)));
    indices.truncate(k);
    indices
}

/// Renders a probability as a two-decimal percentage, e.g. `0.875` -> `"87.50%"`.
pub fn format_confidence(p: f32) -> String {
    format!("{:.2}%", f64::from(p) * 100.0)
}
