/// Cosine similarity between two embeddings of equal length. Zero-norm
/// vectors score 0.0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    debug_assert_eq!(a.len(), b.len());

    let mut dot = 0.0_f64;
    let mut norm_a = 0.0_f64;
    let mut norm_b = 0.0_f64;
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a < 1e-12 || norm_b < 1e-12 {
        return 0.0;
    }

    (dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(-1.0, 1.0)
}

/// Indices and scores of the `k` candidates most similar to `query` with a
/// score at or above `threshold`, best first. Equal scores keep candidate order.
pub fn top_k_matches<V>(query: &[f32], candidates: &[V], threshold: f64, k: usize) -> Vec<(usize, f64)>
where
    V: AsRef<[f32]>,
{
    let mut scores: Vec<(usize, f64)> = candidates
        .iter()
        .enumerate()
        .map(|(index, candidate)| (index, cosine_similarity(query, candidate.as_ref())))
        .filter(|(_, score)| *score >= threshold)
        .collect();

    // stable: ties stay in table order
    scores.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    scores.truncate(k);
    scores
}
