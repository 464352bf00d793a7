pub fn dot_product(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

pub fn manhattan_distance(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).abs()).sum()
}

pub fn histogram_intersection(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b.iter()).map(|(x, y)| x.min(*y)).sum()
}

/// Squared Euclidean distance over colour channels. Used by the clustering
/// assignment step, where the square root does not change the arg-min.
pub fn squared_euclidean<const C: usize>(a: &[f32; C], b: &[f32; C]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).powi(2)).sum()
}

pub fn euclidean_distance<const C: usize>(a: &[f32; C], b: &[f32; C]) -> f32 {
    squared_euclidean(a, b).sqrt()
}
