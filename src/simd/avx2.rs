#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

/// Horizontal sum of the 8 lanes.
#[cfg(target_arch = "x86_64")]
#[inline]
#[target_feature(enable = "avx2")]
unsafe fn horizontal_sum(v: __m256) -> f32 {
    // Reduce to 128 bits: [s0+s4, s1+s5, s2+s6, s3+s7]
    let sum128 = _mm_add_ps(_mm256_castps256_ps128(v), _mm256_extractf128_ps(v, 1));
    let sum128 = _mm_hadd_ps(sum128, sum128);
    let sum128 = _mm_hadd_ps(sum128, sum128);
    _mm_cvtss_f32(sum128)
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2", enable = "fma")]
pub unsafe fn dot_product_avx2(a: &[f32], b: &[f32]) -> f32 {
    let n = a.len().min(b.len());
    let mut sum256 = _mm256_setzero_ps();
    let mut i = 0;

    // Process 8 floats at a time
    while i + 8 <= n {
        let a_vec = _mm256_loadu_ps(a.as_ptr().add(i));
        let b_vec = _mm256_loadu_ps(b.as_ptr().add(i));
        sum256 = _mm256_fmadd_ps(a_vec, b_vec, sum256);
        i += 8;
    }

    let mut sum = horizontal_sum(sum256);

    // Handle remaining elements
    while i < n {
        sum += a[i] * b[i];
        i += 1;
    }

    sum
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2", enable = "fma")]
pub unsafe fn manhattan_distance_avx2(a: &[f32], b: &[f32]) -> f32 {
    let n = a.len().min(b.len());
    // Clearing the sign bit gives |x|.
    let sign_mask = _mm256_set1_ps(-0.0);
    let mut sum256 = _mm256_setzero_ps();
    let mut i = 0;

    while i + 8 <= n {
        let a_vec = _mm256_loadu_ps(a.as_ptr().add(i));
        let b_vec = _mm256_loadu_ps(b.as_ptr().add(i));
        let diff = _mm256_sub_ps(a_vec, b_vec);
        sum256 = _mm256_add_ps(sum256, _mm256_andnot_ps(sign_mask, diff));
        i += 8;
    }

    let mut sum = horizontal_sum(sum256);

    while i < n {
        sum += (a[i] - b[i]).abs();
        i += 1;
    }

    sum
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2", enable = "fma")]
pub unsafe fn histogram_intersection_avx2(a: &[f32], b: &[f32]) -> f32 {
    let n = a.len().min(b.len());
    let mut sum256 = _mm256_setzero_ps();
    let mut i = 0;

    while i + 8 <= n {
        let a_vec = _mm256_loadu_ps(a.as_ptr().add(i));
        let b_vec = _mm256_loadu_ps(b.as_ptr().add(i));
        sum256 = _mm256_add_ps(sum256, _mm256_min_ps(a_vec, b_vec));
        i += 8;
    }

    let mut sum = horizontal_sum(sum256);

    while i < n {
        sum += a[i].min(b[i]);
        i += 1;
    }

    sum
}
