pub mod avx2;
pub mod distance;

/// Kernel signature shared by the scalar and AVX2 paths. Callers must pass
/// slices of equal length; the metric layer checks this before dispatch.
pub type DistanceFunc = unsafe fn(&[f32], &[f32]) -> f32;

fn avx2_available() -> bool {
    #[cfg(target_arch = "x86_64")]
    {
        if is_x86_feature_detected!("avx2") && is_x86_feature_detected!("fma") {
            return true;
        }
    }
    false
}

pub fn get_dot_product() -> DistanceFunc {
    #[cfg(target_arch = "x86_64")]
    {
        if avx2_available() {
            return avx2::dot_product_avx2;
        }
    }

    // Fallback
    wrapper_dot_product
}

pub fn get_manhattan_distance() -> DistanceFunc {
    #[cfg(target_arch = "x86_64")]
    {
        if avx2_available() {
            return avx2::manhattan_distance_avx2;
        }
    }

    wrapper_manhattan_distance
}

pub fn get_histogram_intersection() -> DistanceFunc {
    #[cfg(target_arch = "x86_64")]
    {
        if avx2_available() {
            return avx2::histogram_intersection_avx2;
        }
    }

    wrapper_histogram_intersection
}

/// Name of the kernel family in use, for start-up logging.
pub fn kernel_name() -> &'static str {
    if avx2_available() {
        "avx2+fma"
    } else {
        "scalar"
    }
}

unsafe fn wrapper_dot_product(a: &[f32], b: &[f32]) -> f32 {
    distance::dot_product(a, b)
}

unsafe fn wrapper_manhattan_distance(a: &[f32], b: &[f32]) -> f32 {
    distance::manhattan_distance(a, b)
}

unsafe fn wrapper_histogram_intersection(a: &[f32], b: &[f32]) -> f32 {
    distance::histogram_intersection(a, b)
}
