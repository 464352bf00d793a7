//! Gradient-magnitude texture features.

use crate::features::histogram::normalize_min_max;
use crate::features::pixels::PixelBuffer;

/// Luma with the ITU-R BT.601 weights, rounded to 8 bits.
pub fn grayscale(image: &PixelBuffer) -> Vec<u8> {
    image
        .pixels()
        .iter()
        .map(|p| (0.299 * p[0] as f32 + 0.587 * p[1] as f32 + 0.114 * p[2] as f32).round() as u8)
        .collect()
}

/// Mirrors an out-of-range index back into `0..n` without repeating the
/// edge sample (`-1 -> 1`, `n -> n - 2`).
fn reflect_101(i: isize, n: usize) -> usize {
    if n == 1 {
        return 0;
    }
    let n = n as isize;
    let mut i = i;
    if i < 0 {
        i = -i;
    }
    if i >= n {
        i = 2 * n - 2 - i;
    }
    i as usize
}

/// 3×3 Sobel gradient magnitudes of an 8-bit grey image, saturated to 8 bits.
pub fn sobel_magnitude(gray: &[u8], width: usize, height: usize) -> Vec<u8> {
    let at = |x: isize, y: isize| -> f32 {
        gray[reflect_101(y, height) * width + reflect_101(x, width)] as f32
    };

    let mut out = Vec::with_capacity(width * height);
    for y in 0..height as isize {
        for x in 0..width as isize {
            let gx = (at(x + 1, y - 1) + 2.0 * at(x + 1, y) + at(x + 1, y + 1))
                - (at(x - 1, y - 1) + 2.0 * at(x - 1, y) + at(x - 1, y + 1));
            let gy = (at(x - 1, y + 1) + 2.0 * at(x, y + 1) + at(x + 1, y + 1))
                - (at(x - 1, y - 1) + 2.0 * at(x, y - 1) + at(x + 1, y - 1));
            let magnitude = (gx * gx + gy * gy).sqrt();
            out.push(magnitude.round().min(255.0) as u8);
        }
    }
    out
}

/// 256-bin histogram of Sobel gradient magnitudes, min-max normalized.
pub fn gradient_magnitude_histogram(image: &PixelBuffer) -> Vec<f32> {
    let mut hist = vec![0.0f32; 256];
    if image.is_empty() {
        return hist;
    }
    let gray = grayscale(image);
    for m in sobel_magnitude(&gray, image.width(), image.height()) {
        hist[m as usize] += 1.0;
    }
    normalize_min_max(&mut hist);
    hist
}
