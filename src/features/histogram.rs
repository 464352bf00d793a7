//! Colour histograms over a [`PixelBuffer`].

use crate::features::pixels::PixelBuffer;

/// Rescales `values` linearly onto `[0, 1]`. A flat input becomes all zeros.
pub fn normalize_min_max(values: &mut [f32]) {
    let (min, max) = values
        .iter()
        .fold((f32::MAX, f32::MIN), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let range = max - min;
    if range.is_nan() || range <= f32::EPSILON {
        values.iter_mut().for_each(|v| *v = 0.0);
        return;
    }
    for v in values.iter_mut() {
        *v = (*v - min) / range;
    }
}

#[inline]
fn bin_of(value: u8, bins: usize) -> usize {
    value as usize * bins / 256
}

/// Joint RGB histogram with `bins` bins per channel (`bins³` values,
/// red-major), min-max normalized.
pub fn rgb_histogram(image: &PixelBuffer, bins: usize) -> Vec<f32> {
    let mut hist = vec![0.0f32; bins * bins * bins];
    for p in image.pixels() {
        let idx = (bin_of(p[0], bins) * bins + bin_of(p[1], bins)) * bins + bin_of(p[2], bins);
        hist[idx] += 1.0;
    }
    normalize_min_max(&mut hist);
    hist
}

/// RGB histograms of the top and bottom halves, concatenated.
/// Both halves are `height / 2` rows tall.
pub fn split_rgb_histogram(image: &PixelBuffer, bins: usize) -> Vec<f32> {
    let half = image.height() / 2;
    let top = image.crop(0, 0, image.width(), half);
    let bottom = image.crop(0, half, image.width(), half);

    let mut features = rgb_histogram(&top, bins);
    features.extend(rgb_histogram(&bottom, bins));
    features
}

/// Histogram of red chromaticity `r / (r + g + b)`, scaled to `0..256`.
/// Raw counts; black pixels count as chromaticity 0.
pub fn chromaticity_histogram(image: &PixelBuffer, bins: usize) -> Vec<f32> {
    let mut hist = vec![0.0f32; bins];
    for p in image.pixels() {
        let sum = p[0] as f32 + p[1] as f32 + p[2] as f32;
        let r = if sum > 0.0 { p[0] as f32 / sum } else { 0.0 };
        let idx = ((r * 255.0) as usize * bins / 256).min(bins - 1);
        hist[idx] += 1.0;
    }
    hist
}

/// 8-bit HSV in the usual image-library ranges: H in `0..180`, S and V in `0..=255`.
pub fn rgb_to_hsv(p: [u8; 3]) -> [u8; 3] {
    let (r, g, b) = (p[0] as f32, p[1] as f32, p[2] as f32);
    let v = r.max(g).max(b);
    let min = r.min(g).min(b);
    let diff = v - min;

    let s = if v > 0.0 { 255.0 * diff / v } else { 0.0 };
    let mut h = if diff == 0.0 {
        0.0
    } else if v == r {
        60.0 * (g - b) / diff
    } else if v == g {
        120.0 + 60.0 * (b - r) / diff
    } else {
        240.0 + 60.0 * (r - g) / diff
    };
    if h < 0.0 {
        h += 360.0;
    }

    [
        (h / 2.0).round().min(179.0) as u8,
        s.round() as u8,
        v as u8,
    ]
}

/// Per-channel 256-bin histograms of H, S and V, concatenated (768 values)
/// and min-max normalized together.
pub fn hsv_histogram(image: &PixelBuffer) -> Vec<f32> {
    let mut hist = vec![0.0f32; 3 * 256];
    for &p in image.pixels() {
        let hsv = rgb_to_hsv(p);
        for (channel, &value) in hsv.iter().enumerate() {
            hist[channel * 256 + value as usize] += 1.0;
        }
    }
    normalize_min_max(&mut hist);
    hist
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker() -> PixelBuffer {
        PixelBuffer::new(
            2,
            2,
            vec![[255, 0, 0], [255, 0, 0], [0, 0, 255], [10, 10, 10]],
        )
        .unwrap()
    }

    #[test]
    fn test_min_max() {
        let mut v = vec![2.0, 4.0, 6.0];
        normalize_min_max(&mut v);
        assert_eq!(v, vec![0.0, 0.5, 1.0]);

        let mut flat = vec![3.0, 3.0];
        normalize_min_max(&mut flat);
        assert_eq!(flat, vec![0.0, 0.0]);
    }

    #[test]
    fn test_rgb_histogram() {
        let hist = rgb_histogram(&checker(), 8);
        assert_eq!(hist.len(), 512);
        // Two pure-red pixels: bin (7, 0, 0) holds the maximum.
        assert_eq!(hist[7 * 64], 1.0);
        assert_eq!(hist[7], 0.5);
        assert_eq!(hist[0], 0.5);
    }

    #[test]
    fn test_split_histogram() {
        let hist = split_rgb_histogram(&checker(), 8);
        assert_eq!(hist.len(), 1024);
        // Top half is all red, bottom half has no red.
        assert_eq!(hist[7 * 64], 1.0);
        assert_eq!(hist[512 + 7 * 64], 0.0);
    }

    #[test]
    fn test_chromaticity() {
        let hist = chromaticity_histogram(&checker(), 8);
        assert_eq!(hist.len(), 8);
        assert_eq!(hist.iter().sum::<f32>(), 4.0);
        assert_eq!(hist[7], 2.0);
        // Blue has r = 0, grey has r = 1/3 -> 85 -> bin 2
        assert_eq!(hist[0], 1.0);
        assert_eq!(hist[2], 1.0);
    }

    #[test]
    fn test_rgb_to_hsv() {
        assert_eq!(rgb_to_hsv([255, 0, 0]), [0, 255, 255]);
        assert_eq!(rgb_to_hsv([0, 255, 0]), [60, 255, 255]);
        assert_eq!(rgb_to_hsv([0, 0, 255]), [120, 255, 255]);
        assert_eq!(rgb_to_hsv([0, 0, 0]), [0, 0, 0]);
        assert_eq!(rgb_to_hsv([128, 128, 128]), [0, 0, 128]);
    }

    #[test]
    fn test_hsv_histogram_len() {
        let hist = hsv_histogram(&checker());
        assert_eq!(hist.len(), 768);
        assert!(hist.iter().all(|&v| (0.0..=1.0).contains(&v)));
    }
}
