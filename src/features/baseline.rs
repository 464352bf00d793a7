use crate::features::pixels::PixelBuffer;

pub const PATCH_SIZE: usize = 7;

/// Raw channel values of the `size × size` patch at the image centre,
/// row-major, `r, g, b` per pixel. Images smaller than the patch yield a
/// shorter vector.
pub fn center_patch(image: &PixelBuffer, size: usize) -> Vec<f32> {
    let x = (image.width() / 2).saturating_sub(size / 2);
    let y = (image.height() / 2).saturating_sub(size / 2);
    let patch = image.crop(x, y, size, size);
    patch
        .pixels()
        .iter()
        .flat_map(|p| p.iter().map(|&c| c as f32))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_patch() {
        let pixels: Vec<[u8; 3]> = (0..100).map(|i| [i as u8, 0, 1]).collect();
        let image = PixelBuffer::new(10, 10, pixels).unwrap();
        let features = center_patch(&image, PATCH_SIZE);
        assert_eq!(features.len(), 7 * 7 * 3);
        // Window starts at (2, 2)
        assert_eq!(&features[..3], &[22.0, 0.0, 1.0]);
    }

    #[test]
    fn test_small_image() {
        let image = PixelBuffer::new(2, 1, vec![[1, 2, 3], [4, 5, 6]]).unwrap();
        assert_eq!(center_patch(&image, PATCH_SIZE), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }
}
