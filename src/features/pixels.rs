use crate::core::error::EngineError;

/// A decoded RGB image, row-major, one `[r, g, b]` triple per pixel.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    width: usize,
    height: usize,
    pixels: Vec<[u8; 3]>,
}

impl PixelBuffer {
    pub fn new(width: usize, height: usize, pixels: Vec<[u8; 3]>) -> Result<Self, EngineError> {
        if pixels.len() != width * height {
            return Err(EngineError::DimensionMismatch {
                expected: width * height,
                found: pixels.len(),
            });
        }
        Ok(Self { width, height, pixels })
    }

    /// Wraps interleaved `RGBRGB...` bytes, e.g. the raw buffer of a decoded image.
    pub fn from_raw(width: usize, height: usize, bytes: &[u8]) -> Result<Self, EngineError> {
        if bytes.len() != width * height * 3 {
            return Err(EngineError::DimensionMismatch {
                expected: width * height * 3,
                found: bytes.len(),
            });
        }
        let pixels: &[[u8; 3]] = bytemuck::cast_slice(bytes);
        Self::new(width, height, pixels.to_vec())
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[[u8; 3]] {
        &self.pixels
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    pub fn get(&self, x: usize, y: usize) -> [u8; 3] {
        self.pixels[y * self.width + x]
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Copies the `width × height` window whose top-left corner is `(x, y)`,
    /// clipped to the image.
    pub fn crop(&self, x: usize, y: usize, width: usize, height: usize) -> PixelBuffer {
        let x_end = (x + width).min(self.width);
        let y_end = (y + height).min(self.height);
        let x = x.min(x_end);
        let y = y.min(y_end);

        let mut pixels = Vec::with_capacity((x_end - x) * (y_end - y));
        for row in y..y_end {
            let start = row * self.width;
            pixels.extend_from_slice(&self.pixels[start + x..start + x_end]);
        }
        PixelBuffer {
            width: x_end - x,
            height: y_end - y,
            pixels,
        }
    }

    /// Colour samples in row-major order, ready for clustering.
    pub fn samples(&self) -> Vec<[f32; 3]> {
        self.pixels
            .iter()
            .map(|p| [p[0] as f32, p[1] as f32, p[2] as f32])
            .collect()
    }

    /// Rebuilds an image by replacing every sample with its cluster's
    /// centroid, walking labels in the same row-major order `samples` used.
    pub fn from_labels(
        width: usize,
        height: usize,
        labels: &[usize],
        centroids: &[[f32; 3]],
    ) -> Result<Self, EngineError> {
        let palette: Vec<[u8; 3]> = centroids.iter().map(to_pixel).collect();
        let pixels = labels
            .iter()
            .map(|&label| {
                palette.get(label).copied().ok_or_else(|| {
                    EngineError::InvalidParameter(format!("label {} has no centroid", label))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(width, height, pixels)
    }
}

fn to_pixel(centroid: &[f32; 3]) -> [u8; 3] {
    let mut out = [0u8; 3];
    for (o, &c) in out.iter_mut().zip(centroid.iter()) {
        *o = c.round().clamp(0.0, 255.0) as u8;
    }
    out
}
