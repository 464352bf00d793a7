//! Colour quantisation ("cartoonisation") of images with k-means.
//!
//! Every pixel becomes one `[f32; 3]` sample. After clustering each pixel is
//! replaced by its cluster centroid, rounded and clamped back to `0..=255`.

use crate::core::error::EngineError;
use crate::core::kmeans::{ClusterConfig, ClusterEngine, ClusterOutcome};
use crate::features::pixels::PixelBuffer;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct Quantized {
    pub image: PixelBuffer,
    pub outcome: ClusterOutcome<3>,
}

impl Quantized {
    /// The distinct colours of the quantised image, one per cluster.
    pub fn palette(&self) -> Vec<[u8; 3]> {
        self.outcome
            .centroids
            .iter()
            .map(|c| [quantize_channel(c[0]), quantize_channel(c[1]), quantize_channel(c[2])])
            .collect()
    }
}

pub struct Cartoonizer {
    engine: ClusterEngine,
}

impl Cartoonizer {
    pub fn new(config: ClusterConfig) -> Result<Self, EngineError> {
        Ok(Self {
            engine: ClusterEngine::new(config)?,
        })
    }

    pub fn quantize(&self, image: &PixelBuffer) -> Result<Quantized, EngineError> {
        let outcome = self.engine.cluster(&image.samples())?;
        let quantized = PixelBuffer::from_labels(image.width(), image.height(), &outcome.labels, &outcome.centroids)?;
        debug!(
            width = image.width(),
            height = image.height(),
            k = outcome.k(),
            iterations = outcome.iterations,
            status = ?outcome.status,
            "Quantized image"
        );
        Ok(Quantized {
            image: quantized,
            outcome,
        })
    }

    /// Quantises only the `width × height` window at `(x, y)` (clipped to the
    /// image) and pastes it back; pixels outside the window are untouched.
    pub fn quantize_region(
        &self,
        image: &PixelBuffer,
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    ) -> Result<Quantized, EngineError> {
        let window = image.crop(x, y, width, height);
        let Quantized { image: patch, outcome } = self.quantize(&window)?;

        let mut pixels = image.pixels().to_vec();
        let (x, y) = (x.min(image.width()), y.min(image.height()));
        for row in 0..patch.height() {
            let dst = (y + row) * image.width() + x;
            let src = row * patch.width();
            pixels[dst..dst + patch.width()].copy_from_slice(&patch.pixels()[src..src + patch.width()]);
        }

        Ok(Quantized {
            image: PixelBuffer::new(image.width(), image.height(), pixels)?,
            outcome,
        })
    }
}

fn quantize_channel(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}
