//! Feature extraction from decoded images.
//!
//! Each [`FeatureKind`] turns a [`PixelBuffer`] into one flat vector and
//! knows the column layout it is stored under.

pub mod baseline;
pub mod histogram;
pub mod pixels;
pub mod texture;

use crate::core::error::EngineError;
use crate::core::metric::DistanceMetric;
use crate::storage::format::TableSchema;
use pixels::PixelBuffer;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const HISTOGRAM_BINS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    /// Centre 7×7 patch.
    Baseline,
    /// Whole-image 8×8×8 RGB histogram.
    RgbHistogram,
    /// Top-half and bottom-half RGB histograms.
    MultiHistogram,
    /// 8-bin red-chromaticity histogram.
    Chromaticity,
    /// HSV channel histograms followed by a gradient-magnitude histogram.
    TextureColor,
}

impl FeatureKind {
    pub const ALL: [FeatureKind; 5] = [
        FeatureKind::Baseline,
        FeatureKind::RgbHistogram,
        FeatureKind::MultiHistogram,
        FeatureKind::Chromaticity,
        FeatureKind::TextureColor,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FeatureKind::Baseline => "baseline",
            FeatureKind::RgbHistogram => "rgb_histogram",
            FeatureKind::MultiHistogram => "multi_histogram",
            FeatureKind::Chromaticity => "chromaticity",
            FeatureKind::TextureColor => "texture_color",
        }
    }

    pub fn extract(self, image: &PixelBuffer) -> Vec<f32> {
        match self {
            FeatureKind::Baseline => baseline::center_patch(image, baseline::PATCH_SIZE),
            FeatureKind::RgbHistogram => histogram::rgb_histogram(image, HISTOGRAM_BINS),
            FeatureKind::MultiHistogram => histogram::split_rgb_histogram(image, HISTOGRAM_BINS),
            FeatureKind::Chromaticity => histogram::chromaticity_histogram(image, HISTOGRAM_BINS),
            FeatureKind::TextureColor => {
                let mut features = histogram::hsv_histogram(image);
                features.extend(texture::gradient_magnitude_histogram(image));
                features
            }
        }
    }

    /// Column layout for a table of `dimension`-wide rows of this kind.
    pub fn schema(self, dimension: usize) -> TableSchema {
        match self {
            FeatureKind::MultiHistogram => TableSchema::with_blocks(&[
                ("top_feature_", dimension / 2),
                ("bottom_feature_", dimension - dimension / 2),
            ]),
            FeatureKind::TextureColor => {
                let color = dimension.min(3 * 256);
                TableSchema::with_blocks(&[
                    ("color_feature_", color),
                    ("texture_feature_", dimension - color),
                ])
            }
            _ => TableSchema::generic(dimension),
        }
    }

    /// The metric these features are usually compared with.
    pub fn default_metric(self) -> DistanceMetric {
        match self {
            FeatureKind::Baseline | FeatureKind::TextureColor => DistanceMetric::Manhattan,
            FeatureKind::RgbHistogram | FeatureKind::MultiHistogram | FeatureKind::Chromaticity => {
                DistanceMetric::HistogramIntersection
            }
        }
    }
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeatureKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.to_ascii_lowercase().replace('-', "_");
        FeatureKind::ALL
            .into_iter()
            .find(|k| k.as_str() == wanted)
            .ok_or_else(|| EngineError::InvalidParameter(format!("unknown feature kind '{}'", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient_image() -> PixelBuffer {
        let pixels: Vec<[u8; 3]> = (0..16 * 16)
            .map(|i| [(i % 16 * 16) as u8, (i / 16 * 16) as u8, 128])
            .collect();
        PixelBuffer::new(16, 16, pixels).unwrap()
    }

    #[test]
    fn test_feature_lengths() {
        let image = gradient_image();
        let expected = [
            (FeatureKind::Baseline, 147),
            (FeatureKind::RgbHistogram, 512),
            (FeatureKind::MultiHistogram, 1024),
            (FeatureKind::Chromaticity, 8),
            (FeatureKind::TextureColor, 1024),
        ];
        for (kind, len) in expected {
            let features = kind.extract(&image);
            assert_eq!(features.len(), len, "{}", kind);
            assert_eq!(kind.schema(len).dimension(), len);
        }
    }

    #[test]
    fn test_parse_kind() {
        for kind in FeatureKind::ALL {
            assert_eq!(kind.as_str().parse::<FeatureKind>().unwrap(), kind);
        }
        assert_eq!("Texture-Color".parse::<FeatureKind>().unwrap(), FeatureKind::TextureColor);
        assert!("orb".parse::<FeatureKind>().is_err());
    }
}
