//! Decoding and encoding of image files into [`PixelBuffer`]s.

use crate::features::pixels::PixelBuffer;
use crate::storage::table::StorageError;
use std::path::Path;

/// File extensions picked up when scanning an image directory.
pub const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

pub fn is_image_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.iter().any(|known| e.eq_ignore_ascii_case(known)))
        .unwrap_or(false)
}

/// Decodes any supported image and converts it to 8-bit RGB.
pub fn load_image(path: &Path) -> Result<PixelBuffer, StorageError> {
    let rgb = image::open(path)?.to_rgb8();
    let (width, height) = rgb.dimensions();
    Ok(PixelBuffer::from_raw(width as usize, height as usize, rgb.as_raw())?)
}

/// Encodes the buffer; the format follows the file extension.
pub fn save_image(path: &Path, buffer: &PixelBuffer) -> Result<(), StorageError> {
    image::save_buffer(
        path,
        buffer.as_bytes(),
        buffer.width() as u32,
        buffer.height() as u32,
        image::ColorType::Rgb8,
    )?;
    Ok(())
}
