use bytes::Bytes;
use image::DynamicImage;

use super::TransformError;

/// Encode to progressive JPEG using mozjpeg. Alpha is dropped.
pub(super) fn encode_progressive(img: &DynamicImage, quality: u8) -> Result<Bytes, TransformError> {
    let rgb_img = img.to_rgb8();
    let (width, height) = rgb_img.dimensions();

    let mut comp = mozjpeg::Compress::new(mozjpeg::ColorSpace::JCS_RGB);
    comp.set_size(width as usize, height as usize);
    comp.set_quality(quality as f32);
    comp.set_progressive_mode();
    comp.set_optimize_coding(true);

    let mut comp = comp
        .start_compress(Vec::new())
        .map_err(|e| TransformError::Encode(e.to_string()))?;
    comp.write_scanlines(&rgb_img)
        .map_err(|e| TransformError::Encode(e.to_string()))?;
    let jpeg_data = comp
        .finish()
        .map_err(|e| TransformError::Encode(e.to_string()))?;

    Ok(Bytes::from(jpeg_data))
}
