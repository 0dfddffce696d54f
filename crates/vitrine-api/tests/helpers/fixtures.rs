//! Synthesized test images.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, ImageReader, Rgb, RgbImage};

fn gradient(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    }))
}

fn encode(img: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, format).expect("encode test image");
    buf.into_inner()
}

pub fn create_test_png(width: u32, height: u32) -> Vec<u8> {
    encode(&gradient(width, height), ImageFormat::Png)
}

pub fn create_test_jpeg(width: u32, height: u32) -> Vec<u8> {
    encode(&gradient(width, height), ImageFormat::Jpeg)
}

/// Bytes that claim to be an image but are not decodable.
pub fn create_corrupt_image() -> Vec<u8> {
    let mut data = b"\x89PNG\r\n\x1a\n".to_vec();
    data.extend_from_slice(&[0u8; 256]);
    data
}

/// Decode a stored artifact; panics unless it is a JPEG.
pub fn dimensions(data: &[u8]) -> (u32, u32) {
    let reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .expect("guess format");
    assert_eq!(reader.format(), Some(ImageFormat::Jpeg));
    let img = reader.decode().expect("decode stored image");
    (img.width(), img.height())
}
