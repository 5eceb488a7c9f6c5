//! Image encoding: `DynamicImage` → JPEG bytes, optionally base64-wrapped
//! into a [`PageImage`].
//!
//! pdfium hands back RGBA bitmaps. JPEG has no alpha channel, so pages are
//! flattened to 8-bit RGB before encoding.

use crate::output::{PageImage, JPEG_CONTENT_TYPE};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use tracing::debug;

/// Encode a rasterised page as JPEG at the given quality (1–100).
pub fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<Vec<u8>, image::ImageError> {
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
    let mut buf = Vec::new();
    rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut buf, quality))?;
    debug!(
        "Encoded {}x{} page → {} bytes JPEG",
        rgb.width(),
        rgb.height(),
        buf.len()
    );
    Ok(buf)
}

/// Wrap already-encoded JPEG bytes as a base64 [`PageImage`].
pub fn to_page_image(filename: String, jpeg: &[u8]) -> PageImage {
    PageImage {
        filename,
        content_type: JPEG_CONTENT_TYPE.to_string(),
        data: STANDARD.encode(jpeg),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn encode_small_image() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(10, 10, Rgba([255, 0, 0, 255])));
        let jpeg = encode_jpeg(&img, 75).expect("encode should succeed");
        // SOI marker
        assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);

        let decoded = image::load_from_memory_with_format(&jpeg, image::ImageFormat::Jpeg)
            .expect("valid jpeg");
        assert_eq!((decoded.width(), decoded.height()), (10, 10));
    }

    #[test]
    fn page_image_round_trips_through_base64() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 6, Rgba([0, 0, 255, 128])));
        let jpeg = encode_jpeg(&img, 90).unwrap();
        let page = to_page_image("doc_page_1.jpg".into(), &jpeg);

        assert_eq!(page.content_type, "image/jpeg");
        assert_eq!(page.filename, "doc_page_1.jpg");
        let decoded = STANDARD.decode(&page.data).expect("valid base64");
        assert_eq!(decoded, jpeg);
    }

    #[test]
    fn higher_quality_is_not_smaller() {
        let mut img = RgbaImage::new(64, 64);
        for (x, y, px) in img.enumerate_pixels_mut() {
            *px = Rgba([(x * 4) as u8, (y * 4) as u8, ((x + y) * 2) as u8, 255]);
        }
        let img = DynamicImage::ImageRgba8(img);
        let low = encode_jpeg(&img, 10).unwrap();
        let high = encode_jpeg(&img, 100).unwrap();
        assert!(high.len() >= low.len());
    }
}
