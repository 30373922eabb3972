// src/transform/images.rs

//! Image optimization via the `image` crate.
//!
//! PNG and JPEG inputs are decoded and re-encoded with fixed settings;
//! anything else passes through untouched.

use std::io::Cursor;
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::ImageReader;

use crate::config::model::ImageOptions;

use super::{TransformError, Transformer};

pub struct ImageOptimizer {
    jpeg_quality: u8,
}

impl ImageOptimizer {
    pub fn new(opts: &ImageOptions) -> Self {
        Self {
            jpeg_quality: opts.jpeg_quality,
        }
    }

    fn reencode(&self, source: &Path, input: &[u8], ext: &str) -> Result<Vec<u8>, TransformError> {
        let img = ImageReader::new(Cursor::new(input))
            .with_guessed_format()
            .map_err(|e| TransformError::new(format!("{}: {e}", source.display())))?
            .decode()
            .map_err(|e| TransformError::new(format!("{}: {e}", source.display())))?;

        let mut out = Vec::new();
        match ext {
            "png" => {
                let encoder = PngEncoder::new_with_quality(
                    &mut out,
                    CompressionType::Best,
                    FilterType::Adaptive,
                );
                img.write_with_encoder(encoder)
                    .map_err(|e| TransformError::new(format!("{}: {e}", source.display())))?;
            }
            "jpg" | "jpeg" => {
                let encoder = JpegEncoder::new_with_quality(&mut out, self.jpeg_quality);
                // JPEG has no alpha channel; flatten first.
                img.to_rgb8()
                    .write_with_encoder(encoder)
                    .map_err(|e| TransformError::new(format!("{}: {e}", source.display())))?;
            }
            _ => unreachable!("reencode called for unsupported extension"),
        }
        Ok(out)
    }
}

impl Transformer for ImageOptimizer {
    fn name(&self) -> &'static str {
        "images"
    }

    fn transform(&self, source: &Path, input: &[u8]) -> Result<Vec<u8>, TransformError> {
        let ext = source
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "png" | "jpg" | "jpeg" => self.reencode(source, input, &ext),
            // Formats we cannot re-encode are copied as-is.
            _ => Ok(input.to_vec()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, RgbaImage};

    fn sample_png() -> Vec<u8> {
        let img = RgbaImage::from_fn(8, 8, |x, y| {
            image::Rgba([(x * 30) as u8, (y * 30) as u8, 0, 255])
        });
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    #[test]
    fn png_roundtrip_keeps_dimensions() {
        let input = sample_png();
        let opt = ImageOptimizer::new(&ImageOptions::default());
        let out = opt.transform(Path::new("images/dot.png"), &input).unwrap();

        let decoded = image::load_from_memory(&out).unwrap();
        assert_eq!(decoded.width(), 8);
        assert_eq!(decoded.height(), 8);
    }

    #[test]
    fn jpeg_reencode_produces_jpeg() {
        let input = sample_png();
        let opt = ImageOptimizer::new(&ImageOptions::default());
        // Extension drives the output format; feed PNG data with a .jpg name.
        let out = opt.transform(Path::new("images/photo.jpg"), &input).unwrap();
        assert_eq!(&out[..2], &[0xff, 0xd8]); // JPEG SOI marker
    }

    #[test]
    fn unknown_extension_passes_through() {
        let opt = ImageOptimizer::new(&ImageOptions::default());
        let out = opt.transform(Path::new("images/x.gif"), b"GIF89a").unwrap();
        assert_eq!(out, b"GIF89a");
    }

    #[test]
    fn corrupt_image_is_a_transform_error() {
        let opt = ImageOptimizer::new(&ImageOptions::default());
        let err = opt.transform(Path::new("images/x.png"), b"not a png");
        assert!(err.is_err());
    }
}
