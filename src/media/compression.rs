//! Client-side photo compression before upload.

use async_trait::async_trait;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};

use crate::domain::media::MediaFile;
use crate::media::MediaError;

/// Bounds applied to photos before they are attached.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompressionOptions {
    /// Longest side after resizing, in pixels.
    pub max_dimension: u32,
    /// Size the encoder aims for; quality steps down until reached.
    pub target_bytes: u64,
    pub initial_quality: u8,
    pub min_quality: u8,
    pub quality_step: u8,
}

impl Default for CompressionOptions {
    fn default() -> Self {
        Self {
            max_dimension: 1920,
            target_bytes: 1024 * 1024,
            initial_quality: 85,
            min_quality: 40,
            quality_step: 10,
        }
    }
}

/// Shrinks an image file, returning the replacement binary.
#[async_trait]
pub trait ImageCompressor: Send + Sync {
    async fn compress(&self, file: MediaFile) -> Result<MediaFile, MediaError>;
}

/// Re-encodes photos as JPEG on the blocking thread pool.
#[derive(Clone, Debug, Default)]
pub struct JpegCompressor {
    options: CompressionOptions,
}

impl JpegCompressor {
    pub fn new(options: CompressionOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CompressionOptions {
        &self.options
    }
}

#[async_trait]
impl ImageCompressor for JpegCompressor {
    async fn compress(&self, file: MediaFile) -> Result<MediaFile, MediaError> {
        let options = self.options;
        tokio::task::spawn_blocking(move || compress_to_jpeg(&file, &options))
            .await
            .map_err(|err| MediaError::Task(err.to_string()))?
    }
}

/// Resizes to fit `max_dimension` and lowers JPEG quality until the target
/// size or the minimum quality is reached.
///
/// Files already within both bounds are returned untouched.
pub fn compress_to_jpeg(
    file: &MediaFile,
    options: &CompressionOptions,
) -> Result<MediaFile, MediaError> {
    let image = image::load_from_memory(&file.data)?;
    let (width, height) = image.dimensions();
    let oversized = width.max(height) > options.max_dimension;

    if !oversized && file.size() <= options.target_bytes {
        return Ok(file.clone());
    }

    let image = if oversized {
        image.resize(options.max_dimension, options.max_dimension, FilterType::Lanczos3)
    } else {
        image
    };
    let rgb = DynamicImage::ImageRgb8(image.to_rgb8());

    let step = options.quality_step.max(1);
    let mut quality = options.initial_quality.max(options.min_quality);
    loop {
        let encoded = encode_jpeg(&rgb, quality)?;
        if encoded.len() as u64 <= options.target_bytes || quality <= options.min_quality {
            log::debug!(
                "Compressed {} from {} to {} bytes at quality {quality}",
                file.name,
                file.size(),
                encoded.len()
            );
            return Ok(MediaFile::new(jpeg_name(&file.name), "image/jpeg", encoded));
        }
        quality = quality.saturating_sub(step).max(options.min_quality);
    }
}

fn encode_jpeg(image: &DynamicImage, quality: u8) -> Result<Vec<u8>, MediaError> {
    let mut buffer = Vec::new();
    image.write_with_encoder(JpegEncoder::new_with_quality(&mut buffer, quality))?;
    Ok(buffer)
}

fn jpeg_name(name: &str) -> String {
    match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => format!("{stem}.jpg"),
        _ => format!("{name}.jpg"),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use image::{ImageFormat, RgbImage};

    use super::*;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let pixels = RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, ((x ^ y) % 256) as u8])
        });
        let mut buffer = Vec::new();
        DynamicImage::ImageRgb8(pixels)
            .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .unwrap();
        buffer
    }

    #[tokio::test]
    async fn large_photos_are_resized_and_reencoded() {
        let file = MediaFile::new("shop.png", "image/png", png(2400, 1200));
        let compressor = JpegCompressor::default();

        let compressed = compressor.compress(file).await.unwrap();

        assert_eq!(compressed.name, "shop.jpg");
        assert_eq!(compressed.mime, "image/jpeg");
        let decoded = image::load_from_memory(&compressed.data).unwrap();
        assert_eq!(decoded.dimensions(), (1920, 960));
    }

    #[test]
    fn small_photos_pass_through() {
        let file = MediaFile::new("icon.png", "image/png", png(32, 32));
        let result = compress_to_jpeg(&file, &CompressionOptions::default()).unwrap();
        assert_eq!(result, file);
    }

    #[test]
    fn undecodable_bytes_are_an_error() {
        let file = MediaFile::new("broken.jpg", "image/jpeg", vec![0u8, 1, 2, 3]);
        assert!(matches!(
            compress_to_jpeg(&file, &CompressionOptions::default()),
            Err(MediaError::Decode(_))
        ));
    }

    #[test]
    fn jpeg_names_replace_extension() {
        assert_eq!(jpeg_name("a.b.png"), "a.b.jpg");
        assert_eq!(jpeg_name("noext"), "noext.jpg");
        assert_eq!(jpeg_name(".hidden"), ".hidden.jpg");
    }
}
