//! Image codec layer
//!
//! Decodes source images, writes annotated copies in the canonical format
//! with embedded text attributes, and reads those attributes back.
//! Pixel decoding goes through the `image` crate; text chunks are handled
//! with the `png` crate, which `image` does not expose for writing.

pub mod png_text;
pub mod viewer;

use image::DynamicImage;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

use crate::contract::TextAttributes;

pub use viewer::{ImageViewer, SystemViewer};

/// Failure while decoding, encoding or inspecting an image
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("PNG decoding error: {0}")]
    PngDecode(#[from] png::DecodingError),

    #[error("PNG encoding error: {0}")]
    PngEncode(#[from] png::EncodingError),
}

/// The codec collaborator used by the annotator and the searcher
pub trait ImageCodec: Send + Sync {
    /// Decode a source image into pixels
    fn decode(&self, path: &Path) -> Result<DynamicImage, CodecError>;

    /// Write `image` to `destination` in the canonical format with `attributes`
    fn encode(
        &self,
        image: &DynamicImage,
        attributes: &TextAttributes,
        destination: &Path,
    ) -> Result<(), CodecError>;

    /// Read the text attributes embedded in an annotated image
    fn attributes_of(&self, path: &Path) -> Result<TextAttributes, CodecError>;
}

/// PNG codec: the canonical output format
#[derive(Debug, Clone, Copy, Default)]
pub struct PngCodec;

impl PngCodec {
    pub fn new() -> Self {
        Self
    }
}

impl ImageCodec for PngCodec {
    fn decode(&self, path: &Path) -> Result<DynamicImage, CodecError> {
        let image = image::ImageReader::open(path)?
            .with_guessed_format()?
            .decode()?;
        debug!(
            "Decoded {:?}: {}x{} {:?}",
            path,
            image.width(),
            image.height(),
            image.color()
        );
        Ok(image)
    }

    fn encode(
        &self,
        image: &DynamicImage,
        attributes: &TextAttributes,
        destination: &Path,
    ) -> Result<(), CodecError> {
        let layout = PixelLayout::from_image(image);

        let writer = BufWriter::new(File::create(destination)?);
        let mut encoder = png::Encoder::new(writer, image.width(), image.height());
        encoder.set_color(layout.color_type);
        encoder.set_depth(png::BitDepth::Eight);
        for (key, value) in attributes {
            png_text::add_text_attribute(&mut encoder, key, value)?;
        }

        let mut writer = encoder.write_header()?;
        writer.write_image_data(&layout.data)?;
        writer.finish()?;

        debug!("Encoded {:?} with {} attribute(s)", destination, attributes.len());
        Ok(())
    }

    fn attributes_of(&self, path: &Path) -> Result<TextAttributes, CodecError> {
        png_text::read_text_attributes(File::open(path)?)
    }
}

/// 8-bit pixel buffer with its matching PNG color type
struct PixelLayout {
    color_type: png::ColorType,
    data: Vec<u8>,
}

impl PixelLayout {
    /// 8-bit gray, gray-alpha, RGB and RGBA are kept; everything else
    /// (16-bit, float) is converted to RGBA8
    fn from_image(image: &DynamicImage) -> Self {
        match image {
            DynamicImage::ImageLuma8(buf) => Self {
                color_type: png::ColorType::Grayscale,
                data: buf.as_raw().clone(),
            },
            DynamicImage::ImageLumaA8(buf) => Self {
                color_type: png::ColorType::GrayscaleAlpha,
                data: buf.as_raw().clone(),
            },
            DynamicImage::ImageRgb8(buf) => Self {
                color_type: png::ColorType::Rgb,
                data: buf.as_raw().clone(),
            },
            DynamicImage::ImageRgba8(buf) => Self {
                color_type: png::ColorType::Rgba,
                data: buf.as_raw().clone(),
            },
            other => Self {
                color_type: png::ColorType::Rgba,
                data: other.to_rgba8().into_raw(),
            },
        }
    }
}
