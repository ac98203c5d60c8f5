//! Image encoding
//!
//! Turns host image tensors into base64 data URLs that can be embedded in a
//! task's JSON content. Pixel values are scaled from `[0, 1]` to 8 bits and
//! clipped. Images with an alpha channel or a mask are encoded as PNG, all
//! others as JPEG.

use std::io::Cursor;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::{DynamicImage, GrayImage, ImageFormat, RgbImage, RgbaImage};
use thiserror::Error;

/// Result type alias for encoding
pub type Result<T> = std::result::Result<T, EncodeError>;

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("image batch is empty")]
    EmptyBatch,

    #[error("tensor data has {actual} values, expected {expected} for its shape")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("unsupported channel count {0}, expected 1, 3 or 4")]
    UnsupportedChannels(usize),

    #[error("image dimensions {width}x{height} are out of range")]
    Dimensions { width: usize, height: usize },

    #[error("mask is {mask_width}x{mask_height} but image is {width}x{height}")]
    MaskSizeMismatch {
        width: usize,
        height: usize,
        mask_width: usize,
        mask_height: usize,
    },

    #[error("image encoding failed: {0}")]
    Image(#[from] image::ImageError),
}

/// A batch of images laid out as `[batch, height, width, channels]`
///
/// Values are nominally in `[0, 1]`; anything outside is clipped on encode.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageTensor {
    batch: usize,
    height: usize,
    width: usize,
    channels: usize,
    data: Vec<f32>,
}

impl ImageTensor {
    pub fn new(
        batch: usize,
        height: usize,
        width: usize,
        channels: usize,
        data: Vec<f32>,
    ) -> Result<Self> {
        if batch == 0 {
            return Err(EncodeError::EmptyBatch);
        }
        if !matches!(channels, 1 | 3 | 4) {
            return Err(EncodeError::UnsupportedChannels(channels));
        }
        let expected = height
            .checked_mul(width)
            .and_then(|n| n.checked_mul(channels))
            .and_then(|n| n.checked_mul(batch))
            .ok_or(EncodeError::Dimensions { width, height })?;
        if data.len() != expected {
            return Err(EncodeError::ShapeMismatch {
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            batch,
            height,
            width,
            channels,
            data,
        })
    }

    /// Single RGB image from 8-bit pixels
    pub fn from_rgb8(width: usize, height: usize, pixels: &[u8]) -> Result<Self> {
        let data = pixels.iter().map(|&p| f32::from(p) / 255.0).collect();
        Self::new(1, height, width, 3, data)
    }

    /// `(batch, height, width, channels)`
    pub fn shape(&self) -> (usize, usize, usize, usize) {
        (self.batch, self.height, self.width, self.channels)
    }

    // `new` checked that the whole batch length fits in usize
    fn frame(&self, index: usize) -> &[f32] {
        let len = self.height * self.width * self.channels;
        &self.data[index * len..(index + 1) * len]
    }
}

/// Per-pixel alpha, `[height, width]` in `[0, 1]`
#[derive(Debug, Clone, PartialEq)]
pub struct Mask {
    height: usize,
    width: usize,
    data: Vec<f32>,
}

impl Mask {
    pub fn new(height: usize, width: usize, data: Vec<f32>) -> Result<Self> {
        let expected = height
            .checked_mul(width)
            .ok_or(EncodeError::Dimensions { width, height })?;
        if data.len() != expected {
            return Err(EncodeError::ShapeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            height,
            width,
            data,
        })
    }
}

/// Compressed image bytes and their format
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub format: ImageFormat,
    pub bytes: Vec<u8>,
}

impl EncodedImage {
    pub fn mime_type(&self) -> &'static str {
        self.format.to_mime_type()
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type(), self.to_base64())
    }
}

fn to_u8(value: f32) -> u8 {
    (value * 255.0).clamp(0.0, 255.0) as u8
}

/// Encodes the first image of `tensor`, applying `mask` as its alpha channel
pub fn encode_image(tensor: &ImageTensor, mask: Option<&Mask>) -> Result<EncodedImage> {
    let (width, height) = match (u32::try_from(tensor.width), u32::try_from(tensor.height)) {
        (Ok(w), Ok(h)) if w > 0 && h > 0 => (w, h),
        _ => {
            return Err(EncodeError::Dimensions {
                width: tensor.width,
                height: tensor.height,
            });
        }
    };

    if let Some(mask) = mask {
        if mask.width != tensor.width || mask.height != tensor.height {
            return Err(EncodeError::MaskSizeMismatch {
                width: tensor.width,
                height: tensor.height,
                mask_width: mask.width,
                mask_height: mask.height,
            });
        }
    }

    let shape_error = || EncodeError::ShapeMismatch {
        expected: tensor.height * tensor.width * tensor.channels,
        actual: tensor.frame(0).len(),
    };

    let pixels: Vec<u8> = tensor.frame(0).iter().copied().map(to_u8).collect();
    let image = match tensor.channels {
        1 => DynamicImage::ImageLuma8(
            GrayImage::from_raw(width, height, pixels).ok_or_else(shape_error)?,
        ),
        3 => DynamicImage::ImageRgb8(
            RgbImage::from_raw(width, height, pixels).ok_or_else(shape_error)?,
        ),
        4 => DynamicImage::ImageRgba8(
            RgbaImage::from_raw(width, height, pixels).ok_or_else(shape_error)?,
        ),
        other => return Err(EncodeError::UnsupportedChannels(other)),
    };

    let (image, format) = match mask {
        Some(mask) => {
            let mut rgba = image.to_rgba8();
            for (pixel, &alpha) in rgba.pixels_mut().zip(&mask.data) {
                pixel.0[3] = to_u8(alpha);
            }
            (DynamicImage::ImageRgba8(rgba), ImageFormat::Png)
        }
        None if tensor.channels == 4 => (image, ImageFormat::Png),
        None => (image, ImageFormat::Jpeg),
    };

    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), format)?;

    Ok(EncodedImage { format, bytes })
}

/// Data URL for an optional host image; `None` in, `None` out
pub fn image_to_data_url(image: Option<&ImageTensor>, mask: Option<&Mask>) -> Result<Option<String>> {
    image
        .map(|tensor| encode_image(tensor, mask).map(|encoded| encoded.to_data_url()))
        .transpose()
}
