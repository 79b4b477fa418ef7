//! Boundary between compressed bytes and [`PixelBuffer`]s.
//!
//! [`CodecAdapter`] is the contract the core relies on. [`ImageCodec`]
//! implements it with the `image` crate when the `codec` feature is on;
//! callers with their own encoder plug in through the same trait.

use std::fmt;
use std::str::FromStr;

use image::ImageFormat;

use crate::error::{Error, Result};
use crate::imageops_enhance::dimensions::{fit_within, MAX_COMPRESS_SIDE};
use crate::imageops_enhance::pixel_buffer::PixelBuffer;
use crate::imageops_enhance::resample::{resize, ResampleSpec};
use crate::utils::validate_non_empty_image;

/// Largest accepted upload in bytes (10 MiB)
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// MIME types accepted by [`validate_upload`]
pub const SUPPORTED_MIME_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/webp"];

/// Encoded output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum OutputFormat {
    #[default]
    Jpeg,
    Png,
    WebP,
}

impl OutputFormat {
    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::WebP => "image/webp",
        }
    }

    pub const fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::WebP => "webp",
        }
    }

    /// Whether `quality` has no effect on the output
    pub const fn is_lossless(self) -> bool {
        matches!(self, Self::Png | Self::WebP)
    }

    /// Resolves a MIME type such as `"image/png"`. `image/jpg` is accepted
    /// as an alias of `image/jpeg`.
    ///
    /// # Errors
    ///
    /// * `Error::UnsupportedFormat` - For any other MIME type
    pub fn from_mime(mime: &str) -> Result<Self> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => Ok(Self::Jpeg),
            "image/png" => Ok(Self::Png),
            "image/webp" => Ok(Self::WebP),
            other => Err(Error::UnsupportedFormat(other.to_string())),
        }
    }

    pub const fn image_format(self) -> ImageFormat {
        match self {
            Self::Jpeg => ImageFormat::Jpeg,
            Self::Png => ImageFormat::Png,
            Self::WebP => ImageFormat::WebP,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime_type())
    }
}

/// Accepts a MIME type or a bare extension (`"png"`, `"jpg"`, `"webp"`).
impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            "png" => Ok(Self::Png),
            "webp" => Ok(Self::WebP),
            other => Self::from_mime(other),
        }
    }
}

/// Encoder settings
///
/// `quality` runs from 1 (smallest) to 100 (best) and is only used by JPEG.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EncodeOptions {
    pub format: OutputFormat,
    pub quality: u8,
}

impl EncodeOptions {
    pub const DEFAULT_QUALITY: u8 = 90;

    pub const fn new(format: OutputFormat, quality: u8) -> Self {
        Self { format, quality }
    }

    /// Quality clamped into `[1, 100]`
    pub fn effective_quality(&self) -> u8 {
        self.quality.clamp(1, 100)
    }
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self::new(OutputFormat::Jpeg, Self::DEFAULT_QUALITY)
    }
}

/// Converts between compressed bytes and pixel buffers
pub trait CodecAdapter {
    /// Decodes `bytes`. `mime_hint` selects the decoder when given;
    /// otherwise the format is guessed from the content.
    ///
    /// # Errors
    ///
    /// * `Error::Decode` - When the data cannot be decoded
    fn decode(&self, bytes: &[u8], mime_hint: Option<&str>) -> Result<PixelBuffer>;

    /// Encodes `buffer` with `options`.
    ///
    /// # Errors
    ///
    /// * `Error::Encode` - When the encoder fails
    fn encode(&self, buffer: &PixelBuffer, options: &EncodeOptions) -> Result<Vec<u8>>;
}

/// [`CodecAdapter`] backed by the `image` crate's JPEG, PNG and WebP codecs
///
/// JPEG has no alpha channel, so RGBA input loses alpha on the way out;
/// composite over a backdrop first to control the result. WebP is written
/// lossless.
#[cfg(feature = "codec")]
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageCodec;

#[cfg(feature = "codec")]
impl CodecAdapter for ImageCodec {
    fn decode(&self, bytes: &[u8], mime_hint: Option<&str>) -> Result<PixelBuffer> {
        let decoded = match mime_hint.and_then(ImageFormat::from_mime_type) {
            Some(format) => image::load_from_memory_with_format(bytes, format),
            None => image::load_from_memory(bytes),
        }
        .map_err(|e| Error::Decode(e.to_string()))?;

        log::debug!(
            "decoded {}x{} {:?}",
            decoded.width(),
            decoded.height(),
            decoded.color()
        );
        Ok(PixelBuffer::from(decoded))
    }

    fn encode(&self, buffer: &PixelBuffer, options: &EncodeOptions) -> Result<Vec<u8>> {
        use std::io::Cursor;

        use image::codecs::jpeg::JpegEncoder;

        let mut cursor = Cursor::new(Vec::new());
        match options.format {
            OutputFormat::Jpeg => {
                let rgb = buffer.to_rgb().into_dynamic_image()?;
                let encoder = JpegEncoder::new_with_quality(&mut cursor, options.effective_quality());
                rgb.write_with_encoder(encoder)
            }
            format => buffer
                .clone()
                .into_dynamic_image()?
                .write_to(&mut cursor, format.image_format()),
        }
        .map_err(|e| Error::Encode(e.to_string()))?;

        let bytes = cursor.into_inner();
        log::debug!(
            "encoded {}x{} as {} ({} bytes)",
            buffer.width(),
            buffer.height(),
            options.format,
            bytes.len()
        );
        Ok(bytes)
    }
}

/// Checks an upload before decoding.
///
/// # Errors
///
/// * `Error::UnsupportedFormat` - When `mime` is not JPEG, PNG or WebP
/// * `Error::FileTooLarge` - When `len` exceeds [`MAX_UPLOAD_BYTES`]
pub fn validate_upload(len: usize, mime: &str) -> Result<OutputFormat> {
    let format = OutputFormat::from_mime(mime)?;
    if len > MAX_UPLOAD_BYTES {
        return Err(Error::FileTooLarge {
            size: len,
            limit: MAX_UPLOAD_BYTES,
        });
    }
    Ok(format)
}

/// Shrinks `buffer` so its longer side is at most 1920 px, then encodes it.
///
/// Smaller images are encoded at their own size.
///
/// # Errors
///
/// * `Error::InvalidDimensions` - When `buffer` is empty
/// * `Error::Encode` - When the codec fails
pub fn compress(
    codec: &dyn CodecAdapter,
    buffer: &PixelBuffer,
    quality: u8,
    format: OutputFormat,
) -> Result<Vec<u8>> {
    let (width, height) = buffer.dimensions();
    validate_non_empty_image(width, height)?;
    let options = EncodeOptions::new(format, quality);
    let target = fit_within(width, height, MAX_COMPRESS_SIDE);

    if target == (width, height) {
        codec.encode(buffer, &options)
    } else {
        log::debug!("compress {width}x{height} -> {}x{}", target.0, target.1);
        let resized = resize(buffer, &ResampleSpec::new(target.0, target.1))?;
        codec.encode(&resized, &options)
    }
}
