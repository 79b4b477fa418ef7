use image::{DynamicImage, Rgb, RgbImage, Rgba, RgbaImage};
use imageproc::definitions::Image;

use crate::error::{Error, Result};

/// Channel layout of a [`PixelBuffer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ChannelLayout {
    /// 3 channels, no alpha
    Rgb,
    /// 4 channels, straight (non-premultiplied) alpha last
    Rgba,
}

impl ChannelLayout {
    /// Resolves a channel count to a layout.
    ///
    /// # Errors
    ///
    /// * `Error::UnsupportedChannelLayout` - When `channels` is not 3 or 4
    pub fn from_channels(channels: u8) -> Result<Self> {
        match channels {
            3 => Ok(Self::Rgb),
            4 => Ok(Self::Rgba),
            _ => Err(Error::UnsupportedChannelLayout { channels }),
        }
    }

    /// Number of interleaved channels per pixel
    pub const fn channels(self) -> usize {
        match self {
            Self::Rgb => 3,
            Self::Rgba => 4,
        }
    }

    pub const fn has_alpha(self) -> bool {
        matches!(self, Self::Rgba)
    }
}

/// An 8-bit RGB or RGBA raster, row-major and tightly packed
///
/// Color values are straight alpha. Every operation in this crate takes a
/// buffer by reference and returns a freshly allocated one, so a buffer is
/// never modified once produced.
///
/// Invariant: `as_raw().len() == width * height * channels`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    layout: ChannelLayout,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Wraps raw interleaved pixel data.
    ///
    /// # Arguments
    ///
    /// * `width` - Width in pixels
    /// * `height` - Height in pixels
    /// * `channels` - 3 for RGB, 4 for RGBA
    /// * `data` - Row-major pixel data
    ///
    /// # Errors
    ///
    /// * `Error::UnsupportedChannelLayout` - When `channels` is not 3 or 4
    /// * `Error::BufferLengthMismatch` - When `data` does not hold exactly
    ///   `width * height * channels` bytes
    ///
    /// # Examples
    ///
    /// ```
    /// use imageops_enhance::PixelBuffer;
    ///
    /// # fn example() -> Result<(), imageops_enhance::Error> {
    /// let buffer = PixelBuffer::new(2, 1, 3, vec![255, 0, 0, 0, 255, 0])?;
    /// assert_eq!(buffer.pixel(1, 0), &[0, 255, 0]);
    /// # Ok(())
    /// # }
    /// # example().unwrap();
    /// ```
    pub fn new(width: u32, height: u32, channels: u8, data: Vec<u8>) -> Result<Self> {
        let layout = ChannelLayout::from_channels(channels)?;
        Self::with_layout(width, height, layout, data)
    }

    /// Same as [`PixelBuffer::new`] with an already resolved layout.
    pub fn with_layout(width: u32, height: u32, layout: ChannelLayout, data: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * layout.channels();
        if data.len() != expected {
            return Err(Error::BufferLengthMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            layout,
            data,
        })
    }

    /// Creates a buffer with every pixel set to `pixel`.
    ///
    /// `pixel` is truncated to the layout's channel count; missing channels
    /// are filled with 255.
    pub fn filled(width: u32, height: u32, layout: ChannelLayout, pixel: &[u8]) -> Self {
        let channels = layout.channels();
        let mut value = [255u8; 4];
        value
            .iter_mut()
            .zip(pixel)
            .for_each(|(slot, &channel)| *slot = channel);

        let data = value[..channels]
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * channels)
            .collect();

        Self {
            width,
            height,
            layout,
            data,
        }
    }

    pub const fn width(&self) -> u32 {
        self.width
    }

    pub const fn height(&self) -> u32 {
        self.height
    }

    pub const fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub const fn layout(&self) -> ChannelLayout {
        self.layout
    }

    pub const fn channels(&self) -> usize {
        self.layout.channels()
    }

    pub const fn has_alpha(&self) -> bool {
        self.layout.has_alpha()
    }

    /// Length of one row in bytes
    pub const fn row_len(&self) -> usize {
        self.width as usize * self.layout.channels()
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// Channels of the pixel at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> &[u8] {
        assert!(
            x < self.width && y < self.height,
            "pixel ({x}, {y}) out of bounds for {}x{}",
            self.width,
            self.height
        );
        let channels = self.channels();
        let start = (y as usize * self.width as usize + x as usize) * channels;
        &self.data[start..start + channels]
    }

    /// Iterates over the pixels in row-major order.
    pub fn pixels(&self) -> std::slice::ChunksExact<'_, u8> {
        self.data.chunks_exact(self.channels())
    }

    /// Converts into an `image` crate buffer of the matching layout.
    ///
    /// # Errors
    ///
    /// * `Error::BufferLengthMismatch` - When the data no longer matches the
    ///   dimensions
    pub fn into_dynamic_image(self) -> Result<DynamicImage> {
        match self.layout {
            ChannelLayout::Rgb => Image::<Rgb<u8>>::try_from(self).map(DynamicImage::ImageRgb8),
            ChannelLayout::Rgba => Image::<Rgba<u8>>::try_from(self).map(DynamicImage::ImageRgba8),
        }
    }

    /// Returns an RGBA copy, adding an opaque alpha channel to RGB data.
    pub fn to_rgba(&self) -> Self {
        match self.layout {
            ChannelLayout::Rgba => self.clone(),
            ChannelLayout::Rgb => {
                let data = self
                    .data
                    .chunks_exact(3)
                    .flat_map(|rgb| [rgb[0], rgb[1], rgb[2], 255])
                    .collect();
                Self {
                    width: self.width,
                    height: self.height,
                    layout: ChannelLayout::Rgba,
                    data,
                }
            }
        }
    }

    /// Returns an RGB copy, dropping the alpha channel without compositing.
    pub fn to_rgb(&self) -> Self {
        match self.layout {
            ChannelLayout::Rgb => self.clone(),
            ChannelLayout::Rgba => {
                let data = self
                    .data
                    .chunks_exact(4)
                    .flat_map(|rgba| [rgba[0], rgba[1], rgba[2]])
                    .collect();
                Self {
                    width: self.width,
                    height: self.height,
                    layout: ChannelLayout::Rgb,
                    data,
                }
            }
        }
    }
}

impl From<Image<Rgb<u8>>> for PixelBuffer {
    fn from(image: Image<Rgb<u8>>) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            layout: ChannelLayout::Rgb,
            data: image.into_raw(),
        }
    }
}

impl From<Image<Rgba<u8>>> for PixelBuffer {
    fn from(image: Image<Rgba<u8>>) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            layout: ChannelLayout::Rgba,
            data: image.into_raw(),
        }
    }
}

/// Normalizes any decoded image to 8-bit RGB or RGBA.
///
/// Layouts carrying alpha become RGBA, everything else RGB. Wider sample
/// types are reduced to 8 bits.
impl From<DynamicImage> for PixelBuffer {
    fn from(image: DynamicImage) -> Self {
        match image {
            DynamicImage::ImageRgb8(buffer) => buffer.into(),
            DynamicImage::ImageRgba8(buffer) => buffer.into(),
            other if other.color().has_alpha() => other.to_rgba8().into(),
            other => other.to_rgb8().into(),
        }
    }
}

impl TryFrom<PixelBuffer> for DynamicImage {
    type Error = Error;

    fn try_from(buffer: PixelBuffer) -> Result<Self> {
        buffer.into_dynamic_image()
    }
}

impl TryFrom<PixelBuffer> for Image<Rgba<u8>> {
    type Error = Error;

    fn try_from(buffer: PixelBuffer) -> Result<Self> {
        if !buffer.has_alpha() {
            return Err(Error::MissingAlphaChannel);
        }
        let (width, height) = buffer.dimensions();
        let actual = buffer.data.len();
        RgbaImage::from_raw(width, height, buffer.data).ok_or(Error::BufferLengthMismatch {
            expected: width as usize * height as usize * 4,
            actual,
        })
    }
}

impl TryFrom<PixelBuffer> for Image<Rgb<u8>> {
    type Error = Error;

    fn try_from(buffer: PixelBuffer) -> Result<Self> {
        let buffer = buffer.to_rgb();
        let (width, height) = buffer.dimensions();
        let actual = buffer.data.len();
        RgbImage::from_raw(width, height, buffer.data).ok_or(Error::BufferLengthMismatch {
            expected: width as usize * height as usize * 3,
            actual,
        })
    }
}

/// Floating-point working copy used between convolution passes
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FloatPlane {
    pub width: usize,
    pub height: usize,
    pub channels: usize,
    pub data: Vec<f32>,
}

impl FloatPlane {
    pub fn zeros(width: usize, height: usize, channels: usize) -> Self {
        Self {
            width,
            height,
            channels,
            data: vec![0.0; width * height * channels],
        }
    }

    pub const fn row_len(&self) -> usize {
        self.width * self.channels
    }

    pub fn row(&self, y: usize) -> &[f32] {
        let row_len = self.row_len();
        &self.data[y * row_len..(y + 1) * row_len]
    }
}
