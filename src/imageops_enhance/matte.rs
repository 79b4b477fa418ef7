//! Alpha matte refinement for segmented cutouts.
//!
//! Segmentation models leave a band of translucent pixels around the subject
//! whose color still carries the old background ("halo"). Refinement shrinks
//! the alpha mask with a plus-shaped morphological erosion, one pixel per
//! level, so those pixels turn transparent. Only alpha is eroded; color
//! channels are never mixed with their neighbors.
//!
//! After refinement, [`composite_over_backdrop`] places the subject over a
//! solid color or leaves it transparent.

use std::fmt;
use std::str::FromStr;

use enough::{Stop, Unstoppable};
use image::Rgb;
use itertools::izip;

use crate::error::{Error, Result};
use crate::imageops_enhance::pixel_buffer::PixelBuffer;
use crate::utils::validate_non_empty_image;

/// What the refined subject is placed on
///
/// With the `serde` feature it is stored in its string form
/// (`"transparent"` or `"#rrggbb"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(into = "String", try_from = "String")
)]
pub enum Backdrop {
    /// Keep the alpha channel
    #[default]
    Transparent,
    /// Flatten onto an opaque color
    Color(Rgb<u8>),
}

impl Backdrop {
    pub const fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self::Color(Rgb([red, green, blue]))
    }
}

/// Parses `"transparent"`, `#rgb` or `#rrggbb` (case-insensitive).
impl FromStr for Backdrop {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        let trimmed = value.trim();
        if trimmed.eq_ignore_ascii_case("transparent") {
            return Ok(Self::Transparent);
        }

        let invalid = || Error::InvalidColor(value.to_string());
        let hex = trimmed.strip_prefix('#').ok_or_else(invalid)?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let channel = |digits: &str| u8::from_str_radix(digits, 16).map_err(|_| invalid());
        match hex.len() {
            3 => {
                let expand = |i: usize| channel(&hex[i..=i].repeat(2));
                Ok(Self::rgb(expand(0)?, expand(1)?, expand(2)?))
            }
            6 => Ok(Self::rgb(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            _ => Err(invalid()),
        }
    }
}

impl TryFrom<String> for Backdrop {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Backdrop> for String {
    fn from(backdrop: Backdrop) -> Self {
        backdrop.to_string()
    }
}

impl fmt::Display for Backdrop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transparent => f.write_str("transparent"),
            Self::Color(Rgb([red, green, blue])) => write!(f, "#{red:02x}{green:02x}{blue:02x}"),
        }
    }
}

/// Settings of the background remover's edge cleanup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MatteSpec {
    /// Erosion iterations; typical range 0 to 10
    pub erode_level: u32,
    pub backdrop: Backdrop,
}

impl MatteSpec {
    pub const fn new(erode_level: u32, backdrop: Backdrop) -> Self {
        Self {
            erode_level,
            backdrop,
        }
    }
}

/// One-pixel shift directions intersected per erosion iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shift {
    Left,
    Right,
    Up,
    Down,
}

impl Shift {
    const ALL: [Self; 4] = [Self::Left, Self::Right, Self::Up, Self::Down];
}

/// Level beyond which erosion no longer changes anything.
///
/// After `k` iterations every alpha is the minimum over a diamond of radius
/// `k`; at `width + height - 2` the diamond covers the whole image.
const fn max_useful_level(width: u32, height: u32) -> u32 {
    width.saturating_add(height).saturating_sub(2)
}

/// Intersects `next` with a copy of `alpha` shifted by one pixel.
///
/// Out-of-range neighbors repeat the edge pixel.
fn intersect_shifted(next: &mut [u8], alpha: &[u8], width: usize, height: usize, shift: Shift) {
    for (y, row) in next.chunks_exact_mut(width).enumerate() {
        let source_y = match shift {
            Shift::Up => (y + 1).min(height - 1),
            Shift::Down => y.saturating_sub(1),
            Shift::Left | Shift::Right => y,
        };
        let source_row = &alpha[source_y * width..(source_y + 1) * width];

        for (x, value) in row.iter_mut().enumerate() {
            let source_x = match shift {
                Shift::Left => (x + 1).min(width - 1),
                Shift::Right => x.saturating_sub(1),
                Shift::Up | Shift::Down => x,
            };
            *value = (*value).min(source_row[source_x]);
        }
    }
}

/// Erodes the alpha channel of an RGBA subject by `erode_level` pixels.
///
/// Each level takes, for every pixel, the minimum alpha of the pixel and its
/// four direct neighbors (edges repeat). RGB values are copied unchanged.
/// Level 0 returns an identical copy. Levels past `width + height - 2` are
/// clamped since the result stops changing there.
///
/// Input must be straight alpha.
///
/// # Errors
///
/// * `Error::MissingAlphaChannel` - When `subject` is RGB
/// * `Error::InvalidDimensions` - When `subject` is empty
///
/// # Examples
///
/// ```
/// use imageops_enhance::{refine_alpha, PixelBuffer};
///
/// # fn example() -> Result<(), imageops_enhance::Error> {
/// let mut data = vec![0u8; 3 * 3 * 4];
/// data.chunks_exact_mut(4).for_each(|p| p.copy_from_slice(&[9, 9, 9, 255]));
/// data[3] = 0; // top-left transparent
/// let subject = PixelBuffer::new(3, 3, 4, data)?;
///
/// let refined = refine_alpha(&subject, 1)?;
/// assert_eq!(refined.pixel(1, 0)[3], 0);
/// assert_eq!(refined.pixel(1, 1)[3], 255);
/// # Ok(())
/// # }
/// # example().unwrap();
/// ```
pub fn refine_alpha(subject: &PixelBuffer, erode_level: u32) -> Result<PixelBuffer> {
    refine_alpha_with_stop(subject, erode_level, &Unstoppable)
}

/// [`refine_alpha`] with a stop token checked between iterations.
///
/// # Errors
///
/// * `Error::MissingAlphaChannel` - When `subject` is RGB
/// * `Error::Cancelled` - When `stop` is tripped
pub fn refine_alpha_with_stop(
    subject: &PixelBuffer,
    erode_level: u32,
    stop: &dyn Stop,
) -> Result<PixelBuffer> {
    if !subject.has_alpha() {
        return Err(Error::MissingAlphaChannel);
    }
    let (width, height) = subject.dimensions();
    validate_non_empty_image(width, height)?;
    if erode_level == 0 {
        return Ok(subject.clone());
    }

    let level = erode_level.min(max_useful_level(width, height));
    if level != erode_level {
        log::debug!("erode level {erode_level} clamped to {level} for {width}x{height}");
    }
    log::debug!("refine alpha {width}x{height} level={level}");

    let (w, h) = (width as usize, height as usize);
    let mut alpha: Vec<u8> = subject.pixels().map(|pixel| pixel[3]).collect();

    for iteration in 0..level {
        stop.check()?;
        let mut next = alpha.clone();
        for shift in Shift::ALL {
            intersect_shifted(&mut next, &alpha, w, h, shift);
        }
        if next == alpha {
            log::trace!("erosion reached a fixed point after {iteration} iterations");
            break;
        }
        alpha = next;
    }

    let mut data = subject.as_raw().to_vec();
    data.chunks_exact_mut(4)
        .zip(&alpha)
        .for_each(|(pixel, &value)| pixel[3] = value);
    PixelBuffer::with_layout(width, height, subject.layout(), data)
}

/// Places `subject` over `backdrop`.
///
/// With [`Backdrop::Transparent`] the subject is returned unchanged. With a
/// color, every pixel becomes `subject * a + backdrop * (1 - a)` per channel
/// (straight-alpha over, `a = alpha / 255`) and alpha becomes 255. The
/// output keeps the RGBA layout.
///
/// # Errors
///
/// * `Error::MissingAlphaChannel` - When `subject` is RGB
pub fn composite_over_backdrop(subject: &PixelBuffer, backdrop: Backdrop) -> Result<PixelBuffer> {
    if !subject.has_alpha() {
        return Err(Error::MissingAlphaChannel);
    }
    let Backdrop::Color(Rgb(backdrop_color)) = backdrop else {
        return Ok(subject.clone());
    };
    log::debug!(
        "composite {}x{} over {backdrop}",
        subject.width(),
        subject.height()
    );

    let mut data = subject.as_raw().to_vec();
    data.chunks_exact_mut(4).for_each(|pixel| {
        let alpha = u32::from(pixel[3]);
        let inverse = 255 - alpha;
        for (channel, &back) in izip!(pixel[..3].iter_mut(), backdrop_color.iter()) {
            let mixed = u32::from(*channel) * alpha + u32::from(back) * inverse;
            *channel = ((mixed + 127) / 255) as u8;
        }
        pixel[3] = 255;
    });

    PixelBuffer::with_layout(subject.width(), subject.height(), subject.layout(), data)
}

/// Erodes with `spec.erode_level`, then composites over `spec.backdrop`.
///
/// # Errors
///
/// * `Error::MissingAlphaChannel` - When `subject` is RGB
pub fn apply_matte(subject: &PixelBuffer, spec: &MatteSpec) -> Result<PixelBuffer> {
    apply_matte_with_stop(subject, spec, &Unstoppable)
}

/// [`apply_matte`] with a stop token checked between erosion iterations.
///
/// # Errors
///
/// * `Error::MissingAlphaChannel` - When `subject` is RGB
/// * `Error::Cancelled` - When `stop` is tripped
pub fn apply_matte_with_stop(
    subject: &PixelBuffer,
    spec: &MatteSpec,
    stop: &dyn Stop,
) -> Result<PixelBuffer> {
    let refined = refine_alpha_with_stop(subject, spec.erode_level, stop)?;
    composite_over_backdrop(&refined, spec.backdrop)
}

/// Trait providing alpha matte refinement on RGBA pixel buffers
pub trait AlphaMatteExt {
    /// See [`refine_alpha`].
    fn refine_alpha(&self, erode_level: u32) -> Result<PixelBuffer>;

    /// See [`composite_over_backdrop`].
    fn composite_over(&self, backdrop: Backdrop) -> Result<PixelBuffer>;

    /// See [`apply_matte`].
    fn apply_matte(&self, spec: &MatteSpec) -> Result<PixelBuffer>;
}

impl AlphaMatteExt for PixelBuffer {
    fn refine_alpha(&self, erode_level: u32) -> Result<PixelBuffer> {
        refine_alpha(self, erode_level)
    }

    fn composite_over(&self, backdrop: Backdrop) -> Result<PixelBuffer> {
        composite_over_backdrop(self, backdrop)
    }

    fn apply_matte(&self, spec: &MatteSpec) -> Result<PixelBuffer> {
        apply_matte(self, spec)
    }
}
