use enough::{Stop, Unstoppable};

use crate::error::Result;
use crate::imageops_enhance::alpha_premultiply::{
    premultiplied_plane, premultiply_plane, quantize_plane, unpremultiply_in_place,
};
use crate::imageops_enhance::kernel::{convolve_separable, WeightTable};
use crate::imageops_enhance::pixel_buffer::{FloatPlane, PixelBuffer};
use crate::utils::{clamp_param, validate_non_empty_image};

/// Parameters of the unsharp mask applied after resampling
///
/// * `amount` - Strength in percent; `0` disables sharpening
/// * `radius` - Standard deviation of the Gaussian blur, in output pixels
/// * `threshold` - Minimum per-channel difference between a pixel and its
///   blurred copy before it is sharpened, in 8-bit levels
///
/// Values are clamped by [`UnsharpParams::clamped`]: amount to `[0, 500]`,
/// radius to `[0.5, 5.0]`, threshold to `[0, 255]`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnsharpParams {
    pub amount: f32,
    pub radius: f32,
    pub threshold: f32,
}

impl UnsharpParams {
    /// No sharpening
    pub const NONE: Self = Self::new(0.0, 0.6, 0.0);

    /// Light sharpening used by the resize tool to counter resampling blur
    pub const RESIZER: Self = Self::new(80.0, 0.6, 2.0);

    pub const MAX_AMOUNT: f32 = 500.0;
    pub const MIN_RADIUS: f32 = 0.5;
    pub const MAX_RADIUS: f32 = 5.0;

    pub const fn new(amount: f32, radius: f32, threshold: f32) -> Self {
        Self {
            amount,
            radius,
            threshold,
        }
    }

    /// Returns a copy with every field clamped into its valid range.
    pub fn clamped(self) -> Self {
        Self {
            amount: clamp_param("unsharp amount", self.amount, 0.0, Self::MAX_AMOUNT, 0.0),
            radius: clamp_param(
                "unsharp radius",
                self.radius,
                Self::MIN_RADIUS,
                Self::MAX_RADIUS,
                Self::NONE.radius,
            ),
            threshold: clamp_param("unsharp threshold", self.threshold, 0.0, 255.0, 0.0),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.amount > 0.0
    }
}

impl Default for UnsharpParams {
    fn default() -> Self {
        Self::NONE
    }
}

/// Blurs a plane with a separable Gaussian of standard deviation `sigma`.
pub(crate) fn gaussian_blur_plane(
    plane: &FloatPlane,
    sigma: f32,
    stop: &dyn Stop,
) -> Result<FloatPlane> {
    let horizontal = WeightTable::gaussian(plane.width as u32, f64::from(sigma));
    let vertical = WeightTable::gaussian(plane.height as u32, f64::from(sigma));
    convolve_separable(plane, Some(&horizontal), Some(&vertical), stop)
}

/// Sharpens the color channels of a straight-alpha plane in place.
///
/// For every color channel, `value + amount / 100 * (value - blurred)` is
/// applied only where `|value - blurred| > threshold`. Alpha is left as is.
///
/// For RGBA the blurred reference is alpha weighted: the plane is blurred
/// premultiplied and divided by the blurred alpha, so transparent
/// neighbours do not pull edge pixels toward black. Pixels whose blurred
/// alpha would quantize to 0 have no reference and are left unchanged.
pub(crate) fn unsharp_mask_in_place(
    plane: &mut FloatPlane,
    params: &UnsharpParams,
    stop: &dyn Stop,
) -> Result<()> {
    if !params.is_enabled() {
        return Ok(());
    }
    let channels = plane.channels;
    let has_alpha = channels == 4;

    let blurred = if has_alpha {
        let mut reference = gaussian_blur_plane(&premultiply_plane(plane), params.radius, stop)?;
        unpremultiply_in_place(&mut reference);
        reference
    } else {
        gaussian_blur_plane(plane, params.radius, stop)?
    };
    let gain = params.amount / 100.0;

    plane
        .data
        .chunks_exact_mut(channels)
        .zip(blurred.data.chunks_exact(channels))
        .filter(|(_, blurred_pixel)| !has_alpha || blurred_pixel[3] >= 0.5)
        .for_each(|(pixel, blurred_pixel)| {
            pixel[..3]
                .iter_mut()
                .zip(&blurred_pixel[..3])
                .for_each(|(value, &blur)| {
                    let diff = *value - blur;
                    if diff.abs() > params.threshold {
                        *value += gain * diff;
                    }
                });
        });

    Ok(())
}

/// Applies an isotropic Gaussian blur with standard deviation `radius`.
///
/// RGBA input is blurred in premultiplied space and returned as straight
/// alpha. A radius of zero (or below) returns an unchanged copy.
///
/// # Errors
///
/// * `Error::InvalidDimensions` - When the source is empty
///
/// # Examples
///
/// ```
/// use imageops_enhance::{blur, ChannelLayout, PixelBuffer};
///
/// # fn example() -> Result<(), imageops_enhance::Error> {
/// let flat = PixelBuffer::filled(8, 8, ChannelLayout::Rgb, &[90, 120, 30]);
/// let blurred = blur(&flat, 1.5)?;
/// assert_eq!(blurred, flat);
/// # Ok(())
/// # }
/// # example().unwrap();
/// ```
pub fn blur(src: &PixelBuffer, radius: f32) -> Result<PixelBuffer> {
    blur_with_stop(src, radius, &Unstoppable)
}

/// [`blur`] with a stop token checked between row chunks.
///
/// # Errors
///
/// * `Error::InvalidDimensions` - When the source is empty
/// * `Error::Cancelled` - When `stop` is tripped
pub fn blur_with_stop(src: &PixelBuffer, radius: f32, stop: &dyn Stop) -> Result<PixelBuffer> {
    let (width, height) = src.dimensions();
    validate_non_empty_image(width, height)?;

    if !radius.is_finite() || radius <= 0.0 {
        return Ok(src.clone());
    }

    log::debug!("gaussian blur {width}x{height} sigma={radius}");
    let mut plane = gaussian_blur_plane(&premultiplied_plane(src), radius, stop)?;
    unpremultiply_in_place(&mut plane);
    quantize_plane(&plane, src.layout())
}

/// Trait providing Gaussian blur on pixel buffers
pub trait BlurExt {
    /// Blurs with standard deviation `radius`. See [`blur`].
    fn blurred(&self, radius: f32) -> Result<PixelBuffer>;
}

impl BlurExt for PixelBuffer {
    fn blurred(&self, radius: f32) -> Result<PixelBuffer> {
        blur(self, radius)
    }
}
