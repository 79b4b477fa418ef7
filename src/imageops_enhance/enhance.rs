use enough::{Stop, Unstoppable};

use crate::error::{Error, Result};
use crate::imageops_enhance::pixel_buffer::PixelBuffer;
use crate::imageops_enhance::resample::{resize_with_stop, ResampleSpec};
use crate::imageops_enhance::unsharp::{blur_with_stop, UnsharpParams};
use crate::utils::clamp_param;

/// Parameters of the denoise, upscale and sharpen pipeline
///
/// * `scale` - Factor applied to both sides, must be positive
/// * `clarity` - Unsharp amount in percent, clamped to `[0, 250]`
/// * `denoise` - Noise reduction strength, clamped to `[0, 100]`
///
/// The unsharp threshold rises with `denoise` (`1 + denoise * 0.5`) so the
/// sharpening pass does not bring back grain that the pre-blur removed.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PipelineSpec {
    pub scale: f32,
    pub clarity: f32,
    pub denoise: f32,
}

impl PipelineSpec {
    pub const MAX_CLARITY: f32 = 250.0;
    pub const MAX_DENOISE: f32 = 100.0;

    pub const fn new(scale: f32, clarity: f32, denoise: f32) -> Self {
        Self {
            scale,
            clarity,
            denoise,
        }
    }

    /// Sharpening threshold derived from denoise strength
    pub fn unsharp_threshold(&self) -> f32 {
        1.0 + self.denoise * 0.5
    }

    /// Pre-blur standard deviation in source pixels
    pub fn pre_blur_radius(&self) -> f32 {
        self.denoise * 0.02
    }

    /// Sharpening radius derived from the scale factor
    pub fn unsharp_radius(&self) -> f32 {
        0.6 + self.scale * 0.1
    }

    /// Unsharp parameters for the resampling stage
    pub fn unsharp_params(&self) -> UnsharpParams {
        UnsharpParams::new(self.clarity, self.unsharp_radius(), self.unsharp_threshold())
    }

    /// Returns a copy with `clarity` and `denoise` clamped. `scale` is kept.
    pub fn clamped(self) -> Self {
        Self {
            scale: self.scale,
            clarity: clamp_param("clarity", self.clarity, 0.0, Self::MAX_CLARITY, 0.0),
            denoise: clamp_param("denoise", self.denoise, 0.0, Self::MAX_DENOISE, 0.0),
        }
    }

    /// Output dimensions for a `width` x `height` source.
    ///
    /// Each side is `round(side * scale)`, never below 1.
    ///
    /// # Errors
    ///
    /// * `Error::InvalidScaleFactor` - When `scale` is not a positive finite
    ///   number or the result does not fit in `u32`
    pub fn target_dimensions(&self, width: u32, height: u32) -> Result<(u32, u32)> {
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(Error::InvalidScaleFactor(format!(
                "scale must be positive and finite, got {}",
                self.scale
            )));
        }
        let scale_side = |side: u32| -> Result<u32> {
            let scaled = (f64::from(side) * f64::from(self.scale)).round().max(1.0);
            if scaled > f64::from(u32::MAX) {
                return Err(Error::InvalidScaleFactor(format!(
                    "scale {} overflows {width}x{height}",
                    self.scale
                )));
            }
            Ok(scaled as u32)
        };
        Ok((scale_side(width)?, scale_side(height)?))
    }
}

impl Default for PipelineSpec {
    fn default() -> Self {
        Self::new(2.0, 0.0, 0.0)
    }
}

/// Denoises, upscales and sharpens `src`.
///
/// 1. When `denoise > 0`, `src` is blurred with a Gaussian of standard
///    deviation `denoise * 0.02` source pixels.
/// 2. The result is resampled to `round(size * scale)` with an unsharp mask
///    of amount `clarity`, radius `0.6 + scale * 0.1` and threshold
///    `1 + denoise * 0.5`.
///
/// With `denoise == 0` and `clarity == 0` this equals a plain [`resize`].
///
/// [`resize`]: crate::resize
///
/// # Errors
///
/// * `Error::InvalidScaleFactor` - When `spec.scale` is zero, negative or not finite
/// * `Error::InvalidDimensions` - When the source is empty
///
/// # Examples
///
/// ```
/// use imageops_enhance::{enhance, ChannelLayout, PipelineSpec, PixelBuffer};
///
/// # fn example() -> Result<(), imageops_enhance::Error> {
/// let src = PixelBuffer::filled(16, 9, ChannelLayout::Rgb, &[40, 80, 120]);
/// let upscaled = enhance(&src, &PipelineSpec::new(2.0, 50.0, 10.0))?;
/// assert_eq!(upscaled.dimensions(), (32, 18));
/// # Ok(())
/// # }
/// # example().unwrap();
/// ```
pub fn enhance(src: &PixelBuffer, spec: &PipelineSpec) -> Result<PixelBuffer> {
    enhance_with_stop(src, spec, &Unstoppable)
}

/// [`enhance`] with a stop token checked throughout both stages.
///
/// # Errors
///
/// * `Error::InvalidScaleFactor` - When `spec.scale` is zero, negative or not finite
/// * `Error::InvalidDimensions` - When the source is empty
/// * `Error::Cancelled` - When `stop` is tripped
pub fn enhance_with_stop(
    src: &PixelBuffer,
    spec: &PipelineSpec,
    stop: &dyn Stop,
) -> Result<PixelBuffer> {
    let spec = spec.clamped();
    let (width, height) = spec.target_dimensions(src.width(), src.height())?;
    let unsharp = spec.unsharp_params();

    log::debug!(
        "enhance {}x{} -> {width}x{height} (scale={} clarity={} denoise={}, pre-blur={} threshold={})",
        src.width(),
        src.height(),
        spec.scale,
        spec.clarity,
        spec.denoise,
        spec.pre_blur_radius(),
        unsharp.threshold
    );

    let resample = ResampleSpec::new(width, height).with_unsharp(unsharp);
    if spec.denoise > 0.0 {
        let denoised = blur_with_stop(src, spec.pre_blur_radius(), stop)?;
        resize_with_stop(&denoised, &resample, stop)
    } else {
        resize_with_stop(src, &resample, stop)
    }
}

/// Trait providing the denoise, upscale and sharpen pipeline on pixel buffers
pub trait EnhanceExt {
    /// See [`enhance`].
    fn enhanced(&self, spec: &PipelineSpec) -> Result<PixelBuffer>;

    /// Upscales by `scale` without denoise or sharpening.
    fn upscaled(&self, scale: f32) -> Result<PixelBuffer> {
        self.enhanced(&PipelineSpec::new(scale, 0.0, 0.0))
    }
}

impl EnhanceExt for PixelBuffer {
    fn enhanced(&self, spec: &PipelineSpec) -> Result<PixelBuffer> {
        enhance(self, spec)
    }
}
