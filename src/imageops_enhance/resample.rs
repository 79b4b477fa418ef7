use enough::{Stop, Unstoppable};

use crate::error::Result;
use crate::imageops_enhance::alpha_premultiply::{
    premultiplied_plane, quantize_plane, unpremultiply_in_place,
};
use crate::imageops_enhance::kernel::{convolve_separable, WeightTable};
use crate::imageops_enhance::pixel_buffer::PixelBuffer;
use crate::imageops_enhance::unsharp::{unsharp_mask_in_place, UnsharpParams};
use crate::utils::validate_non_empty_image;

/// Target of a Lanczos resize
///
/// The kernel is fixed to Lanczos with a support radius of 3 source samples
/// (widened proportionally when downscaling). `unsharp` is applied to the
/// resized image when its amount is above zero.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResampleSpec {
    pub width: u32,
    pub height: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub unsharp: UnsharpParams,
}

impl ResampleSpec {
    /// Resize to `width` x `height` without sharpening.
    pub const fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            unsharp: UnsharpParams::NONE,
        }
    }

    pub const fn with_unsharp(mut self, unsharp: UnsharpParams) -> Self {
        self.unsharp = unsharp;
        self
    }

    pub const fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Resizes `src` with a separable Lanczos-3 filter and optional unsharp mask.
///
/// The horizontal pass runs first, then the vertical pass. Intermediate
/// values stay in `f32` and are rounded to 8 bits only at the final store.
/// RGBA data is filtered premultiplied and returned as straight alpha.
///
/// Resizing to the source dimensions with sharpening disabled returns a
/// byte-identical copy.
///
/// # Errors
///
/// * `Error::InvalidDimensions` - When the target or the source has a zero side
///
/// # Examples
///
/// ```
/// use imageops_enhance::{resize, ChannelLayout, PixelBuffer, ResampleSpec, UnsharpParams};
///
/// # fn example() -> Result<(), imageops_enhance::Error> {
/// let src = PixelBuffer::filled(4, 4, ChannelLayout::Rgb, &[255, 0, 0]);
/// let spec = ResampleSpec::new(8, 8).with_unsharp(UnsharpParams::RESIZER);
/// let resized = resize(&src, &spec)?;
/// assert_eq!(resized.dimensions(), (8, 8));
/// # Ok(())
/// # }
/// # example().unwrap();
/// ```
pub fn resize(src: &PixelBuffer, spec: &ResampleSpec) -> Result<PixelBuffer> {
    resize_with_stop(src, spec, &Unstoppable)
}

/// [`resize`] with a stop token checked between row chunks of every pass.
///
/// # Errors
///
/// * `Error::InvalidDimensions` - When the target or the source has a zero side
/// * `Error::Cancelled` - When `stop` is tripped; no partial result is returned
pub fn resize_with_stop(
    src: &PixelBuffer,
    spec: &ResampleSpec,
    stop: &dyn Stop,
) -> Result<PixelBuffer> {
    validate_non_empty_image(spec.width, spec.height)?;
    let (src_width, src_height) = src.dimensions();
    validate_non_empty_image(src_width, src_height)?;

    let unsharp = spec.unsharp.clamped();
    let same_size = (src_width, src_height) == spec.dimensions();

    if same_size && !unsharp.is_enabled() {
        log::debug!("resize {src_width}x{src_height}: same size, copying");
        return Ok(src.clone());
    }

    log::debug!(
        "resize {}x{} -> {}x{} (unsharp amount={} radius={} threshold={})",
        src_width,
        src_height,
        spec.width,
        spec.height,
        unsharp.amount,
        unsharp.radius,
        unsharp.threshold
    );

    let horizontal = (src_width != spec.width).then(|| WeightTable::lanczos(src_width, spec.width));
    let vertical =
        (src_height != spec.height).then(|| WeightTable::lanczos(src_height, spec.height));

    let mut plane = convolve_separable(
        &premultiplied_plane(src),
        horizontal.as_ref(),
        vertical.as_ref(),
        stop,
    )?;
    unpremultiply_in_place(&mut plane);
    unsharp_mask_in_place(&mut plane, &unsharp, stop)?;

    quantize_plane(&plane, src.layout())
}

/// Trait providing Lanczos resampling on pixel buffers
pub trait ResizeExt {
    /// Resizes according to `spec`. See [`resize`].
    fn resized(&self, spec: &ResampleSpec) -> Result<PixelBuffer>;

    /// Resizes to exactly `width` x `height` without sharpening.
    fn resized_to(&self, width: u32, height: u32) -> Result<PixelBuffer> {
        self.resized(&ResampleSpec::new(width, height))
    }
}

impl ResizeExt for PixelBuffer {
    fn resized(&self, spec: &ResampleSpec) -> Result<PixelBuffer> {
        resize(self, spec)
    }
}
