//! Target size arithmetic done by callers before invoking the core.
//!
//! None of these functions touch pixels. [`safe_resolution`] in particular
//! is the caller-side guard against oversized inputs; the resampler never
//! applies it on its own.

/// Longest side produced by [`crate::compress`]
pub const MAX_COMPRESS_SIDE: u32 = 1920;

/// Requested output size for an aspect-preserving resize
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TargetSize {
    /// Both sides given, aspect ratio may change
    Exact(u32, u32),
    /// Width given, height follows the source aspect ratio
    Width(u32),
    /// Height given, width follows the source aspect ratio
    Height(u32),
}

/// Resolves `target` against the `original` dimensions.
///
/// With [`TargetSize::Width`] the height becomes `round(width / ratio)`,
/// with [`TargetSize::Height`] the width becomes `round(height * ratio)`,
/// where `ratio = original_width / original_height`. Derived sides are
/// never below 1. A zero-sized original yields the requested side and 1.
///
/// # Examples
///
/// ```
/// use imageops_enhance::{fit_aspect, TargetSize};
///
/// assert_eq!(fit_aspect((1920, 1080), TargetSize::Width(1280)), (1280, 720));
/// assert_eq!(fit_aspect((1920, 1080), TargetSize::Height(540)), (960, 540));
/// ```
pub fn fit_aspect(original: (u32, u32), target: TargetSize) -> (u32, u32) {
    let (width, height) = original;
    if width == 0 || height == 0 {
        return match target {
            TargetSize::Exact(w, h) => (w, h),
            TargetSize::Width(w) => (w, 1),
            TargetSize::Height(h) => (1, h),
        };
    }
    let ratio = f64::from(width) / f64::from(height);
    let derive = |value: f64| value.round().clamp(1.0, f64::from(u32::MAX)) as u32;

    match target {
        TargetSize::Exact(w, h) => (w, h),
        TargetSize::Width(w) => (w, derive(f64::from(w) / ratio)),
        TargetSize::Height(h) => (derive(f64::from(h) * ratio), h),
    }
}

/// Pixel count ceiling for a device class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PixelBudget {
    /// 1920x1080
    LowEnd,
    /// 3840x2160
    #[default]
    Standard,
    /// Explicit pixel count
    Custom(u64),
}

impl PixelBudget {
    pub const fn max_pixels(self) -> u64 {
        match self {
            Self::LowEnd => 2_073_600,
            Self::Standard => 8_294_400,
            Self::Custom(pixels) => pixels,
        }
    }
}

/// Shrinks `width` x `height` until it fits `budget`, keeping the aspect ratio.
///
/// Dimensions already within budget are returned unchanged. Otherwise both
/// sides are multiplied by `sqrt(max / current)` and floored, never below 1.
pub fn safe_resolution(width: u32, height: u32, budget: PixelBudget) -> (u32, u32) {
    let current = u64::from(width) * u64::from(height);
    let max = budget.max_pixels();
    if current <= max {
        return (width, height);
    }

    let ratio = (max as f64 / current as f64).sqrt();
    let shrink = |side: u32| ((f64::from(side) * ratio).floor() as u32).max(1);
    let result = (shrink(width), shrink(height));
    log::debug!("safe resolution {width}x{height} -> {}x{}", result.0, result.1);
    result
}

/// Caps the longer side at `max_side`, keeping the aspect ratio.
///
/// Never upscales. The shorter side is rounded and kept at least 1.
pub fn fit_within(width: u32, height: u32, max_side: u32) -> (u32, u32) {
    let longest = width.max(height);
    if longest <= max_side || max_side == 0 {
        return (width, height);
    }
    let ratio = f64::from(max_side) / f64::from(longest);
    let scale = |side: u32| ((f64::from(side) * ratio).round() as u32).clamp(1, max_side);
    if width >= height {
        (max_side, scale(height))
    } else {
        (scale(width), max_side)
    }
}
