//! Property-based tests for imageops-enhance
//!
//! These tests use proptest to verify invariants that should hold for all
//! inputs to the resampler, the matte refiner and the enhance pipeline.

use imageops_enhance::{
    composite_over_backdrop, enhance, fit_aspect, fit_within, refine_alpha, resize,
    safe_resolution, Backdrop, ChannelLayout, PipelineSpec, PixelBudget, PixelBuffer,
    ResampleSpec, TargetSize, UnsharpParams,
};
use proptest::prelude::*;

/// Strategy for generating small but valid image dimensions
fn image_dimensions() -> impl Strategy<Value = (u32, u32)> {
    (1u32..=16, 1u32..=16)
}

/// Strategy for generating a channel layout
fn channel_layout() -> impl Strategy<Value = ChannelLayout> {
    prop_oneof![Just(ChannelLayout::Rgb), Just(ChannelLayout::Rgba)]
}

/// Strategy for generating a buffer filled with arbitrary bytes
fn pixel_buffer() -> impl Strategy<Value = PixelBuffer> {
    (image_dimensions(), channel_layout()).prop_flat_map(|((width, height), layout)| {
        let len = (width * height) as usize * layout.channels();
        prop::collection::vec(any::<u8>(), len).prop_map(move |data| {
            PixelBuffer::with_layout(width, height, layout, data).unwrap()
        })
    })
}

/// Strategy for generating an RGBA buffer with arbitrary bytes
fn rgba_buffer() -> impl Strategy<Value = PixelBuffer> {
    image_dimensions().prop_flat_map(|(width, height)| {
        prop::collection::vec(any::<u8>(), (width * height * 4) as usize)
            .prop_map(move |data| PixelBuffer::new(width, height, 4, data).unwrap())
    })
}

proptest! {
    /// Property: Resize always produces exactly the requested dimensions
    #[test]
    fn resize_produces_requested_dimensions(
        src in pixel_buffer(),
        (width, height) in image_dimensions(),
        amount in 0.0f32..200.0,
    ) {
        let spec = ResampleSpec::new(width, height)
            .with_unsharp(UnsharpParams::new(amount, 0.6, 2.0));
        let result = resize(&src, &spec).unwrap();

        prop_assert_eq!(result.dimensions(), (width, height));
        prop_assert_eq!(result.layout(), src.layout());
        prop_assert_eq!(result.as_raw().len(), (width * height) as usize * src.channels());
    }

    /// Property: Same-size resize without sharpening is the identity
    #[test]
    fn resize_to_same_size_is_identity(src in pixel_buffer()) {
        let spec = ResampleSpec::new(src.width(), src.height());
        prop_assert_eq!(resize(&src, &spec).unwrap(), src);
    }

    /// Property: A flat opaque image stays flat under resampling
    #[test]
    fn resize_preserves_flat_color(
        (width, height) in image_dimensions(),
        (target_width, target_height) in image_dimensions(),
        (r, g, b) in (any::<u8>(), any::<u8>(), any::<u8>()),
    ) {
        let src = PixelBuffer::filled(width, height, ChannelLayout::Rgba, &[r, g, b, 255]);
        let result = resize(&src, &ResampleSpec::new(target_width, target_height)).unwrap();

        for pixel in result.pixels() {
            prop_assert!(pixel[0].abs_diff(r) <= 1);
            prop_assert!(pixel[1].abs_diff(g) <= 1);
            prop_assert!(pixel[2].abs_diff(b) <= 1);
            prop_assert!(pixel[3] >= 254);
        }
    }

    /// Property: Erode level 0 returns the input unchanged
    #[test]
    fn refine_alpha_level_zero_is_identity(src in rgba_buffer()) {
        prop_assert_eq!(refine_alpha(&src, 0).unwrap(), src);
    }

    /// Property: Erosion never raises alpha and never touches color
    #[test]
    fn refine_alpha_is_monotonic_and_color_preserving(
        src in rgba_buffer(),
        level in 1u32..6,
    ) {
        let once = refine_alpha(&src, level).unwrap();
        let more = refine_alpha(&src, level + 1).unwrap();

        for ((original, eroded), further) in src.pixels().zip(once.pixels()).zip(more.pixels()) {
            prop_assert!(eroded[3] <= original[3]);
            prop_assert!(further[3] <= eroded[3]);
            prop_assert_eq!(&eroded[..3], &original[..3]);
        }
    }

    /// Property: Composite at alpha 255 keeps the subject, at alpha 0 shows the backdrop
    #[test]
    fn composite_respects_alpha_extremes(
        (width, height) in image_dimensions(),
        subject_color in any::<[u8; 3]>(),
        backdrop_color in any::<[u8; 3]>(),
        opaque in any::<bool>(),
    ) {
        let [r, g, b] = subject_color;
        let alpha = if opaque { 255 } else { 0 };
        let subject = PixelBuffer::filled(width, height, ChannelLayout::Rgba, &[r, g, b, alpha]);
        let [br, bg, bb] = backdrop_color;

        let result = composite_over_backdrop(&subject, Backdrop::rgb(br, bg, bb)).unwrap();
        let expected = if opaque { [r, g, b, 255] } else { [br, bg, bb, 255] };
        prop_assert!(result.pixels().all(|p| p == expected));
    }

    /// Property: enhance is deterministic
    #[test]
    fn enhance_is_deterministic(
        src in pixel_buffer(),
        scale in 0.5f32..3.0,
        clarity in 0.0f32..250.0,
        denoise in 0.0f32..100.0,
    ) {
        let spec = PipelineSpec::new(scale, clarity, denoise);
        prop_assert_eq!(enhance(&src, &spec).unwrap(), enhance(&src, &spec).unwrap());
    }

    /// Property: Aspect-preserving sizes are never zero
    #[test]
    fn fit_aspect_sides_are_positive(
        (width, height) in (1u32..5000, 1u32..5000),
        side in 1u32..5000,
        by_width in any::<bool>(),
    ) {
        let target = if by_width { TargetSize::Width(side) } else { TargetSize::Height(side) };
        let (w, h) = fit_aspect((width, height), target);
        prop_assert!(w >= 1 && h >= 1);
    }

    /// Property: Safe resolution never grows an image and respects the budget
    #[test]
    fn safe_resolution_fits_budget(
        (width, height) in (1u32..10_000, 1u32..10_000),
    ) {
        let (w, h) = safe_resolution(width, height, PixelBudget::LowEnd);
        prop_assert!(w <= width && h <= height);
        if w > 1 && h > 1 {
            prop_assert!(u64::from(w) * u64::from(h) <= PixelBudget::LowEnd.max_pixels());
        }
    }

    /// Property: fit_within caps the longer side and never upscales
    #[test]
    fn fit_within_caps_longer_side(
        (width, height) in (1u32..8000, 1u32..8000),
        max_side in 1u32..4000,
    ) {
        let (w, h) = fit_within(width, height, max_side);
        prop_assert!(w.max(h) <= max_side);
        prop_assert!(w <= width && h <= height);
    }
}
