//! Conversions between 8-bit straight-alpha buffers and floating-point
//! working planes.
//!
//! Fully transparent pixels carry arbitrary color (often the removed
//! background), so convolution runs on premultiplied color. Every
//! convolution in this crate goes
//!
//! ```text
//! PixelBuffer (straight) -> premultiply -> convolve -> unpremultiply -> quantize
//! ```
//!
//! so buffers handed back to callers are always straight alpha again.

use crate::error::Result;
use crate::imageops_enhance::pixel_buffer::{ChannelLayout, FloatPlane, PixelBuffer};
use crate::utils::{normalize_alpha_with_max, quantize_u8};

const MAX_VALUE: f32 = 255.0;

/// Loads `buffer` into a float plane, premultiplying color by alpha for RGBA.
pub(crate) fn premultiplied_plane(buffer: &PixelBuffer) -> FloatPlane {
    let data = match buffer.layout() {
        ChannelLayout::Rgb => buffer.as_raw().iter().map(|&value| f32::from(value)).collect(),
        ChannelLayout::Rgba => buffer
            .pixels()
            .flat_map(|pixel| {
                let alpha = normalize_alpha_with_max(pixel[3], MAX_VALUE);
                [
                    f32::from(pixel[0]) * alpha,
                    f32::from(pixel[1]) * alpha,
                    f32::from(pixel[2]) * alpha,
                    f32::from(pixel[3]),
                ]
            })
            .collect(),
    };

    FloatPlane {
        width: buffer.width() as usize,
        height: buffer.height() as usize,
        channels: buffer.channels(),
        data,
    }
}

/// Returns a premultiplied copy of a straight-alpha float plane.
///
/// RGB planes are copied unchanged.
pub(crate) fn premultiply_plane(plane: &FloatPlane) -> FloatPlane {
    let mut premultiplied = plane.clone();
    if plane.channels == 4 {
        premultiplied.data.chunks_exact_mut(4).for_each(|pixel| {
            let alpha = pixel[3].clamp(0.0, MAX_VALUE) / MAX_VALUE;
            pixel[..3].iter_mut().for_each(|value| *value *= alpha);
        });
    }
    premultiplied
}

/// Divides premultiplied color back out of an RGBA plane in place.
///
/// Alpha is clamped to `[0, 255]` first since kernel overshoot can push it
/// outside. Pixels that would quantize to alpha 0 get black color.
pub(crate) fn unpremultiply_in_place(plane: &mut FloatPlane) {
    if plane.channels != 4 {
        return;
    }
    plane.data.chunks_exact_mut(4).for_each(|pixel| {
        let alpha = pixel[3].clamp(0.0, MAX_VALUE);
        pixel[3] = alpha;
        if alpha < 0.5 {
            pixel[..3].fill(0.0);
        } else {
            let scale = MAX_VALUE / alpha;
            pixel[..3].iter_mut().for_each(|value| *value *= scale);
        }
    });
}

/// Stores a straight-alpha float plane as an 8-bit buffer.
pub(crate) fn quantize_plane(plane: &FloatPlane, layout: ChannelLayout) -> Result<PixelBuffer> {
    let data = plane.data.iter().map(|&value| quantize_u8(value)).collect();
    PixelBuffer::with_layout(plane.width as u32, plane.height as u32, layout, data)
}
