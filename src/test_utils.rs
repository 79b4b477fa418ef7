//! Test utilities for imageops-enhance
//!
//! This module provides common fixtures for testing image operations.
//! It is only compiled when running tests.

use image::{Rgb, Rgba};
use imageproc::definitions::Image;

use crate::imageops_enhance::pixel_buffer::{ChannelLayout, PixelBuffer};

/// Creates a test RGB image with predefined pixel values for testing.
///
/// This function creates a 2x2 test image with known pixel values:
/// - (0,0): [200, 150, 100]
/// - (1,0): [100, 200, 150]
/// - (0,1): [150, 100, 200]
/// - (1,1): [50, 75, 25]
pub fn create_test_rgb_image() -> Image<Rgb<u8>> {
    let mut image: Image<Rgb<u8>> = Image::new(2, 2);
    image.put_pixel(0, 0, Rgb([200, 150, 100]));
    image.put_pixel(1, 0, Rgb([100, 200, 150]));
    image.put_pixel(0, 1, Rgb([150, 100, 200]));
    image.put_pixel(1, 1, Rgb([50, 75, 25]));
    image
}

/// Creates a test RGBA image with predefined pixel values for testing.
///
/// This function creates a 2x2 test image with known pixel values including alpha:
/// - (0,0): [200, 150, 100, 255] (opaque)
/// - (1,0): [100, 200, 150, 128] (semi-transparent)
/// - (0,1): [150, 100, 200, 64]  (more transparent)
/// - (1,1): [50, 75, 25, 0]      (fully transparent)
pub fn create_test_rgba_image() -> Image<Rgba<u8>> {
    let mut image: Image<Rgba<u8>> = Image::new(2, 2);
    image.put_pixel(0, 0, Rgba([200, 150, 100, 255]));
    image.put_pixel(1, 0, Rgba([100, 200, 150, 128]));
    image.put_pixel(0, 1, Rgba([150, 100, 200, 64]));
    image.put_pixel(1, 1, Rgba([50, 75, 25, 0]));
    image
}

/// Creates a buffer with horizontal and vertical ramps plus a checker pattern.
///
/// - red ramps from 0 to 255 left to right
/// - green ramps from 0 to 255 top to bottom
/// - blue alternates between 220 and 30 in 3x3 blocks
/// - alpha (RGBA only) varies between 128 and 255
///
/// The checker gives the buffer hard edges so sharpening and blurring
/// always have something to change.
pub fn create_gradient_buffer(width: u32, height: u32, layout: ChannelLayout) -> PixelBuffer {
    let ramp = |value: u32, len: u32| (value * 255 / (len.max(2) - 1)).min(255) as u8;
    let mut data = Vec::with_capacity(width as usize * height as usize * layout.channels());

    for y in 0..height {
        for x in 0..width {
            let blue = if (x / 3 + y / 3) % 2 == 0 { 220 } else { 30 };
            data.extend_from_slice(&[ramp(x, width), ramp(y, height), blue]);
            if layout.has_alpha() {
                data.push(255 - ((x * 17 + y * 31) % 128) as u8);
            }
        }
    }

    PixelBuffer::with_layout(width, height, layout, data).unwrap()
}

/// Creates an RGBA subject that is opaque inside a frame and transparent outside.
///
/// Pixels with `border <= x < width - border` and `border <= y < height - border`
/// have alpha 255, all others alpha 0. Color varies per pixel on both sides.
pub fn create_framed_subject(width: u32, height: u32, border: u32) -> PixelBuffer {
    let inside = |value: u32, len: u32| value >= border && value + border < len;
    let mut data = Vec::with_capacity(width as usize * height as usize * 4);

    for y in 0..height {
        for x in 0..width {
            let alpha = if inside(x, width) && inside(y, height) {
                255
            } else {
                0
            };
            data.extend_from_slice(&[
                (x * 23 % 256) as u8,
                (y * 41 % 256) as u8,
                ((x + y) * 13 % 256) as u8,
                alpha,
            ]);
        }
    }

    PixelBuffer::with_layout(width, height, ChannelLayout::Rgba, data).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_test_rgb_image_with_valid_input_creates_image() {
        let image = create_test_rgb_image();
        assert_eq!(image.dimensions(), (2, 2));
        assert_eq!(image.get_pixel(0, 0), &Rgb([200, 150, 100]));
        assert_eq!(image.get_pixel(1, 1), &Rgb([50, 75, 25]));
    }

    #[test]
    fn create_gradient_buffer_spans_full_range() {
        let buffer = create_gradient_buffer(5, 4, ChannelLayout::Rgba);
        assert_eq!(buffer.pixel(0, 0)[0], 0);
        assert_eq!(buffer.pixel(4, 0)[0], 255);
        assert_eq!(buffer.pixel(0, 3)[1], 255);
        assert_eq!(buffer.pixel(0, 0)[3], 255);
        assert_ne!(buffer.pixel(0, 0)[2], buffer.pixel(3, 0)[2]);
    }

    #[test]
    fn create_framed_subject_marks_interior_opaque() {
        let subject = create_framed_subject(6, 5, 1);
        assert_eq!(subject.pixel(0, 0)[3], 0);
        assert_eq!(subject.pixel(1, 1)[3], 255);
        assert_eq!(subject.pixel(4, 3)[3], 255);
        assert_eq!(subject.pixel(5, 3)[3], 0);
        assert_eq!(subject.pixel(4, 4)[3], 0);
    }
}
