//! Internal utility functions for imageops-enhance.
//!
//! This module contains common functionality used across different image operations.

use enough::Stop;
use imageproc::definitions::Clamp;

use crate::error::{Error, Result};

/// Number of rows handed to a worker between stop-token checks.
pub const ROWS_PER_CHUNK: usize = 16;

/// Converts an accumulated channel value to 8-bit with round-to-nearest.
///
/// `imageproc`'s clamp truncates, so the value is rounded first. NaN maps to 0.
#[inline]
pub fn quantize_u8(value: f32) -> u8 {
    if value.is_nan() {
        return 0;
    }
    <u8 as Clamp<f32>>::clamp(value.round())
}

/// Normalizes an alpha value using a pre-computed max value.
///
/// # Arguments
///
/// * `alpha` - The alpha value to normalize
/// * `max_value` - The pre-computed maximum value for the type
///
/// # Returns
///
/// The normalized alpha value as a floating-point number between 0 and 1
#[inline]
pub fn normalize_alpha_with_max<S>(alpha: S, max_value: f32) -> f32
where
    S: Into<f32>,
{
    alpha.into() / max_value
}

/// Validates that an image has non-zero dimensions.
///
/// # Arguments
///
/// * `width` - The width of the image
/// * `height` - The height of the image
///
/// # Returns
///
/// `Ok(())` if the dimensions are valid, otherwise `Error::InvalidDimensions`
pub fn validate_non_empty_image(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        Err(Error::InvalidDimensions { width, height })
    } else {
        Ok(())
    }
}

/// Runs `f` on every row of `output`, checking `stop` between row chunks.
///
/// `f` receives the row index and the mutable row slice. Rows are written
/// independently, so the result does not depend on how rows are partitioned
/// across threads.
pub fn for_each_row<T, F>(output: &mut [T], row_len: usize, stop: &dyn Stop, f: F) -> Result<()>
where
    T: Send,
    F: Fn(usize, &mut [T]) + Sync,
{
    if row_len == 0 {
        return Ok(());
    }
    let chunk_len = row_len * ROWS_PER_CHUNK;

    let process_chunk = |chunk_index: usize, chunk: &mut [T]| -> Result<()> {
        stop.check()?;
        for (offset, row) in chunk.chunks_mut(row_len).enumerate() {
            f(chunk_index * ROWS_PER_CHUNK + offset, row);
        }
        Ok(())
    };

    #[cfg(feature = "rayon")]
    {
        use rayon::prelude::*;
        output
            .par_chunks_mut(chunk_len)
            .enumerate()
            .try_for_each(|(chunk_index, chunk)| process_chunk(chunk_index, chunk))
    }

    #[cfg(not(feature = "rayon"))]
    {
        output
            .chunks_mut(chunk_len)
            .enumerate()
            .try_for_each(|(chunk_index, chunk)| process_chunk(chunk_index, chunk))
    }
}

/// Clamps `value` into `[min, max]`, logging a warning when it had to move.
///
/// Non-finite values are replaced by `fallback`.
pub fn clamp_param(name: &str, value: f32, min: f32, max: f32, fallback: f32) -> f32 {
    if !value.is_finite() {
        log::warn!("{name} = {value} is not finite, using {fallback}");
        return fallback;
    }
    let clamped = value.clamp(min, max);
    if clamped != value {
        log::warn!("{name} = {value} clamped to {clamped}");
    }
    clamped
}
