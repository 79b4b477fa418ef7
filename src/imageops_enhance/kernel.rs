//! Separable convolution kernels and the weight tables built from them.
//!
//! A [`WeightTable`] lists, for every destination sample on one axis, the
//! source samples that contribute to it and their normalized weights. The
//! same tables drive the Lanczos resampler and the Gaussian blur used by the
//! unsharp mask and the denoise pre-blur.
//!
//! Source indices outside `[0, len)` are clamped to the nearest edge sample.

use std::f64::consts::PI;
use std::ops::Range;

use enough::Stop;

use crate::error::Result;
use crate::imageops_enhance::pixel_buffer::FloatPlane;
use crate::utils::for_each_row;

/// Support radius of the Lanczos kernel in source samples
pub const LANCZOS_SUPPORT: f64 = 3.0;

/// Gaussian kernels are truncated at this many standard deviations
const GAUSSIAN_TRUNCATE: f64 = 3.0;

/// Element of the weight table for separable convolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InterpolationWeight {
    /// Destination sample this weight contributes to
    pub destination_index: u32,
    /// Source index, already clamped into the source range
    pub source_index: u32,
    /// Weight value
    pub weight: f32,
}

/// Per-axis table of contributing samples, grouped by destination index.
#[derive(Debug, Clone)]
pub struct WeightTable {
    entries: Vec<InterpolationWeight>,
    spans: Vec<Range<usize>>,
}

#[inline]
fn sinc(x: f64) -> f64 {
    if x == 0.0 {
        1.0
    } else {
        let px = PI * x;
        px.sin() / px
    }
}

/// Lanczos windowed sinc with a = 3.
#[inline]
pub fn lanczos3(x: f64) -> f64 {
    if x.abs() >= LANCZOS_SUPPORT {
        0.0
    } else {
        sinc(x) * sinc(x / LANCZOS_SUPPORT)
    }
}

impl WeightTable {
    /// Builds the table for resampling `src_len` samples to `dst_len`.
    ///
    /// Destination sample `d` maps to source coordinate
    /// `(d + 0.5) / scale - 0.5` with `scale = dst_len / src_len`. When
    /// shrinking, the kernel is stretched by `1 / scale` so it still covers
    /// every source sample that falls under the destination footprint.
    pub fn lanczos(src_len: u32, dst_len: u32) -> Self {
        let scale = f64::from(dst_len) / f64::from(src_len);
        let filter_scale = (1.0 / scale).max(1.0);
        let support = LANCZOS_SUPPORT * filter_scale;

        Self::build(
            src_len,
            dst_len,
            support,
            |dst| (f64::from(dst) + 0.5) / scale - 0.5,
            |distance| lanczos3(distance / filter_scale),
        )
    }

    /// Builds a same-length table for a Gaussian blur with standard deviation `sigma`.
    pub fn gaussian(len: u32, sigma: f64) -> Self {
        let support = (sigma * GAUSSIAN_TRUNCATE).ceil().max(1.0);
        let denominator = 2.0 * sigma * sigma;

        Self::build(
            len,
            len,
            support,
            f64::from,
            |distance| (-(distance * distance) / denominator).exp(),
        )
    }

    fn build<C, K>(src_len: u32, dst_len: u32, support: f64, center_of: C, kernel: K) -> Self
    where
        C: Fn(u32) -> f64,
        K: Fn(f64) -> f64,
    {
        let last = i64::from(src_len) - 1;
        let mut entries = Vec::new();
        let mut spans = Vec::with_capacity(dst_len as usize);
        let mut weights = Vec::new();

        for dst in 0..dst_len {
            let center = center_of(dst);
            let first = (center - support).floor() as i64;
            let end = (center + support).ceil() as i64;

            weights.clear();
            for index in first..=end {
                let weight = kernel(index as f64 - center);
                if weight != 0.0 {
                    weights.push((index.clamp(0, last) as u32, weight));
                }
            }

            let sum: f64 = weights.iter().map(|&(_, weight)| weight).sum();
            let start = entries.len();
            if sum.abs() < f64::EPSILON {
                // Degenerate window: fall back to the nearest sample.
                let nearest = (center.round() as i64).clamp(0, last) as u32;
                entries.push(InterpolationWeight {
                    destination_index: dst,
                    source_index: nearest,
                    weight: 1.0,
                });
            } else {
                entries.extend(weights.iter().map(|&(source_index, weight)| {
                    InterpolationWeight {
                        destination_index: dst,
                        source_index,
                        weight: (weight / sum) as f32,
                    }
                }));
            }
            spans.push(start..entries.len());
        }

        Self { entries, spans }
    }

    /// Number of destination samples
    pub fn dst_len(&self) -> usize {
        self.spans.len()
    }

    /// Contributions to destination sample `dst`
    pub fn span(&self, dst: usize) -> &[InterpolationWeight] {
        &self.entries[self.spans[dst].clone()]
    }

    /// Every contribution in destination order; [`WeightTable::span`] slices
    /// this per destination sample
    pub fn entries(&self) -> &[InterpolationWeight] {
        &self.entries
    }
}

/// Convolves every row of `src` with `table`, producing `table.dst_len()` columns.
pub(crate) fn convolve_horizontal(
    src: &FloatPlane,
    table: &WeightTable,
    stop: &dyn Stop,
) -> Result<FloatPlane> {
    let channels = src.channels;
    let mut output = FloatPlane::zeros(table.dst_len(), src.height, channels);
    let row_len = output.row_len();

    for_each_row(&mut output.data, row_len, stop, |y, row| {
        let src_row = src.row(y);
        for (dst_x, pixel) in row.chunks_exact_mut(channels).enumerate() {
            for entry in table.span(dst_x) {
                let start = entry.source_index as usize * channels;
                let source = &src_row[start..start + channels];
                pixel
                    .iter_mut()
                    .zip(source)
                    .for_each(|(out, &value)| *out += value * entry.weight);
            }
        }
    })?;

    Ok(output)
}

/// Convolves every column of `src` with `table`, producing `table.dst_len()` rows.
pub(crate) fn convolve_vertical(
    src: &FloatPlane,
    table: &WeightTable,
    stop: &dyn Stop,
) -> Result<FloatPlane> {
    let mut output = FloatPlane::zeros(src.width, table.dst_len(), src.channels);
    let row_len = output.row_len();

    for_each_row(&mut output.data, row_len, stop, |dst_y, row| {
        for entry in table.span(dst_y) {
            let source = src.row(entry.source_index as usize);
            row.iter_mut()
                .zip(source)
                .for_each(|(out, &value)| *out += value * entry.weight);
        }
    })?;

    Ok(output)
}

/// Runs the horizontal then the vertical pass.
///
/// An axis whose table is `None` is left untouched.
pub(crate) fn convolve_separable(
    src: &FloatPlane,
    horizontal: Option<&WeightTable>,
    vertical: Option<&WeightTable>,
    stop: &dyn Stop,
) -> Result<FloatPlane> {
    let after_horizontal = match horizontal {
        Some(table) => convolve_horizontal(src, table, stop)?,
        None => src.clone(),
    };
    match vertical {
        Some(table) => convolve_vertical(&after_horizontal, table, stop),
        None => Ok(after_horizontal),
    }
}
