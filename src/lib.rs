//! Lanczos resampling, unsharp masking, a denoise-upscale-sharpen pipeline
//! and alpha matte refinement for 8-bit RGB/RGBA rasters.
//!
//! Every operation takes a [`PixelBuffer`] by reference and returns a new
//! one. Parameter values are clamped into range; only structural problems
//! (empty images, missing alpha, a non-positive scale) are errors.
//!
//! ```
//! use imageops_enhance::{
//!     AlphaMatteExt, Backdrop, ChannelLayout, EnhanceExt, MatteSpec, PipelineSpec, PixelBuffer,
//!     ResampleSpec, ResizeExt, UnsharpParams,
//! };
//!
//! # fn example() -> Result<(), imageops_enhance::Error> {
//! let photo = PixelBuffer::filled(64, 48, ChannelLayout::Rgba, &[180, 120, 90, 255]);
//!
//! let thumbnail = photo.resized(&ResampleSpec::new(32, 24).with_unsharp(UnsharpParams::RESIZER))?;
//! let upscaled = photo.enhanced(&PipelineSpec::new(2.0, 60.0, 20.0))?;
//! let flattened = photo.apply_matte(&MatteSpec::new(2, "#ffffff".parse::<Backdrop>()?))?;
//!
//! assert_eq!(thumbnail.dimensions(), (32, 24));
//! assert_eq!(upscaled.dimensions(), (128, 96));
//! assert!(flattened.pixels().all(|p| p[3] == 255));
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! # Features
//!
//! * `codec` (default) - PNG, JPEG and WebP through [`ImageCodec`]
//! * `rayon` - Row passes run in parallel; output is byte-identical
//! * `serde` - `Serialize`/`Deserialize` for the parameter types

mod error;
mod imageops_enhance;
#[cfg(test)]
mod test_utils;
mod utils;

pub use enough::{Stop, StopReason, Unstoppable};
pub use error::{Error, Result};
#[cfg(feature = "codec")]
pub use imageops_enhance::codec::ImageCodec;
pub use imageops_enhance::codec::{
    compress, validate_upload, CodecAdapter, EncodeOptions, OutputFormat, MAX_UPLOAD_BYTES,
    SUPPORTED_MIME_TYPES,
};
pub use imageops_enhance::dimensions::{
    fit_aspect, fit_within, safe_resolution, PixelBudget, TargetSize, MAX_COMPRESS_SIDE,
};
pub use imageops_enhance::enhance::{enhance, enhance_with_stop, EnhanceExt, PipelineSpec};
pub use imageops_enhance::kernel::{lanczos3, InterpolationWeight, WeightTable, LANCZOS_SUPPORT};
pub use imageops_enhance::matte::{
    apply_matte, apply_matte_with_stop, composite_over_backdrop, refine_alpha,
    refine_alpha_with_stop, AlphaMatteExt, Backdrop, MatteSpec,
};
pub use imageops_enhance::models::{
    remove_background, LanczosUpscaler, Progress, SegmentationModel, SuperResModel,
};
pub use imageops_enhance::pixel_buffer::{ChannelLayout, PixelBuffer};
pub use imageops_enhance::resample::{resize, resize_with_stop, ResampleSpec, ResizeExt};
pub use imageops_enhance::unsharp::{blur, blur_with_stop, BlurExt, UnsharpParams};

pub use imageproc::definitions::Image;
