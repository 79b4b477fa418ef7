//! Interfaces to the slow, model-backed collaborators.
//!
//! Segmentation and super-resolution run outside this crate. The traits
//! here fix what the core expects from them: straight-alpha RGBA from a
//! segmenter, an upscaled buffer from a super-resolution model, and
//! progress reported as a percentage along the way.

use crate::error::{Error, Result};
use crate::imageops_enhance::enhance::{enhance, PipelineSpec};
use crate::imageops_enhance::matte::{apply_matte, MatteSpec};
use crate::imageops_enhance::pixel_buffer::PixelBuffer;

/// Progress callback receiving a percentage in `[0, 100]`
pub type Progress<'a> = &'a mut dyn FnMut(u8);

/// Produces a subject cutout from an image
pub trait SegmentationModel {
    /// Returns an RGBA straight-alpha buffer with the same dimensions as
    /// `image`, where alpha marks the subject.
    ///
    /// # Errors
    ///
    /// * `Error::Segmentation` - When the model fails
    fn segment(&self, image: &PixelBuffer, progress: Progress<'_>) -> Result<PixelBuffer>;
}

/// Upscales an image by a scale factor
pub trait SuperResModel {
    /// # Errors
    ///
    /// * `Error::Model` - When the model fails
    fn super_resolve(
        &self,
        image: &PixelBuffer,
        scale: f32,
        progress: Progress<'_>,
    ) -> Result<PixelBuffer>;
}

/// Non-neural [`SuperResModel`] running the Lanczos enhance pipeline
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LanczosUpscaler {
    pub clarity: f32,
    pub denoise: f32,
}

impl LanczosUpscaler {
    pub const fn new(clarity: f32, denoise: f32) -> Self {
        Self { clarity, denoise }
    }
}

impl SuperResModel for LanczosUpscaler {
    fn super_resolve(
        &self,
        image: &PixelBuffer,
        scale: f32,
        progress: Progress<'_>,
    ) -> Result<PixelBuffer> {
        progress(0);
        let upscaled = enhance(image, &PipelineSpec::new(scale, self.clarity, self.denoise))?;
        progress(100);
        Ok(upscaled)
    }
}

/// Segments `image`, then refines and composites the cutout with `matte`.
///
/// Progress from the model is forwarded unchanged; refinement is fast and
/// reports nothing.
///
/// # Errors
///
/// * `Error::Segmentation` - When the model fails or returns a buffer
///   without alpha or with different dimensions
pub fn remove_background(
    model: &dyn SegmentationModel,
    image: &PixelBuffer,
    matte: &MatteSpec,
    progress: Progress<'_>,
) -> Result<PixelBuffer> {
    let cutout = model.segment(image, progress)?;

    if !cutout.has_alpha() {
        return Err(Error::Segmentation(
            "model returned an image without alpha".to_string(),
        ));
    }
    if cutout.dimensions() != image.dimensions() {
        return Err(Error::Segmentation(format!(
            "model returned {}x{} for a {}x{} input",
            cutout.width(),
            cutout.height(),
            image.width(),
            image.height()
        )));
    }

    log::debug!(
        "remove background {}x{} erode={} backdrop={}",
        image.width(),
        image.height(),
        matte.erode_level,
        matte.backdrop
    );
    apply_matte(&cutout, matte)
}
