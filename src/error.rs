use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for every operation in this crate
///
/// Structural problems with the input (bad dimensions, wrong channel layout)
/// are always reported. Parameter values outside their sane range are
/// clamped by the operations instead, so they never show up here.
///
/// Failures of external collaborators (codecs and models) keep their own
/// variant so a caller can tell "unsupported file" apart from
/// "try a smaller image".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Width or height is zero
    #[error("Invalid dimensions {width}x{height}: width and height must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// Channel count is neither 3 (RGB) nor 4 (RGBA)
    #[error("Unsupported channel layout: {channels} channels (expected 3 or 4)")]
    UnsupportedChannelLayout { channels: u8 },

    /// Raw data does not hold `width * height * channels` bytes
    #[error("Buffer length mismatch: expected {expected} bytes, got {actual}")]
    BufferLengthMismatch { expected: usize, actual: usize },

    /// The operation needs an RGBA buffer
    #[error("Image has no alpha channel")]
    MissingAlphaChannel,

    /// Scale factor is zero, negative or not finite
    #[error("Invalid scale factor: {0}")]
    InvalidScaleFactor(String),

    /// A backdrop color string could not be parsed
    #[error("Invalid color: {0}")]
    InvalidColor(String),

    /// The MIME type is not one of the supported formats
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Upload exceeds the size limit
    #[error("File too large: {size} bytes (limit is {limit} bytes)")]
    FileTooLarge { size: usize, limit: usize },

    /// The codec failed to decode the input bytes
    #[error("Decode error: {0}")]
    Decode(String),

    /// The codec failed to encode the buffer
    #[error("Encode error: {0}")]
    Encode(String),

    /// The segmentation model failed
    #[error("Segmentation error: {0}")]
    Segmentation(String),

    /// The super-resolution model failed
    #[error("Model error: {0}")]
    Model(String),

    /// A stop token was tripped before the operation finished
    #[error("Operation cancelled")]
    Cancelled,
}

impl From<enough::StopReason> for Error {
    fn from(_: enough::StopReason) -> Self {
        Self::Cancelled
    }
}
