pub mod alpha_premultiply;
pub mod codec;
pub mod dimensions;
pub mod enhance;
pub mod kernel;
pub mod matte;
pub mod models;
pub mod pixel_buffer;
pub mod resample;
pub mod unsharp;
