//! Four-stage pixel preprocessor: calibration subtract, percentile squash,
//! unsharp mask, center crop. Each stage lives in its own module and is
//! independently unit-tested; [`pipeline::preprocess`] wires them together.

pub mod calibration;
pub mod crop;
pub mod pipeline;
pub mod squash;
pub mod unsharp;

pub use pipeline::{preprocess, ProcessedImage};
