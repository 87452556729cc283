/*!
# fpbench

`fpbench` reconstructs a capacitive fingerprint sensor's on-device image
pipeline from archived raw frames and drives an offline enrollment/
verification benchmark against it: calibration subtraction, percentile
histogram stretching, unsharp masking, and center crop feed a pluggable
keypoint matcher, and a bounded per-identity template is curated and
studied across a verification run to report False Reject Rate.

## Modules

- [`pixel`]: the four-stage preprocessor (raw 16-bit frame to 8-bit
  cropped image).
- [`gates`]: pre-extraction (pixel stddev) and post-extraction (keypoint
  count) quality gates.
- [`feature`]: the [`feature::FeatureExtractor`] trait modeling the
  external keypoint-descriptor collaborator as an opaque capability.
- [`template`]: the bounded template store, its curation policies
  (score-sort, diversity-prune), and the two template-study variants.
- [`driver`]: orchestrates one enrollment/verification run and reports
  classified outcomes and FRR.
- [`io`]: raw 16-bit little-endian frame files and binary PGM.
- [`config`]: CLI-mirrored configuration structs.
- [`error`]: the library's error enum.

## Safety
Pure Rust, `#![forbid(unsafe_code)]`.
*/
#![forbid(unsafe_code)]

pub mod config;
pub mod constants;
pub mod driver;
pub mod error;
pub mod feature;
pub mod gates;
pub mod io;
pub mod pixel;
pub mod template;

pub use error::FpError;
pub use feature::FeatureExtractor;
