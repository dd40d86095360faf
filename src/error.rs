/*!
 * Error types for the yield quantization engine.
 *
 * The policy is deliberately two-tiered: configuration problems are fatal and surfaced to the
 * caller immediately, while record- and segment-level problems only exclude the offending record
 * or segment from the output. Telemetry exported from harvest carts is noisy, and aborting a whole
 * batch over one bad row would make the tools useless in practice.
 */

use std::{
    error::Error,
    fmt::{Display, Formatter},
};

/// Convenience result type used at the binary seams of this crate.
pub type CropYieldResult<T> = Result<T, Box<dyn Error>>;

/// A fatal problem with the run configuration.
///
/// These abort the run before any telemetry is processed.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Two field boundaries were configured with the same name.
    DuplicateFieldName(String),
    /// A field boundary has corners that cannot form a usable polygon.
    MalformedBoundary {
        /// The name of the offending field.
        field: String,
        /// What was wrong with it.
        msg: &'static str,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter) -> Result<(), std::fmt::Error> {
        match self {
            ConfigError::DuplicateFieldName(name) => {
                write!(f, "duplicate field boundary name: {}", name)
            }
            ConfigError::MalformedBoundary { field, msg } => {
                write!(f, "malformed boundary for field {}: {}", field, msg)
            }
        }
    }
}

impl Error for ConfigError {}

/// A recoverable, per-segment failure.
///
/// A skipped segment is excluded from the output sequence and counted, but processing of the rest
/// of the field continues. The anchor used by the segmenter advances regardless of these, so a
/// field with persistently bad weight text cannot stall the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentSkip {
    /// The travel vector between the segment's endpoints has zero length, so no pooling region
    /// orientation can be derived.
    DegenerateSegment,
    /// The weight text of one of the segment's endpoint records did not contain a parsable number.
    UnparsableWeight,
}

impl Display for SegmentSkip {
    fn fmt(&self, f: &mut Formatter) -> Result<(), std::fmt::Error> {
        match self {
            SegmentSkip::DegenerateSegment => write!(f, "zero length travel vector"),
            SegmentSkip::UnparsableWeight => write!(f, "unparsable weight text"),
        }
    }
}

impl Error for SegmentSkip {}
