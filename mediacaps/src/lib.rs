//! # Mediacaps
//!
//! A media codec capability model and format-negotiation engine.
//!
//! Given a codec's advertised profile/level support and an attribute map of
//! device-reported limits, this crate computes the full matrix of supported
//! resolutions, frame rates, bitrates and block constraints, and answers
//! whether a specific playback or encoding configuration is supported.
//!
//! ## Pipeline
//!
//! - [`profile`] holds the standards-defined profile/level constants
//! - [`levels`] evaluates the per-standard performance tables
//! - [`AudioCapabilities`] / [`VideoCapabilities`] / [`EncoderCapabilities`]
//!   merge platform defaults, table-derived limits and device overrides
//! - [`CodecCapabilities`] aggregates them per media type and validates
//!   candidate formats
//! - [`CodecInfo`] groups capability objects for one codec component
//!
//! ## Example
//!
//! ```
//! use mediacaps::{mime, profile, CodecCapabilities, ProfileLevel};
//! use mediacaps_core::FormatMap;
//!
//! let declared = vec![ProfileLevel {
//!     profile: profile::avc::PROFILE_BASELINE,
//!     level: profile::avc::LEVEL_31,
//! }];
//! let caps = CodecCapabilities::new(
//!     mime::VIDEO_AVC, false, declared, vec![], &FormatMap::new(),
//! ).unwrap();
//!
//! let mut format = FormatMap::new();
//! format.set_str("mime", mime::VIDEO_AVC);
//! format.set_int("width", 720);
//! format.set_int("height", 480);
//! format.set_int("frame-rate", 30);
//! assert!(caps.supports_format(&format).unwrap());
//! ```
//!
//! All objects are immutable after construction; queries are pure and may
//! run concurrently without coordination.

pub mod audio;
pub mod caps;
pub mod encoder;
pub mod info;
pub mod levels;
pub mod mime;
pub mod profile;
pub mod video;

pub use audio::AudioCapabilities;
pub use caps::{CodecCapabilities, ErrorFlags, Feature};
pub use encoder::{BitrateMode, EncoderCapabilities};
pub use info::CodecInfo;
pub use profile::ProfileLevel;
pub use video::VideoCapabilities;

pub use mediacaps_core::{CapsError, FormatMap, Range, Rational, Result, Value};
