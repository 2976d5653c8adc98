//! # Mediacaps Core
//!
//! Core types and utilities for the mediacaps capability engine.
//!
//! This crate provides the fundamental building blocks used by the
//! capability model and format-negotiation code:
//! - Error handling types
//! - Closed-interval range algebra over integers and rationals
//! - Exact rational numbers for aspect ratios
//! - String-keyed attribute/format maps with the parsers for the
//!   "WxH" / "lo-hi" / "n:d-n:d" value syntaxes used by codec metadata

pub mod error;
pub mod format;
pub mod range;
pub mod rational;

pub use error::{CapsError, Result};
pub use format::{FormatMap, Value};
pub use range::Range;
pub use rational::Rational;
