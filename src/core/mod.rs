//! Core data model: geometry, stitch/pattern types, settings, and the
//! fixed thread palette.

/// 2D point primitive.
pub mod geometry;

/// Fixed thread palette and color distance metric.
pub mod palette;

/// Processing settings and their sanitizer.
pub mod settings;

/// Stitch records and the `StitchPattern` value type.
pub mod stitch;
