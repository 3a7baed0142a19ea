//! Stitch records and the finished [`StitchPattern`] data model.

use crate::core::geometry::Point;
use crate::utils::error::{Error, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// The kind of needle action a stitch represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StitchType {
    /// Needle penetrates at the destination.
    Normal,
    /// Needle lifts and moves without stitching.
    Jump,
    /// Cut the thread tail.
    Trim,
    /// Pause, typically for a color change.
    Stop,
    /// Terminate the pattern.
    End,
}

/// A single planned needle position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StitchPoint {
    /// Position in millimeters.
    pub point: Point,
    /// What kind of stitch this is.
    pub stitch_type: StitchType,
    /// Hex-RGB thread color of this stitch (§3).
    ///
    /// This pipeline plans one fill color per conversion call, so every
    /// stitch a `Pipeline::convert` invocation produces is stamped with the
    /// same resolved color (see `pipeline::mod`'s final stamping step)
    /// rather than being tracked per-region during planning. Stitches built
    /// directly via [`StitchPoint::new`] (geometry-only fixtures, internal
    /// planner/optimizer scratch values) carry an empty string here until
    /// stamped.
    #[serde(default)]
    pub color: String,
}

impl StitchPoint {
    /// Construct a new stitch point with no color assigned yet.
    pub fn new(x: f64, y: f64, stitch_type: StitchType) -> Self {
        Self {
            point: Point::new(x, y),
            stitch_type,
            color: String::new(),
        }
    }

    /// Return a copy of this stitch stamped with `color`.
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    /// Coordinates are finite.
    pub fn is_valid(&self) -> bool {
        self.point.is_valid()
    }
}

/// Physical size of the finished pattern, in millimeters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in millimeters.
    pub width: f64,
    /// Height in millimeters.
    pub height: f64,
}

/// Descriptive metadata carried alongside a pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// Human-readable pattern name.
    pub name: String,
    /// ISO 8601 / RFC 3339 creation timestamp.
    pub date: String,
    /// Format the pattern was produced for (`"internal"` for pipeline output).
    pub format: String,
}

impl Metadata {
    /// Build metadata stamped with the current time.
    pub fn now(name: impl Into<String>, format: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            date: Utc::now().to_rfc3339(),
            format: format.into(),
        }
    }
}

/// The complete output of the conversion pipeline: an ordered stitch
/// sequence plus the data needed to serialize it to a machine format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StitchPattern {
    /// Ordered stitch sequence.
    pub stitches: Vec<StitchPoint>,
    /// Distinct thread colors used, in first-appearance order.
    pub colors: Vec<String>,
    /// Physical size of the pattern, in millimeters.
    pub dimensions: Dimensions,
    /// Descriptive metadata.
    pub metadata: Metadata,
}

impl StitchPattern {
    /// Build a pattern from stitches, the set of colors in use, and
    /// dimensions, checking the invariants of §3: non-empty, finite
    /// coordinates, and every *stamped* stitch color present in `colors`.
    ///
    /// A stitch with an empty `color` (the default from [`StitchPoint::new`]
    /// before the pipeline's final color-stamping step) is exempt from the
    /// membership check — this lets geometry-only fixtures built directly
    /// with `StitchPoint::new` construct a pattern without also stamping a
    /// color on every point.
    pub fn new(
        stitches: Vec<StitchPoint>,
        colors: Vec<String>,
        dimensions: Dimensions,
        metadata: Metadata,
    ) -> Result<Self> {
        if stitches.is_empty() {
            return Err(Error::invalid_input("pattern has no stitches"));
        }
        for s in &stitches {
            if !s.is_valid() {
                return Err(Error::invalid_coordinates("non-finite stitch coordinate"));
            }
            if !s.color.is_empty() && !colors.contains(&s.color) {
                return Err(Error::invalid_input(format!(
                    "stitch color {} is not present in the pattern's color set",
                    s.color
                )));
            }
        }
        Ok(Self {
            stitches,
            colors,
            dimensions,
            metadata,
        })
    }

    /// Bounding box of all stitch coordinates, `(min_x, min_y, max_x, max_y)`.
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        let mut min_x = f64::INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut max_y = f64::NEG_INFINITY;
        for s in &self.stitches {
            min_x = min_x.min(s.point.x);
            min_y = min_y.min(s.point.y);
            max_x = max_x.max(s.point.x);
            max_y = max_y.max(s.point.y);
        }
        (min_x, min_y, max_x, max_y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_pattern_rejected() {
        let err = StitchPattern::new(
            vec![],
            vec![],
            Dimensions { width: 10.0, height: 10.0 },
            Metadata::now("x", "internal"),
        );
        assert!(matches!(err, Err(Error::InvalidInput { .. })));
    }

    #[test]
    fn nan_coordinate_rejected() {
        let stitches = vec![StitchPoint::new(f64::NAN, 0.0, StitchType::Normal)];
        let err = StitchPattern::new(
            stitches,
            vec!["#000000".to_string()],
            Dimensions { width: 10.0, height: 10.0 },
            Metadata::now("x", "internal"),
        );
        assert!(matches!(err, Err(Error::InvalidCoordinates { .. })));
    }

    #[test]
    fn bounds_cover_all_stitches() {
        let stitches = vec![
            StitchPoint::new(0.0, 0.0, StitchType::Jump),
            StitchPoint::new(10.0, -5.0, StitchType::Normal),
        ];
        let pattern = StitchPattern::new(
            stitches,
            vec!["#000000".to_string()],
            Dimensions { width: 10.0, height: 5.0 },
            Metadata::now("x", "internal"),
        )
        .unwrap();
        assert_eq!(pattern.bounds(), (0.0, -5.0, 10.0, 0.0));
    }
}
