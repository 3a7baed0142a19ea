//! Stitch list optimization: drop redundant points, collapse jump runs.

use crate::core::stitch::{StitchPoint, StitchType};
use crate::utils::error::{Error, Result};

const DUPLICATE_EPSILON_MM: f64 = 1e-6;

/// Remove consecutive duplicate `Normal` points (within
/// [`DUPLICATE_EPSILON_MM`]), collapse runs of consecutive `Jump` stitches
/// down to a single `Jump` at the run's final destination, and validate
/// that every remaining coordinate is finite. The first and last stitch
/// positions are always preserved.
pub fn optimize_stitches(stitches: &[StitchPoint]) -> Result<Vec<StitchPoint>> {
    if stitches.is_empty() {
        return Ok(Vec::new());
    }

    let mut collapsed: Vec<StitchPoint> = Vec::with_capacity(stitches.len());
    for s in stitches {
        if let (Some(last), StitchType::Jump) = (collapsed.last(), s.stitch_type) {
            if last.stitch_type == StitchType::Jump {
                let idx = collapsed.len() - 1;
                collapsed[idx] = s.clone();
                continue;
            }
        }
        collapsed.push(s.clone());
    }

    let mut out: Vec<StitchPoint> = Vec::with_capacity(collapsed.len());
    for (i, s) in collapsed.iter().enumerate() {
        let is_first = i == 0;
        let is_last = i == collapsed.len() - 1;
        if !is_first && !is_last && s.stitch_type == StitchType::Normal {
            if let Some(prev) = out.last() {
                if prev.stitch_type == StitchType::Normal
                    && prev.point.distance_to(&s.point) < DUPLICATE_EPSILON_MM
                {
                    continue;
                }
            }
        }
        out.push(s.clone());
    }

    for s in &out {
        if !s.is_valid() {
            return Err(Error::invalid_coordinates("non-finite stitch coordinate after optimization"));
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removes_consecutive_duplicate_normals() {
        let stitches = vec![
            StitchPoint::new(0.0, 0.0, StitchType::Jump),
            StitchPoint::new(1.0, 1.0, StitchType::Normal),
            StitchPoint::new(1.0, 1.0, StitchType::Normal),
            StitchPoint::new(2.0, 2.0, StitchType::Normal),
        ];
        let out = optimize_stitches(&stitches).unwrap();
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn collapses_jump_runs_to_final_destination() {
        let stitches = vec![
            StitchPoint::new(0.0, 0.0, StitchType::Jump),
            StitchPoint::new(1.0, 0.0, StitchType::Jump),
            StitchPoint::new(5.0, 0.0, StitchType::Jump),
            StitchPoint::new(5.0, 1.0, StitchType::Normal),
        ];
        let out = optimize_stitches(&stitches).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].point, crate::core::geometry::Point::new(5.0, 0.0));
    }

    #[test]
    fn preserves_first_and_last_positions() {
        let stitches = vec![
            StitchPoint::new(3.0, 4.0, StitchType::Jump),
            StitchPoint::new(3.0, 4.0, StitchType::Normal),
            StitchPoint::new(9.0, 9.0, StitchType::Normal),
        ];
        let out = optimize_stitches(&stitches).unwrap();
        assert_eq!(out.first().unwrap().point, stitches.first().unwrap().point);
        assert_eq!(out.last().unwrap().point, stitches.last().unwrap().point);
    }

    #[test]
    fn rejects_non_finite_coordinates() {
        let stitches = vec![
            StitchPoint::new(0.0, 0.0, StitchType::Jump),
            StitchPoint::new(f64::NAN, 0.0, StitchType::Normal),
            StitchPoint::new(1.0, 1.0, StitchType::End),
        ];
        assert!(matches!(
            optimize_stitches(&stitches),
            Err(Error::InvalidCoordinates { .. })
        ));
    }
}
