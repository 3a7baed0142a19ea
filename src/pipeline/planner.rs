//! Stitch planning: angled scanline fills (with optional underlay),
//! per-contour outline stitching, and pull compensation.

use crate::core::geometry::Point;
use crate::core::settings::ProcessingSettings;
use crate::core::stitch::{StitchPoint, StitchType};

const MAX_TARGET_STITCHES: f64 = 15000.0;
const MIN_SPACING_MM: f64 = 0.3;

/// Plan a full stitch sequence from traced contours and sanitized
/// settings: an initial jump to the first contour point, an optional
/// perpendicular underlay fill, the main angled fill, per-contour outline
/// stitches, a terminal jump, and uniform pull compensation.
pub fn generate_stitches(contours: &[Vec<Point>], settings: &ProcessingSettings) -> Vec<StitchPoint> {
    let area = settings.width * settings.height;
    let target_count = (area * settings.density).ceil().min(MAX_TARGET_STITCHES).max(1.0);
    let base_spacing = (area / target_count).sqrt();
    let spacing = (base_spacing / settings.density).max(MIN_SPACING_MM);

    let mut stitches = Vec::new();

    if let Some(first_point) = contours.first().and_then(|c| c.first()) {
        stitches.push(StitchPoint::new(first_point.x, first_point.y, StitchType::Jump));
    }

    if settings.use_underlay {
        let underlay_angle = (settings.fill_angle + 90.0) % 360.0;
        scanline_fill(contours, underlay_angle, spacing * 2.0, &mut stitches);
    }

    scanline_fill(contours, settings.fill_angle, spacing, &mut stitches);

    for contour in contours {
        outline_stitches(contour, spacing, &mut stitches);
    }

    if let Some(last) = stitches.last().cloned() {
        stitches.push(StitchPoint::new(last.point.x, last.point.y, StitchType::Jump));
    }

    for s in stitches.iter_mut() {
        s.point.x += settings.pull_compensation;
        s.point.y += settings.pull_compensation;
    }

    stitches
}

fn outline_stitches(contour: &[Point], spacing: f64, out: &mut Vec<StitchPoint>) {
    let Some(start) = contour.first() else { return };
    out.push(StitchPoint::new(start.x, start.y, StitchType::Jump));
    for pair in contour.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let len = a.distance_to(&b);
        if len < spacing {
            continue;
        }
        let steps = (len / spacing).ceil().max(1.0) as usize;
        for k in 1..=steps {
            let t = k as f64 / steps as f64;
            let p = a.lerp(&b, t);
            out.push(StitchPoint::new(p.x, p.y, StitchType::Normal));
        }
    }
}

fn bounding_box(contours: &[Vec<Point>]) -> Option<(f64, f64, f64, f64)> {
    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    let mut any = false;
    for contour in contours {
        for p in contour {
            any = true;
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
    }
    any.then_some((min_x, min_y, max_x, max_y))
}

/// Closed-polygon edges of every contour, used only for scanline
/// intersection testing (the outline pass above walks the open contour
/// directly and does not need the closing edge).
fn closed_edges(contours: &[Vec<Point>]) -> Vec<(Point, Point)> {
    let mut edges = Vec::new();
    for contour in contours {
        if contour.len() < 2 {
            continue;
        }
        for pair in contour.windows(2) {
            edges.push((pair[0], pair[1]));
        }
        edges.push((contour[contour.len() - 1], contour[0]));
    }
    edges
}

/// Parametric segment-segment intersection of `(p1, p2)` and `(a, b)`,
/// requiring both `ua` and `ub` in `[0, 1]`.
fn segment_intersection(p1: Point, p2: Point, a: Point, b: Point) -> Option<Point> {
    let denom = (b.y - a.y) * (p2.x - p1.x) - (b.x - a.x) * (p2.y - p1.y);
    if denom.abs() < 1e-12 {
        return None;
    }
    let ua = ((b.x - a.x) * (p1.y - a.y) - (b.y - a.y) * (p1.x - a.x)) / denom;
    let ub = ((p2.x - p1.x) * (p1.y - a.y) - (p2.y - p1.y) * (p1.x - a.x)) / denom;
    if (0.0..=1.0).contains(&ua) && (0.0..=1.0).contains(&ub) {
        Some(p1.lerp(&p2, ua))
    } else {
        None
    }
}

/// Fill the contours' interior with parallel stitch lines at `angle_deg`,
/// spaced `spacing` apart, alternating traversal direction between
/// successive lines (boustrophedon) to minimize travel jumps. Scanlines
/// whose intersection count with the contour edges isn't even are
/// skipped, since they can't be paired into fill segments.
fn scanline_fill(contours: &[Vec<Point>], angle_deg: f64, spacing: f64, out: &mut Vec<StitchPoint>) {
    if spacing <= 0.0 {
        return;
    }
    let Some((min_x, min_y, max_x, max_y)) = bounding_box(contours) else { return };

    let theta = angle_deg.to_radians();
    let d = (theta.cos(), theta.sin());
    let n = (-theta.sin(), theta.cos());
    let center = Point::new((min_x + max_x) / 2.0, (min_y + max_y) / 2.0);
    let diagonal = ((max_x - min_x).powi(2) + (max_y - min_y).powi(2)).sqrt();
    if diagonal <= 0.0 {
        return;
    }

    let edges = closed_edges(contours);
    let num_lines = (diagonal / spacing).ceil() as i64;

    for i in -num_lines..=num_lines {
        let offset = i as f64 * spacing;
        let line_center = Point::new(center.x + offset * n.0, center.y + offset * n.1);
        let p1 = Point::new(line_center.x - diagonal * d.0, line_center.y - diagonal * d.1);
        let p2 = Point::new(line_center.x + diagonal * d.0, line_center.y + diagonal * d.1);

        let mut hits: Vec<Point> = edges
            .iter()
            .filter_map(|&(a, b)| segment_intersection(p1, p2, a, b))
            .collect();

        if hits.len() < 2 || hits.len() % 2 != 0 {
            continue;
        }

        hits.sort_by(|p, q| {
            let proj_p = p.x * d.0 + p.y * d.1;
            let proj_q = q.x * d.0 + q.y * d.1;
            proj_p.partial_cmp(&proj_q).unwrap_or(std::cmp::Ordering::Equal)
        });
        if i.rem_euclid(2) == 1 {
            hits.reverse();
        }

        for pair in hits.chunks(2) {
            let (start, end) = (pair[0], pair[1]);
            out.push(StitchPoint::new(start.x, start.y, StitchType::Jump));
            let len = start.distance_to(&end);
            let steps = (len / spacing).ceil().max(1.0) as usize;
            for k in 1..=steps {
                let t = k as f64 / steps as f64;
                let p = start.lerp(&end, t);
                out.push(StitchPoint::new(p.x, p.y, StitchType::Normal));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::settings::ColorMode;

    fn square(side: f64) -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0),
            Point::new(side, 0.0),
            Point::new(side, side),
            Point::new(0.0, side),
        ]
    }

    fn settings() -> ProcessingSettings {
        ProcessingSettings {
            width: 20.0,
            height: 20.0,
            density: 2.0,
            edge_threshold: 128.0,
            fill_angle: 0.0,
            use_underlay: false,
            pull_compensation: 0.0,
            color: "#000000".to_string(),
            color_mode: ColorMode::Color,
        }
    }

    #[test]
    fn generates_at_least_outline_and_initial_jump() {
        let contours = vec![square(20.0)];
        let stitches = generate_stitches(&contours, &settings());
        assert!(!stitches.is_empty());
        assert_eq!(stitches.first().unwrap().stitch_type, StitchType::Jump);
        assert_eq!(stitches.last().unwrap().stitch_type, StitchType::Jump);
    }

    #[test]
    fn pull_compensation_shifts_every_stitch() {
        let contours = vec![square(20.0)];
        let mut s = settings();
        s.pull_compensation = 0.0;
        let baseline = generate_stitches(&contours, &s);
        s.pull_compensation = 2.0;
        let shifted = generate_stitches(&contours, &s);
        assert_eq!(baseline.len(), shifted.len());
        for (a, b) in baseline.iter().zip(shifted.iter()) {
            assert!((b.point.x - a.point.x - 2.0).abs() < 1e-9);
            assert!((b.point.y - a.point.y - 2.0).abs() < 1e-9);
        }
    }

    #[test]
    fn underlay_adds_a_perpendicular_pass() {
        let contours = vec![square(20.0)];
        let mut s = settings();
        s.use_underlay = false;
        let without = generate_stitches(&contours, &s);
        s.use_underlay = true;
        let with = generate_stitches(&contours, &s);
        assert!(with.len() > without.len());
    }

    #[test]
    fn segment_intersection_finds_crossing_point() {
        let p1 = Point::new(-5.0, 0.0);
        let p2 = Point::new(5.0, 0.0);
        let a = Point::new(0.0, -5.0);
        let b = Point::new(0.0, 5.0);
        let hit = segment_intersection(p1, p2, a, b).unwrap();
        assert!((hit.x).abs() < 1e-9);
        assert!((hit.y).abs() < 1e-9);
    }

    #[test]
    fn parallel_segments_do_not_intersect() {
        let p1 = Point::new(0.0, 0.0);
        let p2 = Point::new(10.0, 0.0);
        let a = Point::new(0.0, 5.0);
        let b = Point::new(10.0, 5.0);
        assert!(segment_intersection(p1, p2, a, b).is_none());
    }
}
