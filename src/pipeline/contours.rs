//! Contour tracing: turns an edge bitmap into ordered polyline contours.
//!
//! Uses Moore-neighbor boundary tracing (8-connectivity), following the
//! same flood/visitation-set discipline as the region-extraction style
//! this crate's contour tracer is grounded on: walk the 8 neighbors of the
//! current boundary pixel in a fixed clockwise order starting just past
//! the direction we arrived from, step to the first foreground neighbor
//! found, and stop once the walk returns to its starting pixel.

use crate::core::geometry::Point;
use crate::utils::image_buffer::ImageBuffer;
use std::collections::HashSet;

/// Clockwise neighbor offsets starting at North.
const DIRS: [(i64, i64); 8] = [
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
];

fn is_foreground(edges: &ImageBuffer, x: i64, y: i64) -> bool {
    if x < 0 || y < 0 || x >= edges.width() as i64 || y >= edges.height() as i64 {
        return false;
    }
    let (v, ..) = edges.get(x as u32, y as u32);
    v > 0
}

fn has_background_neighbor(edges: &ImageBuffer, x: i64, y: i64) -> bool {
    DIRS.iter().any(|(dx, dy)| !is_foreground(edges, x + dx, y + dy))
}

/// Trace a single contour starting at `(sx, sy)`, a foreground pixel with
/// at least one background neighbor. Returns the ordered boundary pixels
/// as points (pixel centers), and marks every pixel visited along the way
/// in `visited`.
fn trace_one(edges: &ImageBuffer, sx: i64, sy: i64, visited: &mut HashSet<(i64, i64)>) -> Vec<Point> {
    let mut contour = vec![Point::new(sx as f64, sy as f64)];
    visited.insert((sx, sy));

    // Direction of the background neighbor we treat as "arrived from":
    // the first background direction found scanning clockwise from North.
    let mut entry_dir = DIRS
        .iter()
        .position(|(dx, dy)| !is_foreground(edges, sx + dx, sy + dy))
        .unwrap_or(0);

    let mut cx = sx;
    let mut cy = sy;
    let max_steps = (edges.width() as usize * edges.height() as usize).max(16) * 8;

    for _ in 0..max_steps {
        let mut found = None;
        for step in 1..=8 {
            let dir = (entry_dir + step) % 8;
            let (dx, dy) = DIRS[dir];
            let (nx, ny) = (cx + dx, cy + dy);
            if is_foreground(edges, nx, ny) {
                found = Some((nx, ny, dir));
                break;
            }
        }

        let (nx, ny, dir) = match found {
            Some(t) => t,
            None => break,
        };

        if (nx, ny) == (sx, sy) {
            break;
        }

        contour.push(Point::new(nx as f64, ny as f64));
        visited.insert((nx, ny));
        // The direction to re-enter the search from is the reverse of the
        // direction just traveled.
        entry_dir = (dir + 4) % 8;
        cx = nx;
        cy = ny;
    }

    contour
}

/// Trace all boundary contours in `edges`. Pixels are visited in raster
/// order; each foreground pixel with a background neighbor that hasn't
/// already been swept into a previously-traced contour becomes the start
/// of a new one, so no region is traced twice.
pub fn trace_contours(edges: &ImageBuffer) -> Vec<Vec<Point>> {
    let mut visited = HashSet::new();
    let mut contours = Vec::new();

    for y in 0..edges.height() as i64 {
        for x in 0..edges.width() as i64 {
            if visited.contains(&(x, y)) {
                continue;
            }
            if !is_foreground(edges, x, y) {
                continue;
            }
            if !has_background_neighbor(edges, x, y) {
                continue;
            }
            let contour = trace_one(edges, x, y, &mut visited);
            if contour.len() >= 2 {
                contours.push(contour);
            }
        }
    }

    contours
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_edges() -> ImageBuffer {
        let mut img = ImageBuffer::new(6, 6);
        for y in 1..5u32 {
            for x in 1..5u32 {
                let border = x == 1 || x == 4 || y == 1 || y == 4;
                let v = if border { 255 } else { 0 };
                img.set(x, y, (v, v, v, 255));
            }
        }
        img
    }

    #[test]
    fn empty_edge_image_has_no_contours() {
        let img = ImageBuffer::new(5, 5);
        assert!(trace_contours(&img).is_empty());
    }

    #[test]
    fn square_outline_produces_one_contour() {
        let img = square_edges();
        let contours = trace_contours(&img);
        assert_eq!(contours.len(), 1);
        assert!(contours[0].len() >= 4);
    }

    #[test]
    fn contour_points_are_all_on_the_edge_image() {
        let img = square_edges();
        let contours = trace_contours(&img);
        for contour in &contours {
            for p in contour {
                let (v, ..) = img.get(p.x as u32, p.y as u32);
                assert!(v > 0);
            }
        }
    }
}
