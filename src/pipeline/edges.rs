//! Sobel edge detection with non-maximum suppression.

use crate::utils::error::{Error, Result};
use crate::utils::image_buffer::ImageBuffer;

const GX: [[f64; 3]; 3] = [[-1.0, 0.0, 1.0], [-2.0, 0.0, 2.0], [-1.0, 0.0, 1.0]];
const GY: [[f64; 3]; 3] = [[-1.0, -2.0, -1.0], [0.0, 0.0, 0.0], [1.0, 2.0, 1.0]];

/// Detect edges in `image` via Sobel gradient magnitude thresholded
/// against `threshold`, followed by non-maximum suppression.
///
/// Fails [`Error::InvalidInput`] for images smaller than 3x3,
/// [`Error::InsufficientEdges`] if no edges survive thresholding or fewer
/// than 100 survive suppression, and [`Error::TooManyEdges`] if more than
/// half of the interior pixels are classified as edges before suppression.
pub fn detect_edges(image: &ImageBuffer, threshold: f64) -> Result<ImageBuffer> {
    if !image.meets_minimum_size() {
        return Err(Error::invalid_input("image must be at least 3x3"));
    }

    let w = image.width();
    let h = image.height();
    let gray = to_grayscale_bt601(image);

    let mut edges = ImageBuffer::new(w, h);
    let mut edge_count = 0usize;

    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let mut gx = 0.0;
            let mut gy = 0.0;
            for ky in 0..3i64 {
                for kx in 0..3i64 {
                    let (v, ..) = gray.get((x as i64 + kx - 1) as u32, (y as i64 + ky - 1) as u32);
                    gx += v as f64 * GX[ky as usize][kx as usize];
                    gy += v as f64 * GY[ky as usize][kx as usize];
                }
            }
            let magnitude = (gx * gx + gy * gy).sqrt();
            let on = magnitude > threshold;
            if on {
                edge_count += 1;
            }
            let v = if on { 255 } else { 0 };
            edges.set(x, y, (v, v, v, 255));
        }
    }

    let interior = image.interior_pixel_count();
    if edge_count == 0 {
        return Err(Error::insufficient_edges("no edge pixels survived thresholding"));
    }
    if interior > 0 && edge_count as f64 / interior as f64 > 0.5 {
        return Err(Error::too_many_edges(
            "more than half of interior pixels classified as edges",
        ));
    }

    let suppressed = non_max_suppress(&edges);

    let surviving = count_white(&suppressed);
    if surviving < 100 {
        return Err(Error::insufficient_edges(
            "fewer than 100 edge pixels survived non-maximum suppression",
        ));
    }

    Ok(suppressed)
}

fn to_grayscale_bt601(image: &ImageBuffer) -> ImageBuffer {
    let w = image.width();
    let h = image.height();
    let mut out = ImageBuffer::new(w, h);
    for y in 0..h {
        for x in 0..w {
            let (r, g, b, a) = image.get(x, y);
            let lum = 0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64;
            let y8 = lum.round().clamp(0.0, 255.0) as u8;
            out.set(x, y, (y8, y8, y8, a));
        }
    }
    out
}

fn non_max_suppress(edges: &ImageBuffer) -> ImageBuffer {
    let w = edges.width();
    let h = edges.height();
    let mut out = ImageBuffer::new(w, h);
    for y in 0..h {
        for x in 0..w {
            let (v, ..) = edges.get(x, y);
            if v == 0 {
                continue;
            }
            let mut keep = true;
            for dy in -1i64..=1 {
                for dx in -1i64..=1 {
                    if dx == 0 && dy == 0 {
                        continue;
                    }
                    let (nv, ..) = edges.get_clamped(x as i64 + dx, y as i64 + dy);
                    if nv > v {
                        keep = false;
                    }
                }
            }
            if keep {
                out.set(x, y, (255, 255, 255, 255));
            }
        }
    }
    out
}

fn count_white(image: &ImageBuffer) -> usize {
    let mut count = 0;
    for y in 0..image.height() {
        for x in 0..image.width() {
            let (v, ..) = image.get(x, y);
            if v > 0 {
                count += 1;
            }
        }
    }
    count
}
