//! Janome JEF writer: fixed binary header plus delta-byte stitch records.
//!
//! Adapted from the ancestor's `formats::io::writers::jef` — same header
//! shape (offsets, date stamp, color/point counts, hoop-distance blocks)
//! and the same stitch-record byte layout (plain/jump/color-change/trim
//! markers) — but against this crate's `StitchPattern` and its fixed
//! 11-entry thread palette (§4.1) instead of the ancestor's 79-entry JEF
//! color table, which has no equivalent in this crate.

use crate::core::palette;
use crate::core::stitch::{StitchPattern, StitchType};
use crate::utils::error::Result;
use crate::utils::io::WriteHelper;
use chrono::Utc;

const HOOP_110X110: i32 = 0;
const HOOP_50X50: i32 = 1;
const HOOP_140X200: i32 = 2;
const HOOP_126X110: i32 = 3;
const HOOP_200X200: i32 = 4;

fn hoop_size(width: i32, height: i32) -> i32 {
    if width < 500 && height < 500 {
        return HOOP_50X50;
    }
    if width < 1260 && height < 1100 {
        return HOOP_126X110;
    }
    if width < 1400 && height < 2000 {
        return HOOP_140X200;
    }
    if width < 2000 && height < 2000 {
        return HOOP_200X200;
    }
    HOOP_110X110
}

fn write_hoop_edge<W: std::io::Write>(h: &mut WriteHelper<W>, x: i32, y: i32) -> Result<()> {
    if x.min(y) >= 0 {
        h.write_i32_le(x)?;
        h.write_i32_le(y)?;
        h.write_i32_le(x)?;
        h.write_i32_le(y)?;
    } else {
        for _ in 0..4 {
            h.write_i32_le(-1)?;
        }
    }
    Ok(())
}

/// Serialize `pattern` (already in machine coordinates) to JEF bytes.
pub fn write(pattern: &StitchPattern) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let mut helper = WriteHelper::new(&mut buf);

    let palette_indices: Vec<i32> = pattern
        .colors
        .iter()
        .map(|hex| {
            let (r, g, b) = palette::parse_hex(hex).unwrap_or((0, 0, 0));
            palette::nearest_index(r, g, b, &palette::PALETTE[..]) as i32
        })
        .collect();
    let color_count = palette_indices.len().max(1) as i32;

    let mut point_count = 1i32;
    for s in &pattern.stitches {
        point_count += match s.stitch_type {
            StitchType::Normal => 1,
            StitchType::Jump | StitchType::Stop => 2,
            StitchType::Trim => 2,
            StitchType::End => 0,
        };
    }

    let (min_x, min_y, max_x, max_y) = pattern.bounds();
    let design_width = (max_x - min_x).round() as i32;
    let design_height = (max_y - min_y).round() as i32;

    let offsets = 0x74 + color_count * 8;
    helper.write_i32_le(offsets)?;
    helper.write_i32_le(0x14)?;

    let date_string = Utc::now().format("%Y%m%d%H%M%S").to_string();
    let date_bytes = date_string.as_bytes();
    helper.write_bytes(&date_bytes[..date_bytes.len().min(14)])?;
    for _ in date_bytes.len().min(14)..14 {
        helper.write_u8(0)?;
    }
    helper.write_u8(0)?;
    helper.write_u8(0)?;

    helper.write_i32_le(color_count)?;
    helper.write_i32_le(point_count)?;
    helper.write_i32_le(hoop_size(design_width, design_height))?;

    let half_width = design_width / 2;
    let half_height = design_height / 2;
    helper.write_i32_le(half_width)?;
    helper.write_i32_le(half_height)?;
    helper.write_i32_le(half_width)?;
    helper.write_i32_le(half_height)?;

    write_hoop_edge(&mut helper, 550 - half_width, 550 - half_height)?;
    write_hoop_edge(&mut helper, 250 - half_width, 250 - half_height)?;
    write_hoop_edge(&mut helper, 700 - half_width, 1000 - half_height)?;
    write_hoop_edge(&mut helper, 700 - half_width, 1000 - half_height)?;

    if palette_indices.is_empty() {
        helper.write_i32_le(0)?;
    } else {
        for idx in &palette_indices {
            helper.write_i32_le(*idx)?;
        }
    }
    for _ in 0..color_count {
        helper.write_i32_le(0x0D)?;
    }

    let mut prev_x = 0.0;
    let mut prev_y = 0.0;
    for s in &pattern.stitches {
        let dx = (s.point.x - prev_x).round().clamp(-127.0, 127.0) as i8;
        let dy = (s.point.y - prev_y).round().clamp(-127.0, 127.0) as i8;
        prev_x += dx as f64;
        prev_y += dy as f64;

        match s.stitch_type {
            StitchType::Normal => {
                helper.write_i8(dx)?;
                helper.write_i8(-dy)?;
            }
            StitchType::Stop => {
                helper.write_bytes(&[0x80, 0x01])?;
                helper.write_i8(dx)?;
                helper.write_i8(-dy)?;
            }
            StitchType::Jump => {
                helper.write_bytes(&[0x80, 0x02])?;
                helper.write_i8(dx)?;
                helper.write_i8(-dy)?;
            }
            StitchType::Trim => {
                helper.write_bytes(&[0x80, 0x02, 0x00, 0x00])?;
            }
            StitchType::End => {}
        }
    }
    helper.write_bytes(&[0x80, 0x10])?;

    Ok(buf)
}
