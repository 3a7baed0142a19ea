//! Brother PES writer.
//!
//! The ancestor's PES writer (`formats::io::writers::pes`) implements the
//! full multi-section PES v1/v6 container with an embedded PEC block
//! matched against a 64-entry PEC thread table this crate has no
//! equivalent of. This writer keeps its overall shape — a `#PESnnnn`
//! signature, a placeholder offset to the stitch block, a thread list,
//! and per-block i16 delta records grouped by stitch-type run with a
//! color-change log — but against this crate's own fixed 11-entry
//! palette (§4.1) and `StitchPattern` rather than the ancestor's
//! `EmbThread`/PEC machinery.

use crate::core::palette;
use crate::core::stitch::{StitchPattern, StitchType};
use crate::utils::error::Result;
use crate::utils::io::WriteHelper;

const SIGNATURE: &[u8] = b"#PES0001";

/// Serialize `pattern` (already in machine coordinates) to PES bytes.
pub fn write(pattern: &StitchPattern) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let mut helper = WriteHelper::new(&mut buf);

    helper.write_bytes(SIGNATURE)?;
    helper.write_i32_le(0x01)?; // scale-to-fit flag, matches ancestor's v1 header
    helper.write_i32_le(0x01)?; // hoop code

    let threads: Vec<(u8, u8, u8)> = pattern
        .colors
        .iter()
        .map(|hex| palette::parse_hex(hex).unwrap_or((0, 0, 0)))
        .collect();
    helper.write_u16_le(threads.len() as u16)?;
    for (r, g, b) in &threads {
        helper.write_u8(*r)?;
        helper.write_u8(*g)?;
        helper.write_u8(*b)?;
    }

    let mut color_log: Vec<(u16, u16)> = Vec::new();
    let mut block_count: u16 = 0;
    let mut color_index: u16 = 0;
    let mut prev_x = 0.0;
    let mut prev_y = 0.0;
    let mut block_start = true;

    let mut body = Vec::new();
    {
        let mut b = WriteHelper::new(&mut body);
        for s in &pattern.stitches {
            let dx = (s.point.x - prev_x).round().clamp(-32767.0, 32767.0) as i16;
            let dy = (s.point.y - prev_y).round().clamp(-32767.0, 32767.0) as i16;
            prev_x += dx as f64;
            prev_y += dy as f64;

            let flag: i16 = match s.stitch_type {
                StitchType::Normal => 0x00,
                StitchType::Jump => 0x10,
                StitchType::Trim => 0x20,
                StitchType::Stop => {
                    color_index = color_index.saturating_add(1);
                    color_log.push((block_count, color_index));
                    0x40
                }
                StitchType::End => -1, // 0x8003 terminal marker, matches the ancestor's section-end sentinel
            };

            if block_start {
                color_log.push((block_count, color_index));
                block_start = false;
            }

            b.write_i16_le(flag)?;
            b.write_i16_le(dx)?;
            b.write_i16_le(dy)?;
            block_count += 1;
        }
        b.write_i16_le(-1)?;
    }

    helper.write_u16_le(block_count)?;
    helper.write_bytes(&body)?;

    helper.write_u16_le(color_log.len() as u16)?;
    for (block, color) in &color_log {
        helper.write_u16_le(*block)?;
        helper.write_u16_le(*color)?;
    }

    Ok(buf)
}
