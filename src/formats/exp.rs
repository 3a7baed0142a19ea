//! Melco EXP writer: 2-byte delta stitch records, no header.
//!
//! Adapted from the ancestor's `formats::io::writers::exp` (same record
//! shapes — plain stitch, jump prefix, trim marker, color-change marker)
//! to the new `StitchPattern` model. Deltas are carried in the pattern's
//! machine-coordinate space (already scaled to 0.1mm integer units by the
//! dispatch layer) and wrapped into a single byte exactly as the ancestor
//! does; EXP has no provision for deltas wider than a byte; a stitch plan
//! that produces one is a known limitation shared with the ancestor, not
//! introduced here.

use crate::core::stitch::{StitchPattern, StitchType};
use crate::utils::error::Result;
use crate::utils::io::WriteHelper;

/// Serialize `pattern` (already in machine coordinates) to EXP bytes.
pub fn write(pattern: &StitchPattern) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let mut helper = WriteHelper::new(&mut buf);

    let mut prev_x = 0.0;
    let mut prev_y = 0.0;

    for stitch in &pattern.stitches {
        let dx = (stitch.point.x - prev_x).round() as i32;
        let dy = (stitch.point.y - prev_y).round() as i32;
        prev_x += dx as f64;
        prev_y += dy as f64;

        match stitch.stitch_type {
            StitchType::Normal => {
                helper.write_u8((dx & 0xFF) as u8)?;
                helper.write_u8(((-dy) & 0xFF) as u8)?;
            }
            StitchType::Jump => {
                helper.write_bytes(&[0x80, 0x04])?;
                helper.write_u8((dx & 0xFF) as u8)?;
                helper.write_u8(((-dy) & 0xFF) as u8)?;
            }
            StitchType::Trim => {
                helper.write_bytes(&[0x80, 0x80, 0x07, 0x00])?;
            }
            StitchType::Stop => {
                helper.write_bytes(&[0x80, 0x01, 0x00, 0x00])?;
            }
            StitchType::End => {
                // No terminal record in the EXP format.
            }
        }
    }

    Ok(buf)
}
