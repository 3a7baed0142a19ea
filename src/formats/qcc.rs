//! Generic QCC writer.
//!
//! No prior-art analogue was available for QCC either; same rationale
//! and shape as [`crate::formats::pat`] — original-in-crate, modeled on
//! the delta-plus-command-byte record.

use crate::core::stitch::{StitchPattern, StitchType};
use crate::utils::error::Result;
use crate::utils::io::WriteHelper;

const SIGNATURE: &[u8] = b"QCC1";

fn encode_command(kind: StitchType) -> u8 {
    match kind {
        StitchType::Normal => 0,
        StitchType::Jump => 1,
        StitchType::Trim => 2,
        StitchType::Stop => 3,
        StitchType::End => 4,
    }
}

/// Serialize `pattern` (already in machine coordinates) to QCC bytes.
pub fn write(pattern: &StitchPattern) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let mut helper = WriteHelper::new(&mut buf);

    helper.write_bytes(SIGNATURE)?;
    helper.write_u32_le(pattern.stitches.len() as u32)?;
    helper.write_u32_le(pattern.dimensions.width.round() as u32)?;
    helper.write_u32_le(pattern.dimensions.height.round() as u32)?;

    let mut prev_x = 0.0;
    let mut prev_y = 0.0;
    for s in &pattern.stitches {
        let dx = (s.point.x - prev_x).round().clamp(-127.0, 127.0) as i8;
        let dy = (s.point.y - prev_y).round().clamp(-127.0, 127.0) as i8;
        prev_x += dx as f64;
        prev_y += dy as f64;
        helper.write_i8(dx)?;
        helper.write_i8(dy)?;
        helper.write_u8(encode_command(s.stitch_type))?;
    }

    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::stitch::{Dimensions, Metadata, StitchPoint};

    #[test]
    fn writes_signature_and_counts() {
        let pattern = StitchPattern::new(
            vec![
                StitchPoint::new(0.0, 0.0, StitchType::Jump),
                StitchPoint::new(5.0, 5.0, StitchType::Normal),
                StitchPoint::new(5.0, 5.0, StitchType::End),
            ],
            vec!["#000000".to_string()],
            Dimensions { width: 100.0, height: 100.0 },
            Metadata::now("t", "qcc"),
        )
        .unwrap();
        let bytes = write(&pattern).unwrap();
        assert_eq!(&bytes[0..4], SIGNATURE);
        let count = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
        assert_eq!(count, 3);
    }
}
