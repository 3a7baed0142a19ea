//! Pfaff VP3 writer: `%vsm%`-tagged metadata sections plus a delta-record
//! stitch section.
//!
//! Ported from the ancestor's `formats::io::writers::vp3` — same section
//! markers (`%nam%`, `%aut%`, `%xxs%`, ...) and the same 3-byte-per-stitch
//! record shape (`i8` dx, `i8` dy, command byte) — adapted to this
//! crate's `StitchPattern` and `Metadata`.

use crate::core::stitch::{StitchPattern, StitchType};
use crate::utils::error::Result;
use crate::utils::io::WriteHelper;

const SIGNATURE: &[u8] = b"%vsm%";

fn encode_command(kind: StitchType) -> u8 {
    match kind {
        StitchType::Normal => 0x00,
        StitchType::Jump => 0x01,
        StitchType::Stop => 0x02,
        StitchType::Trim => 0x03,
        StitchType::End => 0x80,
    }
}

fn write_metadata_section<W: std::io::Write>(
    helper: &mut WriteHelper<W>,
    marker: &[u8],
    value: &str,
) -> Result<()> {
    if value.is_empty() {
        return Ok(());
    }
    helper.write_bytes(marker)?;
    let bytes = value.as_bytes();
    helper.write_u16_le((bytes.len() + 1) as u16)?;
    helper.write_bytes(bytes)?;
    helper.write_u8(0)?;
    Ok(())
}

/// Serialize `pattern` (already in machine coordinates) to VP3 bytes.
pub fn write(pattern: &StitchPattern) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let mut helper = WriteHelper::new(&mut buf);

    helper.write_bytes(SIGNATURE)?;
    write_metadata_section(&mut helper, b"%nam%", &pattern.metadata.name)?;
    write_metadata_section(&mut helper, b"%dat%", &pattern.metadata.date)?;

    helper.write_bytes(b"%xxs%")?;
    let section_size = (pattern.stitches.len() * 3) as u32;
    helper.write_u32_le(section_size)?;

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

    fn pattern() -> StitchPattern {
        StitchPattern::new(
            vec![
                StitchPoint::new(0.0, 0.0, StitchType::Jump),
                StitchPoint::new(15.0, 15.0, StitchType::Normal),
                StitchPoint::new(25.0, 25.0, StitchType::Normal),
                StitchPoint::new(25.0, 25.0, StitchType::End),
            ],
            vec!["#FF0000".to_string()],
            Dimensions { width: 260.0, height: 260.0 },
            Metadata::now("My Design", "vp3"),
        )
        .unwrap()
    }

    #[test]
    fn starts_with_vsm_signature() {
        let bytes = write(&pattern()).unwrap();
        assert_eq!(&bytes[0..5], SIGNATURE);
    }

    #[test]
    fn contains_stitch_section_marker() {
        let bytes = write(&pattern()).unwrap();
        assert!(bytes.windows(5).any(|w| w == b"%xxs%"));
    }

    #[test]
    fn command_bytes_match_known_mapping() {
        assert_eq!(encode_command(StitchType::Normal), 0x00);
        assert_eq!(encode_command(StitchType::Jump), 0x01);
        assert_eq!(encode_command(StitchType::Stop), 0x02);
        assert_eq!(encode_command(StitchType::Trim), 0x03);
        assert_eq!(encode_command(StitchType::End), 0x80);
    }
}
