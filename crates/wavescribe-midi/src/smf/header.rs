//! SMF header chunk.

use std::io::{self, Write};

use byteorder::{BigEndian, WriteBytesExt};

/// Header chunk magic identifier.
pub const SMF_HEADER_MAGIC: &[u8; 4] = b"MThd";

/// Header chunk payload length (fixed at 6 bytes).
pub const SMF_HEADER_LENGTH: u32 = 6;

/// Format tag for a single-track file.
pub const SMF_FORMAT_SINGLE_TRACK: u16 = 0;

/// SMF header chunk data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SmfHeader {
    /// File format (0 = single track).
    pub format: u16,
    /// Number of track chunks that follow.
    pub num_tracks: u16,
    /// Time division in ticks per beat. The high bit selects SMPTE
    /// timing, which this writer never emits.
    pub division: u16,
}

impl SmfHeader {
    /// Single-track header at the given division.
    pub fn new(division: u16) -> Self {
        Self {
            format: SMF_FORMAT_SINGLE_TRACK,
            num_tracks: 1,
            division,
        }
    }

    /// Write the complete header chunk.
    pub fn write<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(SMF_HEADER_MAGIC)?;
        writer.write_u32::<BigEndian>(SMF_HEADER_LENGTH)?;
        writer.write_u16::<BigEndian>(self.format)?;
        writer.write_u16::<BigEndian>(self.num_tracks)?;
        writer.write_u16::<BigEndian>(self.division)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_header_bytes() {
        let mut bytes = Vec::new();
        SmfHeader::new(960).write(&mut bytes).unwrap();
        assert_eq!(
            bytes,
            vec![
                b'M', b'T', b'h', b'd', // magic
                0x00, 0x00, 0x00, 0x06, // payload length
                0x00, 0x00, // format 0
                0x00, 0x01, // one track
                0x03, 0xC0, // 960 ticks per beat
            ]
        );
    }
}
