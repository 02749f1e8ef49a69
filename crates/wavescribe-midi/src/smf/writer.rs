//! SMF file assembly - header and track chunk into one byte stream.

use std::io::{self, Write};

use super::header::SmfHeader;
use super::track::TrackChunk;

/// A complete single-track sequencer file.
#[derive(Debug, Clone)]
pub struct SmfFile {
    /// Header chunk.
    pub header: SmfHeader,
    /// The single track chunk.
    pub track: TrackChunk,
}

impl SmfFile {
    /// Create an empty file at the given division.
    pub fn new(division: u16) -> Self {
        Self {
            header: SmfHeader::new(division),
            track: TrackChunk::new(),
        }
    }

    /// Write the complete file to a writer.
    pub fn write<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        self.header.write(writer)?;
        self.track.write(writer)
    }

    /// Write the file to a byte vector.
    pub fn to_bytes(&self) -> io::Result<Vec<u8>> {
        let mut buffer = Vec::new();
        self.write(&mut buffer)?;
        Ok(buffer)
    }

    /// Compute the BLAKE3 hash of the file bytes.
    pub fn compute_hash(&self) -> io::Result<String> {
        let bytes = self.to_bytes()?;
        Ok(blake3::hash(&bytes).to_hex().to_string())
    }
}
