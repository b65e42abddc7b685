//! LZSS decompressor for whole-file compressed BPK1 containers.
//!
//! The stream is the LZ10 variant used across the platform's system
//! software: a one-byte `0x10` tag, a 24-bit little-endian decompressed
//! size, then flag-driven tokens. Each flag byte supplies 8 flags, most
//! significant bit first; a 0 flag copies one literal byte, a 1 flag reads
//! a two-byte back-reference into the 0x1000-byte window of output emitted
//! so far.

use crate::error::{Result, ScrapeError};

const VARIANT_TAG: u8 = 0x10;
const MIN_MATCH_LEN: usize = 3;

/// Decompress an LZSS stream into its raw bytes.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    let mut decompressor = LzssDecompressor::new(data);
    decompressor.decompress()
}

struct LzssDecompressor<'a> {
    compressed_data: &'a [u8],
    cursor: usize,
    uncompressed_data: Vec<u8>,
}

impl<'a> LzssDecompressor<'a> {
    fn new(compressed_data: &'a [u8]) -> Self {
        LzssDecompressor {
            compressed_data,
            cursor: 0,
            uncompressed_data: Vec::new(),
        }
    }

    fn decompress(&mut self) -> Result<Vec<u8>> {
        if self.compressed_data.len() < 4 {
            return Err(ScrapeError::Codec(
                "Stream too short for LZSS header".to_string(),
            ));
        }

        if self.compressed_data[0] != VARIANT_TAG {
            return Err(ScrapeError::Codec(format!(
                "Unknown LZSS variant tag {:#04x}",
                self.compressed_data[0]
            )));
        }

        // Decompressed size is a 24-bit little-endian integer
        let size = u32::from_le_bytes([
            self.compressed_data[1],
            self.compressed_data[2],
            self.compressed_data[3],
            0,
        ]) as usize;

        self.cursor = 4;
        self.uncompressed_data = Vec::with_capacity(size);

        while self.uncompressed_data.len() < size {
            let flags = self.read_next_byte()?;

            for bit_pos in 0..8 {
                if self.uncompressed_data.len() >= size {
                    break;
                }

                let is_reference = (flags & (0x80 >> bit_pos)) != 0;
                if is_reference {
                    self.copy_sequence(size)?;
                } else {
                    let literal = self.read_next_byte()?;
                    self.uncompressed_data.push(literal);
                }
            }
        }

        Ok(std::mem::take(&mut self.uncompressed_data))
    }

    fn read_next_byte(&mut self) -> Result<u8> {
        let b = self
            .compressed_data
            .get(self.cursor)
            .copied()
            .ok_or_else(|| ScrapeError::Codec("Truncated LZSS stream".to_string()))?;
        self.cursor += 1;
        Ok(b)
    }

    /// Copy a back-referenced sequence from previously emitted output.
    fn copy_sequence(&mut self, size: usize) -> Result<()> {
        let hi = self.read_next_byte()?;
        let lo = self.read_next_byte()?;

        let length = ((hi >> 4) as usize) + MIN_MATCH_LEN;
        let distance = ((((hi & 0x0F) as usize) << 8) | lo as usize) + 1;

        let emitted = self.uncompressed_data.len();
        if distance > emitted {
            return Err(ScrapeError::Codec(format!(
                "Back-reference distance {} exceeds {} bytes of output",
                distance, emitted
            )));
        }

        // Sequences may overlap their own output, so copy byte by byte
        for i in 0..length {
            if self.uncompressed_data.len() >= size {
                break;
            }
            let byte = self.uncompressed_data[emitted - distance + i];
            self.uncompressed_data.push(byte);
        }

        Ok(())
    }
}
