use std::io::{self, ErrorKind};

pub fn read_u16_le(data: &[u8], offset: usize) -> io::Result<u16> {
    match data.get(offset..offset + 2) {
        Some(b) => Ok(u16::from_le_bytes([b[0], b[1]])),
        None => Err(io::Error::new(
            ErrorKind::UnexpectedEof,
            format!("Not enough bytes for u16 at offset {:#x}", offset),
        )),
    }
}

pub fn read_u32_le(data: &[u8], offset: usize) -> io::Result<u32> {
    match data.get(offset..offset + 4) {
        Some(b) => Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]])),
        None => Err(io::Error::new(
            ErrorKind::UnexpectedEof,
            format!("Not enough bytes for u32 at offset {:#x}", offset),
        )),
    }
}

/// Extract `width` bits starting at bit `start` (counting from bit 0).
pub fn bits(value: u32, start: u32, width: u32) -> u32 {
    (value >> start) & ((1 << width) - 1)
}

/// Test a single bit.
pub fn bit(value: u32, index: u32) -> bool {
    (value >> index) & 1 != 0
}
