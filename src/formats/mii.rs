//! Decoder for the fixed 92-byte avatar ("Mii") record embedded in letter
//! containers as `MIISTD1` blocks.
//!
//! Every attribute is a fixed-offset unsigned bitfield read from
//! little-endian words. No cross-field validation is performed; any bit
//! pattern is accepted.

use serde::Serialize;

use crate::binary_utils::{bit, bits, read_u16_le, read_u32_le};
use crate::error::{Result, ScrapeError};

/// Size of the record as stored in a `MIISTD1` block.
pub const AVATAR_RECORD_LEN: usize = 92;

/// Number of UTF-16 code units in the owner and creator name fields.
const NAME_LEN: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Gender {
    Male,
    Female,
}

/// Semantic attributes of one avatar record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AvatarRecord {
    pub gender: Gender,
    pub favorite_color: u8,
    pub owner_name: String,
    pub creator_name: String,

    pub height: u8,
    pub weight: u8,

    // Bit 0 of byte 0x30 is set when sharing is turned off
    pub sharing_disabled: bool,
    pub face_shape: u8,
    pub skin_color: u8,
    pub wrinkles: u8,
    pub makeup: u8,

    pub hair_style: u8,
    pub hair_color: u8,
    pub flip_hair: bool,

    pub eye_style: u8,
    pub eye_color: u8,
    pub eye_scale: u8,
    pub eye_scale_y: u8,
    pub eye_rotation: u8,
    pub eye_spacing_x: u8,
    pub eye_position_y: u8,

    pub eyebrow_style: u8,
    pub eyebrow_color: u8,
    pub eyebrow_scale: u8,
    pub eyebrow_scale_y: u8,
    pub eyebrow_rotation: u8,
    pub eyebrow_spacing_x: u8,
    pub eyebrow_position_y: u8,

    pub nose_style: u8,
    pub nose_scale: u8,
    pub nose_position_y: u8,

    pub mouth_style: u8,
    pub mouth_color: u8,
    pub mouth_scale: u8,
    pub mouth_scale_y: u8,
    pub mouth_position_y: u8,

    pub mustache_style: u8,
    pub mustache_scale: u8,
    pub mustache_position_y: u8,

    pub beard_style: u8,
    pub beard_color: u8,

    pub glasses_style: u8,
    pub glasses_color: u8,
    pub glasses_scale: u8,
    pub glasses_position_y: u8,

    pub mole_enabled: bool,
    pub mole_scale: u8,
    pub mole_position_x: u8,
    pub mole_position_y: u8,
}

/// Decode a 92-byte avatar record.
pub fn decode(data: &[u8]) -> Result<AvatarRecord> {
    if data.len() < AVATAR_RECORD_LEN {
        return Err(ScrapeError::ShortRecord {
            len: data.len(),
            expected: AVATAR_RECORD_LEN,
        });
    }

    // Gender, birthday and favorite color share the u16 at 0x18
    let meta = read_u16_le(data, 0x18)? as u32;
    let gender = if bit(meta, 0) {
        Gender::Female
    } else {
        Gender::Male
    };
    let favorite_color = bits(meta, 10, 4) as u8;

    let eyes = read_u32_le(data, 0x34)?;
    let eyebrows = read_u32_le(data, 0x38)?;
    let nose = read_u16_le(data, 0x3C)? as u32;
    let mouth = read_u16_le(data, 0x3E)? as u32;
    let mouth_y_mustache = read_u16_le(data, 0x40)? as u32;
    let beard_mustache = read_u16_le(data, 0x42)? as u32;
    let glasses = read_u16_le(data, 0x44)? as u32;
    let mole = read_u16_le(data, 0x46)? as u32;

    Ok(AvatarRecord {
        gender,
        favorite_color,
        owner_name: read_name(&data[0x1A..0x1A + NAME_LEN * 2]),
        creator_name: read_name(&data[0x48..0x48 + NAME_LEN * 2]),

        height: data[0x2E],
        weight: data[0x2F],

        sharing_disabled: bit(data[0x30] as u32, 0),
        face_shape: bits(data[0x30] as u32, 1, 4) as u8,
        skin_color: bits(data[0x30] as u32, 5, 3) as u8,
        wrinkles: bits(data[0x31] as u32, 0, 4) as u8,
        makeup: bits(data[0x31] as u32, 4, 4) as u8,

        hair_style: data[0x32],
        hair_color: bits(data[0x33] as u32, 0, 3) as u8,
        flip_hair: bit(data[0x33] as u32, 3),

        eye_style: bits(eyes, 0, 6) as u8,
        eye_color: bits(eyes, 6, 3) as u8,
        eye_scale: bits(eyes, 9, 4) as u8,
        eye_scale_y: bits(eyes, 13, 3) as u8,
        eye_rotation: bits(eyes, 16, 5) as u8,
        eye_spacing_x: bits(eyes, 21, 4) as u8,
        eye_position_y: bits(eyes, 25, 5) as u8,

        eyebrow_style: bits(eyebrows, 0, 5) as u8,
        eyebrow_color: bits(eyebrows, 5, 3) as u8,
        eyebrow_scale: bits(eyebrows, 8, 4) as u8,
        eyebrow_scale_y: bits(eyebrows, 12, 3) as u8,
        eyebrow_rotation: bits(eyebrows, 16, 4) as u8,
        eyebrow_spacing_x: bits(eyebrows, 21, 4) as u8,
        eyebrow_position_y: bits(eyebrows, 25, 5) as u8,

        nose_style: bits(nose, 0, 5) as u8,
        nose_scale: bits(nose, 5, 4) as u8,
        nose_position_y: bits(nose, 9, 5) as u8,

        mouth_style: bits(mouth, 0, 6) as u8,
        mouth_color: bits(mouth, 6, 3) as u8,
        mouth_scale: bits(mouth, 9, 4) as u8,
        mouth_scale_y: bits(mouth, 13, 3) as u8,
        mouth_position_y: bits(mouth_y_mustache, 0, 5) as u8,

        mustache_style: bits(mouth_y_mustache, 5, 3) as u8,
        mustache_scale: bits(beard_mustache, 6, 4) as u8,
        mustache_position_y: bits(beard_mustache, 10, 5) as u8,

        beard_style: bits(beard_mustache, 0, 3) as u8,
        beard_color: bits(beard_mustache, 3, 3) as u8,

        glasses_style: bits(glasses, 0, 4) as u8,
        glasses_color: bits(glasses, 4, 3) as u8,
        glasses_scale: bits(glasses, 7, 4) as u8,
        glasses_position_y: bits(glasses, 11, 5) as u8,

        mole_enabled: bit(mole, 0),
        mole_scale: bits(mole, 1, 4) as u8,
        mole_position_x: bits(mole, 5, 5) as u8,
        mole_position_y: bits(mole, 10, 5) as u8,
    })
}

/// Decode a fixed-length name field: UTF-16LE code units, terminated early
/// by a NUL unit.
fn read_name(field: &[u8]) -> String {
    let units: Vec<u16> = field
        .chunks_exact(2)
        .map(|b| u16::from_le_bytes([b[0], b[1]]))
        .take_while(|&u| u != 0)
        .collect();
    String::from_utf16_lossy(&units)
}
