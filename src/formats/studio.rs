//! Re-encoder from a decoded avatar record into the token format consumed
//! by the external Mii Studio rendering service.
//!
//! The token is produced in two steps: the record's attributes are repacked
//! into a fixed 47-byte layout on top of an immutable default template,
//! then the array is run through a rolling byte transform and emitted as
//! lowercase hex. The transform is one-way; no decode path exists.

use std::fmt::Write;

use crate::formats::mii::{AvatarRecord, Gender};

/// Length of the repacked attribute array.
pub const STUDIO_DATA_LEN: usize = 47;

/// Default attribute values; the final byte is reserved padding and is
/// never overwritten by the repack.
const STUDIO_TEMPLATE: [u8; STUDIO_DATA_LEN] = [
    0x08, 0x00, 0x40, 0x03, 0x08, 0x04, 0x04, 0x02, 0x02, 0x0C, 0x03, 0x01, 0x06, 0x04, 0x06,
    0x02, 0x0A, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x08, 0x04, 0x00, 0x0A, 0x01, 0x00, 0x21,
    0x40, 0x04, 0x00, 0x02, 0x14, 0x03, 0x13, 0x04, 0x17, 0x0D, 0x04, 0x00, 0x0A, 0x04, 0x01,
    0x09, 0x00,
];

/// The repacked attribute array together with its hex encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudioToken {
    pub data: [u8; STUDIO_DATA_LEN],
    pub hex: String,
}

impl StudioToken {
    pub fn from_record(record: &AvatarRecord) -> StudioToken {
        let data = repack(record);
        StudioToken {
            data,
            hex: obfuscate(&data),
        }
    }
}

/// Encode an avatar record as the 96-character studio hex token.
pub fn encode(record: &AvatarRecord) -> String {
    StudioToken::from_record(record).hex
}

/// Render URL for the external studio endpoint.
pub fn studio_url(record: &AvatarRecord) -> String {
    format!(
        "https://studio.mii.nintendo.com/miis/image.png?data={}&width=512&type=face",
        encode(record)
    )
}

/// Colors where the studio side treats raw 0 as palette slot 8.
fn or_eight(color: u8) -> u8 {
    if color == 0 {
        8
    } else {
        color
    }
}

/// Repack decoded attributes into the studio byte layout.
pub fn repack(record: &AvatarRecord) -> [u8; STUDIO_DATA_LEN] {
    let mut out = STUDIO_TEMPLATE;

    out[0x00] = or_eight(record.beard_color);
    out[0x01] = record.beard_style;
    out[0x02] = record.weight;

    out[0x03] = record.eye_scale_y;
    out[0x04] = record.eye_color + 8;
    out[0x05] = record.eye_rotation;
    out[0x06] = record.eye_scale;
    out[0x07] = record.eye_style;
    out[0x08] = record.eye_spacing_x;
    out[0x09] = record.eye_position_y;

    out[0x0A] = record.eyebrow_scale_y;
    out[0x0B] = or_eight(record.eyebrow_color);
    out[0x0C] = record.eyebrow_rotation;
    out[0x0D] = record.eyebrow_scale;
    out[0x0E] = record.eyebrow_style;
    out[0x0F] = record.eyebrow_spacing_x;
    out[0x10] = record.eyebrow_position_y;

    out[0x11] = record.skin_color;
    out[0x12] = record.makeup;
    out[0x13] = record.face_shape;
    out[0x14] = record.wrinkles;
    out[0x15] = record.favorite_color;
    out[0x16] = match record.gender {
        Gender::Male => 0,
        Gender::Female => 1,
    };

    out[0x17] = match record.glasses_color {
        0 => 8,
        c @ 1..=5 => c + 13,
        _ => 0,
    };
    out[0x18] = record.glasses_scale;
    out[0x19] = record.glasses_style;
    out[0x1A] = record.glasses_position_y;

    out[0x1B] = or_eight(record.hair_color);
    out[0x1C] = record.flip_hair as u8;
    out[0x1D] = record.hair_style;
    out[0x1E] = record.height;

    out[0x1F] = record.mole_scale;
    out[0x20] = record.mole_enabled as u8;
    out[0x21] = record.mole_position_x;
    out[0x22] = record.mole_position_y;

    out[0x23] = record.mouth_scale_y;
    out[0x24] = if record.mouth_color < 4 {
        record.mouth_color + 19
    } else {
        0
    };
    out[0x25] = record.mouth_scale;
    out[0x26] = record.mouth_style;
    out[0x27] = record.mouth_position_y;

    out[0x28] = record.mustache_scale;
    out[0x29] = record.mustache_style;
    out[0x2A] = record.mustache_position_y;

    out[0x2B] = record.nose_scale;
    out[0x2C] = record.nose_style;
    out[0x2D] = record.nose_position_y;

    out
}

/// Rolling transform: every output byte mixes in the running state, so the
/// hex token cannot be reversed without replaying the stream.
fn obfuscate(data: &[u8; STUDIO_DATA_LEN]) -> String {
    let mut n: u8 = 0;
    let mut hex = String::with_capacity((STUDIO_DATA_LEN + 1) * 2);
    // The initial state is emitted first
    let _ = write!(hex, "{:02x}", n);
    for &b in data {
        n = (b ^ n).wrapping_add(7);
        let _ = write!(hex, "{:02x}", n);
    }
    hex
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::mii::{self, AVATAR_RECORD_LEN};

    #[test]
    fn golden_token_for_zeroed_record() {
        let record = mii::decode(&[0u8; AVATAR_RECORD_LEN]).unwrap();
        let token = StudioToken::from_record(&record);

        // Every attribute is zero, so only the template padding and the
        // color fallbacks survive the repack.
        assert_eq!(token.data[0x00], 8);
        assert_eq!(token.data[0x04], 8);
        assert_eq!(token.data[0x0B], 8);
        assert_eq!(token.data[0x17], 8);
        assert_eq!(token.data[0x1B], 8);
        assert_eq!(token.data[0x24], 19);
        assert_eq!(token.data[0x2E], 0);

        assert_eq!(token.hex.len(), 96);
        assert_eq!(
            token.hex,
            "000f161d24333a41484f565d5c636a71787f868d949ba2a9a8afb6bdbcc3cad1d8dfe6edf4eef5fc030a11181f262d34"
        );
    }

    #[test]
    fn hair_color_one_is_not_remapped() {
        let mut data = [0u8; AVATAR_RECORD_LEN];
        data[0x33] = 0x01;
        let record = mii::decode(&data).unwrap();
        assert_eq!(record.hair_color, 1);
        assert_eq!(repack(&record)[0x1B], 1);
    }

    #[test]
    fn female_gender_bit_reaches_the_token() {
        let mut data = [0u8; AVATAR_RECORD_LEN];
        data[0x18] = 0x01;
        let record = mii::decode(&data).unwrap();
        assert_eq!(record.gender, crate::formats::mii::Gender::Female);
        assert_eq!(repack(&record)[0x16], 1);
    }

    #[test]
    fn glasses_color_recoding() {
        let mut data = [0u8; AVATAR_RECORD_LEN];

        data[0x44..0x46].copy_from_slice(&(3u16 << 4).to_le_bytes());
        let record = mii::decode(&data).unwrap();
        assert_eq!(record.glasses_color, 3);
        assert_eq!(repack(&record)[0x17], 16);

        data[0x44..0x46].copy_from_slice(&(6u16 << 4).to_le_bytes());
        let record = mii::decode(&data).unwrap();
        assert_eq!(repack(&record)[0x17], 0);
    }

    #[test]
    fn mouth_color_recoding() {
        let mut data = [0u8; AVATAR_RECORD_LEN];

        data[0x3E..0x40].copy_from_slice(&(2u16 << 6).to_le_bytes());
        let record = mii::decode(&data).unwrap();
        assert_eq!(repack(&record)[0x24], 21);

        data[0x3E..0x40].copy_from_slice(&(5u16 << 6).to_le_bytes());
        let record = mii::decode(&data).unwrap();
        assert_eq!(repack(&record)[0x24], 0);
    }

    #[test]
    fn url_wraps_the_token() {
        let record = mii::decode(&[0u8; AVATAR_RECORD_LEN]).unwrap();
        let url = studio_url(&record);
        assert!(url.starts_with("https://studio.mii.nintendo.com/miis/image.png?data=00"));
        assert!(url.ends_with("&width=512&type=face"));
    }
}
