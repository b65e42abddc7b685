//! Decoder toolkit for the BPK1 letter containers written by the 3DS
//! Swapdoodle application: block directory parsing, whole-file LZSS
//! unwrapping, avatar record decoding and Mii Studio token encoding.

pub mod binary_utils;
pub mod containers;
pub mod error;
pub mod formats;
pub mod letter_extractor;

pub use containers::bpk1::{BlockDescriptor, Container, BPK1_MAGIC};
pub use containers::compression::lzss::decompress;
pub use error::{Result, ScrapeError};
pub use formats::letter::Letter;
pub use formats::mii::{decode as decode_avatar, AvatarRecord, Gender};
pub use formats::stationery::Stationery;
pub use formats::studio::{encode as encode_studio, studio_url, StudioToken};
