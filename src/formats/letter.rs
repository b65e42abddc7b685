//! Letter: the top-level model of a Swapdoodle BPK1 file.

use crate::containers::bpk1::Container;
use crate::error::Result;
use crate::formats::mii::{self, AvatarRecord};
use crate::formats::stationery::Stationery;
use crate::formats::{dispatch_blocks, BlockDiagnostic, BlockHandler};

/// A parsed letter: thumbnails, the sender's avatar record, optional
/// nested stationery, plus the container with every raw block (recognized
/// or not) addressable as `NAME$occurrence`.
#[derive(Debug)]
pub struct Letter {
    /// Raw thumbnail images (JPEG), in directory order.
    pub thumbnails: Vec<Vec<u8>>,
    pub sender: Option<AvatarRecord>,
    pub stationery: Option<Stationery>,
    pub diagnostics: Vec<BlockDiagnostic>,
    container: Container,
}

#[derive(Default)]
struct LetterBuilder {
    thumbnails: Vec<Vec<u8>>,
    sender: Option<AvatarRecord>,
    stationery: Option<Stationery>,
}

impl BlockHandler for LetterBuilder {
    fn handle(&mut self, name: &str, data: &[u8]) -> Result<()> {
        match name {
            "THUMB2" => self.thumbnails.push(data.to_vec()),
            // Singleton slots: the last decodable occurrence wins
            "MIISTD1" => self.sender = Some(mii::decode(data)?),
            "STATIN1" => self.stationery = Some(Stationery::parse(data)?),
            _ => {}
        }
        Ok(())
    }
}

impl Letter {
    /// Parse a letter from a BPK1 buffer (compressed or not).
    pub fn parse(bytes: &[u8]) -> Result<Letter> {
        Ok(Self::from_container(Container::parse(bytes)?))
    }

    pub fn from_container(container: Container) -> Letter {
        let mut builder = LetterBuilder::default();
        let diagnostics = dispatch_blocks(&container, &mut builder);
        Letter {
            thumbnails: builder.thumbnails,
            sender: builder.sender,
            stationery: builder.stationery,
            diagnostics,
            container,
        }
    }

    /// The underlying container, for raw block access.
    pub fn blocks(&self) -> &Container {
        &self.container
    }
}
