//! BPK1 is the letter container format: a magic-tagged directory of named
//! byte ranges, optionally wrapped whole-file in an LZSS stream.
//!
//! Layout: bytes 0-3 magic `"BPK1"` (LE u32), bytes 4-7 block count,
//! bytes 8-0x3F reserved, then one 20-byte directory entry per block
//! {offset, size, checksum, 8-byte NUL-padded ASCII name}. Checksums are
//! read but never verified. The compressed wrapping carries no flag and is
//! detected only by the magic mismatching.

use std::collections::{BTreeMap, HashMap};

use crate::binary_utils::read_u32_le;
use crate::containers::compression::lzss;
use crate::error::{Result, ScrapeError};

pub const BPK1_MAGIC: u32 = u32::from_le_bytes(*b"BPK1");

const DIRECTORY_OFFSET: usize = 0x40;
const DIRECTORY_ENTRY_LEN: usize = 20;
const BLOCK_NAME_LEN: usize = 8;

/// One directory entry, resolved to a range of the container's buffer.
#[derive(Debug, Clone)]
pub struct BlockDescriptor {
    pub name: String,
    /// Zero-based index among blocks sharing this name, in directory order.
    pub occurrence: u32,
    pub offset: u32,
    pub size: u32,
    /// Present in the directory but never validated.
    pub checksum: u32,
}

impl BlockDescriptor {
    /// Key used to address this block, e.g. `THUMB2$0`.
    pub fn key(&self) -> String {
        format!("{}${}", self.name, self.occurrence)
    }
}

/// A parsed BPK1 container: the decompressed source buffer plus the block
/// directory. Block contents are views into the buffer, which is never
/// mutated after parsing.
#[derive(Debug)]
pub struct Container {
    data: Vec<u8>,
    blocks: Vec<BlockDescriptor>,
}

impl Container {
    /// Parse a BPK1 container from bytes.
    ///
    /// If the magic does not match, the whole input is run through the LZSS
    /// codec once and re-checked; a second mismatch (or a codec failure)
    /// reports the magic value originally observed.
    pub fn parse(bytes: &[u8]) -> Result<Container> {
        let found = read_u32_le(bytes, 0)?;

        let data = if found == BPK1_MAGIC {
            bytes.to_vec()
        } else {
            let decompressed =
                lzss::decompress(bytes).map_err(|_| ScrapeError::BadMagic { found })?;
            let recheck = read_u32_le(&decompressed, 0).map_err(|_| ScrapeError::BadMagic { found })?;
            if recheck != BPK1_MAGIC {
                return Err(ScrapeError::BadMagic { found });
            }
            decompressed
        };

        let block_count = read_u32_le(&data, 4)?;

        // The declared count sizes the allocation below, so the directory
        // must fit the buffer first
        let directory_end =
            DIRECTORY_OFFSET as u64 + block_count as u64 * DIRECTORY_ENTRY_LEN as u64;
        if directory_end > data.len() as u64 {
            return Err(ScrapeError::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                format!(
                    "Directory of {} blocks needs {} bytes but buffer has {}",
                    block_count,
                    directory_end,
                    data.len()
                ),
            )));
        }

        let mut blocks = Vec::with_capacity(block_count as usize);
        let mut occurrences: HashMap<String, u32> = HashMap::new();

        for i in 0..block_count as usize {
            let entry = DIRECTORY_OFFSET + i * DIRECTORY_ENTRY_LEN;
            let offset = read_u32_le(&data, entry)?;
            let size = read_u32_le(&data, entry + 4)?;
            let checksum = read_u32_le(&data, entry + 8)?;
            let name = read_block_name(&data, entry + 12)?;

            if offset as u64 + size as u64 > data.len() as u64 {
                return Err(ScrapeError::BlockRange {
                    name,
                    offset,
                    size,
                    buffer_len: data.len(),
                });
            }

            let occurrence = occurrences.entry(name.clone()).or_insert(0);
            blocks.push(BlockDescriptor {
                name,
                occurrence: *occurrence,
                offset,
                size,
                checksum,
            });
            *occurrence += 1;
        }

        Ok(Container { data, blocks })
    }

    pub fn block_count(&self) -> u32 {
        self.blocks.len() as u32
    }

    /// Directory entries in directory order, recognized or not.
    pub fn descriptors(&self) -> &[BlockDescriptor] {
        &self.blocks
    }

    /// The raw bytes of a block, as a view into the container's buffer.
    pub fn block_bytes(&self, descriptor: &BlockDescriptor) -> &[u8] {
        // Range was validated against the buffer during parsing
        &self.data[descriptor.offset as usize..(descriptor.offset + descriptor.size) as usize]
    }

    /// Look up a block by name and occurrence index.
    pub fn get(&self, name: &str, occurrence: u32) -> Option<&[u8]> {
        self.blocks
            .iter()
            .find(|b| b.name == name && b.occurrence == occurrence)
            .map(|b| self.block_bytes(b))
    }

    /// All blocks keyed as `NAME$occurrence`.
    pub fn block_map(&self) -> BTreeMap<String, &[u8]> {
        self.blocks
            .iter()
            .map(|b| (b.key(), self.block_bytes(b)))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&BlockDescriptor, &[u8])> {
        self.blocks.iter().map(|b| (b, self.block_bytes(b)))
    }

    /// Serialize back into an uncompressed BPK1 buffer.
    ///
    /// Offsets and sizes are regenerated from the current block contents,
    /// checksums are zero-filled and the reserved header region is zeroed.
    /// Only content equivalence with the source is guaranteed, not byte
    /// equality.
    pub fn build(&self) -> Vec<u8> {
        let directory_len = self.blocks.len() * DIRECTORY_ENTRY_LEN;
        let mut output = vec![0u8; DIRECTORY_OFFSET + directory_len];

        output[0..4].copy_from_slice(&BPK1_MAGIC.to_le_bytes());
        output[4..8].copy_from_slice(&(self.blocks.len() as u32).to_le_bytes());

        for (i, block) in self.blocks.iter().enumerate() {
            let data = self.block_bytes(block);
            let offset = output.len() as u32;

            let entry = DIRECTORY_OFFSET + i * DIRECTORY_ENTRY_LEN;
            output[entry..entry + 4].copy_from_slice(&offset.to_le_bytes());
            output[entry + 4..entry + 8].copy_from_slice(&(data.len() as u32).to_le_bytes());
            // entry + 8: checksum stays zero

            let name = block.name.as_bytes();
            let name_len = name.len().min(BLOCK_NAME_LEN);
            output[entry + 12..entry + 12 + name_len].copy_from_slice(&name[..name_len]);

            output.extend_from_slice(data);
        }

        output
    }
}

/// Read an 8-byte block name, stopping at the first NUL.
fn read_block_name(data: &[u8], offset: usize) -> Result<String> {
    let field = data
        .get(offset..offset + BLOCK_NAME_LEN)
        .ok_or_else(|| ScrapeError::Io(std::io::ErrorKind::UnexpectedEof.into()))?;
    let end = field.iter().position(|&b| b == 0).unwrap_or(BLOCK_NAME_LEN);
    let name = &field[..end];
    if !name.is_ascii() {
        return Err(ScrapeError::NameDecode);
    }
    Ok(String::from_utf8_lossy(name).into_owned())
}

/// Build a minimal container by hand from (name, data) pairs. Test helper.
#[cfg(test)]
pub(crate) fn make_container(blocks: &[(&str, &[u8])]) -> Vec<u8> {
    let mut out = vec![0u8; DIRECTORY_OFFSET + blocks.len() * DIRECTORY_ENTRY_LEN];
    out[0..4].copy_from_slice(b"BPK1");
    out[4..8].copy_from_slice(&(blocks.len() as u32).to_le_bytes());
    for (i, (name, data)) in blocks.iter().enumerate() {
        let entry = DIRECTORY_OFFSET + i * DIRECTORY_ENTRY_LEN;
        let offset = out.len() as u32;
        out[entry..entry + 4].copy_from_slice(&offset.to_le_bytes());
        out[entry + 4..entry + 8].copy_from_slice(&(data.len() as u32).to_le_bytes());
        out[entry + 8..entry + 12].copy_from_slice(&0xDEADBEEFu32.to_le_bytes());
        out[entry + 12..entry + 12 + name.len()].copy_from_slice(name.as_bytes());
        out.extend_from_slice(data);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_directory_in_order() {
        let bytes = make_container(&[
            ("THUMB2", b"first"),
            ("MIISTD1", b"avatar"),
            ("THUMB2", b"second"),
        ]);
        let container = Container::parse(&bytes).unwrap();

        assert_eq!(container.block_count(), 3);
        assert_eq!(container.get("THUMB2", 0).unwrap(), &b"first"[..]);
        assert_eq!(container.get("THUMB2", 1).unwrap(), &b"second"[..]);
        assert_eq!(container.get("MIISTD1", 0).unwrap(), &b"avatar"[..]);
        assert!(container.get("THUMB2", 2).is_none());

        let keys: Vec<String> = container.descriptors().iter().map(|b| b.key()).collect();
        assert_eq!(keys, ["THUMB2$0", "MIISTD1$0", "THUMB2$1"]);
    }

    #[test]
    fn records_unrecognized_blocks() {
        let bytes = make_container(&[("WHAT1", b"mystery")]);
        let container = Container::parse(&bytes).unwrap();
        assert_eq!(container.block_map()["WHAT1$0"], &b"mystery"[..]);
    }

    #[test]
    fn bad_magic_reports_observed_value() {
        let mut bytes = make_container(&[("THUMB2", b"x")]);
        bytes[0..4].copy_from_slice(b"NOPE");
        match Container::parse(&bytes) {
            Err(ScrapeError::BadMagic { found }) => {
                assert_eq!(found, u32::from_le_bytes(*b"NOPE"));
            }
            other => panic!("expected BadMagic, got {:?}", other),
        }
    }

    #[test]
    fn oversized_block_count_is_an_error_not_an_allocation() {
        // A bare header declaring u32::MAX blocks has no room for any
        // directory entry; parsing must fail cleanly
        let mut bytes = vec![0u8; DIRECTORY_OFFSET];
        bytes[0..4].copy_from_slice(b"BPK1");
        bytes[4..8].copy_from_slice(&u32::MAX.to_le_bytes());
        assert!(matches!(
            Container::parse(&bytes),
            Err(ScrapeError::Io(_))
        ));
    }

    #[test]
    fn truncated_directory_is_an_error() {
        let mut bytes = make_container(&[("THUMB2", b"x")]);
        // Claim one more block than the directory holds
        bytes[4..8].copy_from_slice(&2u32.to_le_bytes());
        assert!(Container::parse(&bytes).is_err());
    }

    #[test]
    fn out_of_range_block_is_an_error() {
        let mut bytes = make_container(&[("THUMB2", b"x")]);
        // Inflate the declared size past the end of the buffer
        let entry = DIRECTORY_OFFSET;
        bytes[entry + 4..entry + 8].copy_from_slice(&0xFFFF_FFF0u32.to_le_bytes());
        assert!(matches!(
            Container::parse(&bytes),
            Err(ScrapeError::BlockRange { .. })
        ));
    }

    #[test]
    fn build_round_trips_content() {
        let bytes = make_container(&[
            ("THUMB2", b"first"),
            ("THUMB2", b"second"),
            ("STAHED1", b"Some name\0"),
        ]);
        let container = Container::parse(&bytes).unwrap();
        let rebuilt = Container::parse(&container.build()).unwrap();

        assert_eq!(container.block_map(), rebuilt.block_map());
        // Checksums are regenerated as zero
        assert!(rebuilt.descriptors().iter().all(|b| b.checksum == 0));
    }

    #[test]
    fn compressed_container_parses_like_raw() {
        // Single literal-coded LZSS stream wrapping a whole container
        let raw = make_container(&[("THUMB2", b"jpeg bytes")]);
        let mut compressed = vec![0x10];
        compressed.extend_from_slice(&(raw.len() as u32).to_le_bytes()[..3]);
        for chunk in raw.chunks(8) {
            compressed.push(0x00);
            compressed.extend_from_slice(chunk);
        }

        let a = Container::parse(&raw).unwrap();
        let b = Container::parse(&compressed).unwrap();
        assert_eq!(a.block_map(), b.block_map());
    }
}
