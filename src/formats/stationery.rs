//! Stationery: the nested decorative-asset container embedded in a letter
//! as a `STATIN1` block. Same BPK1 shape as the outer file.

use crate::containers::bpk1::Container;
use crate::error::{Result, ScrapeError};
use crate::formats::{dispatch_blocks, BlockDiagnostic, BlockHandler};

/// Maximum length of the `STAHED1` name field.
const NAME_LIMIT: usize = 0x80;

/// Parsed stationery: a name, background images and the nested container
/// with every raw block (including the reserved, unparsed `STMASK1`).
#[derive(Debug)]
pub struct Stationery {
    pub name: Option<String>,
    pub backgrounds: Vec<Vec<u8>>,
    pub diagnostics: Vec<BlockDiagnostic>,
    container: Container,
}

#[derive(Default)]
struct StationeryBuilder {
    name: Option<String>,
    backgrounds: Vec<Vec<u8>>,
}

impl BlockHandler for StationeryBuilder {
    fn handle(&mut self, name: &str, data: &[u8]) -> Result<()> {
        match name {
            "STAHED1" => self.name = Some(read_stationery_name(data)?),
            "STBARD1" => self.backgrounds.push(data.to_vec()),
            // Reserved 256x256 4-bit mask; recorded in the block map but
            // deliberately never parsed
            "STMASK1" => {}
            _ => {}
        }
        Ok(())
    }
}

impl Stationery {
    /// Parse stationery from the bytes of a `STATIN1` block.
    pub fn parse(bytes: &[u8]) -> Result<Stationery> {
        Ok(Self::from_container(Container::parse(bytes)?))
    }

    pub fn from_container(container: Container) -> Stationery {
        let mut builder = StationeryBuilder::default();
        let diagnostics = dispatch_blocks(&container, &mut builder);
        Stationery {
            name: builder.name,
            backgrounds: builder.backgrounds,
            diagnostics,
            container,
        }
    }

    /// The raw bytes of the reserved mask block, if present.
    pub fn mask(&self) -> Option<&[u8]> {
        self.container.get("STMASK1", 0)
    }

    /// The nested container, for raw block access.
    pub fn blocks(&self) -> &Container {
        &self.container
    }
}

/// Decode the `STAHED1` name: ASCII, NUL-terminated, at most 0x80 bytes.
/// An unterminated field truncates at the limit rather than failing.
fn read_stationery_name(data: &[u8]) -> Result<String> {
    let field = &data[..data.len().min(NAME_LIMIT)];
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    let name = &field[..end];
    if !name.is_ascii() {
        return Err(ScrapeError::NameDecode);
    }
    Ok(String::from_utf8_lossy(name).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::containers::bpk1::make_container;

    #[test]
    fn parses_name_and_backgrounds() {
        let bytes = make_container(&[
            ("STAHED1", b"Classic\0junk after nul"),
            ("STBARD1", b"bg 2d"),
            ("STBARD1", b"bg 3d"),
            ("STMASK1", &[0u8; 16]),
        ]);
        let stationery = Stationery::parse(&bytes).unwrap();

        assert_eq!(stationery.name.as_deref(), Some("Classic"));
        assert_eq!(stationery.backgrounds, [b"bg 2d".to_vec(), b"bg 3d".to_vec()]);
        assert_eq!(stationery.mask().unwrap(), [0u8; 16]);
        assert!(stationery.diagnostics.is_empty());
    }

    #[test]
    fn unterminated_name_truncates_at_limit() {
        let long = vec![b'a'; 0x100];
        let bytes = make_container(&[("STAHED1", &long)]);
        let stationery = Stationery::parse(&bytes).unwrap();
        assert_eq!(stationery.name.as_deref().map(str::len), Some(0x80));
    }

    #[test]
    fn non_ascii_name_is_a_diagnostic_not_a_failure() {
        let bytes = make_container(&[("STAHED1", &[0xFF, 0xFE, 0x00]), ("STBARD1", b"bg")]);
        let stationery = Stationery::parse(&bytes).unwrap();

        assert!(stationery.name.is_none());
        assert_eq!(stationery.diagnostics.len(), 1);
        assert!(matches!(
            stationery.diagnostics[0].error,
            ScrapeError::NameDecode
        ));
        // Sibling blocks were still processed and the raw bytes remain
        assert_eq!(stationery.backgrounds.len(), 1);
        assert_eq!(stationery.blocks().get("STAHED1", 0).unwrap(), [0xFF, 0xFE, 0x00]);
    }
}
