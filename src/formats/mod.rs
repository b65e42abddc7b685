pub mod letter;
pub mod mii;
pub mod stationery;
pub mod studio;

use crate::containers::bpk1::Container;
use crate::error::{Result, ScrapeError};

/// A per-block decode failure, recorded instead of aborting the container
/// parse. The raw bytes stay addressable through the container's block map.
#[derive(Debug)]
pub struct BlockDiagnostic {
    pub name: String,
    pub occurrence: u32,
    pub error: ScrapeError,
}

/// Name-keyed handler for the blocks of one container kind.
///
/// The same walk serves the top-level letter and the nested stationery;
/// handlers ignore names they do not know.
pub(crate) trait BlockHandler {
    fn handle(&mut self, name: &str, data: &[u8]) -> Result<()>;
}

/// Feed every block to the handler in directory order.
///
/// Handler failures never abort the walk; they are collected as
/// diagnostics so sibling blocks still get processed.
pub(crate) fn dispatch_blocks<H: BlockHandler>(
    container: &Container,
    handler: &mut H,
) -> Vec<BlockDiagnostic> {
    let mut diagnostics = Vec::new();
    for (descriptor, data) in container.iter() {
        if let Err(error) = handler.handle(&descriptor.name, data) {
            diagnostics.push(BlockDiagnostic {
                name: descriptor.name.clone(),
                occurrence: descriptor.occurrence,
                error,
            });
        }
    }
    diagnostics
}
