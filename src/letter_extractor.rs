//! Filesystem extraction driver used by the CLI: unpacks a letter
//! container into a directory of raw blocks and decoded artifacts.

use std::fs;
use std::path::{Path, PathBuf};

use crate::containers::bpk1::Container;
use crate::error::Result;
use crate::formats::letter::Letter;
use crate::formats::studio;

pub struct ExtractOptions {
    /// Recurse into blocks that are themselves BPK1 containers.
    pub recurse: bool,
    /// Convert thumbnail images to optimized PNG instead of raw JPEG.
    pub png: bool,
}

pub struct LetterExtractor {
    input_path: PathBuf,
}

impl LetterExtractor {
    pub fn new(input_path: &Path) -> Self {
        LetterExtractor {
            input_path: input_path.to_path_buf(),
        }
    }

    /// Unpack the container into `output_dir`: every raw block as
    /// `NAME$occurrence.bin`, plus decoded letter artifacts (thumbnails,
    /// sender avatar JSON, studio token, stationery backgrounds).
    pub fn extract(&self, output_dir: &Path, options: &ExtractOptions) -> Result<()> {
        let bytes = fs::read(&self.input_path)?;
        let container = Container::parse(&bytes)?;

        fs::create_dir_all(output_dir)?;
        write_blocks(&container, output_dir, options.recurse)?;

        let letter = Letter::from_container(container);
        for diagnostic in &letter.diagnostics {
            eprintln!(
                "Warning: block {}${} failed to decode: {}",
                diagnostic.name, diagnostic.occurrence, diagnostic.error
            );
        }

        for (i, thumbnail) in letter.thumbnails.iter().enumerate() {
            if options.png {
                write_png(thumbnail, &output_dir.join(format!("thumbnail_{}.png", i)));
            } else {
                fs::write(output_dir.join(format!("thumbnail_{}.jpg", i)), thumbnail)?;
            }
        }

        if let Some(sender) = &letter.sender {
            let json = serde_json::to_string_pretty(sender)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
            fs::write(output_dir.join("sender.json"), json)?;
            fs::write(output_dir.join("studio_url.txt"), studio::studio_url(sender))?;
        }

        if let Some(stationery) = &letter.stationery {
            let dir = output_dir.join("stationery");
            fs::create_dir_all(&dir)?;
            if let Some(name) = &stationery.name {
                fs::write(dir.join("name.txt"), name)?;
            }
            for (i, background) in stationery.backgrounds.iter().enumerate() {
                fs::write(dir.join(format!("background_{}.bin", i)), background)?;
            }
        }

        Ok(())
    }
}

fn write_blocks(container: &Container, output_dir: &Path, recurse: bool) -> Result<()> {
    for (descriptor, data) in container.iter() {
        let path = output_dir.join(format!("{}.bin", descriptor.key()));
        fs::write(&path, data)?;
        println!(
            "Wrote {} ({} bytes, offset {:#x})",
            path.display(),
            descriptor.size,
            descriptor.offset
        );

        if recurse {
            // Nested containers (e.g. STATIN1) unpack into a subdirectory
            if let Ok(nested) = Container::parse(data) {
                let nested_dir = output_dir.join(descriptor.key());
                fs::create_dir_all(&nested_dir)?;
                write_blocks(&nested, &nested_dir, recurse)?;
            }
        }
    }
    Ok(())
}

/// Decode an embedded JPEG and write it back out as an optimized PNG.
/// Falls back to leaving the unoptimized PNG in place if oxipng fails.
fn write_png(jpeg: &[u8], path: &Path) {
    let image = match image::load_from_memory(jpeg) {
        Ok(image) => image,
        Err(e) => {
            eprintln!("Warning: could not decode thumbnail image: {}", e);
            return;
        }
    };

    if let Err(e) = image.save(path) {
        eprintln!("Warning: could not write {}: {}", path.display(), e);
        return;
    }

    let options = oxipng::Options::from_preset(2);
    if let Err(e) = oxipng::optimize(
        &oxipng::InFile::Path(path.to_path_buf()),
        &oxipng::OutFile::Path(Some(path.to_path_buf())),
        &options,
    ) {
        eprintln!(
            "Warning: oxipng optimisation failed for {}: {}. File saved unoptimised.",
            path.display(),
            e
        );
    }
}
