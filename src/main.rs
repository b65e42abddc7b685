use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use doodle_scraper::containers::bpk1::Container;
use doodle_scraper::formats::letter::Letter;
use doodle_scraper::formats::studio;
use doodle_scraper::letter_extractor::{ExtractOptions, LetterExtractor};

#[derive(Parser)]
#[command(name = "doodle_scraper", about = "Extract Swapdoodle BPK1 letter containers")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Unpack blocks and decoded artifacts into a directory
    Unpack {
        /// Input .bpk file
        input: PathBuf,
        /// Output directory (default: input path without extension)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Recurse into blocks that are themselves BPK1 containers
        #[arg(long)]
        recurse: bool,
        /// Convert thumbnails to optimized PNG
        #[arg(long)]
        png: bool,
    },
    /// Print a summary of a letter container
    Info {
        /// Input .bpk file
        input: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Unpack {
            input,
            output,
            recurse,
            png,
        } => {
            let output = output.unwrap_or_else(|| input.with_extension(""));
            let extractor = LetterExtractor::new(&input);
            extractor.extract(&output, &ExtractOptions { recurse, png })
        }
        Command::Info { input } => info(&input),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn info(input: &PathBuf) -> doodle_scraper::Result<()> {
    let bytes = std::fs::read(input)?;
    let container = Container::parse(&bytes)?;

    println!("Read {} blocks", container.block_count());
    for descriptor in container.descriptors() {
        println!(
            "  {:<12} offset {:#010x}  size {:>8}  checksum {:#010x}",
            descriptor.key(),
            descriptor.offset,
            descriptor.size,
            descriptor.checksum
        );
    }

    let letter = Letter::from_container(container);
    println!("Thumbnails: {}", letter.thumbnails.len());

    if let Some(sender) = &letter.sender {
        println!(
            "Sender: {:?} (made by {:?})",
            sender.owner_name, sender.creator_name
        );
        println!("Studio render: {}", studio::studio_url(sender));
    }

    if let Some(stationery) = &letter.stationery {
        println!(
            "Stationery: {} ({} backgrounds{})",
            stationery.name.as_deref().unwrap_or("<unnamed>"),
            stationery.backgrounds.len(),
            if stationery.mask().is_some() {
                ", mask present"
            } else {
                ""
            }
        );
    }

    for diagnostic in &letter.diagnostics {
        println!(
            "Corrupt block {}${}: {}",
            diagnostic.name, diagnostic.occurrence, diagnostic.error
        );
    }

    Ok(())
}
