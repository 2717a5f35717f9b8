use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};

use huffman_archiver::{decode_archive, CoreError, Encoder};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Multi-file archiver built on canonical Huffman coding.",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compress one or more files into a single archive.
    #[command(alias = "c")]
    Compress {
        /// Path of the archive to create.
        archive: PathBuf,
        /// Files to add to the archive, in order.
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Decompress an archive, restoring each file under its embedded name
    /// in the current directory.
    #[command(alias = "d")]
    Decompress {
        /// Path of the archive to read.
        archive: PathBuf,
    },
}

fn main() {
    env_logger::init();

    if let Err(err) = run(Cli::parse()) {
        log::error!("{err:#}");
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Compress { archive, files } => compress(&archive, &files),
        Commands::Decompress { archive } => decompress(&archive),
    }
}

fn compress(archive_path: &Path, files: &[PathBuf]) -> Result<()> {
    if archive_path.exists() {
        bail!("archive \"{}\" already exists", archive_path.display());
    }

    let out = File::create(archive_path)
        .with_context(|| format!("failed to create archive \"{}\"", archive_path.display()))?;
    let mut encoder = Encoder::new(BufWriter::new(out));

    for path in files {
        let data = std::fs::read(path)
            .with_context(|| format!("failed to read \"{}\"", path.display()))?;
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .with_context(|| format!("file name \"{}\" is not valid UTF-8", path.display()))?;

        info!("adding \"{name}\" ({} bytes)", data.len());
        encoder.add_file(name, &data)?;
    }

    drop(encoder);
    info!("wrote archive \"{}\"", archive_path.display());
    Ok(())
}

fn decompress(archive_path: &Path) -> Result<()> {
    let input = File::open(archive_path)
        .with_context(|| format!("failed to open archive \"{}\"", archive_path.display()))?;

    decode_archive(BufReader::new(input), |entry| {
        if Path::new(&entry.name).exists() {
            warn!("refusing to overwrite existing file \"{}\"", entry.name);
            return Err(CoreError::IOFailure(std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                format!("\"{}\" already exists", entry.name),
            )));
        }

        info!("extracting \"{}\" ({} bytes)", entry.name, entry.data.len());
        std::fs::write(&entry.name, &entry.data).map_err(CoreError::IOFailure)
    })
    .with_context(|| format!("failed to decode archive \"{}\"", archive_path.display()))
}
