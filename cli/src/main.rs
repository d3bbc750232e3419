use std::fs::File;
use std::io::{stdout, Write};
use std::path::PathBuf;

use celik::pcsc::{Context, Device, PcscCard};
use celik::transport::Transport;
use celik::{Card, IdCard};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum Error {
    #[error("Error occurred on communicating with the reader: {0}")]
    Pcsc(#[from] celik::pcsc::Error),

    #[error("Failed to read the card: {0}")]
    Card(#[from] celik::Error),

    #[error("Failed to write the output: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize the document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to save the portrait: {0}")]
    Image(#[from] image::ImageError),
}

type Result<T> = std::result::Result<T, Error>;

/// Read the personal data and the portrait from Serbian electronic ID cards.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// List connected readers and exit
    #[arg(long)]
    list: bool,

    /// Print the ATR of the card and exit
    #[arg(long)]
    atr: bool,

    /// Index of the reader to use, as shown by --list
    #[arg(long, default_value_t = 0)]
    reader: usize,

    /// Write the document as JSON to this path instead of the standard output
    #[arg(long)]
    json: Option<PathBuf>,

    /// Save the portrait to this path, in the format given by the extension
    #[arg(long)]
    photo: Option<PathBuf>,

    /// Provide additional details in the terminal
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        true => EnvFilter::new("debug"),
        _ => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let ctx = Context::try_new()?;

    if cli.list {
        return list_readers(&ctx);
    }

    let device = ctx.open(cli.reader)?;
    let pcsc_card = connect(&ctx, &device)?;

    if cli.atr {
        println!("{}", hex::encode_upper(pcsc_card.atr()));
        return Ok(());
    }

    let id_card = IdCard::open(Card::new(pcsc_card))?;
    let document = id_card.read_document()?;
    info!("Read the document {}", document.document_number);

    match &cli.json {
        Some(path) => {
            debug!("Writing JSON to {}", path.display());
            serde_json::to_writer_pretty(File::create(path)?, &document)?;
        }
        None => {
            let mut out = stdout().lock();
            serde_json::to_writer_pretty(&mut out, &document)?;
            writeln!(out)?;
        }
    }

    if let Some(path) = &cli.photo {
        debug!("Saving portrait to {}", path.display());
        document.portrait.save(path)?;
    }

    Ok(())
}

fn list_readers(ctx: &Context) -> Result<()> {
    let readers = ctx.list_readers()?;

    if readers.is_empty() {
        println!("No readers found.");
    }

    for (i, name) in readers.iter().enumerate() {
        println!("{} | {}", i, name.to_string_lossy());
    }

    Ok(())
}

fn connect(ctx: &Context, device: &Device) -> Result<PcscCard> {
    info!("Using reader {}", device.name().to_string_lossy());

    Ok(device.connect(ctx)?)
}
