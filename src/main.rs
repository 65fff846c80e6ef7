use clap::{Parser, Subcommand};
use ffa::archive::{self, ArchivePaths, PackOptions, PackOrder, UnpackOptions};
use ffa::codec::CodecId;
use ffa::io_stream::DEFAULT_COMPRESSION_LEVEL;
use ffa::report::TracingReporter;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ffa", version, about = "FFA file packer/unpacker (.dat + .lst archives)")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log every entry (use RUST_LOG for finer control)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Pack a folder into a .dat/.lst pair
    #[command(visible_alias = "p")]
    Pack {
        input: PathBuf,
        /// Defaults to `<input folder name>.dat`
        output: Option<PathBuf>,
        /// Codec for .so4/.so5 payloads: lzss (default), zstd, lz4, brotli, lzma, none
        #[arg(short, long, default_value = "lzss")]
        codec: CodecId,
        /// Compression level (zstd 1-19; brotli 0-11; ignored otherwise)
        #[arg(short, long, default_value_t = DEFAULT_COMPRESSION_LEVEL)]
        level: i32,
        /// Ignore the order ledger and pack in sorted path order
        #[arg(long)]
        scan: bool,
    },
    /// Unpack a .dat/.lst pair into a folder
    #[command(visible_alias = "u")]
    Unpack {
        input: PathBuf,
        /// Defaults to the archive's file stem
        output: Option<PathBuf>,
        #[arg(short, long, default_value = "lzss")]
        codec: CodecId,
    },
    /// List index records
    List {
        input: PathBuf,
        #[arg(short, long, default_value = "lzss")]
        codec: CodecId,
    },
}

fn main() {
    let cli = Cli::parse();

    let directive = if cli.verbose { "ffa=debug" } else { "ffa=info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive)))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli.command) {
        eprintln!("\nError: {e}");
        std::process::exit(1);
    }
}

fn run(command: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match command {

        // ── Pack ─────────────────────────────────────────────────────────────
        Commands::Pack { input, output, codec, level, scan } => {
            let output = output.unwrap_or_else(|| default_archive_name(&input));
            let opts = PackOptions {
                codec,
                level,
                order: if scan { PackOrder::Scan } else { PackOrder::Ledger },
            };

            println!("Packing mode");
            println!("Input folder: {}", input.display());
            println!("Output file:  {}", output.display());

            let summary = archive::pack(&input, &output, &opts, &TracingReporter)?;
            let paths = ArchivePaths::new(&output);
            println!("\nPacking completed!");
            println!("Created: {}", paths.data.display());
            println!("Created: {}", paths.index.display());
            println!("Total files packed: {}", summary.packed);
            if summary.skipped > 0 {
                println!("Skipped: {}", summary.skipped);
            }
        }

        // ── Unpack ───────────────────────────────────────────────────────────
        Commands::Unpack { input, output, codec } => {
            let output = output.unwrap_or_else(|| default_folder_name(&input));

            println!("Unpacking mode");
            println!("Input file:    {}", input.display());
            println!("Output folder: {}", output.display());

            let summary = archive::unpack(&input, &output, &UnpackOptions { codec }, &TracingReporter)?;
            println!("\nUnpacking completed!");
            println!("Records: {}", summary.records);
            println!("Total files extracted: {}", summary.extracted);
            if summary.skipped > 0 {
                println!("Skipped: {}", summary.skipped);
            }
            println!("Order ledger: {}", ArchivePaths::new(&input).ledger.display());
        }

        // ── List ─────────────────────────────────────────────────────────────
        Commands::List { input, codec } => {
            let rows = archive::list(&input, &UnpackOptions { codec })?;
            println!("Archive: {}", input.display());
            println!("{:>5}  {:<14} {:>10} {:>10}  {}", "#", "Name", "Offset", "Size", "Kind");
            for row in &rows {
                let kind = match (row.placed, row.frame) {
                    (false, _)     => "INVALID".to_string(),
                    (true, Some(h)) => format!("frame {} -> {}", h.packed_size, h.unpacked_size),
                    (true, None)   => "raw".to_string(),
                };
                println!("{:>5}  {:<14} {:>10} {:>10}  {}",
                    row.entry.order, row.entry.name, row.entry.offset, row.entry.size, kind);
            }
            println!("{} record(s)", rows.len());
        }
    }

    Ok(())
}

// ── helpers ──────────────────────────────────────────────────────────────────

fn default_archive_name(input: &Path) -> PathBuf {
    let full = input.canonicalize().unwrap_or_else(|_| input.to_path_buf());
    let stem = full
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "archive".into());
    PathBuf::from(format!("{stem}.dat"))
}

fn default_folder_name(input: &Path) -> PathBuf {
    input
        .file_stem()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("unpacked"))
}
