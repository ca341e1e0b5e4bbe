use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Parser, ValueEnum};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use bitstream_feeder::{ChunkParser, DEFAULT_PADDING, Feeder, FeederConfig};
use bitstream_parsers::{FixedSizeParser, StartCodeParser};

mod report;
mod writer;

use report::Report;
use writer::ChunkWriter;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ParserKind {
    /// Equal-sized chunks
    Fixed,
    /// Annex B units split at start codes
    Annexb,
}

impl ParserKind {
    fn name(self) -> &'static str {
        match self {
            Self::Fixed => "fixed",
            Self::Annexb => "annexb",
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "bitsplit")]
#[command(about = "Split a bitstream file into chunks with an incremental parser")]
struct Args {
    /// Input file
    input: PathBuf,

    /// Chunk parser to run
    #[arg(short, long, value_enum, default_value = "annexb")]
    parser: ParserKind,

    /// Chunk size for the fixed parser
    #[arg(long, default_value = "4096")]
    chunk_size: usize,

    /// Data region of the working buffer, in bytes
    #[arg(short, long)]
    buffer_size: Option<usize>,

    /// Zeroed padding after the data region, in bytes
    #[arg(long, default_value_t = DEFAULT_PADDING)]
    padding: usize,

    /// Refill once fewer than this many bytes are buffered
    #[arg(long)]
    refill_threshold: Option<usize>,

    /// Write each chunk to DIR/chunk_<n>.bin
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn feeder_config(&self) -> FeederConfig {
        let mut config = match self.parser {
            ParserKind::Fixed => FeederConfig::audio(),
            ParserKind::Annexb => FeederConfig::video(),
        }
        .with_padding(self.padding);

        if let Some(size) = self.buffer_size {
            config = config.with_buffer_size(size);
        }
        if let Some(threshold) = self.refill_threshold {
            config = config.with_refill_threshold(threshold);
        }
        config
    }
}

fn log_filter(verbose: u8) -> EnvFilter {
    if std::env::var("RUST_LOG").is_ok() {
        return EnvFilter::builder().from_env_lossy();
    }
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    EnvFilter::builder().parse_lossy(level)
}

fn run(args: &Args) -> anyhow::Result<Report> {
    let config = args.feeder_config();
    config.validate().context("invalid buffer configuration")?;

    let mut parser: Box<dyn ChunkParser> = match args.parser {
        ParserKind::Fixed => {
            if args.chunk_size > config.buffer_size {
                bail!(
                    "chunk size {} does not fit a {} byte buffer",
                    args.chunk_size,
                    config.buffer_size
                );
            }
            Box::new(FixedSizeParser::new(args.chunk_size)?)
        }
        ParserKind::Annexb => Box::new(StartCodeParser::new()),
    };

    let file = File::open(&args.input)
        .with_context(|| format!("failed to open {}", args.input.display()))?;
    let mut writer =
        ChunkWriter::new(args.output_dir.clone()).context("failed to create output directory")?;

    info!(input = %args.input.display(), parser = args.parser.name(), "splitting");

    let feeder = Feeder::with_config(file, config)?;
    let stats = feeder
        .run(&mut parser, &mut writer)
        .with_context(|| format!("failed to split {}", args.input.display()))?;

    debug!(
        chunks = writer.chunks(),
        bytes = writer.bytes(),
        largest = writer.largest(),
        "wrote chunks"
    );
    if writer.chunks() != stats.chunks {
        bail!(
            "sink saw {} chunks but the feeder reported {}",
            writer.chunks(),
            stats.chunks
        );
    }

    let mut report = Report::new(
        args.input.display().to_string(),
        args.parser.name(),
        &stats,
    );
    report.chunk_bytes = writer.bytes();
    report.largest_chunk = writer.largest();
    Ok(report)
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let _ = tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(log_filter(args.verbose))
        .try_init();

    let report = run(&args)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{report}");
    }
    Ok(())
}
