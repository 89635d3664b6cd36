use std::io::{BufRead, Read, Write};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Parser;
use sqmat::{AllocHook, AllocStats, AllocTracker, Matrix};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "sqmat",
    about = "Block averages and powers of square integer matrices",
    long_about = "Reads one matrix from standard input and writes results to standard output.\n\nThe text format is a single line: rows separated by ';', values by spaces,\nfor example \"1 2;3 4\".",
    version
)]
struct Cli {
    /// Input and output encoding
    #[arg(long, value_enum, default_value_t = Format::Text, global = true)]
    format: Format,
    /// Report allocation statistics on stderr (one line per size for bench)
    #[arg(long, global = true)]
    track_allocations: bool,
    /// Increase log verbosity (-v info, -vv debug, -vvv trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug, PartialEq, Eq)]
enum Commands {
    /// Average the blocks of size 2^EXPONENT of the input matrix
    Blocks {
        /// Base-two logarithm of the block size
        exponent: u32,
    },
    /// Raise the input matrix to the N-th power
    Power {
        /// The exponent; must be at least 1
        n: u64,
    },
    /// Time exponentiation of zero matrices
    Bench {
        /// Matrix sizes to benchmark (comma-separated)
        #[arg(long, value_delimiter = ',', default_value = "2,4,8,16,32,64,128")]
        sizes: Vec<usize>,
        /// Exponent to raise each matrix to
        #[arg(long, default_value_t = 20)]
        power: u64,
    },
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Format {
    /// One line: "1 2;3 4"
    Text,
    /// A YAML sequence of rows
    Yaml,
    /// A JSON array of rows
    #[cfg(feature = "json")]
    Json,
}

fn read_matrix<R: BufRead>(mut input: R, format: Format) -> Result<Matrix> {
    let matrix = match format {
        Format::Text => {
            let mut line = String::new();
            input
                .read_line(&mut line)
                .context("failed to read a line from standard input")?;
            Matrix::decode(&line)?
        }
        Format::Yaml => {
            let mut buf = String::new();
            input
                .read_to_string(&mut buf)
                .context("failed to read standard input")?;
            sqmat::loads_yaml(&buf)?
        }
        #[cfg(feature = "json")]
        Format::Json => {
            let mut buf = String::new();
            input
                .read_to_string(&mut buf)
                .context("failed to read standard input")?;
            sqmat::loads_json(&buf)?
        }
    };
    info!(size = matrix.size(), "read input matrix");
    Ok(matrix)
}

fn write_matrix<W: Write>(out: &mut W, matrix: &Matrix, format: Format) -> Result<()> {
    match format {
        Format::Text => write!(out, "{matrix}")?,
        Format::Yaml => write!(out, "{}", matrix.as_yaml_string()?)?,
        #[cfg(feature = "json")]
        Format::Json => writeln!(out, "{}", matrix.as_json_string()?)?,
    }
    Ok(())
}

fn block_size_from_exponent(exponent: u32) -> Result<usize> {
    match 1usize.checked_shl(exponent) {
        Some(block_size) => Ok(block_size),
        None => bail!("block size exponent {exponent} is too large"),
    }
}

fn run_blocks<R, W, H>(input: R, out: &mut W, format: Format, exponent: u32, hook: &H) -> Result<()>
where
    R: BufRead,
    W: Write,
    H: AllocHook + ?Sized,
{
    let block_size = block_size_from_exponent(exponent)?;
    let matrix = read_matrix(input, format)?;
    write_matrix(out, &matrix, format)?;
    let approx = matrix
        .block_average_tracked(block_size, hook)
        .with_context(|| format!("block average with block size {block_size} (2^{exponent})"))?;
    write_matrix(out, &approx, format)
}

fn run_power<R, W, H>(input: R, out: &mut W, format: Format, n: u64, hook: &H) -> Result<()>
where
    R: BufRead,
    W: Write,
    H: AllocHook + ?Sized,
{
    let matrix = read_matrix(input, format)?;
    writeln!(
        out,
        "performing exponentiation (n: {n}) of base matrix (size: {}):",
        matrix.size()
    )?;
    write_matrix(out, &matrix, format)?;
    let result = matrix
        .power_tracked(n, hook)
        .with_context(|| format!("exponentiation with n = {n}"))?;
    writeln!(out, "result:")?;
    write_matrix(out, &result, format)
}

// The tracker is reset for every size, so each entry of the
// returned list covers exactly one size.
fn run_bench<W: Write>(
    out: &mut W,
    sizes: &[usize],
    n: u64,
    tracker: &AllocTracker,
) -> Result<Vec<(usize, AllocStats)>> {
    let mut per_size = Vec::with_capacity(sizes.len());
    for &size in sizes {
        let matrix = Matrix::new(size).with_context(|| format!("benchmark size {size}"))?;
        tracker.reset();
        let start = Instant::now();
        let result = matrix
            .power_tracked(n, tracker)
            .with_context(|| format!("exponentiation with n = {n}"))?;
        let elapsed = start.elapsed();
        drop(result);
        let stats = tracker.stats();
        writeln!(
            out,
            "size: {size}, time: {elapsed:?}, peak: {:.3} KiB",
            stats.peak_kib()
        )?;
        per_size.push((size, stats));
    }
    Ok(per_size)
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let tracker = AllocTracker::new();
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Blocks { exponent } => {
            run_blocks(stdin.lock(), &mut out, cli.format, exponent, &tracker)?;
            if cli.track_allocations {
                eprintln!("{}", tracker.stats());
            }
        }
        Commands::Power { n } => {
            run_power(stdin.lock(), &mut out, cli.format, n, &tracker)?;
            if cli.track_allocations {
                eprintln!("{}", tracker.stats());
            }
        }
        Commands::Bench { sizes, power } => {
            let per_size = run_bench(&mut out, &sizes, power, &tracker)?;
            if cli.track_allocations {
                for (size, stats) in per_size {
                    eprintln!("size {size}: {stats}");
                }
            }
        }
    }
    Ok(())
}
