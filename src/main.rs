//! clint-gen - generate the clint OpenCL interception layer
//!
//! Scans the given OpenCL headers and writes `clint_opencl_types.h`,
//! `clint_opencl_types.c` and `clint_opencl_funcs.c`, or prints all three
//! to stdout when no output directory is given.

use clap::Parser;
use clint_codegen::{generate, GeneratorConfig};
use std::io::{IsTerminal, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "clint-gen",
    author,
    version,
    about = "Generate the clint OpenCL interception layer from OpenCL headers",
    long_about = None
)]
struct Cli {
    /// Headers to scan, in order (e.g. cl.h cl_ext.h cl_gl.h)
    #[arg(required = true)]
    headers: Vec<PathBuf>,

    /// Base include directory; resolved to DIR/CL, or DIR/Headers for a framework
    #[arg(short, long, value_name = "DIR")]
    include_dir: Option<PathBuf>,

    /// Write the artifacts into DIR instead of stdout
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// YAML generator configuration
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

fn init_logging(cli: &Cli) {
    let default = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .without_time()
        .init();
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = match &cli.config {
        Some(path) => GeneratorConfig::load(path)?,
        None => GeneratorConfig::default(),
    };

    let generation = generate(&cli.headers, cli.include_dir.as_deref(), config)?;
    if !generation.diagnostics.is_empty() {
        tracing::info!(count = generation.diagnostics.len(), "advisory diagnostics");
    }

    match &cli.output_dir {
        Some(dir) => {
            for path in generation.artifacts.write_to_dir(dir)? {
                tracing::info!(path = %path.display(), "generated");
            }
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(generation.artifacts.concatenated().as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(1)
        }
    }
}
