//! MathPaste command-line tool
//!
//! Reads and writes MathPaste files without the editor window, and manages
//! the stored settings.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use mathpaste_core::FileFormat;

/// MathPaste file tool
#[derive(Parser, Debug)]
#[command(name = "mathpaste")]
#[command(author = "MathPaste Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Inspect and build MathPaste files", long_about = None)]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show format and contents summary of a file
    Inspect { path: PathBuf },

    /// Print the math text of a file
    Cat { path: PathBuf },

    /// Build a file from math text and optional drawing parts
    Pack {
        /// File to write
        output: PathBuf,

        /// File holding the math text (UTF-8)
        #[arg(long)]
        math: PathBuf,

        /// Output format (text or zip)
        #[arg(short, long, default_value = "zip")]
        format: FileFormat,

        /// File holding the drawing vector data (ASCII)
        #[arg(long, requires = "drawing_png")]
        drawing_data: Option<PathBuf>,

        /// PNG rendering of the drawing
        #[arg(long, requires = "drawing_data")]
        drawing_png: Option<PathBuf>,
    },

    /// Show or set the stored zoom percent
    Zoom { percent: Option<u32> },
}

fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging(&args.log_level)?;

    let mut stdout = std::io::stdout().lock();
    match args.command {
        Command::Inspect { path } => commands::inspect(&path, &mut stdout),
        Command::Cat { path } => commands::cat(&path, &mut stdout),
        Command::Pack {
            output,
            math,
            format,
            drawing_data,
            drawing_png,
        } => {
            let drawing = drawing_data.zip(drawing_png);
            commands::pack(&output, &math, format, drawing, &mut stdout)
        }
        Command::Zoom { percent } => {
            let mut store = mathpaste_core::SettingsStore::load()?;
            commands::zoom(&mut store, percent, &mut stdout)
        }
    }
}

/// Setup logging with tracing
fn setup_logging(level: &str) -> Result<()> {
    let log_level = level.parse::<Level>().unwrap_or(Level::WARN);

    let filter = EnvFilter::builder()
        .with_default_directive(log_level.into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    Ok(())
}
