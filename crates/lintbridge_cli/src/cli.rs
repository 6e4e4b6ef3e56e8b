//! CLI argument definitions

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use lintbridge_core::{EngineKind, Framing, Ordering};

/// lintbridge - Run JavaScript lint engines for build tools
#[derive(Parser)]
#[command(name = "lintbridge")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Lint files
    Lint(LintArgs),

    /// Initialize configuration
    Init {
        /// Force overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

#[derive(clap::Args)]
pub struct LintArgs {
    /// Files to lint
    pub files: Vec<PathBuf>,

    /// Files to lint as a JSON array, placed before FILES
    #[arg(long, value_name = "JSON")]
    pub paths: Option<String>,

    /// Engine options as a JSON object, replacing the configured options
    #[arg(long, value_name = "JSON")]
    pub options: Option<String>,

    /// Engine to run (eslint-legacy, eslint, jshint, jslint)
    #[arg(short, long)]
    pub engine: Option<EngineKind>,

    /// Output framing
    #[arg(long, value_enum)]
    pub framing: Option<FramingArg>,

    /// Order in which per-file results are emitted
    #[arg(long, value_enum)]
    pub ordering: Option<OrderingArg>,

    /// Do not write autofixed source back to disk
    #[arg(long)]
    pub no_fix: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FramingArg {
    /// Sentinel byte followed by one JSON envelope
    Batch,
    /// Streamed JSON array of [path, diagnostics] tuples
    Legacy,
}

impl From<FramingArg> for Framing {
    fn from(arg: FramingArg) -> Self {
        match arg {
            FramingArg::Batch => Framing::Batch,
            FramingArg::Legacy => Framing::Legacy,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OrderingArg {
    /// As files finish
    Completion,
    /// In the order files were given
    Input,
}

impl From<OrderingArg> for Ordering {
    fn from(arg: OrderingArg) -> Self {
        match arg {
            OrderingArg::Completion => Ordering::Completion,
            OrderingArg::Input => Ordering::Input,
        }
    }
}
