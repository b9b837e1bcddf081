//! CLI argument definitions using clap derive
//!
//! Defines all command-line arguments and subcommands.

use crate::reset::ResetMethod;
use crate::sim::FailPoint;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

/// GPU reset coordination tool
///
/// Exercise the reset domain, handler dispatch, and coredump recorder
/// against a simulated accelerator.
#[derive(Parser, Debug)]
#[command(name = "resetctl")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "RESETCTL_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one full recovery attempt on a simulated device
    Simulate(SimulateArgs),

    /// Capture and render a device coredump from a simulated device
    Coredump(CoredumpArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Arguments for the simulate command
#[derive(Parser, Debug)]
pub struct SimulateArgs {
    /// Hardware revision of the simulated device (major.minor.patch)
    #[arg(long, default_value = "13.0.2")]
    pub hw_version: String,

    /// Number of rings on the simulated device
    #[arg(long, default_value_t = 2)]
    pub rings: u32,

    /// Ring size in dwords
    #[arg(long, default_value_t = 16)]
    pub ring_dwords: usize,

    /// Reset method to request (defaults to the configured one)
    #[arg(long, value_enum)]
    pub method: Option<MethodArg>,

    /// Request a full device reset
    #[arg(long)]
    pub full: bool,

    /// Inject a failure at one phase of the attempt
    #[arg(long, value_enum)]
    pub fail: Option<FailArg>,
}

/// Arguments for the coredump command
#[derive(Parser, Debug)]
pub struct CoredumpArgs {
    /// Hardware revision of the simulated device (major.minor.patch)
    #[arg(long, default_value = "13.0.2")]
    pub hw_version: String,

    /// Number of rings on the simulated device
    #[arg(long, default_value_t = 2)]
    pub rings: u32,

    /// Ring size in dwords
    #[arg(long, default_value_t = 16)]
    pub ring_dwords: usize,

    /// Mark VRAM as lost in the report
    #[arg(long)]
    pub vram_lost: bool,

    /// Include a synthetic page fault in the snapshot
    #[arg(long)]
    pub fault: bool,

    /// Write the report to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// Compact single-line output
    Compact,
}

/// Reset method CLI argument
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MethodArg {
    Auto,
    Engine,
    Full,
}

impl From<MethodArg> for ResetMethod {
    fn from(arg: MethodArg) -> Self {
        match arg {
            MethodArg::Auto => ResetMethod::Auto,
            MethodArg::Engine => ResetMethod::Engine,
            MethodArg::Full => ResetMethod::Full,
        }
    }
}

/// Failure-injection CLI argument, named by protocol phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FailArg {
    /// Fail the coredump snapshot (recovery must be unaffected)
    Capture,
    /// Fail the prepare phase
    Prepare,
    /// Fail the perform phase
    Perform,
    /// Fail the restore phase
    Restore,
}

impl FailArg {
    /// Map the phase to the simulator touchpoint that fails it
    pub fn fail_point(self) -> FailPoint {
        match self {
            FailArg::Capture => FailPoint::Snapshot,
            FailArg::Prepare => FailPoint::Quiesce,
            FailArg::Perform => FailPoint::SocReset,
            FailArg::Restore => FailPoint::Resume,
        }
    }

    /// Whether the failure should fire only once
    ///
    /// The capture snapshot and the prepare phase both read ring
    /// snapshots; a one-shot failure hits capture only.
    pub fn once(self) -> bool {
        matches!(self, FailArg::Capture)
    }
}

/// Generate shell completions to stdout
pub fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
}
