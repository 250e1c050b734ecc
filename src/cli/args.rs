//! CLI argument definitions using clap derive
//!
//! Defines all command-line arguments and subcommands.

use crate::schema::{ComputeMode, EccCounterType, EnableState};

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

/// Inspect and control NVIDIA GPUs through NVML
///
/// Every command loads NVML, opens a session, and shuts it down again
/// before exiting.
#[derive(Parser, Debug)]
#[command(name = "nvbind")]
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
    #[arg(short, long, global = true, env = "NVBIND_CONFIG")]
    pub config: Option<String>,

    /// Path to the NVML library, overriding the platform search
    #[arg(long, global = true)]
    pub library: Option<PathBuf>,

    /// Target GPU by index (0-based); all GPUs when omitted
    #[arg(long, global = true)]
    pub gpu: Option<u32>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List all detected GPUs
    List,

    /// Show GPU information
    Info(InfoArgs),

    /// Show driver, NVML and CUDA versions
    Version,

    /// List processes using the GPU
    Processes(ProcessArgs),

    /// Show or set the compute mode
    ComputeMode(ComputeModeArgs),

    /// Show or set persistence mode (Linux only)
    Persistence(PersistenceArgs),

    /// Show power usage or set the power limit
    Power(PowerArgs),

    /// Show or control fans
    Fan(FanArgs),

    /// Show clocks or lock them to a range
    Clocks(ClockArgs),

    /// Show ECC state and error counts
    Ecc(EccArgs),

    /// Show encoder and decoder activity
    Video,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Arguments for the info command
#[derive(Parser, Debug, Default)]
pub struct InfoArgs {
    /// Show all information
    #[arg(short, long)]
    pub all: bool,

    /// Show memory and BAR1 usage
    #[arg(long)]
    pub memory: bool,

    /// Show power information
    #[arg(long)]
    pub power: bool,

    /// Show temperatures and thresholds
    #[arg(long)]
    pub thermal: bool,

    /// Show clock frequencies and throttle reasons
    #[arg(long)]
    pub clocks: bool,

    /// Show fan information
    #[arg(long)]
    pub fans: bool,

    /// Show PCI and PCIe link information
    #[arg(long)]
    pub pci: bool,
}

impl InfoArgs {
    /// No section flag means every section
    pub fn shows_all(&self) -> bool {
        self.all
            || !(self.memory || self.power || self.thermal || self.clocks || self.fans || self.pci)
    }
}

/// Arguments for the processes command
#[derive(Parser, Debug)]
pub struct ProcessArgs {
    /// Which process lists to read
    #[arg(long, value_enum, default_value = "all")]
    pub kind: ProcessKindArg,

    /// Sort by PID instead of memory usage
    #[arg(long)]
    pub sort_pid: bool,

    /// Only show the first N processes
    #[arg(long, value_name = "N")]
    pub top: Option<usize>,
}

/// Process list selection
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessKindArg {
    Compute,
    Graphics,
    All,
}

/// Arguments for the compute-mode command
#[derive(Parser, Debug)]
pub struct ComputeModeArgs {
    #[command(subcommand)]
    pub command: Option<ComputeModeCommands>,
}

/// Compute mode subcommands
#[derive(Subcommand, Debug)]
pub enum ComputeModeCommands {
    /// Show the current compute mode
    Get,

    /// Set the compute mode (requires root)
    Set {
        #[arg(value_enum)]
        mode: ComputeModeArg,
    },
}

/// Compute mode argument
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComputeModeArg {
    Default,
    ExclusiveProcess,
    Prohibited,
}

impl From<ComputeModeArg> for ComputeMode {
    fn from(arg: ComputeModeArg) -> Self {
        match arg {
            ComputeModeArg::Default => ComputeMode::Default,
            ComputeModeArg::ExclusiveProcess => ComputeMode::ExclusiveProcess,
            ComputeModeArg::Prohibited => ComputeMode::Prohibited,
        }
    }
}

/// On/off switch
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Switch {
    On,
    Off,
}

impl From<Switch> for EnableState {
    fn from(switch: Switch) -> Self {
        EnableState::from(switch == Switch::On)
    }
}

/// Arguments for the persistence command
#[derive(Parser, Debug)]
pub struct PersistenceArgs {
    #[command(subcommand)]
    pub command: Option<PersistenceCommands>,
}

/// Persistence subcommands
#[derive(Subcommand, Debug)]
pub enum PersistenceCommands {
    /// Show persistence mode
    Get,

    /// Turn persistence mode on or off (requires root)
    Set {
        #[arg(value_enum)]
        state: Switch,
    },
}

/// Arguments for power control commands
#[derive(Parser, Debug)]
pub struct PowerArgs {
    #[command(subcommand)]
    pub command: Option<PowerCommands>,
}

/// Power subcommands
#[derive(Subcommand, Debug)]
pub enum PowerCommands {
    /// Show current power status
    Status,

    /// Set power limit (requires root)
    Limit {
        /// Power limit in watts
        watts: u32,
    },
}

/// Arguments for fan control commands
#[derive(Parser, Debug)]
pub struct FanArgs {
    #[command(subcommand)]
    pub command: Option<FanCommands>,
}

/// Fan subcommands
#[derive(Subcommand, Debug)]
pub enum FanCommands {
    /// Show current fan status
    Status,

    /// Set fan speed; the fan stays in manual control until `auto`
    Speed {
        /// Fan speed percentage (0-100)
        #[arg(value_parser = clap::value_parser!(u32).range(0..=100))]
        speed: u32,

        /// Target a single fan; all fans when omitted
        #[arg(long)]
        fan: Option<u32>,
    },

    /// Return fan control to the driver
    Auto {
        /// Target a single fan; all fans when omitted
        #[arg(long)]
        fan: Option<u32>,
    },
}

/// Arguments for clock commands
#[derive(Parser, Debug)]
pub struct ClockArgs {
    #[command(subcommand)]
    pub command: Option<ClockCommands>,
}

/// Clock subcommands
#[derive(Subcommand, Debug)]
pub enum ClockCommands {
    /// Show current and maximum clocks
    Status,

    /// Lock the graphics clock to a range in MHz (requires root)
    LockGpu { min: u32, max: u32 },

    /// Lock the memory clock to a range in MHz (requires root)
    LockMemory { min: u32, max: u32 },

    /// Remove graphics and memory clock locks
    Reset,
}

/// Arguments for ECC commands
#[derive(Parser, Debug)]
pub struct EccArgs {
    #[command(subcommand)]
    pub command: Option<EccCommands>,
}

/// ECC subcommands
#[derive(Subcommand, Debug)]
pub enum EccCommands {
    /// Show ECC mode and error totals
    Status,

    /// Zero error counters (requires root)
    Clear {
        #[arg(value_enum)]
        counter: EccCounterArg,
    },

    /// Enable or disable ECC after the next reboot (requires root)
    Set {
        #[arg(value_enum)]
        state: Switch,
    },
}

/// ECC counter argument
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EccCounterArg {
    /// Since the last driver load
    Volatile,
    /// Lifetime of the board
    Aggregate,
}

impl From<EccCounterArg> for EccCounterType {
    fn from(arg: EccCounterArg) -> Self {
        match arg {
            EccCounterArg::Volatile => EccCounterType::Volatile,
            EccCounterArg::Aggregate => EccCounterType::Aggregate,
        }
    }
}

/// Output format
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format for machine parsing
    Json,
    /// Compact single-line format
    Compact,
}

/// Generate shell completions and print to stdout
pub fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
}
