//! Command-line interface definitions for portctl.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use winport::PortWidth;

/// Read and write x86 I/O ports through a helper driver.
#[derive(Parser)]
#[command(name = "portctl", version, about)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Binder configuration file (TOML).
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// Only load helper libraries from this directory (absolute path).
    #[arg(long, global = true)]
    pub library_dir: Option<PathBuf>,

    /// Suppress everything except the requested value and errors.
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Show every candidate load attempt.
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// List the helper libraries that would be tried, in order.
    Candidates,
    /// Bind a provider, report which one, and release it.
    Probe,
    /// Read a port.
    Read(ReadArgs),
    /// Write a port.
    Write(WriteArgs),
}

/// Arguments for the `read` subcommand.
#[derive(Parser)]
pub struct ReadArgs {
    /// Port address (decimal or 0x-prefixed hex).
    #[arg(value_parser = parse_port)]
    pub port: u16,

    /// Access width in bits.
    #[arg(long, short = 'w', default_value = "8", value_parser = parse_width)]
    pub width: PortWidth,
}

/// Arguments for the `write` subcommand.
#[derive(Parser)]
pub struct WriteArgs {
    /// Port address (decimal or 0x-prefixed hex).
    #[arg(value_parser = parse_port)]
    pub port: u16,

    /// Value to write (decimal or 0x-prefixed hex); must fit the width.
    #[arg(value_parser = parse_number)]
    pub value: u32,

    /// Access width in bits.
    #[arg(long, short = 'w', default_value = "8", value_parser = parse_width)]
    pub width: PortWidth,
}

/// Parses a decimal or `0x`-prefixed hexadecimal number.
pub fn parse_number(s: &str) -> Result<u32, String> {
    let s = s.trim();
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(&hex.replace('_', ""), 16),
        None => s.replace('_', "").parse(),
    };
    parsed.map_err(|e| format!("invalid number '{s}': {e}"))
}

/// Parses a port address; it must fit in 16 bits.
pub fn parse_port(s: &str) -> Result<u16, String> {
    let value = parse_number(s)?;
    u16::try_from(value).map_err(|_| format!("port {value:#x} is outside 0x0-0xffff"))
}

/// Parses an access width given in bits.
pub fn parse_width(s: &str) -> Result<PortWidth, String> {
    let bits = parse_number(s)?;
    PortWidth::from_bits(bits).ok_or_else(|| format!("width must be 8, 16 or 32, not {bits}"))
}
