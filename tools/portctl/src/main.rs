//! Host tool for poking x86 I/O ports through a Windows helper driver.
//!
//! Pipeline: parse flags → load binder config → bind a provider →
//!           run one port operation → release the provider.

mod cli;
mod config;
mod verbose;

use anyhow::{Context, Result, bail};
use clap::Parser;
use winport::{Binder, BinderConfig, PortIo, PortWidth};

use crate::verbose::{StderrSink, dprintln};

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    verbose::init(cli.quiet, cli.verbose);
    let config = config::load(&cli)?;

    match cli.command {
        cli::Command::Candidates => cmd_candidates(&config),
        cli::Command::Probe => cmd_probe(&config),
        cli::Command::Read(ref args) => cmd_read(&config, args),
        cli::Command::Write(ref args) => cmd_write(&config, args),
    }
}

/// Binds a provider with the given configuration.
fn bind(config: &BinderConfig) -> Result<PortIo> {
    Binder::from_config(config)?
        .setup(&StderrSink)
        .context("Port I/O is unavailable")
}

fn cmd_candidates(config: &BinderConfig) -> Result<()> {
    let candidates = config.candidate_set()?;
    if candidates.is_empty() {
        bail!("No helper libraries are enabled in this build");
    }
    for (i, candidate) in candidates.iter().enumerate() {
        println!("{:>2}. {candidate}", i + 1);
    }
    Ok(())
}

fn cmd_probe(config: &BinderConfig) -> Result<()> {
    let io = bind(config)?;
    println!("{} ({})", io.family(), io.library());
    io.cleanup();
    Ok(())
}

fn cmd_read(config: &BinderConfig, args: &cli::ReadArgs) -> Result<()> {
    let io = bind(config)?;
    let value = match args.width {
        PortWidth::Byte => io.try_read::<u8>(args.port).map(u32::from),
        PortWidth::Word => io.try_read::<u16>(args.port).map(u32::from),
        PortWidth::DWord => io.try_read::<u32>(args.port),
    };
    io.cleanup();

    let Some(value) = value else {
        bail!("{} read from port {:#06x} failed", args.width, args.port);
    };
    let digits = usize::from(args.width.bytes()) * 2;
    println!("{value:#0width$x}", width = digits + 2);
    Ok(())
}

fn cmd_write(config: &BinderConfig, args: &cli::WriteArgs) -> Result<()> {
    if args.value & !args.width.mask() != 0 {
        bail!("{:#x} does not fit in a {} write", args.value, args.width);
    }

    let io = bind(config)?;
    #[allow(clippy::cast_possible_truncation)]
    let ok = match args.width {
        PortWidth::Byte => io.try_write(args.port, args.value as u8),
        PortWidth::Word => io.try_write(args.port, args.value as u16),
        PortWidth::DWord => io.try_write(args.port, args.value),
    };
    io.cleanup();

    if !ok {
        bail!("{} write to port {:#06x} failed", args.width, args.port);
    }
    dprintln!("wrote {:#x} to port {:#06x}", args.value, args.port);
    Ok(())
}
