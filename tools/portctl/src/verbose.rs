//! Output verbosity and the diagnostic sink handed to the binder.
//!
//! Three output levels controlled by CLI flags:
//! - **Quiet** (`-q`): the requested value and errors only
//! - **Default** (no flag): binder warnings
//! - **Verbose** (`-v`): everything, including the selected provider and each
//!   candidate load attempt

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

use winport::{LogLevel, LogSink};

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    Quiet = 0,
    Default = 1,
    Verbose = 2,
}

impl Verbosity {
    /// The least severe binder level shown at this verbosity.
    pub fn max_level(self) -> LogLevel {
        match self {
            Self::Quiet => LogLevel::Error,
            Self::Default => LogLevel::Warn,
            Self::Verbose => LogLevel::Trace,
        }
    }
}

/// Global verbosity level, set once at startup.
static VERBOSITY: AtomicU8 = AtomicU8::new(1); // Default

/// Initialize the verbosity level for the current process.
pub fn init(quiet: bool, verbose: bool) {
    let level = if quiet {
        Verbosity::Quiet
    } else if verbose {
        Verbosity::Verbose
    } else {
        Verbosity::Default
    };
    VERBOSITY.store(level as u8, Ordering::Relaxed);
}

/// Returns the current verbosity level.
pub fn verbosity() -> Verbosity {
    match VERBOSITY.load(Ordering::Relaxed) {
        0 => Verbosity::Quiet,
        2 => Verbosity::Verbose,
        _ => Verbosity::Default,
    }
}

/// Returns `true` if quiet mode is active.
pub fn is_quiet() -> bool {
    verbosity() == Verbosity::Quiet
}

/// Print a message at default verbosity and above (suppressed in quiet mode).
///
/// Usage mirrors `println!`:
/// ```ignore
/// dprintln!("using {} from {}", family, library);
/// ```
macro_rules! dprintln {
    ($($arg:tt)*) => {
        if !$crate::verbose::is_quiet() {
            println!($($arg)*);
        }
    };
}

pub(crate) use dprintln;

/// Writes binder diagnostics to stderr, filtered by the global verbosity.
#[derive(Debug, Clone, Copy, Default)]
pub struct StderrSink;

impl LogSink for StderrSink {
    fn log(&self, level: LogLevel, args: fmt::Arguments<'_>) {
        if level <= verbosity().max_level() {
            eprintln!("[{}] {args}", level.name());
        }
    }
}
