//! Diagnostic reporting for the provider binder.
//!
//! The binder never owns a logger. Callers hand a [`LogSink`] to
//! [`Binder::setup`](crate::Binder::setup) and every diagnostic produced while
//! binding is routed through it. Any `Fn(LogLevel, fmt::Arguments<'_>)`
//! closure is a sink, so hosting code can forward into whatever logging it
//! already has.

use core::fmt;

// ---------------------------------------------------------------------------
// Log levels (lower = more severe)
// ---------------------------------------------------------------------------

/// Diagnostic severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum LogLevel {
    /// Error: something failed and the operation was abandoned.
    Error = 0,
    /// Warning: port I/O is unavailable or degraded.
    Warn = 1,
    /// Informational: high-level progress messages.
    Info = 2,
    /// Debug: per-candidate load attempts and similar detail.
    Debug = 3,
    /// Trace: very verbose, low-level tracing.
    Trace = 4,
}

impl LogLevel {
    /// Returns the human-readable name (fixed-width for aligned output).
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Error => "ERROR",
            Self::Warn => "WARN ",
            Self::Info => "INFO ",
            Self::Debug => "DEBUG",
            Self::Trace => "TRACE",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name().trim_end())
    }
}

// ---------------------------------------------------------------------------
// Sinks
// ---------------------------------------------------------------------------

/// Destination for binder diagnostics.
pub trait LogSink {
    /// Records one message at the given level.
    fn log(&self, level: LogLevel, args: fmt::Arguments<'_>);
}

impl<F> LogSink for F
where
    F: Fn(LogLevel, fmt::Arguments<'_>),
{
    fn log(&self, level: LogLevel, args: fmt::Arguments<'_>) {
        self(level, args);
    }
}

/// A sink that silently discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl LogSink for NullSink {
    fn log(&self, _level: LogLevel, _args: fmt::Arguments<'_>) {}
}

/// Prefix attached to every message emitted by this crate.
pub const PREFIX: &str = "winport";

/// Implementation detail for [`wlog!`]. Not public API.
#[doc(hidden)]
pub fn _log(sink: &dyn LogSink, level: LogLevel, args: fmt::Arguments<'_>) {
    sink.log(level, format_args!("{PREFIX}: {args}"));
}

/// Logs a message at the given level through an explicit sink.
macro_rules! wlog {
    ($sink:expr, $level:expr, $($arg:tt)*) => {
        $crate::log::_log($sink, $level, format_args!($($arg)*))
    };
}

/// Logs a warning-level message.
macro_rules! wwarn {
    ($sink:expr, $($arg:tt)*) => {
        $crate::log::wlog!($sink, $crate::log::LogLevel::Warn, $($arg)*)
    };
}

/// Logs an info-level message.
macro_rules! winfo {
    ($sink:expr, $($arg:tt)*) => {
        $crate::log::wlog!($sink, $crate::log::LogLevel::Info, $($arg)*)
    };
}

/// Logs a debug-level message.
macro_rules! wdebug {
    ($sink:expr, $($arg:tt)*) => {
        $crate::log::wlog!($sink, $crate::log::LogLevel::Debug, $($arg)*)
    };
}

pub(crate) use {wdebug, winfo, wlog, wwarn};
