//! x86 I/O port access for unprivileged Windows processes.
//!
//! User-mode code cannot execute `in`/`out` on Windows NT. Helper drivers
//! close that gap: each ships a kernel driver plus a user-mode DLL exporting
//! port read/write routines. This crate finds one of those DLLs at runtime,
//! binds its entry points and exposes a single API no matter which one won.
//!
//! - [`Binder`] -- candidate selection, symbol resolution, initialization.
//! - [`PortIo`] -- the bound handle; byte/word/dword reads and writes.
//! - [`Port`], [`ReadOnlyPort`], [`WriteOnlyPort`] -- typed port addresses.
//! - [`Loader`] / [`Module`] -- the shared-library seam ([`SystemLoader`] in
//!   production).
//!
//! ```ignore
//! let io = winport::setup(&winport::NullSink)?;
//! io.write8(0x70, 0x0A);
//! let status = io.read8(0x71);
//! io.cleanup();
//! ```

pub mod binder;
pub mod config;
pub mod error;
pub mod host;
pub mod loader;
pub mod log;
pub mod port;
pub mod provider;

#[cfg(test)]
mod testing;

// Re-export all public types at the crate root for ergonomic imports.
pub use binder::{Binder, PortIo, setup};
pub use config::BinderConfig;
pub use error::{ConfigError, LoadError, SetupError};
pub use host::HostFamily;
pub use loader::{Loader, Module, SystemLoader};
pub use log::{LogLevel, LogSink, NullSink};
pub use port::{Port, PortValue, PortWidth, ReadOnlyPort, WriteOnlyPort};
pub use provider::{Candidate, CandidateSet, PortProvider, ProviderFamily};
