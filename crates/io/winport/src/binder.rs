//! Provider selection, binding and the bound [`PortIo`] handle.
//!
//! Binding walks the candidate list in preference order:
//!
//! 1. restrict the library search path (best effort),
//! 2. open candidates until one loads,
//! 3. resolve all four entry points of that library's family,
//! 4. run the provider's init routine.
//!
//! Only a load failure moves on to the next candidate. A library that loads
//! but misses an entry point, or whose init refuses, ends the attempt. On
//! every failure the opened library is dropped (unloaded) without its
//! shutdown routine being called.

use core::fmt;

use crate::config::BinderConfig;
use crate::error::{ConfigError, SetupError};
use crate::loader::{Loader, Module, SystemLoader};
use crate::log::{LogSink, wdebug, winfo, wwarn};
use crate::port::PortValue;
use crate::provider::{Candidate, CandidateSet, PortProvider, ProviderFamily};

/// Selects and binds one helper-driver provider.
#[derive(Debug, Clone)]
pub struct Binder<L: Loader> {
    loader: L,
    candidates: CandidateSet,
}

impl Binder<SystemLoader> {
    /// A binder over the system loader, configured from `config`.
    ///
    /// # Errors
    ///
    /// See [`BinderConfig::validate`].
    pub fn from_config(config: &BinderConfig) -> Result<Self, ConfigError> {
        Ok(Binder::new(SystemLoader).with_candidates(config.candidate_set()?))
    }
}

impl<L: Loader> Binder<L> {
    /// A binder with the default candidate order for this build and host.
    #[must_use]
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            candidates: CandidateSet::for_host(),
        }
    }

    /// Replaces the candidate list.
    #[must_use]
    pub fn with_candidates(mut self, candidates: CandidateSet) -> Self {
        self.candidates = candidates;
        self
    }

    /// The candidates that [`setup`](Self::setup) will try, in order.
    #[must_use]
    pub fn candidates(&self) -> &CandidateSet {
        &self.candidates
    }

    /// Loads, resolves and initializes the first available provider.
    ///
    /// Each failure is reported once through `log` at warning level before it
    /// is returned.
    ///
    /// # Errors
    ///
    /// - [`SetupError::NoProvider`] if no candidate library could be opened.
    /// - [`SetupError::MissingSymbol`] if the opened library lacks an entry point.
    /// - [`SetupError::InitRefused`] if the provider's init routine failed.
    /// - [`SetupError::Disabled`] if the library's family is not compiled in.
    pub fn setup(&self, log: &dyn LogSink) -> Result<PortIo, SetupError> {
        self.try_setup(log).inspect_err(|err| wwarn!(log, "{}", err.warning()))
    }

    fn try_setup(&self, log: &dyn LogSink) -> Result<PortIo, SetupError> {
        if self.loader.restrict_search_path() {
            wdebug!(log, "removed the working directory from the library search path");
        } else {
            wdebug!(log, "library search path left unchanged");
        }

        let (candidate, module) = self.open_first(log)?;

        // SAFETY: the candidate list declares which family each library
        // belongs to, and that family's entry-point signatures are fixed.
        let provider = unsafe { candidate.family.bind(module.as_ref()) }?;

        if !provider.init() {
            return Err(SetupError::InitRefused {
                library: candidate.library.clone(),
                family: candidate.family,
            });
        }

        winfo!(log, "using {} from {}", candidate.family, candidate.library);
        Ok(PortIo {
            provider,
            library: candidate.library.clone(),
            active: true,
            _module: module,
        })
    }

    fn open_first(&self, log: &dyn LogSink) -> Result<(&Candidate, Box<dyn Module>), SetupError> {
        for candidate in &self.candidates {
            match self.loader.open(&candidate.library) {
                Ok(module) => return Ok((candidate, module)),
                Err(err) => wdebug!(log, "{err}"),
            }
        }
        Err(SetupError::NoProvider {
            attempted: self.candidates.as_slice().to_vec(),
        })
    }
}

/// Binds the first available provider using the system loader and the
/// default candidate order.
///
/// # Errors
///
/// See [`Binder::setup`].
pub fn setup(log: &dyn LogSink) -> Result<PortIo, SetupError> {
    Binder::new(SystemLoader).setup(log)
}

/// A bound provider: the only way to reach the port I/O operations.
///
/// Exactly one provider is active per handle and it never changes. The
/// provider's shutdown routine runs exactly once, either in [`cleanup`] or
/// when the handle is dropped.
///
/// # Failed reads
///
/// [`read8`], [`read16`], [`read32`] and [`read`] return zero when the
/// provider reports a failure, so "the port reads zero" and "the read failed"
/// look the same. Callers probing for hardware must treat zero as "absent".
/// Use [`try_read`] to tell the two apart.
///
/// `PortIo` is neither `Send` nor `Sync`; calls are not synchronized.
///
/// [`cleanup`]: Self::cleanup
/// [`read8`]: Self::read8
/// [`read16`]: Self::read16
/// [`read32`]: Self::read32
/// [`read`]: Self::read
/// [`try_read`]: Self::try_read
pub struct PortIo {
    provider: Box<dyn PortProvider>,
    library: String,
    active: bool,
    // Declared last: the library is unloaded only after `provider` is gone.
    _module: Box<dyn Module>,
}

impl PortIo {
    /// The family of the bound provider.
    #[must_use]
    pub fn family(&self) -> ProviderFamily {
        self.provider.family()
    }

    /// The library the provider was loaded from.
    #[must_use]
    pub fn library(&self) -> &str {
        &self.library
    }

    /// Reads a `T`-sized value from `port`, or zero if the provider fails.
    #[inline]
    #[must_use]
    pub fn read<T: PortValue>(&self, port: u16) -> T {
        self.try_read(port).unwrap_or(T::ZERO)
    }

    /// Reads a `T`-sized value from `port`. `None` if the provider fails.
    #[inline]
    #[must_use]
    pub fn try_read<T: PortValue>(&self, port: u16) -> Option<T> {
        self.provider.read(port, T::WIDTH).map(T::from_slot)
    }

    /// Writes a `T`-sized value to `port`, ignoring the provider's result.
    #[inline]
    pub fn write<T: PortValue>(&self, port: u16, value: T) {
        self.try_write(port, value);
    }

    /// Writes a `T`-sized value to `port`. Returns `false` if the provider
    /// reported failure.
    #[inline]
    pub fn try_write<T: PortValue>(&self, port: u16, value: T) -> bool {
        self.provider.write(port, value.into_slot(), T::WIDTH)
    }

    /// Reads a byte. Zero on failure.
    #[inline]
    #[must_use]
    pub fn read8(&self, port: u16) -> u8 {
        self.read(port)
    }

    /// Reads a word. Zero on failure.
    #[inline]
    #[must_use]
    pub fn read16(&self, port: u16) -> u16 {
        self.read(port)
    }

    /// Reads a dword. Zero on failure.
    #[inline]
    #[must_use]
    pub fn read32(&self, port: u16) -> u32 {
        self.read(port)
    }

    /// Writes a byte.
    #[inline]
    pub fn write8(&self, port: u16, value: u8) {
        self.write(port, value);
    }

    /// Writes a word.
    #[inline]
    pub fn write16(&self, port: u16, value: u16) {
        self.write(port, value);
    }

    /// Writes a dword.
    #[inline]
    pub fn write32(&self, port: u16, value: u32) {
        self.write(port, value);
    }

    /// Shuts the provider down and unloads its library.
    pub fn cleanup(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if core::mem::take(&mut self.active) {
            self.provider.shutdown();
        }
    }
}

impl Drop for PortIo {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl fmt::Debug for PortIo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PortIo")
            .field("family", &self.family())
            .field("library", &self.library)
            .field("active", &self.active)
            .finish_non_exhaustive()
    }
}
