//! Helper-driver providers and the candidate policy that chooses between them.
//!
//! A provider is a user-mode shared library shipped with a kernel-mode helper
//! driver. Two mutually incompatible families are supported:
//!
//! - [`DirectIo`] -- `DirectIOLib32.dll` / `DirectIOLibx64.dll`, width passed
//!   as an enumerated size tag.
//! - [`WinIo`] -- `WinIo.dll` (v2), `WinIo32.dll` / `WinIo64.dll` (v3), width
//!   passed as a byte count.
//!
//! Both expose the same four logical entry points (init, shutdown, read,
//! write) and are driven through the [`PortProvider`] trait once bound.

#[cfg(feature = "directio")]
pub mod directio;
#[cfg(feature = "winio")]
pub mod winio;

#[cfg(any(feature = "directio", feature = "winio"))]
use core::ffi::c_void;
use core::fmt;
use std::path::Path;

#[cfg(feature = "directio")]
pub use directio::DirectIo;
#[cfg(feature = "winio")]
pub use winio::WinIo;

use crate::error::SetupError;
use crate::host::HostFamily;
use crate::loader::Module;
use crate::port::PortWidth;

/// Interface every bound provider implements.
///
/// Values travel in a 32-bit slot regardless of the requested width; the
/// caller narrows or widens them (see [`PortValue`](crate::PortValue)).
pub trait PortProvider {
    /// The family this provider belongs to.
    fn family(&self) -> ProviderFamily;

    /// Runs the provider's init routine. Returns `false` if it refused.
    fn init(&self) -> bool;

    /// Runs the provider's shutdown routine.
    fn shutdown(&self);

    /// Reads `width` bits from `port`. `None` if the provider reported failure.
    fn read(&self, port: u16, width: PortWidth) -> Option<u32>;

    /// Writes the low `width` bits of `value` to `port`. Returns the
    /// provider's success flag.
    fn write(&self, port: u16, value: u32, width: PortWidth) -> bool;
}

/// Which helper-driver family a library belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ProviderFamily {
    /// `DirectIO`.
    DirectIo,
    /// `WinIo`.
    WinIo,
}

impl ProviderFamily {
    /// Human-readable family name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::DirectIo => "DirectIO",
            Self::WinIo => "WinIo",
        }
    }

    /// Whether support for this family was compiled in.
    #[must_use]
    pub const fn is_enabled(self) -> bool {
        match self {
            Self::DirectIo => cfg!(feature = "directio"),
            Self::WinIo => cfg!(feature = "winio"),
        }
    }

    /// Names of the entry points a library of this family must export.
    ///
    /// Empty for a family that is not compiled in.
    #[must_use]
    pub const fn entry_points(self) -> &'static [&'static str] {
        match self {
            #[cfg(feature = "directio")]
            Self::DirectIo => &directio::ENTRY_POINTS,
            #[cfg(feature = "winio")]
            Self::WinIo => &winio::ENTRY_POINTS,
            #[allow(unreachable_patterns)]
            _ => &[],
        }
    }

    /// Resolves every entry point of this family from `module`.
    ///
    /// Fails on the first missing symbol; a partially resolved table is never
    /// returned. A family that is not compiled in fails without resolving
    /// anything.
    ///
    /// # Safety
    ///
    /// `module` must be a library of this family, i.e. each exported symbol
    /// named in [`entry_points`](Self::entry_points) must have the signature
    /// the family documents.
    pub(crate) unsafe fn bind(
        self,
        module: &dyn Module,
    ) -> Result<Box<dyn PortProvider>, SetupError> {
        // SAFETY: forwarded from the caller.
        let provider: Box<dyn PortProvider> = unsafe {
            match self {
                #[cfg(feature = "directio")]
                Self::DirectIo => Box::new(DirectIo::resolve(module)?),
                #[cfg(feature = "winio")]
                Self::WinIo => Box::new(WinIo::resolve(module)?),
                #[allow(unreachable_patterns)]
                _ => {
                    return Err(SetupError::Disabled {
                        library: module.name().to_string(),
                        family: self,
                    });
                }
            }
        };
        Ok(provider)
    }
}

impl fmt::Display for ProviderFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Looks up `name` in `module` and reinterprets it as the function pointer `F`.
///
/// # Safety
///
/// `F` must be a function pointer type matching the symbol's real signature.
#[cfg(any(feature = "directio", feature = "winio"))]
unsafe fn resolve<F: Copy>(module: &dyn Module, name: &'static str) -> Result<F, SetupError> {
    const { assert!(size_of::<F>() == size_of::<*mut c_void>()) };
    let ptr = module
        .symbol(name)
        .ok_or_else(|| SetupError::MissingSymbol {
            library: module.name().to_string(),
            symbol: name,
        })?;
    // SAFETY: `F` is pointer-sized and the caller guarantees it matches the
    // exported symbol's signature.
    Ok(unsafe { core::mem::transmute_copy::<*mut c_void, F>(&ptr.as_ptr()) })
}

// ---------------------------------------------------------------------------
// Candidates
// ---------------------------------------------------------------------------

/// One library to try, and the family it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(deny_unknown_fields))]
pub struct Candidate {
    /// File name (or path) handed to the loader.
    pub library: String,
    /// Family of the library.
    pub family: ProviderFamily,
}

impl Candidate {
    /// Creates a candidate.
    pub fn new(library: impl Into<String>, family: ProviderFamily) -> Self {
        Self {
            library: library.into(),
            family,
        }
    }

    /// The same candidate, with its library looked up inside `dir`.
    #[must_use]
    pub fn in_dir(&self, dir: &Path) -> Self {
        Self {
            library: dir.join(&self.library).to_string_lossy().into_owned(),
            family: self.family,
        }
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.library, self.family)
    }
}

/// 64-bit builds: `DirectIO` first, then `WinIo` 3.
const CANDIDATES_64: &[(&str, ProviderFamily)] = &[
    ("DirectIOLibx64.dll", ProviderFamily::DirectIo),
    ("WinIo64.dll", ProviderFamily::WinIo),
];

/// 32-bit builds on NT: `DirectIO`, then `WinIo` 3, then `WinIo` 2.
const CANDIDATES_32_NT: &[(&str, ProviderFamily)] = &[
    ("DirectIOLib32.dll", ProviderFamily::DirectIo),
    ("WinIo32.dll", ProviderFamily::WinIo),
    ("WinIo.dll", ProviderFamily::WinIo),
];

/// 32-bit builds on Win9x: only `WinIo` 2 has a driver there.
const CANDIDATES_32_9X: &[(&str, ProviderFamily)] = &[("WinIo.dll", ProviderFamily::WinIo)];

/// Ordered list of candidate libraries, most preferred first.
///
/// Candidates of a family that is not compiled in are dropped on
/// construction, so every entry in a set can be bound.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateSet {
    candidates: Vec<Candidate>,
}

impl CandidateSet {
    /// The default preference order for this build and the running host.
    #[must_use]
    pub fn for_host() -> Self {
        Self::for_target(cfg!(target_pointer_width = "64"), HostFamily::detect())
    }

    /// The default preference order for a given pointer width and host.
    ///
    /// Families whose cargo feature is disabled are left out.
    #[must_use]
    pub fn for_target(is_64bit: bool, host: HostFamily) -> Self {
        let table = match (is_64bit, host) {
            (true, _) => CANDIDATES_64,
            (false, HostFamily::Nt) => CANDIDATES_32_NT,
            (false, HostFamily::Win9x) => CANDIDATES_32_9X,
        };
        table
            .iter()
            .map(|&(library, family)| Candidate::new(library, family))
            .collect()
    }

    /// Restricts every candidate to libraries inside `dir`.
    #[must_use]
    pub fn in_dir(self, dir: &Path) -> Self {
        self.candidates.iter().map(|c| c.in_dir(dir)).collect()
    }

    /// Number of candidates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Returns `true` if there is nothing to try.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Iterates candidates in preference order.
    pub fn iter(&self) -> core::slice::Iter<'_, Candidate> {
        self.candidates.iter()
    }

    /// The candidates as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[Candidate] {
        &self.candidates
    }
}

impl From<Vec<Candidate>> for CandidateSet {
    fn from(candidates: Vec<Candidate>) -> Self {
        candidates.into_iter().collect()
    }
}

impl FromIterator<Candidate> for CandidateSet {
    fn from_iter<I: IntoIterator<Item = Candidate>>(iter: I) -> Self {
        Self {
            candidates: iter
                .into_iter()
                .filter(|c| c.family.is_enabled())
                .collect(),
        }
    }
}

impl<'a> IntoIterator for &'a CandidateSet {
    type Item = &'a Candidate;
    type IntoIter = core::slice::Iter<'a, Candidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.candidates.iter()
    }
}
