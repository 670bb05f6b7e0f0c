//! Binder error types.

use core::fmt;
use core::fmt::Write as _;
use std::path::PathBuf;

use crate::provider::{Candidate, ProviderFamily};

/// Reasons a binding attempt can fail.
///
/// Each variant is reported once through the caller's sink at warning level
/// and then returned. None of them is retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetupError {
    /// Every candidate library failed to load.
    NoProvider {
        /// The candidates that were attempted, in order.
        attempted: Vec<Candidate>,
    },
    /// A library loaded but does not export a required entry point.
    MissingSymbol {
        /// The library that was loaded.
        library: String,
        /// The entry point that could not be resolved.
        symbol: &'static str,
    },
    /// The provider loaded and resolved but its init routine refused.
    InitRefused {
        /// The library that was loaded.
        library: String,
        /// The family the library belongs to.
        family: ProviderFamily,
    },
    /// The library belongs to a family whose cargo feature is disabled.
    Disabled {
        /// The library that was loaded.
        library: String,
        /// The family that is not compiled in.
        family: ProviderFamily,
    },
}

impl SetupError {
    /// The one-line warning reported through the sink for this error.
    #[must_use]
    pub fn warning(&self) -> String {
        match self {
            Self::NoProvider { attempted } => {
                let mut families: Vec<ProviderFamily> = Vec::new();
                for candidate in attempted {
                    if !families.contains(&candidate.family) {
                        families.push(candidate.family);
                    }
                }
                match families.as_slice() {
                    [] => "No I/O library candidates were configured.".to_string(),
                    [only] => format!("{only} library could not be loaded."),
                    [first, rest @ ..] => {
                        let mut msg = format!("Neither {first}");
                        for family in rest {
                            let _ = write!(msg, ", nor {family}");
                        }
                        msg.push_str(" library could be loaded.");
                        msg
                    }
                }
            }
            Self::MissingSymbol { symbol, .. } => format!("Couldn't find {symbol} function."),
            Self::InitRefused { .. } => "IO library initialization failed. \
                 Try running from an elevated command prompt."
                .to_string(),
            Self::Disabled { family, .. } => {
                format!("{family} support is not compiled in.")
            }
        }
    }
}

impl fmt::Display for SetupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoProvider { attempted } => {
                f.write_str("no port I/O provider could be loaded")?;
                if !attempted.is_empty() {
                    f.write_str(" (tried ")?;
                    for (i, candidate) in attempted.iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        f.write_str(&candidate.library)?;
                    }
                    f.write_str(")")?;
                }
                Ok(())
            }
            Self::MissingSymbol { library, symbol } => {
                write!(f, "{library} does not export {symbol}")
            }
            Self::InitRefused { library, family } => {
                write!(f, "{family} initialization refused by {library}")
            }
            Self::Disabled { library, family } => {
                write!(f, "{library} is a {family} library, which this build does not support")
            }
        }
    }
}

impl std::error::Error for SetupError {}

/// A single candidate library could not be opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadError {
    /// The library name or path that was attempted.
    pub library: String,
    /// The loader's explanation.
    pub reason: String,
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "could not load {}: {}", self.library, self.reason)
    }
}

impl std::error::Error for LoadError {}

/// A [`BinderConfig`](crate::BinderConfig) that cannot be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// `library_dir` is relative, so loads would depend on the working
    /// directory.
    RelativeLibraryDir(PathBuf),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RelativeLibraryDir(dir) => {
                write!(f, "library directory {} is not an absolute path", dir.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {}
