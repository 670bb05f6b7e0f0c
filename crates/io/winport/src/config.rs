//! Runtime binder configuration.

use std::path::PathBuf;

use crate::error::ConfigError;
use crate::provider::{Candidate, CandidateSet};

/// Knobs for a [`Binder`](crate::Binder).
///
/// Search-path hardening is not configurable: it always runs before the
/// first load.
///
/// With the `serde` feature this deserializes from kebab-case keys:
///
/// ```toml
/// library-dir = 'C:\Tools\DirectIO'
///
/// [[candidates]]
/// library = "DirectIOLibx64.dll"
/// family = "directio"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "kebab-case", deny_unknown_fields))]
pub struct BinderConfig {
    /// Only load helper libraries from this directory. Must be absolute.
    pub library_dir: Option<PathBuf>,
    /// Explicit candidate order. `None` uses the host default.
    pub candidates: Option<Vec<Candidate>>,
}

impl BinderConfig {
    /// Checks the configuration without loading anything.
    ///
    /// # Errors
    ///
    /// [`ConfigError::RelativeLibraryDir`] if `library_dir` is relative; the
    /// loader would resolve it against the working directory.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match &self.library_dir {
            Some(dir) if !dir.is_absolute() => Err(ConfigError::RelativeLibraryDir(dir.clone())),
            _ => Ok(()),
        }
    }

    /// The candidate list this configuration describes.
    ///
    /// # Errors
    ///
    /// See [`validate`](Self::validate).
    pub fn candidate_set(&self) -> Result<CandidateSet, ConfigError> {
        self.validate()?;
        let set = match &self.candidates {
            Some(list) => CandidateSet::from(list.clone()),
            None => CandidateSet::for_host(),
        };
        Ok(match &self.library_dir {
            Some(dir) => set.in_dir(dir),
            None => set,
        })
    }
}
