//! Shared-library loading seam.
//!
//! [`Loader`] opens candidate libraries and [`Module`] hands out raw entry
//! points. [`SystemLoader`] is the production implementation on top of
//! `libloading`; tests substitute fakes.

use core::ffi::c_void;
use core::fmt;
use core::ptr::NonNull;

use crate::error::LoadError;

/// An opened shared library.
///
/// Dropping the module unloads the library, invalidating every pointer it
/// handed out.
///
/// # Safety
///
/// Pointers returned by [`symbol`](Self::symbol) must be the addresses of the
/// library's exported items of that name, and must stay valid until the
/// module is dropped.
pub unsafe trait Module {
    /// The name or path the library was opened with.
    fn name(&self) -> &str;

    /// Looks up an exported symbol. `None` if the library does not export it.
    fn symbol(&self, name: &str) -> Option<NonNull<c_void>>;
}

/// Opens candidate libraries.
pub trait Loader {
    /// Removes the current working directory from the library search path.
    ///
    /// Returns `true` if the search path was changed. Failure is not fatal to
    /// binding.
    fn restrict_search_path(&self) -> bool;

    /// Opens a library by name or path.
    fn open(&self, library: &str) -> Result<Box<dyn Module>, LoadError>;
}

/// Loader backed by the operating system's dynamic linker.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemLoader;

impl Loader for SystemLoader {
    fn restrict_search_path(&self) -> bool {
        restrict_search_path()
    }

    fn open(&self, library: &str) -> Result<Box<dyn Module>, LoadError> {
        // SAFETY: helper-driver libraries run no initialization code beyond
        // `DllMain`, which neither DirectIO nor WinIo uses for side effects.
        let lib = unsafe { libloading::Library::new(library) }.map_err(|err| LoadError {
            library: library.to_string(),
            reason: err.to_string(),
        })?;
        Ok(Box::new(SystemModule {
            name: library.to_string(),
            lib,
        }))
    }
}

/// A library opened by [`SystemLoader`].
pub struct SystemModule {
    name: String,
    lib: libloading::Library,
}

impl fmt::Debug for SystemModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SystemModule")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

// SAFETY: symbols come straight from the dynamic linker, and `lib` keeps the
// library mapped for as long as `self` lives.
unsafe impl Module for SystemModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn symbol(&self, name: &str) -> Option<NonNull<c_void>> {
        // SAFETY: the symbol is only read as an untyped address here; callers
        // assign it a type.
        let sym = unsafe { self.lib.get::<*mut c_void>(name.as_bytes()) }.ok()?;
        NonNull::new(*sym)
    }
}

/// Calls `kernel32!SetDllDirectoryA("")`, looked up at runtime.
#[cfg(windows)]
fn restrict_search_path() -> bool {
    use libloading::os::windows::Library;

    type SetDllDirectoryAFn = unsafe extern "system" fn(*const core::ffi::c_char) -> i32;

    let Ok(kernel32) = Library::open_already_loaded("kernel32") else {
        return false;
    };
    // SAFETY: `SetDllDirectoryA` takes a nul-terminated string and returns a
    // BOOL; the empty string removes the current directory from the search.
    unsafe {
        match kernel32.get::<SetDllDirectoryAFn>(b"SetDllDirectoryA\0") {
            Ok(set_dll_directory) => set_dll_directory(c"".as_ptr()) != 0,
            Err(_) => false,
        }
    }
}

/// The working directory is never implicitly searched by `dlopen`.
#[cfg(not(windows))]
fn restrict_search_path() -> bool {
    false
}
