//! Host operating-system family detection.

/// Windows kernel family of the running host.
///
/// Only 32-bit builds care: Win9x hosts have no `DirectIO` driver and only the
/// legacy `WinIo` 2 library works there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HostFamily {
    /// Windows NT and everything derived from it.
    #[default]
    Nt,
    /// Windows 95/98/Me.
    Win9x,
}

impl HostFamily {
    /// Detects the running host.
    ///
    /// Queries `GetVersion` on 32-bit Windows builds; the high bit of its
    /// result is set on Win9x. Every other build reports [`HostFamily::Nt`].
    #[must_use]
    pub fn detect() -> Self {
        #[cfg(all(windows, target_pointer_width = "32"))]
        {
            if let Some(version) = windows::get_version() {
                return Self::from_version(version);
            }
        }
        Self::Nt
    }

    /// Classifies a raw `GetVersion` result.
    #[must_use]
    pub const fn from_version(version: u32) -> Self {
        if version & 0x8000_0000 == 0 {
            Self::Nt
        } else {
            Self::Win9x
        }
    }
}

#[cfg(all(windows, target_pointer_width = "32"))]
mod windows {
    use libloading::os::windows::Library;

    type GetVersionFn = unsafe extern "system" fn() -> u32;

    /// Calls `kernel32!GetVersion`, looked up at runtime.
    pub(super) fn get_version() -> Option<u32> {
        let kernel32 = Library::open_already_loaded("kernel32").ok()?;
        // SAFETY: `GetVersion` takes no arguments and returns a DWORD.
        unsafe {
            let get_version = kernel32.get::<GetVersionFn>(b"GetVersion\0").ok()?;
            Some(get_version())
        }
    }
}
