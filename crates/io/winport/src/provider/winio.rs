//! `WinIo` provider (versions 2 and 3 share one ABI).

use super::{PortProvider, ProviderFamily, resolve};
use crate::error::SetupError;
use crate::loader::Module;
use crate::port::PortWidth;

/// `bool InitializeWinIo(void)` (`WinIo`'s `bool` is a `BYTE`)
pub type InitializeFn = unsafe extern "system" fn() -> u8;
/// `void ShutdownWinIo(void)`
pub type ShutdownFn = unsafe extern "system" fn();
/// `bool GetPortVal(WORD port, PDWORD value, BYTE size)`
pub type GetPortValFn = unsafe extern "system" fn(port: u16, value: *mut u32, size: u8) -> u8;
/// `bool SetPortVal(WORD port, DWORD value, BYTE size)`
pub type SetPortValFn = unsafe extern "system" fn(port: u16, value: u32, size: u8) -> u8;

pub(super) const ENTRY_POINTS: [&str; 4] =
    ["InitializeWinIo", "ShutdownWinIo", "GetPortVal", "SetPortVal"];

/// Entry-point table of a bound `WinIo` library.
#[derive(Debug, Clone, Copy)]
pub struct WinIo {
    initialize: InitializeFn,
    shutdown: ShutdownFn,
    get_port_val: GetPortValFn,
    set_port_val: SetPortValFn,
}

impl WinIo {
    /// Resolves all four `WinIo` entry points from `module`.
    ///
    /// # Safety
    ///
    /// `module` must export the `WinIo` entry points with the signatures
    /// declared in this module.
    pub unsafe fn resolve(module: &dyn Module) -> Result<Self, SetupError> {
        let [initialize, shutdown, get_port_val, set_port_val] = ENTRY_POINTS;
        // SAFETY: the caller vouches for the signatures.
        unsafe {
            Ok(Self {
                initialize: resolve(module, initialize)?,
                shutdown: resolve(module, shutdown)?,
                get_port_val: resolve(module, get_port_val)?,
                set_port_val: resolve(module, set_port_val)?,
            })
        }
    }
}

impl PortProvider for WinIo {
    fn family(&self) -> ProviderFamily {
        ProviderFamily::WinIo
    }

    fn init(&self) -> bool {
        // SAFETY: resolved from a WinIo library that is still loaded.
        unsafe { (self.initialize)() != 0 }
    }

    fn shutdown(&self) {
        // SAFETY: as above.
        unsafe { (self.shutdown)() }
    }

    fn read(&self, port: u16, width: PortWidth) -> Option<u32> {
        let mut value = 0u32;
        // SAFETY: `value` is a valid out-pointer for the duration of the call.
        let ok = unsafe { (self.get_port_val)(port, &raw mut value, width.bytes()) } != 0;
        ok.then_some(value)
    }

    fn write(&self, port: u16, value: u32, width: PortWidth) -> bool {
        // SAFETY: resolved from a WinIo library that is still loaded.
        unsafe { (self.set_port_val)(port, value, width.bytes()) != 0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{self, FakeLibrary};

    #[test]
    fn passes_byte_counts_to_library() {
        testing::reset();
        let module = FakeLibrary::winio().open("WinIo64.dll");
        // SAFETY: fake WinIo library.
        let io = unsafe { WinIo::resolve(&module) }.unwrap();
        assert!(io.init());
        assert!(io.write(0x70, 0x0000_0A0B, PortWidth::Word));
        assert_eq!(io.read(0x70, PortWidth::Byte).map(|v| v & 0xFF), Some(0x0B));
        assert_eq!(io.read(0x71, PortWidth::Byte).map(|v| v & 0xFF), Some(0x0A));
        assert_eq!(io.read(0x70, PortWidth::DWord), Some(0x0000_0A0B));
        assert_eq!(testing::size_args(), vec![2, 1, 1, 4]);
    }

    #[test]
    fn init_refusal_is_reported() {
        testing::reset();
        testing::refuse_init(true);
        let module = FakeLibrary::winio().open("WinIo32.dll");
        // SAFETY: fake WinIo library.
        let io = unsafe { WinIo::resolve(&module) }.unwrap();
        assert!(!io.init());
        assert_eq!(testing::inits(), 1);
    }

    #[test]
    fn missing_initialize_is_fatal() {
        testing::reset();
        let module = FakeLibrary::winio()
            .without("InitializeWinIo")
            .open("WinIo.dll");
        // SAFETY: fake WinIo library.
        let err = unsafe { WinIo::resolve(&module) }.unwrap_err();
        assert_eq!(err.warning(), "Couldn't find InitializeWinIo function.");
    }
}
