//! `DirectIO` provider.

use super::{PortProvider, ProviderFamily, resolve};
use crate::error::SetupError;
use crate::loader::Module;
use crate::port::PortWidth;

/// `DIRECTIO_PORT_SIZE` tag passed to the read/write routines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum DirectIoPortSize {
    /// `psByte`
    Byte = 1,
    /// `psWord`
    Word = 2,
    /// `psDWord`
    DWord = 3,
}

impl From<PortWidth> for DirectIoPortSize {
    fn from(width: PortWidth) -> Self {
        match width {
            PortWidth::Byte => Self::Byte,
            PortWidth::Word => Self::Word,
            PortWidth::DWord => Self::DWord,
        }
    }
}

/// `BOOL DirectIO_Init(void)`
pub type InitFn = unsafe extern "system" fn() -> i32;
/// `void DirectIO_DeInit(void)`
pub type DeInitFn = unsafe extern "system" fn();
/// `BOOL DirectIO_WritePort(ULONG value, USHORT port, DIRECTIO_PORT_SIZE size)`
pub type WritePortFn = unsafe extern "system" fn(value: u32, port: u16, size: u32) -> i32;
/// `BOOL DirectIO_ReadPort(PULONG value, USHORT port, DIRECTIO_PORT_SIZE size)`
pub type ReadPortFn = unsafe extern "system" fn(value: *mut u32, port: u16, size: u32) -> i32;

pub(super) const ENTRY_POINTS: [&str; 4] = [
    "DirectIO_Init",
    "DirectIO_DeInit",
    "DirectIO_WritePort",
    "DirectIO_ReadPort",
];

/// Entry-point table of a bound `DirectIO` library.
#[derive(Debug, Clone, Copy)]
pub struct DirectIo {
    init: InitFn,
    deinit: DeInitFn,
    write_port: WritePortFn,
    read_port: ReadPortFn,
}

impl DirectIo {
    /// Resolves all four `DirectIO` entry points from `module`.
    ///
    /// # Safety
    ///
    /// `module` must export the `DirectIO` entry points with the signatures
    /// declared in this module.
    pub unsafe fn resolve(module: &dyn Module) -> Result<Self, SetupError> {
        let [init, deinit, write_port, read_port] = ENTRY_POINTS;
        // SAFETY: the caller vouches for the signatures.
        unsafe {
            Ok(Self {
                init: resolve(module, init)?,
                deinit: resolve(module, deinit)?,
                write_port: resolve(module, write_port)?,
                read_port: resolve(module, read_port)?,
            })
        }
    }
}

impl PortProvider for DirectIo {
    fn family(&self) -> ProviderFamily {
        ProviderFamily::DirectIo
    }

    fn init(&self) -> bool {
        // SAFETY: resolved from a DirectIO library that is still loaded.
        unsafe { (self.init)() != 0 }
    }

    fn shutdown(&self) {
        // SAFETY: as above.
        unsafe { (self.deinit)() }
    }

    fn read(&self, port: u16, width: PortWidth) -> Option<u32> {
        let mut value = 0u32;
        let size = DirectIoPortSize::from(width) as u32;
        // SAFETY: `value` is a valid out-pointer for the duration of the call.
        let ok = unsafe { (self.read_port)(&raw mut value, port, size) } != 0;
        ok.then_some(value)
    }

    fn write(&self, port: u16, value: u32, width: PortWidth) -> bool {
        let size = DirectIoPortSize::from(width) as u32;
        // SAFETY: resolved from a DirectIO library that is still loaded.
        unsafe { (self.write_port)(value, port, size) != 0 }
    }
}
