//! In-process fakes for the loader seam.
//!
//! Fake libraries export real `extern "system"` functions with the `DirectIO`
//! and `WinIo` signatures. They share a thread-local, byte-addressed port space
//! that echoes writes back little-endian, and count every init, shutdown and
//! unload. Call [`reset`] at the start of each test.

use core::ffi::c_void;
use core::fmt;
use core::ptr::NonNull;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use crate::error::LoadError;
use crate::loader::{Loader, Module};
use crate::log::{LogLevel, LogSink};
use crate::provider::ProviderFamily;
#[cfg(feature = "directio")]
use crate::provider::directio;
#[cfg(feature = "winio")]
use crate::provider::winio;

/// Bits a fake read sets above the requested width.
const JUNK: u32 = 0xA5A5_A5A5;

thread_local! {
    static PORTS: RefCell<HashMap<u16, u8>> = RefCell::new(HashMap::new());
    static SIZE_ARGS: RefCell<Vec<u32>> = const { RefCell::new(Vec::new()) };
    static RESOLVED: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
    static INITS: Cell<u32> = const { Cell::new(0) };
    static SHUTDOWNS: Cell<u32> = const { Cell::new(0) };
    static UNLOADS: Cell<u32> = const { Cell::new(0) };
    static REFUSE_INIT: Cell<bool> = const { Cell::new(false) };
    static FAIL_READS: Cell<bool> = const { Cell::new(false) };
    static FAIL_WRITES: Cell<bool> = const { Cell::new(false) };
}

/// Clears all fake state for the current thread.
pub fn reset() {
    PORTS.with_borrow_mut(HashMap::clear);
    SIZE_ARGS.with_borrow_mut(Vec::clear);
    RESOLVED.with_borrow_mut(Vec::clear);
    for counter in [&INITS, &SHUTDOWNS, &UNLOADS] {
        counter.set(0);
    }
    for flag in [&REFUSE_INIT, &FAIL_READS, &FAIL_WRITES] {
        flag.set(false);
    }
}

/// Makes every fake init routine report failure.
pub fn refuse_init(refuse: bool) {
    REFUSE_INIT.set(refuse);
}

/// Makes every fake read routine report failure.
pub fn fail_reads(fail: bool) {
    FAIL_READS.set(fail);
}

/// Makes every fake write routine report failure.
pub fn fail_writes(fail: bool) {
    FAIL_WRITES.set(fail);
}

/// Raw size arguments received by read/write routines, in call order.
pub fn size_args() -> Vec<u32> {
    SIZE_ARGS.with_borrow(Clone::clone)
}

/// Symbols successfully looked up in fake modules, in lookup order.
pub fn resolved() -> Vec<String> {
    RESOLVED.with_borrow(Clone::clone)
}

/// Number of init calls.
pub fn inits() -> u32 {
    INITS.get()
}

/// Number of shutdown calls.
pub fn shutdowns() -> u32 {
    SHUTDOWNS.get()
}

/// Number of fake modules dropped.
pub fn unloads() -> u32 {
    UNLOADS.get()
}

// ---------------------------------------------------------------------------
// Shared port space
// ---------------------------------------------------------------------------

fn store(port: u16, value: u32, bytes: u8) -> bool {
    if FAIL_WRITES.get() {
        return false;
    }
    PORTS.with_borrow_mut(|ports| {
        for (i, byte) in value.to_le_bytes().into_iter().take(bytes.into()).enumerate() {
            ports.insert(port.wrapping_add(i as u16), byte);
        }
    });
    true
}

fn load(port: u16, bytes: u8) -> Option<u32> {
    if FAIL_READS.get() {
        return None;
    }
    let mut raw = [0u8; 4];
    PORTS.with_borrow(|ports| {
        for (i, slot) in raw.iter_mut().take(bytes.into()).enumerate() {
            *slot = ports.get(&port.wrapping_add(i as u16)).copied().unwrap_or(0);
        }
    });
    let mask = if bytes >= 4 { u32::MAX } else { (1u32 << (bytes * 8)) - 1 };
    Some(u32::from_le_bytes(raw) | (JUNK & !mask))
}

fn init() -> bool {
    INITS.set(INITS.get() + 1);
    !REFUSE_INIT.get()
}

fn shutdown() {
    SHUTDOWNS.set(SHUTDOWNS.get() + 1);
}

// ---------------------------------------------------------------------------
// Fake DirectIO exports
// ---------------------------------------------------------------------------

#[cfg(feature = "directio")]
fn directio_bytes(size: u32) -> Option<u8> {
    SIZE_ARGS.with_borrow_mut(|args| args.push(size));
    match size {
        1 => Some(1),
        2 => Some(2),
        3 => Some(4),
        _ => None,
    }
}

#[cfg(feature = "directio")]
unsafe extern "system" fn directio_init() -> i32 {
    i32::from(init())
}

#[cfg(feature = "directio")]
unsafe extern "system" fn directio_deinit() {
    shutdown();
}

#[cfg(feature = "directio")]
unsafe extern "system" fn directio_write_port(value: u32, port: u16, size: u32) -> i32 {
    let ok = directio_bytes(size).is_some_and(|bytes| store(port, value, bytes));
    i32::from(ok)
}

#[cfg(feature = "directio")]
unsafe extern "system" fn directio_read_port(value: *mut u32, port: u16, size: u32) -> i32 {
    match directio_bytes(size).and_then(|bytes| load(port, bytes)) {
        Some(v) => {
            // SAFETY: the provider passes a valid out-pointer.
            unsafe { value.write(v) };
            1
        }
        None => 0,
    }
}

// ---------------------------------------------------------------------------
// Fake WinIo exports
// ---------------------------------------------------------------------------

#[cfg(feature = "winio")]
fn winio_bytes(size: u8) -> Option<u8> {
    SIZE_ARGS.with_borrow_mut(|args| args.push(size.into()));
    matches!(size, 1 | 2 | 4).then_some(size)
}

#[cfg(feature = "winio")]
unsafe extern "system" fn initialize_winio() -> u8 {
    u8::from(init())
}

#[cfg(feature = "winio")]
unsafe extern "system" fn shutdown_winio() {
    shutdown();
}

#[cfg(feature = "winio")]
unsafe extern "system" fn get_port_val(port: u16, value: *mut u32, size: u8) -> u8 {
    match winio_bytes(size).and_then(|bytes| load(port, bytes)) {
        Some(v) => {
            // SAFETY: the provider passes a valid out-pointer.
            unsafe { value.write(v) };
            1
        }
        None => 0,
    }
}

#[cfg(feature = "winio")]
unsafe extern "system" fn set_port_val(port: u16, value: u32, size: u8) -> u8 {
    u8::from(winio_bytes(size).is_some_and(|bytes| store(port, value, bytes)))
}

// ---------------------------------------------------------------------------
// Libraries, modules, loader
// ---------------------------------------------------------------------------

/// A fake library image: a family and its exported symbols.
#[derive(Debug, Clone)]
pub struct FakeLibrary {
    family: ProviderFamily,
    symbols: Vec<(&'static str, *mut c_void)>,
}

impl FakeLibrary {
    /// A complete `DirectIO` library.
    #[cfg(feature = "directio")]
    pub fn directio() -> Self {
        Self {
            family: ProviderFamily::DirectIo,
            symbols: vec![
                ("DirectIO_Init", directio_init as directio::InitFn as *mut c_void),
                ("DirectIO_DeInit", directio_deinit as directio::DeInitFn as *mut c_void),
                (
                    "DirectIO_WritePort",
                    directio_write_port as directio::WritePortFn as *mut c_void,
                ),
                (
                    "DirectIO_ReadPort",
                    directio_read_port as directio::ReadPortFn as *mut c_void,
                ),
            ],
        }
    }

    /// A complete `WinIo` library.
    #[cfg(feature = "winio")]
    pub fn winio() -> Self {
        Self {
            family: ProviderFamily::WinIo,
            symbols: vec![
                ("InitializeWinIo", initialize_winio as winio::InitializeFn as *mut c_void),
                ("ShutdownWinIo", shutdown_winio as winio::ShutdownFn as *mut c_void),
                ("GetPortVal", get_port_val as winio::GetPortValFn as *mut c_void),
                ("SetPortVal", set_port_val as winio::SetPortValFn as *mut c_void),
            ],
        }
    }

    /// A library of `family` that exports nothing.
    #[cfg_attr(all(feature = "directio", feature = "winio"), allow(dead_code))]
    pub fn bare(family: ProviderFamily) -> Self {
        Self {
            family,
            symbols: Vec::new(),
        }
    }

    /// The same library without the named export.
    pub fn without(mut self, symbol: &str) -> Self {
        self.symbols.retain(|(name, _)| *name != symbol);
        self
    }

    /// The family this library imitates.
    pub fn family(&self) -> ProviderFamily {
        self.family
    }

    /// "Loads" the library under `name`.
    pub fn open(&self, name: &str) -> FakeModule {
        FakeModule {
            name: name.to_string(),
            symbols: self.symbols.clone(),
        }
    }
}

/// A loaded [`FakeLibrary`]. Dropping it counts as an unload.
#[derive(Debug)]
pub struct FakeModule {
    name: String,
    symbols: Vec<(&'static str, *mut c_void)>,
}

// SAFETY: every exported pointer is a `'static` function with the signature
// its family declares.
unsafe impl Module for FakeModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn symbol(&self, name: &str) -> Option<NonNull<c_void>> {
        let (_, ptr) = self.symbols.iter().find(|(sym, _)| *sym == name)?;
        RESOLVED.with_borrow_mut(|resolved| resolved.push(name.to_string()));
        NonNull::new(*ptr)
    }
}

impl Drop for FakeModule {
    fn drop(&mut self) {
        UNLOADS.set(UNLOADS.get() + 1);
    }
}

/// A loader that only knows the libraries registered with [`with`](Self::with).
#[derive(Debug, Default)]
pub struct FakeLoader {
    libraries: Vec<(String, FakeLibrary)>,
    events: RefCell<Vec<String>>,
}

impl FakeLoader {
    /// A loader with no libraries: every open fails.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a loadable library.
    pub fn with(mut self, name: &str, library: FakeLibrary) -> Self {
        self.libraries.push((name.to_string(), library));
        self
    }

    /// Everything the binder asked of this loader, in order.
    pub fn events(&self) -> Vec<String> {
        self.events.borrow().clone()
    }

    /// Library names passed to `open`, in order.
    pub fn attempts(&self) -> Vec<String> {
        self.events
            .borrow()
            .iter()
            .filter_map(|event| event.strip_prefix("open "))
            .map(str::to_string)
            .collect()
    }
}

impl Loader for FakeLoader {
    fn restrict_search_path(&self) -> bool {
        self.events
            .borrow_mut()
            .push("restrict-search-path".to_string());
        true
    }

    fn open(&self, library: &str) -> Result<Box<dyn Module>, LoadError> {
        self.events.borrow_mut().push(format!("open {library}"));
        self.libraries
            .iter()
            .find(|(name, _)| name == library)
            .map(|(name, lib)| Box::new(lib.open(name)) as Box<dyn Module>)
            .ok_or_else(|| LoadError {
                library: library.to_string(),
                reason: "The specified module could not be found.".to_string(),
            })
    }
}

// ---------------------------------------------------------------------------
// Log capture
// ---------------------------------------------------------------------------

/// A sink that keeps every message.
#[derive(Debug, Default)]
pub struct RecordingSink {
    records: RefCell<Vec<(LogLevel, String)>>,
}

impl RecordingSink {
    /// An empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything logged so far.
    pub fn records(&self) -> Vec<(LogLevel, String)> {
        self.records.borrow().clone()
    }
}

impl LogSink for RecordingSink {
    fn log(&self, level: LogLevel, args: fmt::Arguments<'_>) {
        self.records.borrow_mut().push((level, args.to_string()));
    }
}
