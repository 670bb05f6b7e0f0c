//! Typed port I/O through a bound provider.
//!
//! Provides [`Port<T>`] as a type-safe wrapper around a fixed port address,
//! replacing ad-hoc `read8`/`write8` calls with a structured API. Every access
//! goes through a [`PortIo`] handle, so a port handle can be created before
//! any provider is bound.

use core::fmt;
use core::marker::PhantomData;

use crate::binder::PortIo;

/// Operand size of a single port operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortWidth {
    /// 8-bit access.
    Byte,
    /// 16-bit access.
    Word,
    /// 32-bit access.
    DWord,
}

impl PortWidth {
    /// Width in bits.
    #[must_use]
    pub const fn bits(self) -> u32 {
        match self {
            Self::Byte => 8,
            Self::Word => 16,
            Self::DWord => 32,
        }
    }

    /// Width in bytes.
    #[must_use]
    pub const fn bytes(self) -> u8 {
        match self {
            Self::Byte => 1,
            Self::Word => 2,
            Self::DWord => 4,
        }
    }

    /// Mask selecting the low `bits()` of a 32-bit value.
    #[must_use]
    pub const fn mask(self) -> u32 {
        match self {
            Self::Byte => 0xFF,
            Self::Word => 0xFFFF,
            Self::DWord => 0xFFFF_FFFF,
        }
    }

    /// Parses a width given in bits (8, 16 or 32).
    #[must_use]
    pub const fn from_bits(bits: u32) -> Option<Self> {
        match bits {
            8 => Some(Self::Byte),
            16 => Some(Self::Word),
            32 => Some(Self::DWord),
            _ => None,
        }
    }
}

impl fmt::Display for PortWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-bit", self.bits())
    }
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for u8 {}
    impl Sealed for u16 {}
    impl Sealed for u32 {}
}

/// Types that can be moved through an I/O port.
///
/// Providers always exchange values in a 32-bit slot. This trait narrows that
/// slot to the value's width and widens it back. Implemented for `u8`, `u16`
/// and `u32` only.
pub trait PortValue: sealed::Sealed + Copy + fmt::Debug + fmt::LowerHex + 'static {
    /// The operand size used for this type.
    const WIDTH: PortWidth;
    /// The value returned when the provider reports a failed read.
    const ZERO: Self;

    /// Narrows a provider slot to this width, dropping the upper bits.
    fn from_slot(slot: u32) -> Self;

    /// Zero-extends this value into a provider slot.
    fn into_slot(self) -> u32;
}

impl PortValue for u8 {
    const WIDTH: PortWidth = PortWidth::Byte;
    const ZERO: Self = 0;

    #[inline]
    #[allow(clippy::cast_possible_truncation)]
    fn from_slot(slot: u32) -> Self {
        slot as u8
    }

    #[inline]
    fn into_slot(self) -> u32 {
        u32::from(self)
    }
}

impl PortValue for u16 {
    const WIDTH: PortWidth = PortWidth::Word;
    const ZERO: Self = 0;

    #[inline]
    #[allow(clippy::cast_possible_truncation)]
    fn from_slot(slot: u32) -> Self {
        slot as u16
    }

    #[inline]
    fn into_slot(self) -> u32 {
        u32::from(self)
    }
}

impl PortValue for u32 {
    const WIDTH: PortWidth = PortWidth::DWord;
    const ZERO: Self = 0;

    #[inline]
    fn from_slot(slot: u32) -> Self {
        slot
    }

    #[inline]
    fn into_slot(self) -> u32 {
        self
    }
}

// ---------------------------------------------------------------------------
// Port<T>
// ---------------------------------------------------------------------------

/// A read-write I/O port at a fixed address, generic over the value type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Port<T: PortValue> {
    port: u16,
    _phantom: PhantomData<T>,
}

impl<T: PortValue> Port<T> {
    /// Creates a new port handle. Does **not** perform any I/O.
    #[inline]
    #[must_use]
    pub const fn new(port: u16) -> Self {
        Self {
            port,
            _phantom: PhantomData,
        }
    }

    /// Returns the port number.
    #[inline]
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Reads a value from this port. Yields zero if the provider fails.
    #[inline]
    pub fn read(&self, io: &PortIo) -> T {
        io.read(self.port)
    }

    /// Writes a value to this port.
    #[inline]
    pub fn write(&self, io: &PortIo, value: T) {
        io.write(self.port, value);
    }
}

// ---------------------------------------------------------------------------
// ReadOnlyPort<T>
// ---------------------------------------------------------------------------

/// A read-only I/O port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadOnlyPort<T: PortValue> {
    port: u16,
    _phantom: PhantomData<T>,
}

impl<T: PortValue> ReadOnlyPort<T> {
    /// Creates a new read-only port handle.
    #[inline]
    #[must_use]
    pub const fn new(port: u16) -> Self {
        Self {
            port,
            _phantom: PhantomData,
        }
    }

    /// Returns the port number.
    #[inline]
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Reads a value from this port. Yields zero if the provider fails.
    #[inline]
    pub fn read(&self, io: &PortIo) -> T {
        io.read(self.port)
    }
}

// ---------------------------------------------------------------------------
// WriteOnlyPort<T>
// ---------------------------------------------------------------------------

/// A write-only I/O port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOnlyPort<T: PortValue> {
    port: u16,
    _phantom: PhantomData<T>,
}

impl<T: PortValue> WriteOnlyPort<T> {
    /// Creates a new write-only port handle.
    #[inline]
    #[must_use]
    pub const fn new(port: u16) -> Self {
        Self {
            port,
            _phantom: PhantomData,
        }
    }

    /// Returns the port number.
    #[inline]
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Writes a value to this port.
    #[inline]
    pub fn write(&self, io: &PortIo, value: T) {
        io.write(self.port, value);
    }
}
