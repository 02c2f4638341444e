//! Byte-wide device register access.
//!
//! Drivers talk to a `Registers` rather than to raw pointers so the same
//! driver code runs against real hardware (`Mmio`) and, in host tests,
//! against `regsim::SimRegisters`.

use core::ptr::{read_volatile, write_volatile};

/// A window of 8-bit device registers.  Offsets are in bytes from the start
/// of the window.  Accesses must reach the device in program order.
pub trait Registers {
    fn read8(&self, offset: usize) -> u8;
    fn write8(&self, offset: usize, val: u8);
}

impl<R> Registers for &R
where
    R: Registers + ?Sized,
{
    fn read8(&self, offset: usize) -> u8 {
        (**self).read8(offset)
    }

    fn write8(&self, offset: usize, val: u8) {
        (**self).write8(offset, val)
    }
}

/// Memory mapped registers at a fixed address.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Mmio {
    base: usize,
}

impl Mmio {
    /// # Safety
    ///
    /// `base` must be the start of a device register window that is mapped,
    /// uncached, and large enough for every offset the caller will use.
    pub const unsafe fn new(base: usize) -> Self {
        Mmio { base }
    }

    pub const fn base(&self) -> usize {
        self.base
    }
}

impl Registers for Mmio {
    fn read8(&self, offset: usize) -> u8 {
        unsafe { read_volatile((self.base + offset) as *const u8) }
    }

    fn write8(&self, offset: usize, val: u8) {
        unsafe { write_volatile((self.base + offset) as *mut u8, val) }
    }
}
