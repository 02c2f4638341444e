//! The interface the loader links against.

use core::ffi::c_int;

use port::mmio::{Mmio, Registers};

use crate::devcons;
use crate::platform::SOC;
use crate::uart::RamipsUart;

static UART: RamipsUart<Mmio> = RamipsUart::board(SOC);

/// The uart selected at build time.
pub fn uart() -> &'static RamipsUart<Mmio> {
    &UART
}

/// Put the uart into a known state and make it the console, so `println!`
/// from Rust code in the loader comes out too.  Call once, before
/// `board_putc`.
#[no_mangle]
pub extern "C" fn board_init() {
    devcons::install(&UART);
}

/// Send one character.  Blocks until the uart has taken it.
#[no_mangle]
pub extern "C" fn board_putc(ch: c_int) {
    putc(&UART, ch);
}

// C callers pass an int; only the low byte goes on the wire.
fn putc<R: Registers>(uart: &RamipsUart<R>, ch: c_int) {
    uart.putb(ch as u8);
}
