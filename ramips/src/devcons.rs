// Racy to start.

use port::devcons::set_uart;
use port::mmio::Registers;

use crate::board;
use crate::uart::RamipsUart;

/// Bring up the board uart and make it the console.
pub fn init() {
    install(board::uart());
}

/// Reset `uart` and route `print!`/`println!` to it.
pub fn install<R>(uart: &'static RamipsUart<R>)
where
    R: Registers + 'static,
{
    uart.init();
    // Called from the single boot context before anything prints.
    unsafe { set_uart(uart) };
}
