use core::fmt::{self, Write};

use port::devcons::{EarlyConsole, Uart};

/// Write a panic report straight to `uart`.  Needs no installed console, so
/// it works however far boot got.
#[cfg_attr(not(target_os = "none"), allow(dead_code))]
pub(crate) fn report<U: Uart>(uart: U, location: Option<(&str, u32)>, message: fmt::Arguments) {
    let mut cons = EarlyConsole::new(uart);
    let _ = match location {
        Some((file, line)) => writeln!(cons, "Panic: line {line}, file {file}: {message}"),
        None => writeln!(cons, "Panic: no information available."),
    };
}

#[cfg(all(not(test), target_os = "none"))]
#[panic_handler]
fn panic(info: &core::panic::PanicInfo) -> ! {
    let location = info.location().map(|p| (p.file(), p.line()));
    report(crate::board::uart(), location, format_args!("{}", info.message()));
    halt();
}

#[cfg(all(not(test), target_os = "none"))]
fn halt() -> ! {
    loop {
        core::hint::spin_loop();
    }
}
