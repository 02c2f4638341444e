// Single boot context only: nothing here takes a lock.

use core::cell::UnsafeCell;
use core::fmt;

pub trait Uart {
    fn putb(&self, b: u8);
}

impl<T> Uart for &T
where
    T: Uart + ?Sized,
{
    fn putb(&self, b: u8) {
        (**self).putb(b);
    }
}

struct ConsoleCell(UnsafeCell<Option<&'static dyn Uart>>);

// The loader runs on one CPU with interrupts masked.
unsafe impl Sync for ConsoleCell {}

static CONS: ConsoleCell = ConsoleCell(UnsafeCell::new(None));

/// Install the uart that `print!` and `println!` write to.
///
/// # Safety
///
/// Must not race with another `set_uart` or with printing.  In practice this
/// means calling it from the boot path before anything else can run.
pub unsafe fn set_uart(uart: &'static dyn Uart) {
    unsafe { *CONS.0.get() = Some(uart) };
}

fn installed() -> Option<&'static dyn Uart> {
    unsafe { *CONS.0.get() }
}

/// Console writes to whatever uart was installed with `set_uart`.  Output is
/// dropped until one has been.
pub struct Console;

impl Console {
    pub fn putstr(&mut self, s: &str) {
        if let Some(uart) = installed() {
            for b in s.bytes() {
                putb(uart, b);
            }
        }
    }
}

impl fmt::Write for Console {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.putstr(s);
        Ok(())
    }
}

/// EarlyConsole owns its uart and needs no global state, so it can be used
/// before `set_uart`, e.g. from a panic handler.
pub struct EarlyConsole<T>
where
    T: Uart,
{
    uart: T,
}

impl<T> EarlyConsole<T>
where
    T: Uart,
{
    pub fn new(uart: T) -> Self {
        Self { uart }
    }

    pub fn putstr(&mut self, s: &str) {
        for b in s.bytes() {
            putb(&self.uart, b);
        }
    }

    pub fn into_inner(self) -> T {
        self.uart
    }
}

impl<T> fmt::Write for EarlyConsole<T>
where
    T: Uart,
{
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.putstr(s);
        Ok(())
    }
}

pub fn print(args: fmt::Arguments) {
    use fmt::Write;
    let mut cons = Console;
    let _ = cons.write_fmt(args);
}

#[macro_export]
macro_rules! println {
    () => ($crate::print!("\n"));
    ($($arg:tt)*) => ($crate::print!("{}\n", format_args!($($arg)*)));
}

#[macro_export]
macro_rules! print {
    ($($args:tt)*) => {{
        $crate::devcons::print(format_args!($($args)*))
    }};
}

/// Terminals want CR LF; the uart itself never translates.
fn putb(uart: &dyn Uart, b: u8) {
    if b == b'\n' {
        uart.putb(b'\r');
    }
    uart.putb(b);
}
