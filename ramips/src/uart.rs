use bitflags::bitflags;
use port::devcons::Uart;
use port::mmio::{Mmio, Registers};

use crate::address::kseg1addr;
use crate::platform::{Soc, UartLayout};

bitflags! {
    /// Line status register bits that the loader cares about.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct LineStatus: u8 {
        /// Transmit holding register empty.
        const THRE = 0x20;
        /// Transmitter empty: holding and shift register both drained.
        const TEMT = 0x40;
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct FifoControl: u8 {
        const ENABLE = 0x01;
        const CLEAR_RX = 0x02;
        const CLEAR_TX = 0x04;
        const DMA_MODE = 0x08;
    }
}

// The control registers are 32 bits wide with the byte we want in the last
// lane, hence the +3.  Same layout on every supported SoC.
pub const IER: usize = 0x04 + 3;
pub const FCR: usize = 0x08 + 3;
pub const MCR: usize = 0x10 + 3;
pub const MISCC: usize = 0x24 + 3;

/// The ramips flavour of 16550.  Transmit only; no baud setup, the boot ROM
/// has already done that.
pub struct RamipsUart<R> {
    regs: R,
    layout: UartLayout,
}

impl RamipsUart<Mmio> {
    /// The SoC's uart, addressed through KSEG1.
    pub const fn board(soc: Soc) -> Self {
        let layout = soc.layout();
        // The table holds the SoC's fixed uart address, which KSEG1 reaches
        // uncached without any mapping.
        let regs = unsafe { Mmio::new(kseg1addr(layout.base)) };
        RamipsUart { regs, layout }
    }
}

impl<R> RamipsUart<R>
where
    R: Registers,
{
    pub const fn new(regs: R, layout: UartLayout) -> Self {
        RamipsUart { regs, layout }
    }

    pub fn layout(&self) -> &UartLayout {
        &self.layout
    }

    /// Reset both FIFOs, drop the modem lines, mask every interrupt.
    pub fn init(&self) {
        self.regs.write8(FCR, FifoControl::all().bits());
        self.regs.write8(MCR, 0);
        self.regs.write8(MISCC, 0);
        self.regs.write8(IER, 0);
    }

    /// Transmit one byte.  Spins until the transmitter is ready, both before
    /// and after the write; never returns on dead hardware.
    pub fn putb(&self, b: u8) {
        self.wait_ready();
        self.regs.write8(self.layout.thr, b);
        self.wait_ready();
    }

    pub fn ready(&self) -> bool {
        LineStatus::from_bits_retain(self.regs.read8(self.layout.lsr)).intersects(self.layout.ready)
    }

    fn wait_ready(&self) {
        while !self.ready() {
            core::hint::spin_loop();
        }
    }
}

impl<R> Uart for RamipsUart<R>
where
    R: Registers,
{
    fn putb(&self, b: u8) {
        RamipsUart::putb(self, b);
    }
}

#[cfg(test)]
mod tests {
    use std::thread;
    use std::time::Duration;

    use port::regsim::{Access, SimRegisters};

    use super::*;
    use crate::platform::{FAMILY_A, FAMILY_B, FAMILY_C, FAMILY_D};

    fn always_ready(layout: &UartLayout) -> SimRegisters {
        let sim = SimRegisters::new();
        sim.set(layout.lsr, (LineStatus::THRE | LineStatus::TEMT).bits());
        sim
    }

    #[test]
    fn init_writes_control_registers_only() {
        for soc in Soc::ALL {
            let sim = SimRegisters::new();
            let uart = RamipsUart::new(&sim, soc.layout());
            uart.init();
            assert_eq!(
                sim.log(),
                vec![
                    Access::Write(0x0b, 0x0f),
                    Access::Write(0x13, 0x00),
                    Access::Write(0x27, 0x00),
                    Access::Write(0x07, 0x00),
                ],
                "{soc}"
            );
        }
    }

    #[test]
    fn putb_polls_writes_polls() {
        for layout in [FAMILY_A, FAMILY_B, FAMILY_C, FAMILY_D] {
            let sim = always_ready(&layout);
            let uart = RamipsUart::new(&sim, layout);
            uart.putb(b'A');
            assert_eq!(
                sim.log(),
                vec![
                    Access::Read(layout.lsr, 0x60),
                    Access::Write(layout.thr, b'A'),
                    Access::Read(layout.lsr, 0x60),
                ]
            );
        }
    }

    #[test]
    fn putb_waits_for_ready_before_writing() {
        let sim = SimRegisters::new();
        sim.set(FAMILY_B.lsr, LineStatus::THRE.bits());
        sim.script_reads(FAMILY_B.lsr, &[0x00, 0x00, 0x00]);
        let uart = RamipsUart::new(&sim, FAMILY_B);
        uart.putb(0x55);
        assert_eq!(
            sim.log(),
            vec![
                Access::Read(0x14, 0x00),
                Access::Read(0x14, 0x20),
                Access::Write(0x00, 0x55),
                Access::Read(0x14, 0x20),
            ]
        );
        assert_eq!(sim.polls(0x14), 5);
    }

    #[test]
    fn putb_waits_for_ready_after_writing() {
        let sim = SimRegisters::new();
        sim.set(FAMILY_D.lsr, LineStatus::THRE.bits());
        // Ready, then busy while the byte drains, then ready again.
        sim.script_reads(FAMILY_D.lsr, &[0x20, 0x00, 0x00]);
        let uart = RamipsUart::new(&sim, FAMILY_D);
        uart.putb(b'z');
        assert_eq!(
            sim.log(),
            vec![
                Access::Read(0x17, 0x20),
                Access::Write(0x03, b'z'),
                Access::Read(0x17, 0x00),
                Access::Read(0x17, 0x20),
            ]
        );
    }

    #[test]
    fn putb_blocks_until_ready_is_set() {
        let sim = SimRegisters::new();
        let uart = RamipsUart::new(&sim, FAMILY_C);
        let (early_writes, finished_early) = thread::scope(|s| {
            let tx = s.spawn(|| uart.putb(b'!'));
            thread::sleep(Duration::from_millis(50));
            let seen = (sim.writes(), tx.is_finished());

            // Release the spinning thread before asserting anything.
            sim.set(FAMILY_C.lsr, LineStatus::THRE.bits());
            tx.join().unwrap();
            seen
        });
        assert!(early_writes.is_empty());
        assert!(!finished_early);
        assert_eq!(sim.writes(), vec![(FAMILY_C.thr, b'!')]);
    }

    #[test]
    fn family_a_needs_transmitter_empty() {
        let sim = SimRegisters::new();
        let uart = RamipsUart::new(&sim, FAMILY_A);
        sim.set(FAMILY_A.lsr, LineStatus::THRE.bits());
        assert!(!uart.ready());
        sim.set(FAMILY_A.lsr, LineStatus::TEMT.bits());
        assert!(uart.ready());
    }

    #[test]
    fn other_families_need_holding_empty() {
        for layout in [FAMILY_B, FAMILY_C, FAMILY_D] {
            let sim = SimRegisters::new();
            let uart = RamipsUart::new(&sim, layout);
            sim.set(layout.lsr, LineStatus::TEMT.bits());
            assert!(!uart.ready());
            sim.set(layout.lsr, LineStatus::THRE.bits() | 0x01);
            assert!(uart.ready());
        }
    }

    #[test]
    fn bytes_go_out_in_order() {
        let sim = always_ready(&FAMILY_B);
        let uart = RamipsUart::new(&sim, FAMILY_B);
        for b in [0x41, 0x42, 0x0d, 0x0a] {
            uart.putb(b);
        }
        assert_eq!(sim.writes_to(FAMILY_B.thr), vec![0x41, 0x42, 0x0d, 0x0a]);
        assert_eq!(sim.writes().len(), 4);
    }

    #[test]
    fn init_then_putb_is_five_writes() {
        let sim = always_ready(&FAMILY_A);
        let uart = RamipsUart::new(&sim, FAMILY_A);
        uart.init();
        uart.putb(b'A');
        assert_eq!(
            sim.writes(),
            vec![(FCR, 0x0f), (MCR, 0), (MISCC, 0), (IER, 0), (FAMILY_A.thr, b'A')]
        );
    }

    #[test]
    fn board_uart_lives_in_kseg1() {
        let uart = RamipsUart::board(Soc::Mt7621);
        assert_eq!(uart.regs.base() as u32, 0xbe00_0c00);
        let uart = RamipsUart::board(Soc::Rt63365e);
        assert_eq!(uart.regs.base() as u32, 0xbfbf_0000);
        assert_eq!(uart.layout().thr, 0x03);
    }
}
