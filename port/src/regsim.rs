//! A simulated register file for exercising drivers on the host.
//!
//! Every access is recorded in order.  A run of identical reads (a driver
//! spinning on a status register) is recorded once, with the number of polls
//! kept separately, so the log stays readable however long a driver spins.

extern crate std;

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};
use std::vec::Vec;

use crate::mmio::Registers;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    Read(usize, u8),
    Write(usize, u8),
}

#[derive(Default)]
struct State {
    regs: HashMap<usize, u8>,
    scripted: HashMap<usize, VecDeque<u8>>,
    log: Vec<Access>,
    polls: HashMap<usize, usize>,
}

/// Registers read back whatever was last written or `set`, zero otherwise.
/// Reads of an offset with a script pending return the scripted values first.
#[derive(Default)]
pub struct SimRegisters {
    state: Mutex<State>,
}

impl SimRegisters {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        // A panicking test thread shouldn't hide the log from the others.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Set a register as the device would.  Not logged.
    pub fn set(&self, offset: usize, val: u8) {
        self.state().regs.insert(offset, val);
    }

    /// Queue values for successive reads of `offset`.  Once drained, reads
    /// fall back to the register's current value.
    pub fn script_reads(&self, offset: usize, vals: &[u8]) {
        self.state().scripted.entry(offset).or_default().extend(vals.iter().copied());
    }

    pub fn log(&self) -> Vec<Access> {
        self.state().log.clone()
    }

    pub fn writes(&self) -> Vec<(usize, u8)> {
        self.state()
            .log
            .iter()
            .filter_map(|a| match *a {
                Access::Write(offset, val) => Some((offset, val)),
                Access::Read(..) => None,
            })
            .collect()
    }

    pub fn writes_to(&self, offset: usize) -> Vec<u8> {
        self.writes().into_iter().filter(|(o, _)| *o == offset).map(|(_, v)| v).collect()
    }

    /// Total reads of `offset`, including the ones folded in the log.
    pub fn polls(&self, offset: usize) -> usize {
        self.state().polls.get(&offset).copied().unwrap_or(0)
    }

    pub fn clear_log(&self) {
        let mut state = self.state();
        state.log.clear();
        state.polls.clear();
    }
}

impl Registers for SimRegisters {
    fn read8(&self, offset: usize) -> u8 {
        let mut state = self.state();
        let scripted = state.scripted.get_mut(&offset).and_then(|q| q.pop_front());
        let val = scripted.unwrap_or_else(|| state.regs.get(&offset).copied().unwrap_or(0));
        *state.polls.entry(offset).or_default() += 1;
        let access = Access::Read(offset, val);
        if state.log.last() != Some(&access) {
            state.log.push(access);
        }
        val
    }

    fn write8(&self, offset: usize, val: u8) {
        let mut state = self.state();
        state.regs.insert(offset, val);
        state.log.push(Access::Write(offset, val));
    }
}
