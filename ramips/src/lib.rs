//! Early serial output for the ramips LZMA loader.
//!
//! The loader links against `board_init` and `board_putc`; everything else
//! here exists to make those two calls correct for the SoC chosen at build
//! time.

#![cfg_attr(all(not(test), target_os = "none"), no_std)]
#![allow(clippy::upper_case_acronyms)]
#![forbid(unsafe_op_in_unsafe_fn)]

pub mod address;
pub mod board;
pub mod devcons;
pub mod platform;
mod runtime;
pub mod uart;
