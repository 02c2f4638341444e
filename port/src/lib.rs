#![allow(clippy::upper_case_acronyms)]
#![cfg_attr(not(any(test)), no_std)]
#![forbid(unsafe_op_in_unsafe_fn)]

pub mod devcons;
pub mod mmio;
#[cfg(any(test, feature = "sim"))]
pub mod regsim;

pub type Result<T> = core::result::Result<T, &'static str>;
