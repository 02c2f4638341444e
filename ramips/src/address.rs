//! MIPS32 kernel segment arithmetic.
//!
//! KSEG0 and KSEG1 both map the low 512MiB of physical memory without the
//! TLB; KSEG0 is cached, KSEG1 is not.  Device registers go through KSEG1.

pub const KSEG0: u32 = 0x8000_0000;
pub const KSEG1: u32 = 0xa000_0000;

const PHYS_MASK: u32 = 0x1fff_ffff;

/// Strip the segment bits, leaving the physical address.
pub const fn cphysaddr(a: usize) -> u32 {
    (a as u32) & PHYS_MASK
}

pub const fn kseg0addr(a: usize) -> usize {
    sign_extend(cphysaddr(a) | KSEG0)
}

pub const fn kseg1addr(a: usize) -> usize {
    sign_extend(cphysaddr(a) | KSEG1)
}

// On a 64-bit core the 32-bit segments live at the top of the address
// space, so addresses widen as signed values.  Identity on 32-bit.
const fn sign_extend(a: u32) -> usize {
    a as i32 as isize as usize
}
