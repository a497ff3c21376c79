//! Minimal hand-written peripheral-access shim for the PS-side management
//! core.
//!
//! This fabric-defined SoC has no vendor SVD -- the BRAM/XADC/PL-control
//! register map (`config::regs`) is wholly bespoke to this board, so there
//! is no `svd2rust`-generated crate to depend on. All this module supplies
//! is the small amount of plumbing `cortex-m-rt`/RTIC need to route
//! software tasks to free interrupt vectors; none of it touches real
//! silicon. Actual peripheral access is by direct volatile read/write at
//! the addresses in `config::regs` (see `bram.rs`, `egress.rs`).

/// Free vectors used purely as RTIC software-task dispatchers. They are
/// never triggered by real hardware; RTIC pends them itself to run
/// software tasks at their assigned priority.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u16)]
pub enum Interrupt {
    SW0 = 0,
    SW1 = 1,
    SW2 = 2,
    SW3 = 3,
}

unsafe impl cortex_m::interrupt::InterruptNumber for Interrupt {
    #[inline(always)]
    fn number(&self) -> u16 {
        *self as u16
    }
}

/// Priority bits implemented by the management core's NVIC.
pub const NVIC_PRIO_BITS: u8 = 4;

#[allow(non_snake_case)]
mod vector_table {
    extern "C" {
        fn SW0();
        fn SW1();
        fn SW2();
        fn SW3();
    }

    #[link_section = ".vector_table.interrupts"]
    #[no_mangle]
    pub static __INTERRUPTS: [unsafe extern "C" fn(); 4] = [SW0, SW1, SW2, SW3];
}
