/*!
 * Core Types
 * Common types used across the runtime
 */

use serde::{Deserialize, Serialize};

/// Physical address type
pub type PhysAddr = u64;

/// Size type for memory extents
pub type Size = u64;

/// CPU identifier as enumerated by the boot collaborator
pub type CpuId = u32;

/// Allocation granularity of the platform
pub const PAGE_SHIFT: u32 = 12;
pub const PAGE_SIZE: Size = 1 << PAGE_SHIFT;

/// Maximum number of CPUs the runtime tracks
pub const NR_CPUS: usize = 8;

/// Fixed capacity of the region table
pub const MAX_REGIONS: usize = 16;

/// Per-context stack size (one region per stack)
pub const STACK_SIZE: Size = 16 * 1024;

/// Round `addr` up to the next page boundary
pub const fn page_align_up(addr: PhysAddr) -> PhysAddr {
    (addr + PAGE_SIZE - 1) & !(PAGE_SIZE - 1)
}

/// Round `addr` down to the enclosing page boundary
pub const fn page_align_down(addr: PhysAddr) -> PhysAddr {
    addr & !(PAGE_SIZE - 1)
}

/// True if `addr` sits on a page boundary
pub const fn is_page_aligned(addr: PhysAddr) -> bool {
    addr & (PAGE_SIZE - 1) == 0
}

/// Exception level the guest is currently running at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExceptionLevel {
    El1,
    El2,
}

impl ExceptionLevel {
    /// Numeric level, as printed in diagnostics
    pub fn number(&self) -> u8 {
        match self {
            ExceptionLevel::El1 => 1,
            ExceptionLevel::El2 => 2,
        }
    }
}

impl std::fmt::Display for ExceptionLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "EL{}", self.number())
    }
}
