/*!
 * Memory Types
 * Common types for the region allocator
 */

use crate::core::types::{PhysAddr, Size};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Region operation result
pub type RegionResult<T> = Result<T, RegionError>;

/// Region allocator errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegionError {
    #[error("Out of memory: requested 0x{requested:x} bytes, free 0x{available:x} bytes")]
    OutOfMemory { requested: Size, available: Size },

    #[error("Reserved size 0x{reserved:x} not aligned to allocation granule 0x{granule:x}")]
    MisalignedReserve { reserved: Size, granule: Size },

    #[error("Reserved size 0x{reserved:x} exceeds described memory 0x{total:x}")]
    ReserveExceedsTotal { reserved: Size, total: Size },
}

/// A contiguous, non-overlapping slice of physical memory
///
/// Regions are permanent: once carved out of the trailing free region
/// they are never reclaimed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemRegion {
    pub base: PhysAddr,
    pub size: Size,
    pub free: bool,
}

impl MemRegion {
    pub fn new(base: PhysAddr, size: Size, free: bool) -> Self {
        Self { base, size, free }
    }

    /// Last address covered by the region (inclusive)
    pub fn end(&self) -> PhysAddr {
        self.base + self.size - 1
    }

    /// True if `addr` falls inside this region
    pub fn contains(&self, addr: PhysAddr) -> bool {
        addr >= self.base && addr <= self.end()
    }
}

impl std::fmt::Display for MemRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{:016x}-{:016x} [{}]",
            self.base,
            self.end(),
            if self.free { "FREE" } else { "USED" }
        )
    }
}

/// Region table statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionStats {
    pub total_memory: Size,
    pub used_memory: Size,
    pub free_memory: Size,
    pub region_count: usize,
    pub at_capacity: bool,
}
