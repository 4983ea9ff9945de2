/*!
 * Memory Traits
 * Seam interfaces for the region allocator
 */

use super::types::{MemRegion, RegionResult, RegionStats};
use crate::core::types::Size;

/// Allocation interface
pub trait RegionAllocator {
    /// Carve a new used region out of the trailing free region
    fn allocate(&self, size: Size) -> RegionResult<MemRegion>;
}

/// Read-only inspection interface
pub trait RegionInspect {
    /// Ordered snapshot of all regions, ascending by base address
    fn snapshot(&self) -> Vec<MemRegion>;

    /// Table statistics
    fn stats(&self) -> RegionStats;
}
