/*!
 * Memory Management
 *
 * Physical memory partitioning for the guest. This is deliberately the
 * simplest possible allocator: regions are carved off the trailing free
 * region and never freed. A test that needs real memory management can
 * allocate one region and run its own allocator inside it.
 */

mod table;
mod traits;
mod types;

pub use table::RegionTable;
pub use traits::{RegionAllocator, RegionInspect};
pub use types::{MemRegion, RegionError, RegionResult, RegionStats};
