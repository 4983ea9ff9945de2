/*!
 * Region Table
 *
 * Fixed-capacity physical memory partitioner. Memory described by the boot
 * collaborator is split into ordered, non-overlapping regions. As long as
 * not all memory has been handed out, the highest-address region is the
 * single free region representing the remaining tail; allocation shrinks
 * that tail and never reclaims anything.
 *
 * The table is process-wide shared state. All mutation happens under one
 * mutex held only for table bookkeeping; the guard is dropped on every
 * exit path, including allocation failure.
 */

use super::traits::{RegionAllocator, RegionInspect};
use super::types::{MemRegion, RegionError, RegionResult, RegionStats};
use crate::core::types::{is_page_aligned, page_align_up, PhysAddr, Size, MAX_REGIONS, PAGE_SIZE};
use log::{error, info};
use parking_lot::Mutex;

/// Fixed-capacity ordered list of memory regions
#[derive(Debug)]
pub struct RegionTable {
    regions: Mutex<Vec<MemRegion>>,
    total_memory: Size,
}

impl RegionTable {
    /// Initialize the table for one described memory bank.
    ///
    /// Region 0 covers the already-occupied image (`reserved` bytes from
    /// `base`), region 1 the free remainder. The caller treats failure as
    /// boot-fatal; the table itself only reports it.
    pub fn new(base: PhysAddr, total: Size, reserved: Size) -> RegionResult<Self> {
        if !is_page_aligned(reserved) {
            return Err(RegionError::MisalignedReserve {
                reserved,
                granule: PAGE_SIZE,
            });
        }
        if reserved > total {
            return Err(RegionError::ReserveExceedsTotal { reserved, total });
        }

        let mut regions = Vec::with_capacity(MAX_REGIONS);
        regions.push(MemRegion::new(base, reserved, false));
        if reserved < total {
            regions.push(MemRegion::new(base + reserved, total - reserved, true));
        }

        info!(
            "Region table initialized: base=0x{:x}, total=0x{:x}, reserved=0x{:x}",
            base, total, reserved
        );

        Ok(Self {
            regions: Mutex::new(regions),
            total_memory: total,
        })
    }

    /// Carve a used region of at least `size` bytes out of the trailing
    /// free region.
    ///
    /// The leftover tail is rounded up to the allocation granule and kept
    /// as the new trailing free region. When the table is at capacity the
    /// tail cannot be recorded, so it is absorbed into the returned region
    /// instead; the memory is not reclaimable but the table still covers
    /// all described memory.
    pub fn allocate(&self, size: Size) -> RegionResult<MemRegion> {
        let mut regions = self.regions.lock();

        let last = regions
            .last()
            .copied()
            .expect("region table is never empty after init");

        if !last.free || last.size < size {
            let available = if last.free { last.size } else { 0 };
            error!(
                "Region allocation failed: requested=0x{:x}, free=0x{:x}",
                size, available
            );
            return Err(RegionError::OutOfMemory {
                requested: size,
                available,
            });
        }

        let mem_end = last.base + last.size;
        let free_start = page_align_up(last.base + size);
        let idx = regions.len() - 1;

        let allocated = if free_start < mem_end && regions.len() < MAX_REGIONS {
            let mr = MemRegion::new(last.base, free_start - last.base, false);
            regions[idx] = mr;
            regions.push(MemRegion::new(free_start, mem_end - free_start, true));
            mr
        } else {
            // Table full or request consumed the tail: the whole remainder
            // becomes part of the allocated region.
            let mr = MemRegion::new(last.base, mem_end - last.base, false);
            regions[idx] = mr;
            mr
        };

        info!(
            "Allocated region 0x{:x}-0x{:x} (requested 0x{:x})",
            allocated.base,
            allocated.end(),
            size
        );

        Ok(allocated)
    }

    /// Ordered snapshot of the table, ascending by base address
    pub fn snapshot(&self) -> Vec<MemRegion> {
        self.regions.lock().clone()
    }

    /// Text dump of the table, one `<base>-<end> [FREE|USED]` line per region
    pub fn dump(&self) -> String {
        let regions = self.regions.lock();
        let mut out = String::new();
        for r in regions.iter() {
            out.push_str(&format!("{}\n", r));
        }
        out
    }

    /// Log the table dump at info level
    pub fn show(&self) {
        for line in self.dump().lines() {
            info!("{}", line);
        }
    }

    /// Table statistics
    pub fn stats(&self) -> RegionStats {
        let regions = self.regions.lock();
        let free_memory: Size = regions.iter().filter(|r| r.free).map(|r| r.size).sum();
        RegionStats {
            total_memory: self.total_memory,
            used_memory: self.total_memory - free_memory,
            free_memory,
            region_count: regions.len(),
            at_capacity: regions.len() >= MAX_REGIONS,
        }
    }

    /// Total memory described at init
    pub fn total_memory(&self) -> Size {
        self.total_memory
    }
}

impl RegionAllocator for RegionTable {
    fn allocate(&self, size: Size) -> RegionResult<MemRegion> {
        RegionTable::allocate(self, size)
    }
}

impl RegionInspect for RegionTable {
    fn snapshot(&self) -> Vec<MemRegion> {
        RegionTable::snapshot(self)
    }

    fn stats(&self) -> RegionStats {
        RegionTable::stats(self)
    }
}
