/*!
 * Region Table Tests
 * Initialization, allocation, invariants, and the exact dump format
 */

use guestrt::memory::{MemRegion, RegionError, RegionTable};
use pretty_assertions::assert_eq;

const BASE: u64 = 0x4000_0000;
const TOTAL: u64 = 0x1000_0000;
const RESERVED: u64 = 0x10_0000;

fn table() -> RegionTable {
    RegionTable::new(BASE, TOTAL, RESERVED).unwrap()
}

#[test]
fn init_produces_image_and_free_regions() {
    let t = table();
    let regions = t.snapshot();
    assert_eq!(
        regions,
        vec![
            MemRegion::new(BASE, RESERVED, false),
            MemRegion::new(BASE + RESERVED, TOTAL - RESERVED, true),
        ]
    );
}

#[test]
fn concrete_allocation_scenario() {
    // The documented boot layout: 256MB bank at 0x40000000 with a 1MB image.
    let t = table();
    let region = t.allocate(0x2000).unwrap();
    assert_eq!(region.base, 0x4010_0000);
    assert_eq!(region.size, 0x2000);

    let regions = t.snapshot();
    assert_eq!(
        regions,
        vec![
            MemRegion::new(0x4000_0000, 0x10_0000, false),
            MemRegion::new(0x4010_0000, 0x2000, false),
            MemRegion::new(0x4010_2000, 0x0fef_e000, true),
        ]
    );
}

#[test]
fn dump_uses_exact_line_format() {
    let t = table();
    t.allocate(0x2000).unwrap();
    assert_eq!(
        t.dump(),
        "0000000040000000-00000000400fffff [USED]\n\
         0000000040100000-0000000040101fff [USED]\n\
         0000000040102000-000000004fffffff [FREE]\n"
    );
}

#[test]
fn unaligned_request_is_padded_to_granule() {
    let t = table();
    let region = t.allocate(0x1001).unwrap();
    // Table keeps the page-rounded extent so coverage stays exact.
    assert_eq!(region.size, 0x2000);
    let regions = t.snapshot();
    assert_eq!(regions[2].base, region.base + 0x2000);
}

#[test]
fn oom_reports_requested_and_available() {
    let t = table();
    let free = TOTAL - RESERVED;
    let err = t.allocate(free + 1).unwrap_err();
    assert_eq!(
        err,
        RegionError::OutOfMemory {
            requested: free + 1,
            available: free,
        }
    );
    // The failed call must not have disturbed the table.
    assert_eq!(t.snapshot().len(), 2);
    assert!(t.snapshot()[1].free);
}

#[test]
fn exact_fit_consumes_the_free_region() {
    let t = table();
    let free = TOTAL - RESERVED;
    let region = t.allocate(free).unwrap();
    assert_eq!(region.size, free);
    let regions = t.snapshot();
    assert_eq!(regions.len(), 2);
    assert!(regions.iter().all(|r| !r.free));

    let err = t.allocate(0x1000).unwrap_err();
    assert_eq!(
        err,
        RegionError::OutOfMemory {
            requested: 0x1000,
            available: 0,
        }
    );
}

#[test]
fn trailing_free_invariant_holds_across_allocations() {
    let t = table();
    for _ in 0..8 {
        t.allocate(0x3000).unwrap();
        let regions = t.snapshot();
        let free: Vec<_> = regions.iter().filter(|r| r.free).collect();
        assert!(free.len() <= 1);
        if free.len() == 1 {
            assert!(regions.last().unwrap().free);
        }
    }
}

#[test]
fn stats_track_used_and_free() {
    let t = table();
    t.allocate(0x2000).unwrap();
    let stats = t.stats();
    assert_eq!(stats.total_memory, TOTAL);
    assert_eq!(stats.used_memory, RESERVED + 0x2000);
    assert_eq!(stats.free_memory, TOTAL - RESERVED - 0x2000);
    assert_eq!(stats.region_count, 3);
    assert!(!stats.at_capacity);
}
