/*!
 * Diagnostics Tests
 * Fault-address validity and the fatal report text
 */

use guestrt::core::types::ExceptionLevel;
use guestrt::trap::{
    dispatch, far_is_valid, ContextId, DispatchOutcome, Esr, TrapFrame, TrapManager, Vector,
};
use pretty_assertions::assert_eq;

const EC_WFX: u8 = 0x01;
const EC_HVC64: u8 = 0x16;
const EC_IABT_CUR: u8 = 0x21;
const EC_DABT_CUR: u8 = 0x25;

// DFSC value for the translation fault whose FAR may be stale
const DFSC_FNV_FAULT: u32 = 0x10;
const FNV_BIT: u32 = 1 << 10;

#[test]
fn far_invalid_for_non_memory_classes() {
    assert!(!far_is_valid(Esr::from_parts(EC_WFX, 0)));
    assert!(!far_is_valid(Esr::from_parts(EC_HVC64, 0)));
    // Unallocated class codes never report a fault address.
    assert!(!far_is_valid(Esr::from_parts(0x02, 0)));
}

#[test]
fn far_valid_for_memory_fault_classes() {
    assert!(far_is_valid(Esr::from_parts(EC_DABT_CUR, 0x04)));
    assert!(far_is_valid(Esr::from_parts(EC_IABT_CUR, 0x07)));
}

#[test]
fn fnv_translation_fault_invalidates_far() {
    // Memory-fault class, but the FAR-not-valid status bit is set.
    assert!(!far_is_valid(Esr::from_parts(
        EC_DABT_CUR,
        DFSC_FNV_FAULT | FNV_BIT
    )));
    // Same fault status without FnV: the address is good.
    assert!(far_is_valid(Esr::from_parts(EC_DABT_CUR, DFSC_FNV_FAULT)));
    // FnV set on a different fault status is ignored.
    assert!(far_is_valid(Esr::from_parts(EC_DABT_CUR, 0x04 | FNV_BIT)));
}

fn fatal_report(esr: Esr) -> guestrt::TrapReport {
    let mgr = TrapManager::new();
    mgr.register_kernel(0);
    let mut frame = TrapFrame::new(ContextId::kernel(0));
    frame.far = 0x0000_ffff_8000_0040;
    frame.pc = 0x4010_0000;
    match dispatch(&mgr, ExceptionLevel::El1, Vector::El1hSync, &mut frame, esr) {
        DispatchOutcome::Fatal(report) => report,
        DispatchOutcome::Handled => panic!("expected the fatal path"),
    }
}

#[test]
fn report_carries_far_and_validity() {
    let report = fatal_report(Esr::from_parts(EC_DABT_CUR, 0x04));
    assert_eq!(report.far, 0x0000_ffff_8000_0040);
    assert!(report.far_valid);
    assert!(report
        .render()
        .contains("FAR_ELx: 0000ffff80000040 (valid)"));
}

#[test]
fn report_tags_stale_far() {
    let report = fatal_report(Esr::from_parts(EC_DABT_CUR, DFSC_FNV_FAULT | FNV_BIT));
    assert!(!report.far_valid);
    assert!(report
        .render()
        .contains("FAR_ELx: 0000ffff80000040 (not valid)"));
}

#[test]
fn report_text_is_ordered_for_the_console() {
    let report = fatal_report(Esr::from_parts(EC_DABT_CUR, 0x04));
    let text = report.render();
    let pos = |needle: &str| text.find(needle).unwrap_or_else(|| panic!("missing {needle}"));

    // Privilege level, vector, class, FAR, register dump -- in that order.
    assert!(pos("CurrentEL: EL1") < pos("Vector: 4 (el1h_sync)"));
    assert!(pos("Vector: 4") < pos("ec=0x25 (dabt current EL)"));
    assert!(pos("ec=0x25") < pos("FAR_ELx:"));
    assert!(pos("FAR_ELx:") < pos("Exception frame registers:"));
    assert!(pos("Exception frame registers:") < pos("pc : [<0000000040100000>]"));
}

#[test]
fn report_esr_line_format() {
    let report = fatal_report(Esr::from_parts(EC_HVC64, 0));
    let text = report.render();
    let esr_bits = (EC_HVC64 as u32) << 26;
    assert!(text.contains(&format!(
        "ESR_ELx:         {:08x}, ec=0x16 (hvc64)",
        esr_bits
    )));
}
