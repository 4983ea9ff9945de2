/*!
 * Context Registry Tests
 * Runtime-level context lifecycle and install-target semantics
 */

use guestrt::core::types::STACK_SIZE;
use guestrt::{
    ContextId, ExceptionLevel, MachineInfo, MemoryBank, Runtime, TrapError, TrapManager, Vector,
};
use pretty_assertions::assert_eq;

fn machine(cpus: Vec<u32>) -> MachineInfo {
    MachineInfo {
        bank: MemoryBank {
            base: 0x4000_0000,
            size: 0x1000_0000,
        },
        reserved: 0x10_0000,
        cpus,
        level: ExceptionLevel::El1,
    }
}

#[test]
fn boot_registers_a_kernel_context_per_cpu() {
    let rt = Runtime::boot(machine(vec![0, 1, 2])).unwrap();
    for cpu in [0, 1, 2] {
        assert_eq!(rt.traps().current_context(cpu).unwrap(), ContextId::kernel(cpu));
    }
    assert_eq!(
        rt.traps().current_context(7),
        Err(TrapError::KernelContextMissing(7))
    );
}

#[test]
fn user_activation_owns_a_fresh_stack_region() {
    let rt = Runtime::boot(machine(vec![0])).unwrap();
    let used_before = rt.regions().stats().used_memory;

    let stack = rt.start_user(0).unwrap();
    assert!(stack.size >= STACK_SIZE);
    assert!(!stack.free);
    assert_eq!(rt.traps().current_context(0).unwrap(), ContextId::user(0));

    rt.finish_user(0).unwrap();
    assert_eq!(rt.traps().current_context(0).unwrap(), ContextId::kernel(0));

    // The user stack region is carved out for good.
    assert!(rt.regions().stats().used_memory > used_before);
}

#[test]
fn finishing_without_activation_is_an_error() {
    let rt = Runtime::boot(machine(vec![0])).unwrap();
    assert_eq!(rt.finish_user(0), Err(TrapError::NoUserContext(0)));
}

#[test]
fn user_context_tables_die_with_the_activation() {
    fn handler(_v: Vector, _f: &mut guestrt::TrapFrame, _e: guestrt::Esr) {}

    let rt = Runtime::boot(machine(vec![0])).unwrap();
    rt.start_user(0).unwrap();
    rt.traps()
        .install_vector_handler(0, Vector::El0Sync64, Some(handler))
        .unwrap();
    rt.finish_user(0).unwrap();

    // A later activation starts with empty tables.
    rt.start_user(0).unwrap();
    assert!(rt
        .traps()
        .vector_override_in(ContextId::user(0), Vector::El0Sync64)
        .is_none());
}

#[test]
fn installs_on_different_cpus_are_independent() {
    fn handler(_f: &mut guestrt::TrapFrame, _e: guestrt::Esr) {}

    let mgr = TrapManager::new();
    mgr.register_kernel(0);
    mgr.register_kernel(1);

    mgr.install_exception_handler(0, Vector::El1hSync, 0x15, Some(handler))
        .unwrap();

    assert!(matches!(
        mgr.class_slot_in(ContextId::kernel(0), Vector::El1hSync, 0x15),
        Some(_)
    ));
    assert!(mgr
        .class_slot_in(ContextId::kernel(1), Vector::El1hSync, 0x15)
        .is_none());
}

#[test]
fn class_code_out_of_range_is_rejected() {
    fn handler(_f: &mut guestrt::TrapFrame, _e: guestrt::Esr) {}

    let mgr = TrapManager::new();
    mgr.register_kernel(0);
    assert_eq!(
        mgr.install_exception_handler(0, Vector::El1hSync, 0x40, Some(handler)),
        Err(TrapError::ClassOutOfRange(0x40))
    );
}

#[test]
fn reinstall_overwrites_idempotently() {
    fn first(_f: &mut guestrt::TrapFrame, _e: guestrt::Esr) {}
    fn second(_f: &mut guestrt::TrapFrame, _e: guestrt::Esr) {}

    let mgr = TrapManager::new();
    mgr.register_kernel(0);
    mgr.install_exception_handler(0, Vector::El1hSync, 0x15, Some(first))
        .unwrap();
    mgr.install_exception_handler(0, Vector::El1hSync, 0x15, Some(second))
        .unwrap();
    // Still exactly one slot occupied; the later install replaced the first.
    assert!(mgr
        .class_slot_in(ContextId::kernel(0), Vector::El1hSync, 0x15)
        .is_some());
    mgr.install_exception_handler(0, Vector::El1hSync, 0x15, None)
        .unwrap();
    assert!(mgr
        .class_slot_in(ContextId::kernel(0), Vector::El1hSync, 0x15)
        .is_none());
}
