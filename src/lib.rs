/*!
 * Guest Runtime Substrate
 *
 * Minimal runtime for a bare-metal guest test environment, modeled in
 * userspace: a fixed-capacity physical region allocator and a
 * per-execution-context trap dispatch engine. Architecture test code
 * consumes the allocator and the handler registry; trap delivery arrives
 * as an explicit `(Vector, TrapFrame, Esr)` call.
 */

pub mod boot;
pub mod core;
pub mod memory;
pub mod trap;

// Re-exports
pub use boot::{MachineInfo, MemoryBank, Runtime};
pub use self::core::types::{CpuId, ExceptionLevel, PhysAddr, Size};
pub use memory::{MemRegion, RegionError, RegionTable};
pub use trap::{
    ContextId, DispatchOutcome, Esr, ExceptionClass, TrapError, TrapFrame, TrapManager,
    TrapReport, Vector,
};
