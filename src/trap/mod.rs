/*!
 * Trap Subsystem
 *
 * Vector and syndrome enumerations, per-context handler tables, the
 * registry that resolves a trapping context, and the dispatcher that
 * routes a trap to the most specific registered handler or dies trying.
 *
 * Every exception a test deliberately provokes must have a handler
 * installed (and uninstalled afterwards) scoped to the provoking
 * sequence; there is no generic recovery.
 */

mod context;
mod diagnostics;
mod dispatch;
mod frame;
mod registry;
mod types;

pub use context::{
    ClassHandlerFn, ExecutionContext, HandlerSlot, IrqHandlerFn, VectorHandlerFn,
};
pub use diagnostics::TrapReport;
pub use dispatch::{deliver, dispatch, DispatchOutcome};
pub use frame::{ContextId, ContextKind, TrapFrame};
pub use registry::{TrapError, TrapManager, TrapResult};
pub use types::{
    class_label, far_is_valid, Esr, ExceptionClass, Vector, VectorSemantics, EC_MAX, VECTOR_COUNT,
};
