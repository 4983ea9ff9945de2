/*!
 * Vector Dispatcher
 *
 * Per-trap state machine. A trap arrives as `(Vector, TrapFrame, Esr)`;
 * the dispatcher resolves the owning context(s), tries the whole-vector
 * override first, then class-level dispatch for vectors with built-in
 * sync/IRQ semantics, falling back from the user context to the kernel
 * context of the same cpu at each step. A trap nothing claims is fatal.
 *
 * Dispatch runs to completion on the trapping cpu; there is no suspension
 * inside this path.
 */

use super::context::HandlerSlot;
use super::diagnostics::TrapReport;
use super::frame::TrapFrame;
use super::registry::TrapManager;
use super::types::{Esr, Vector, VectorSemantics};
use crate::core::types::ExceptionLevel;
use log::trace;

/// Terminal state of one trap
#[derive(Debug)]
pub enum DispatchOutcome {
    /// A handler ran; execution resumes with the (possibly modified) frame
    Handled,
    /// No handler at any fallback step; the caller must not resume
    Fatal(TrapReport),
}

impl DispatchOutcome {
    pub fn is_handled(&self) -> bool {
        matches!(self, DispatchOutcome::Handled)
    }
}

/// Route one trap to the most specific registered handler.
///
/// Returns instead of terminating so the fatal path stays observable;
/// `deliver` is the aborting surface.
pub fn dispatch(
    mgr: &TrapManager,
    level: ExceptionLevel,
    vector: Vector,
    frame: &mut TrapFrame,
    esr: Esr,
) -> DispatchOutcome {
    let order = mgr.resolution_order(frame.context);
    trace!(
        "trap: vector={} esr={:08x} context={:?}",
        vector,
        esr.bits(),
        frame.context
    );

    // Whole-vector override owns the trap outright, syndrome included.
    for id in &order {
        if let Some(handler) = mgr.vector_override_in(*id, vector) {
            handler(vector, frame, esr);
            return DispatchOutcome::Handled;
        }
    }

    match vector.semantics() {
        VectorSemantics::Sync => {
            let class = esr.class_code();
            for id in &order {
                if let Some(slot) = mgr.class_slot_in(*id, vector, class) {
                    invoke(slot, frame, esr);
                    return DispatchOutcome::Handled;
                }
            }
            DispatchOutcome::Fatal(TrapReport::new(level, vector, frame, esr, true, false))
        }
        VectorSemantics::Irq => {
            // IRQ vectors discriminate nothing: slot 0 is the one handler.
            for id in &order {
                if let Some(slot) = mgr.class_slot_in(*id, vector, 0) {
                    invoke(slot, frame, esr);
                    return DispatchOutcome::Handled;
                }
            }
            DispatchOutcome::Fatal(TrapReport::new(level, vector, frame, esr, false, false))
        }
        VectorSemantics::Unhandled => {
            DispatchOutcome::Fatal(TrapReport::new(level, vector, frame, esr, true, true))
        }
    }
}

/// Invoke a class-table slot through its own signature.
///
/// A slot holds whichever flavor was installed last; both arms are legal
/// finds for either dispatch path because the IRQ handler and the class-0
/// handler share the slot.
fn invoke(slot: HandlerSlot, frame: &mut TrapFrame, esr: Esr) {
    match slot {
        HandlerSlot::Class(f) => f(frame, esr),
        HandlerSlot::Irq(f) => f(frame),
    }
}

/// Hardware-facing entry: dispatch and terminate the process on a fatal
/// trap. Never returns in the fatal case.
pub fn deliver(
    mgr: &TrapManager,
    level: ExceptionLevel,
    vector: Vector,
    frame: &mut TrapFrame,
    esr: Esr,
) {
    if let DispatchOutcome::Fatal(report) = dispatch(mgr, level, vector, frame, esr) {
        report.die();
    }
}
