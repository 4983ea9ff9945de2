/*!
 * Execution Context
 *
 * Per-context handler tables. A context owns a whole-vector override
 * table and a per-(vector, class) slot table; nothing else in the system
 * touches them, so installation from the owning cpu needs no locking
 * beyond the registry map itself.
 */

use super::frame::{ContextId, ContextKind, TrapFrame};
use super::types::{Esr, Vector, EC_MAX, VECTOR_COUNT};
use crate::core::types::{CpuId, PhysAddr};

/// Class-level handler: invoked with the trap frame and the raw syndrome
pub type ClassHandlerFn = fn(&mut TrapFrame, Esr);

/// IRQ handler: no syndrome to interpret
pub type IrqHandlerFn = fn(&mut TrapFrame);

/// Whole-vector override: fully owns syndrome interpretation for its vector
pub type VectorHandlerFn = fn(Vector, &mut TrapFrame, Esr);

/// One slot of the class table.
///
/// IRQ handlers live in slot 0 of their vector's class table, so an IRQ
/// handler and a class-0 exception handler on the same vector overwrite
/// each other. The tag records which flavor was installed; dispatch
/// matches both arms instead of reinterpreting the function pointer.
#[derive(Clone, Copy)]
pub enum HandlerSlot {
    Class(ClassHandlerFn),
    Irq(IrqHandlerFn),
}

impl std::fmt::Debug for HandlerSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            HandlerSlot::Class(_) => write!(f, "HandlerSlot::Class"),
            HandlerSlot::Irq(_) => write!(f, "HandlerSlot::Irq"),
        }
    }
}

/// Per-cpu, per-privilege execution context record
pub struct ExecutionContext {
    pub id: ContextId,
    /// Page table root this context runs under; user contexts inherit the
    /// owning kernel context's
    pub page_table: Option<PhysAddr>,
    vector_overrides: [Option<VectorHandlerFn>; VECTOR_COUNT],
    class_slots: Box<[[Option<HandlerSlot>; EC_MAX]]>,
}

impl ExecutionContext {
    pub fn new(id: ContextId) -> Self {
        Self {
            id,
            page_table: None,
            vector_overrides: [None; VECTOR_COUNT],
            class_slots: vec![[None; EC_MAX]; VECTOR_COUNT].into_boxed_slice(),
        }
    }

    pub fn cpu(&self) -> CpuId {
        self.id.cpu
    }

    pub fn is_user(&self) -> bool {
        self.id.kind == ContextKind::User
    }

    /// Set or clear the whole-vector override
    pub fn set_vector_override(&mut self, v: Vector, handler: Option<VectorHandlerFn>) {
        self.vector_overrides[v.index()] = handler;
    }

    pub fn vector_override(&self, v: Vector) -> Option<VectorHandlerFn> {
        self.vector_overrides[v.index()]
    }

    /// Set or clear a class-table slot
    pub fn set_class_slot(&mut self, v: Vector, class: u8, slot: Option<HandlerSlot>) {
        self.class_slots[v.index()][class as usize] = slot;
    }

    pub fn class_slot(&self, v: Vector, class: u8) -> Option<HandlerSlot> {
        if (class as usize) < EC_MAX {
            self.class_slots[v.index()][class as usize]
        } else {
            None
        }
    }
}

impl std::fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("id", &self.id)
            .field("page_table", &self.page_table)
            .finish_non_exhaustive()
    }
}
