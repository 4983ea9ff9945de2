/*!
 * Context Registry
 *
 * Arena of execution contexts keyed by `ContextId`, replacing the
 * stack-pointer masking of a raw-memory environment: the trap frame
 * carries an explicit context id and everything resolves through here.
 *
 * The registry also tracks which context is *current* on each cpu, so the
 * handler-install operations act on the calling context the way the
 * original API does. Per-context tables are independent, so installs on
 * different cpus never contend beyond the map shard.
 */

use super::context::{ClassHandlerFn, ExecutionContext, HandlerSlot, IrqHandlerFn, VectorHandlerFn};
use super::frame::{ContextId, ContextKind};
use super::types::{Vector, EC_MAX};
use crate::core::types::{CpuId, PhysAddr};
use ahash::RandomState;
use dashmap::DashMap;
use log::{debug, info};
use thiserror::Error;

/// Trap subsystem result
pub type TrapResult<T> = Result<T, TrapError>;

/// Trap subsystem errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TrapError {
    #[error("No kernel context registered for cpu {0}")]
    KernelContextMissing(CpuId),

    #[error("No user context active on cpu {0}")]
    NoUserContext(CpuId),

    #[error("User context already active on cpu {0}")]
    UserContextActive(CpuId),

    #[error("No context registered for {0:?}")]
    ContextMissing(ContextId),

    #[error("Exception class {0:#04x} out of range")]
    ClassOutOfRange(u8),
}

/// Execution-context registry and handler installation surface
pub struct TrapManager {
    contexts: DashMap<ContextId, ExecutionContext, RandomState>,
    current: DashMap<CpuId, ContextKind, RandomState>,
}

impl TrapManager {
    pub fn new() -> Self {
        Self {
            contexts: DashMap::with_hasher(RandomState::new()),
            current: DashMap::with_hasher(RandomState::new()),
        }
    }

    /// Register (or reset) the kernel context for a cpu and make it current.
    ///
    /// Called once per cpu at boot; the context lives for the process.
    pub fn register_kernel(&self, cpu: CpuId) -> ContextId {
        let id = ContextId::kernel(cpu);
        self.contexts.insert(id, ExecutionContext::new(id));
        self.current.insert(cpu, ContextKind::Kernel);
        info!("Registered kernel context for cpu {}", cpu);
        id
    }

    /// Create the user context for a user-mode activation on `cpu`.
    ///
    /// The context starts with empty handler tables and inherits the
    /// kernel context's page table. It becomes the cpu's current context.
    pub fn enter_user(&self, cpu: CpuId) -> TrapResult<ContextId> {
        let kernel_id = ContextId::kernel(cpu);
        let page_table = self
            .contexts
            .get(&kernel_id)
            .ok_or(TrapError::KernelContextMissing(cpu))?
            .page_table;

        let id = ContextId::user(cpu);
        if self.contexts.contains_key(&id) {
            return Err(TrapError::UserContextActive(cpu));
        }

        let mut ctx = ExecutionContext::new(id);
        ctx.page_table = page_table;
        self.contexts.insert(id, ctx);
        self.current.insert(cpu, ContextKind::User);
        debug!("Entered user context on cpu {}", cpu);
        Ok(id)
    }

    /// Tear down the user context when its activation ends; the kernel
    /// context becomes current again.
    pub fn exit_user(&self, cpu: CpuId) -> TrapResult<()> {
        let id = ContextId::user(cpu);
        if self.contexts.remove(&id).is_none() {
            return Err(TrapError::NoUserContext(cpu));
        }
        self.current.insert(cpu, ContextKind::Kernel);
        debug!("Exited user context on cpu {}", cpu);
        Ok(())
    }

    /// Id of the context currently executing on `cpu`
    pub fn current_context(&self, cpu: CpuId) -> TrapResult<ContextId> {
        let kind = *self
            .current
            .get(&cpu)
            .ok_or(TrapError::KernelContextMissing(cpu))?;
        Ok(ContextId { cpu, kind })
    }

    /// Whether `cpu` is currently in a user-mode activation
    pub fn is_user(&self, cpu: CpuId) -> bool {
        matches!(self.current_context(cpu), Ok(id) if id.is_user())
    }

    /// Record the page table root the kernel context runs under
    pub fn set_page_table(&self, cpu: CpuId, root: PhysAddr) -> TrapResult<()> {
        let id = ContextId::kernel(cpu);
        let mut ctx = self
            .contexts
            .get_mut(&id)
            .ok_or(TrapError::KernelContextMissing(cpu))?;
        ctx.page_table = Some(root);
        Ok(())
    }

    /// Install or clear a whole-vector override on the calling context.
    ///
    /// Re-installing overwrites; `None` uninstalls, returning the vector
    /// to its built-in semantics.
    pub fn install_vector_handler(
        &self,
        cpu: CpuId,
        v: Vector,
        handler: Option<VectorHandlerFn>,
    ) -> TrapResult<()> {
        self.with_current_mut(cpu, |ctx| ctx.set_vector_override(v, handler))
    }

    /// Install or clear a class-specific handler on the calling context.
    ///
    /// Only meaningful for vectors with synchronous semantics. Class 0
    /// shares its slot with the IRQ handler.
    pub fn install_exception_handler(
        &self,
        cpu: CpuId,
        v: Vector,
        class: u8,
        handler: Option<ClassHandlerFn>,
    ) -> TrapResult<()> {
        if class as usize >= EC_MAX {
            return Err(TrapError::ClassOutOfRange(class));
        }
        self.with_current_mut(cpu, |ctx| {
            ctx.set_class_slot(v, class, handler.map(HandlerSlot::Class))
        })
    }

    /// Install or clear the IRQ handler on the calling context.
    ///
    /// The handler occupies the class table's slot 0 for its vector, so it
    /// displaces any class-0 exception handler there (and vice versa).
    pub fn install_irq_handler(
        &self,
        cpu: CpuId,
        v: Vector,
        handler: Option<IrqHandlerFn>,
    ) -> TrapResult<()> {
        self.with_current_mut(cpu, |ctx| {
            ctx.set_class_slot(v, 0, handler.map(HandlerSlot::Irq))
        })
    }

    /// Resolution order for a trap taken in `trapping`: the trapping
    /// context first if it is user-mode, then the kernel context of the
    /// same cpu.
    pub fn resolution_order(&self, trapping: ContextId) -> Vec<ContextId> {
        if trapping.is_user() {
            vec![trapping, ContextId::kernel(trapping.cpu)]
        } else {
            vec![ContextId::kernel(trapping.cpu)]
        }
    }

    /// Vector override installed in `id`, if the context exists.
    ///
    /// The pointer is copied out so no map ref is held while it runs.
    pub fn vector_override_in(&self, id: ContextId, v: Vector) -> Option<VectorHandlerFn> {
        self.contexts.get(&id).and_then(|ctx| ctx.vector_override(v))
    }

    /// Class slot installed in `id`, if the context exists
    pub fn class_slot_in(&self, id: ContextId, v: Vector, class: u8) -> Option<HandlerSlot> {
        self.contexts.get(&id).and_then(|ctx| ctx.class_slot(v, class))
    }

    fn with_current_mut<R>(
        &self,
        cpu: CpuId,
        f: impl FnOnce(&mut ExecutionContext) -> R,
    ) -> TrapResult<R> {
        let id = self.current_context(cpu)?;
        let mut ctx = self
            .contexts
            .get_mut(&id)
            .ok_or(TrapError::ContextMissing(id))?;
        Ok(f(&mut ctx))
    }
}

impl Default for TrapManager {
    fn default() -> Self {
        Self::new()
    }
}
