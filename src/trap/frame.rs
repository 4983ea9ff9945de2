/*!
 * Trap Frame
 * Register state captured at trap entry, plus the trapping context id
 */

use crate::core::types::CpuId;
use serde::{Deserialize, Serialize};

/// Which of a cpu's two execution contexts a frame belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContextKind {
    Kernel,
    User,
}

/// Identity of an execution context in the registry
///
/// One kernel context per cpu for the process lifetime; at most one user
/// context per cpu, alive for the duration of the user-mode activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContextId {
    pub cpu: CpuId,
    pub kind: ContextKind,
}

impl ContextId {
    pub fn kernel(cpu: CpuId) -> Self {
        Self {
            cpu,
            kind: ContextKind::Kernel,
        }
    }

    pub fn user(cpu: CpuId) -> Self {
        Self {
            cpu,
            kind: ContextKind::User,
        }
    }

    pub fn is_user(&self) -> bool {
        self.kind == ContextKind::User
    }
}

/// General-register snapshot delivered with a trap
///
/// The entry glue fills this from the interrupted instruction stream and
/// stamps it with the id of the context that was executing; handlers may
/// mutate it (typically to step `pc` past a provoking instruction) and
/// the modified state is what execution resumes with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrapFrame {
    /// x0..x30
    pub regs: [u64; 31],
    pub sp: u64,
    pub pc: u64,
    pub pstate: u64,
    /// Fault address latched by the hardware, meaningful only for some
    /// syndrome classes
    pub far: u64,
    /// Context that was executing when the trap was taken
    pub context: ContextId,
}

impl TrapFrame {
    pub fn new(context: ContextId) -> Self {
        Self {
            regs: [0; 31],
            sp: 0,
            pc: 0,
            pstate: 0,
            far: 0,
            context,
        }
    }

    /// Link register (x30)
    pub fn lr(&self) -> u64 {
        self.regs[30]
    }

    /// Register dump in diagnostic format: pc/lr/pstate header, sp, then
    /// x29..x0 two per line
    pub fn dump(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "pc : [<{:016x}>] lr : [<{:016x}>] pstate: {:08x}\n",
            self.pc,
            self.lr(),
            self.pstate
        ));
        out.push_str(&format!("sp : {:016x}\n", self.sp));
        for i in (0..30).rev() {
            out.push_str(&format!("x{:<2}: {:016x} ", i, self.regs[i]));
            if i % 2 == 0 {
                out.push('\n');
            }
        }
        out
    }
}
