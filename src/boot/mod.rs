/*!
 * Boot Wiring
 *
 * Consumes what the hardware-discovery collaborator hands over (one
 * memory bank, a cpu enumeration, the running exception level) and stands
 * the substrate up: region table first, then one kernel stack region and
 * kernel context per cpu. Test code takes it from there through the
 * handler registry.
 */

use crate::core::errors::{RuntimeError, RuntimeResult};
use crate::core::types::{CpuId, ExceptionLevel, PhysAddr, Size, STACK_SIZE};
use crate::memory::{MemRegion, RegionTable};
use crate::trap::{
    self, DispatchOutcome, Esr, TrapFrame, TrapManager, TrapResult, Vector,
};
use log::info;
use serde::{Deserialize, Serialize};

/// One physical memory bank as described by the boot collaborator
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MemoryBank {
    pub base: PhysAddr,
    pub size: Size,
}

/// Everything the substrate needs from hardware discovery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MachineInfo {
    pub bank: MemoryBank,
    /// Memory already occupied by the loaded test image
    pub reserved: Size,
    pub cpus: Vec<CpuId>,
    pub level: ExceptionLevel,
}

/// The assembled runtime substrate
pub struct Runtime {
    regions: RegionTable,
    traps: TrapManager,
    level: ExceptionLevel,
    cpus: Vec<CpuId>,
}

impl Runtime {
    /// Bring the substrate up from a machine description.
    ///
    /// Fails only on a broken description (misaligned or oversized
    /// reservation, not enough memory for the per-cpu stacks); callers
    /// treat that as boot-fatal.
    pub fn boot(info: MachineInfo) -> RuntimeResult<Self> {
        info!(
            "Booting: bank 0x{:x}+0x{:x}, {} cpu(s), {}",
            info.bank.base,
            info.bank.size,
            info.cpus.len(),
            info.level
        );

        let regions = RegionTable::new(info.bank.base, info.bank.size, info.reserved)
            .map_err(RuntimeError::Region)?;

        let traps = TrapManager::new();
        for &cpu in &info.cpus {
            // Each context sits on its own stack region.
            let stack = regions.allocate(STACK_SIZE).map_err(RuntimeError::Region)?;
            traps.register_kernel(cpu);
            info!(
                "cpu {}: kernel stack region 0x{:x}-0x{:x}",
                cpu,
                stack.base,
                stack.end()
            );
        }

        Ok(Self {
            regions,
            traps,
            level: info.level,
            cpus: info.cpus,
        })
    }

    /// Region allocator surface
    pub fn regions(&self) -> &RegionTable {
        &self.regions
    }

    /// Handler registry surface
    pub fn traps(&self) -> &TrapManager {
        &self.traps
    }

    /// Exception level the guest runs at
    pub fn level(&self) -> ExceptionLevel {
        self.level
    }

    /// Cpus enumerated at boot
    pub fn cpus(&self) -> &[CpuId] {
        &self.cpus
    }

    /// Begin a user-mode activation on `cpu`: a fresh stack region and a
    /// user context nested on it.
    pub fn start_user(&self, cpu: CpuId) -> RuntimeResult<MemRegion> {
        let stack = self
            .regions
            .allocate(STACK_SIZE)
            .map_err(RuntimeError::Region)?;
        self.traps.enter_user(cpu).map_err(RuntimeError::Trap)?;
        info!(
            "cpu {}: user stack region 0x{:x}-0x{:x}",
            cpu,
            stack.base,
            stack.end()
        );
        Ok(stack)
    }

    /// End the user-mode activation on `cpu`. Its stack region stays
    /// carved out; regions are never reclaimed.
    pub fn finish_user(&self, cpu: CpuId) -> TrapResult<()> {
        self.traps.exit_user(cpu)
    }

    /// Route one trap; returns the outcome for inspection
    pub fn dispatch(&self, vector: Vector, frame: &mut TrapFrame, esr: Esr) -> DispatchOutcome {
        trap::dispatch(&self.traps, self.level, vector, frame, esr)
    }

    /// Route one trap; terminates the process if nothing claims it
    pub fn deliver(&self, vector: Vector, frame: &mut TrapFrame, esr: Esr) {
        trap::deliver(&self.traps, self.level, vector, frame, esr)
    }
}
