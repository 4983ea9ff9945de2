/*!
 * Trap Types
 *
 * Closed enumerations for the hardware trap vectors and the synchronous
 * exception syndrome classes, plus a wrapper over the raw syndrome
 * register value. Neither enumeration is extensible at runtime.
 */

use serde::{Deserialize, Serialize};

/// Number of architecturally defined trap vectors
pub const VECTOR_COUNT: usize = 32;

/// Number of syndrome class codes (allocated or not)
pub const EC_MAX: usize = 0x40;

/// Shift of the class field inside the syndrome register
const ESR_EC_SHIFT: u32 = 26;

/// Built-in dispatch semantics of a vector.
///
/// The subset of vectors the runtime wires up at context creation gets
/// class-level (sync) or single-slot (IRQ) dispatch; every other vector
/// is fatal unless a whole-vector override is installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VectorSemantics {
    Sync,
    Irq,
    Unhandled,
}

/// Hardware trap entry point category
///
/// Privilege level crossed with synchronous/IRQ/FIQ/error kind and
/// execution width, in vector-table order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(usize)]
pub enum Vector {
    El1tSync = 0,
    El1tIrq = 1,
    El1tFiq = 2,
    El1tError = 3,
    El1hSync = 4,
    El1hIrq = 5,
    El1hFiq = 6,
    El1hError = 7,
    El0Sync64 = 8,
    El0Irq64 = 9,
    El0Fiq64 = 10,
    El0Error64 = 11,
    El0Sync32 = 12,
    El0Irq32 = 13,
    El0Fiq32 = 14,
    El0Error32 = 15,
    El2tSync = 16,
    El2tIrq = 17,
    El2tFiq = 18,
    El2tError = 19,
    El2hSync = 20,
    El2hIrq = 21,
    El2hFiq = 22,
    El2hError = 23,
    El1Sync64 = 24,
    El1Irq64 = 25,
    El1Fiq64 = 26,
    El1Error64 = 27,
    El1Sync32 = 28,
    El1Irq32 = 29,
    El1Fiq32 = 30,
    El1Error32 = 31,
}

const VECTOR_NAMES: [&str; VECTOR_COUNT] = [
    "el1t_sync",
    "el1t_irq",
    "el1t_fiq",
    "el1t_error",
    "el1h_sync",
    "el1h_irq",
    "el1h_fiq",
    "el1h_error",
    "el0_sync_64",
    "el0_irq_64",
    "el0_fiq_64",
    "el0_error_64",
    "el0_sync_32",
    "el0_irq_32",
    "el0_fiq_32",
    "el0_error_32",
    "el2t_sync",
    "el2t_irq",
    "el2t_fiq",
    "el2t_error",
    "el2h_sync",
    "el2h_irq",
    "el2h_fiq",
    "el2h_error",
    "el1_sync_64",
    "el1_irq_64",
    "el1_fiq_64",
    "el1_error_64",
    "el1_sync_32",
    "el1_irq_32",
    "el1_fiq_32",
    "el1_error_32",
];

impl Vector {
    /// The total number of distinct vectors defined.
    pub const COUNT: usize = VECTOR_COUNT;

    /// Converts an index into a `Vector`. Useful for iterating over all vectors.
    pub fn from_index(index: usize) -> Option<Self> {
        use Vector::*;
        const TABLE: [Vector; VECTOR_COUNT] = [
            El1tSync, El1tIrq, El1tFiq, El1tError, El1hSync, El1hIrq, El1hFiq, El1hError,
            El0Sync64, El0Irq64, El0Fiq64, El0Error64, El0Sync32, El0Irq32, El0Fiq32, El0Error32,
            El2tSync, El2tIrq, El2tFiq, El2tError, El2hSync, El2hIrq, El2hFiq, El2hError,
            El1Sync64, El1Irq64, El1Fiq64, El1Error64, El1Sync32, El1Irq32, El1Fiq32, El1Error32,
        ];
        TABLE.get(index).copied()
    }

    /// Vector-table index
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Fixed human-readable name
    pub fn name(&self) -> &'static str {
        VECTOR_NAMES[self.index()]
    }

    /// Built-in semantics: which vectors get default class/IRQ dispatch.
    ///
    /// Matches the set the original environment wires at context creation:
    /// the current-EL-h and lower-EL-64 sync and IRQ entries.
    pub fn semantics(&self) -> VectorSemantics {
        match self {
            Vector::El1hSync | Vector::El0Sync64 | Vector::El2hSync => VectorSemantics::Sync,
            Vector::El1hIrq | Vector::El0Irq64 | Vector::El2hIrq => VectorSemantics::Irq,
            _ => VectorSemantics::Unhandled,
        }
    }
}

impl std::fmt::Display for Vector {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{} ({})", self.index(), self.name())
    }
}

/// Syndrome class of a synchronous exception
///
/// Sparse: only these codes are architecturally allocated. Codes without
/// a variant render as `Unallocated_0xNN` in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ExceptionClass {
    Unknown = 0x00,
    Wfx = 0x01,
    Cp15_32 = 0x03,
    Cp15_64 = 0x04,
    Cp14Mr = 0x05,
    Cp14Ls = 0x06,
    FpAsimd = 0x07,
    Cp10Id = 0x08,
    Cp14_64 = 0x0c,
    Ill = 0x0e,
    Svc32 = 0x11,
    Hvc32 = 0x12,
    Smc32 = 0x13,
    Svc64 = 0x15,
    Hvc64 = 0x16,
    Smc64 = 0x17,
    Sys64 = 0x18,
    ImpDef = 0x1f,
    IabtLow = 0x20,
    IabtCur = 0x21,
    PcAlign = 0x22,
    DabtLow = 0x24,
    DabtCur = 0x25,
    SpAlign = 0x26,
    FpExc32 = 0x28,
    FpExc64 = 0x2c,
    SError = 0x2f,
    BreakptLow = 0x30,
    BreakptCur = 0x31,
    SoftstpLow = 0x32,
    SoftstpCur = 0x33,
    WatchptLow = 0x34,
    WatchptCur = 0x35,
    Bkpt32 = 0x38,
    Vector32 = 0x3a,
    Brk64 = 0x3c,
}

impl ExceptionClass {
    /// Decode an allocated class code; `None` for unallocated codes.
    pub fn from_code(code: u8) -> Option<Self> {
        use ExceptionClass::*;
        Some(match code {
            0x00 => Unknown,
            0x01 => Wfx,
            0x03 => Cp15_32,
            0x04 => Cp15_64,
            0x05 => Cp14Mr,
            0x06 => Cp14Ls,
            0x07 => FpAsimd,
            0x08 => Cp10Id,
            0x0c => Cp14_64,
            0x0e => Ill,
            0x11 => Svc32,
            0x12 => Hvc32,
            0x13 => Smc32,
            0x15 => Svc64,
            0x16 => Hvc64,
            0x17 => Smc64,
            0x18 => Sys64,
            0x1f => ImpDef,
            0x20 => IabtLow,
            0x21 => IabtCur,
            0x22 => PcAlign,
            0x24 => DabtLow,
            0x25 => DabtCur,
            0x26 => SpAlign,
            0x28 => FpExc32,
            0x2c => FpExc64,
            0x2f => SError,
            0x30 => BreakptLow,
            0x31 => BreakptCur,
            0x32 => SoftstpLow,
            0x33 => SoftstpCur,
            0x34 => WatchptLow,
            0x35 => WatchptCur,
            0x38 => Bkpt32,
            0x3a => Vector32,
            0x3c => Brk64,
            _ => return None,
        })
    }

    /// Raw class code
    pub fn code(&self) -> u8 {
        *self as u8
    }

    /// Fixed human-readable name
    pub fn name(&self) -> &'static str {
        use ExceptionClass::*;
        match self {
            Unknown => "unknown",
            Wfx => "wfx",
            Cp15_32 => "cp15_32",
            Cp15_64 => "cp15_64",
            Cp14Mr => "cp14_mr",
            Cp14Ls => "cp14_ls",
            FpAsimd => "fp_asimd",
            Cp10Id => "cp10_id",
            Cp14_64 => "cp14_64",
            Ill => "ill",
            Svc32 => "svc32",
            Hvc32 => "hvc32",
            Smc32 => "smc32",
            Svc64 => "svc64",
            Hvc64 => "hvc64",
            Smc64 => "smc64",
            Sys64 => "sys64",
            ImpDef => "implementation defined",
            IabtLow => "iabt lower EL",
            IabtCur => "iabt current EL",
            PcAlign => "PC alignment",
            DabtLow => "dabt lower EL",
            DabtCur => "dabt current EL",
            SpAlign => "SP alignment",
            FpExc32 => "fp_exc32",
            FpExc64 => "fp_exc64",
            SError => "SError",
            BreakptLow => "breakpt lower EL",
            BreakptCur => "breakpt current EL",
            SoftstpLow => "softstp lower EL",
            SoftstpCur => "softstp current EL",
            WatchptLow => "watchpt lower EL",
            WatchptCur => "watchpt current EL",
            Bkpt32 => "bkpt32",
            Vector32 => "vector32",
            Brk64 => "bkpt64",
        }
    }

    /// True for the classes that latch a fault address
    pub fn reports_far(&self) -> bool {
        use ExceptionClass::*;
        matches!(
            self,
            IabtLow | IabtCur | PcAlign | DabtLow | DabtCur | WatchptLow | WatchptCur
        )
    }
}

/// Display name for any class code, allocated or not
pub fn class_label(code: u8) -> String {
    match ExceptionClass::from_code(code) {
        Some(ec) => ec.name().to_string(),
        None => format!("Unallocated_{:#04x}", code),
    }
}

/// Raw fault syndrome register value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Esr(u32);

impl Esr {
    /// Fault status code signalling a translation fault whose FAR is stale
    const DFSC_FAR_NOT_VALID: u32 = 0x10;
    /// "FAR not Valid" status bit
    const FNV: u32 = 1 << 10;

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Build a syndrome from a class code and syndrome-specific bits
    pub const fn from_parts(class: u8, iss: u32) -> Self {
        Self(((class as u32) << ESR_EC_SHIFT) | (iss & 0x01ff_ffff))
    }

    pub const fn bits(&self) -> u32 {
        self.0
    }

    /// Raw class code field (bits 31:26)
    pub fn class_code(&self) -> u8 {
        (self.0 >> ESR_EC_SHIFT) as u8 & 0x3f
    }

    /// Allocated class, if any
    pub fn class(&self) -> Option<ExceptionClass> {
        ExceptionClass::from_code(self.class_code())
    }

    /// Fault status code field (bits 5:0)
    pub fn dfsc(&self) -> u32 {
        self.0 & 0x3f
    }

    /// "FAR not Valid" status bit
    pub fn fnv(&self) -> bool {
        self.0 & Self::FNV != 0
    }
}

/// Whether the latched fault address is meaningful for this syndrome.
///
/// Only the memory-fault classes report a FAR at all, and even then a
/// translation fault with the FnV bit set leaves it stale.
pub fn far_is_valid(esr: Esr) -> bool {
    match esr.class() {
        Some(ec) if ec.reports_far() => {
            !(esr.dfsc() == Esr::DFSC_FAR_NOT_VALID && esr.fnv())
        }
        _ => false,
    }
}
