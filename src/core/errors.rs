/*!
 * Error Types
 * Centralized re-exports for subsystem errors
 */

// Re-export RegionError from the memory module
pub use crate::memory::RegionError;

// Re-export TrapError from the trap module
pub use crate::trap::TrapError;

/// Common result type for runtime operations
pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Top-level boot/runtime error
#[derive(Debug, Clone, thiserror::Error)]
pub enum RuntimeError {
    #[error("region table error: {0}")]
    Region(#[from] RegionError),

    #[error("trap subsystem error: {0}")]
    Trap(#[from] TrapError),
}
