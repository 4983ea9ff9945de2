/*!
 * Core Module
 * Shared types and constants
 */

pub mod errors;
pub mod types;

pub use errors::*;
pub use types::*;
