//! Machine state: memory and register file.
pub mod memory;
pub mod registers;

pub use memory::Memory;
pub use registers::{ConditionFlag, Register, Registers};
