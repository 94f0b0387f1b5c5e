use std::error::Error;

/// Errors raised while copying words into machine memory.
#[derive(Debug, displaydoc::Display, Copy, Clone, PartialEq, Eq)]
pub enum LoadProgramError {
    /// Block of {length:?} words at {address:#06X} does not fit into the 16-bit address space
    ExceedsAddressSpace { address: u16, length: usize },
    /// Program is missing valid .ORIG header
    MissingOrigHeader,
}
impl Error for LoadProgramError {}

/// Errors raised while executing a single instruction.
///
/// The machine state is left as it was before the failing step,
/// so a driver can inspect it or decide to continue.
#[derive(Debug, displaydoc::Display, Copy, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    /// Illegal opcode in instruction {instruction:#06X} at address {address:#06X}
    IllegalOpcode { address: u16, instruction: u16 },
    /// Effective address {address:#X} is outside of the 16-bit address space
    AddressOutOfRange { address: i32 },
    /// No service routine registered for trap vector {vector:#04X} called at {address:#06X}
    UnhandledTrap { vector: u8, address: u16 },
    /// Service routine for trap vector {vector:#04X} failed
    TrapRoutineFailed { vector: u8 },
}
impl Error for ExecutionError {}

/// Failure reported by a [`TrapHandler`](crate::emulator::trap_routines::TrapHandler).
#[derive(Debug, displaydoc::Display, Copy, Clone, PartialEq, Eq)]
pub enum TrapError {
    /// No service routine registered for the trap vector
    Unregistered,
    /// Service routine failed
    Failed,
}
impl Error for TrapError {}

#[cfg(test)]
mod tests {
    use super::*;
    use googletest::prelude::*;

    #[gtest]
    pub fn test_error_messages() {
        expect_that!(
            ExecutionError::IllegalOpcode {
                address: 0x3000,
                instruction: 0xD000
            }
            .to_string(),
            eq("Illegal opcode in instruction 0xD000 at address 0x3000")
        );
        expect_that!(
            ExecutionError::AddressOutOfRange { address: 0x1_0004 }.to_string(),
            eq("Effective address 0x10004 is outside of the 16-bit address space")
        );
        expect_that!(
            ExecutionError::UnhandledTrap {
                vector: 0x21,
                address: 0x3001
            }
            .to_string(),
            eq("No service routine registered for trap vector 0x21 called at 0x3001")
        );
        expect_that!(
            LoadProgramError::ExceedsAddressSpace {
                address: 0xFFFE,
                length: 3
            }
            .to_string(),
            eq("Block of 3 words at 0xFFFE does not fit into the 16-bit address space")
        );
        expect_that!(
            LoadProgramError::MissingOrigHeader.to_string(),
            eq("Program is missing valid .ORIG header")
        );
    }
}
