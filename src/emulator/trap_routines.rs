//! Calling convention between the TRAP instruction and its service routines.
//!
//! The machine saves the return address in R7 and hands registers and memory to a
//! [`TrapHandler`]. Once the routine is done execution continues at the address in R7
//! or stops if the routine asks to halt.
//! Concrete device routines (console input and output) are provided by the embedding system.
use crate::errors::TrapError;
use crate::hardware::memory::Memory;
use crate::hardware::registers::Registers;
use std::fmt::{Debug, Formatter};

/// What the machine does after a service routine returned.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TrapControl {
    /// Continue at the return address in R7
    Resume,
    /// Stop execution, PC points behind the TRAP instruction
    Halt,
}

/// The standard trap vectors of the LC-3.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, enumn::N)]
pub enum TrapVector {
    /// Read a single character without echo into R0
    Getc = 0x20,
    /// Write the character in R0[7:0]
    Out = 0x21,
    /// Write the null terminated string R0 points to, one character per word
    Puts = 0x22,
    /// Prompt for and read a single character with echo into R0
    In = 0x23,
    /// Write the null terminated string R0 points to, two characters per word
    Putsp = 0x24,
    /// Stop execution
    Halt = 0x25,
}
impl From<TrapVector> for u8 {
    fn from(vector: TrapVector) -> Self {
        vector as Self
    }
}

/// Hook the surrounding system implements to serve TRAP instructions.
pub trait TrapHandler {
    /// Runs the service routine of `vector`.
    ///
    /// R7 holds the return address when called, a routine may change it to continue
    /// somewhere else.
    ///
    /// # Errors
    /// - `TrapError::Unregistered` if there is no routine for `vector`
    /// - `TrapError::Failed` if the routine could not complete
    fn invoke_trap(
        &mut self,
        vector: u8,
        registers: &mut Registers,
        memory: &mut Memory,
    ) -> Result<TrapControl, TrapError>;
}

pub type TrapRoutine =
    Box<dyn FnMut(&mut Registers, &mut Memory) -> Result<TrapControl, TrapError> + Send>;

/// A [`TrapHandler`] dispatching to routines registered per trap vector.
pub struct TrapTable {
    routines: [Option<TrapRoutine>; 256],
}
impl Debug for TrapTable {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.registered_vectors().map(|v| format!("{v:#04X}")))
            .finish()
    }
}
impl Default for TrapTable {
    fn default() -> Self {
        Self::with_halt()
    }
}
impl TrapTable {
    /// Table without any routine, every TRAP fails as unregistered.
    #[must_use]
    pub fn new() -> Self {
        Self {
            routines: std::array::from_fn(|_| None),
        }
    }
    /// Table with the HALT routine registered.
    #[must_use]
    pub fn with_halt() -> Self {
        let mut table = Self::new();
        table.register(TrapVector::Halt, halt);
        table
    }
    /// Registers `routine` for `vector`, replacing a formerly registered one.
    pub fn register<F>(&mut self, vector: impl Into<u8>, routine: F) -> &mut Self
    where
        F: FnMut(&mut Registers, &mut Memory) -> Result<TrapControl, TrapError> + Send + 'static,
    {
        self.routines[usize::from(vector.into())] = Some(Box::new(routine));
        self
    }
    pub fn unregister(&mut self, vector: impl Into<u8>) -> Option<TrapRoutine> {
        self.routines[usize::from(vector.into())].take()
    }
    #[must_use]
    pub fn is_registered(&self, vector: impl Into<u8>) -> bool {
        self.routines[usize::from(vector.into())].is_some()
    }
    pub fn registered_vectors(&self) -> impl Iterator<Item = u8> + '_ {
        (0..=u8::MAX).filter(|v| self.is_registered(*v))
    }
}
impl TrapHandler for TrapTable {
    fn invoke_trap(
        &mut self,
        vector: u8,
        registers: &mut Registers,
        memory: &mut Memory,
    ) -> Result<TrapControl, TrapError> {
        let routine = self.routines[usize::from(vector)]
            .as_mut()
            .ok_or(TrapError::Unregistered)?;
        routine(registers, memory)
    }
}

/// HALT: End program.
///
/// # Errors
/// - never, signature matches [`TrapRoutine`]
pub const fn halt(_regs: &mut Registers, _mem: &mut Memory) -> Result<TrapControl, TrapError> {
    Ok(TrapControl::Halt)
}
