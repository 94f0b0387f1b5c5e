//! The fetch, decode and execute engine.
pub mod instruction;
pub mod opcodes;
#[cfg(test)]
mod test_helpers;
pub mod trap_routines;

use crate::emulator::instruction::{
    BaseOffsetOp, DecodedInstruction, Instruction, OperateOp, PcRelativeOp,
};
use crate::emulator::trap_routines::{TrapControl, TrapHandler, TrapTable, TrapVector};
use crate::errors::{ExecutionError, LoadProgramError, TrapError};
use crate::hardware::memory::Memory;
use crate::hardware::registers::{ConditionFlag, Register, Registers, from_binary};
use std::fmt::{Debug, Formatter};

/// Result of a single executed instruction.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Continue,
    /// A trap service routine stopped execution
    Halted,
}

/// Result of a run, `steps` counts the executed instructions.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Halted { steps: usize },
    LimitReached { steps: usize },
}

/// The public facing machine used to run LC-3 programs.
///
/// Owns memory, registers and the trap handler serving TRAP instructions.
/// Every step is atomic, if it fails the machine state stays as it was before.
pub struct Machine<T: TrapHandler = TrapTable> {
    registers: Registers,
    memory: Memory,
    traps: T,
}
impl<T: TrapHandler> Debug for Machine<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Registers: {:?}, {:?}", self.registers, self.memory)
    }
}
impl Default for Machine {
    fn default() -> Self {
        Self::new()
    }
}
impl Machine {
    /// Zeroed machine which only knows the HALT trap routine.
    #[must_use]
    pub fn new() -> Self {
        Self::with_trap_handler(TrapTable::with_halt())
    }
}
impl<T: TrapHandler> Machine<T> {
    /// Zeroed machine serving TRAP instructions with `traps`.
    pub fn with_trap_handler(traps: T) -> Self {
        Self {
            registers: Registers::new(),
            memory: Memory::new(),
            traps,
        }
    }

    /// Zeroes memory, registers and PC, the condition code is `Zero` afterwards.
    /// The trap handler is kept.
    pub fn reset(&mut self) {
        self.registers = Registers::new();
        self.memory.reset();
    }

    /// Copies `words` into memory starting at `address`, PC is not changed.
    ///
    /// # Errors
    /// - Block does not fit into the address space
    pub fn load(&mut self, address: u16, words: &[u16]) -> Result<(), LoadProgramError> {
        self.memory.load(address, words)?;
        tracing::debug!(address, words = words.len(), "loaded block");
        Ok(())
    }

    /// Loads an object image, the first word being the origin address (`.ORIG`)
    /// the rest is loaded to. PC is set to the origin.
    ///
    /// # Errors
    /// - Image is missing the `.ORIG` header
    /// - Program does not fit into the address space
    pub fn load_image(&mut self, image: &[u16]) -> Result<(), LoadProgramError> {
        let (origin, program) = image
            .split_first()
            .ok_or(LoadProgramError::MissingOrigHeader)?;
        self.load(*origin, program)?;
        self.registers.set_pc(*origin);
        Ok(())
    }

    /// Fetches the instruction PC points to and executes it.
    ///
    /// # Errors
    /// See [`ExecutionError`]; the machine state is unchanged then.
    pub fn step(&mut self) -> Result<StepOutcome, ExecutionError> {
        let address = self.registers.pc();
        let word = self.memory[address];
        self.execute(word)
    }

    /// Executes `word` as if it was fetched from the address PC points to:
    /// PC is incremented before the instruction is decoded.
    ///
    /// # Errors
    /// See [`ExecutionError`]; the machine state is unchanged then.
    pub fn execute(&mut self, word: u16) -> Result<StepOutcome, ExecutionError> {
        let address = self.registers.pc();
        let result = self.execute_at(address, word);
        if let Err(error) = result {
            self.registers.set_pc(address);
            tracing::warn!(address, word, %error, "instruction failed");
        }
        result
    }

    fn execute_at(&mut self, address: u16, word: u16) -> Result<StepOutcome, ExecutionError> {
        let next_pc = opcodes::offset_address(address, 1)?;
        let decoded = Instruction::from(word)
            .decode()
            .ok_or(ExecutionError::IllegalOpcode {
                address,
                instruction: word,
            })?;
        tracing::trace!(address, word, ?decoded, "execute");
        self.registers.set_pc(next_pc);
        self.execute_decoded(decoded, address)
    }

    fn execute_decoded(
        &mut self,
        decoded: DecodedInstruction,
        address: u16,
    ) -> Result<StepOutcome, ExecutionError> {
        let r = &mut self.registers;
        let mem = &mut self.memory;
        match decoded {
            DecodedInstruction::Operate { op, dr, sr1 } => match op {
                OperateOp::Add(operand) => opcodes::add(dr, sr1, operand, r),
                OperateOp::And(operand) => opcodes::and(dr, sr1, operand, r),
                OperateOp::Not => opcodes::not(dr, sr1, r),
            },
            DecodedInstruction::PcRelative { op, reg, pc_offset } => match op {
                PcRelativeOp::Ld => opcodes::ld(reg, pc_offset, r, mem)?,
                PcRelativeOp::St => opcodes::st(reg, pc_offset, r, mem)?,
                PcRelativeOp::Ldi => opcodes::ldi(reg, pc_offset, r, mem)?,
                PcRelativeOp::Sti => opcodes::sti(reg, pc_offset, r, mem)?,
                PcRelativeOp::Lea => opcodes::lea(reg, pc_offset, r)?,
            },
            DecodedInstruction::BaseOffset {
                op,
                reg,
                base_r,
                offset,
            } => match op {
                BaseOffsetOp::Ldr => opcodes::ldr(reg, base_r, offset, r, mem)?,
                BaseOffsetOp::Str => opcodes::str(reg, base_r, offset, r, mem)?,
                BaseOffsetOp::Jmp => opcodes::jmp_or_ret(base_r, r),
            },
            DecodedInstruction::Branch { n, z, p, pc_offset } => {
                opcodes::br(n, z, p, pc_offset, r)?;
            }
            DecodedInstruction::Subroutine(target) => opcodes::jsr(target, r)?,
            DecodedInstruction::Trap { vector } => return self.trap(vector, address),
        }
        Ok(StepOutcome::Continue)
    }

    /// TRAP: saves the return address in R7 and calls the service routine of `vector`.
    /// ```text
    ///  15__12__11__8___7_______0_
    /// | 1111 | 0000 | trapvect8 |
    ///  -------------------------
    /// ```
    /// Registers and memory writes of a failing routine are rolled back.
    fn trap(&mut self, vector: u8, address: u16) -> Result<StepOutcome, ExecutionError> {
        let saved_registers = self.registers.clone();
        self.registers.set(7, from_binary(self.registers.pc()));
        tracing::debug!(vector, known = ?TrapVector::n(vector), address, "invoke trap");
        self.memory.open_journal();
        match self
            .traps
            .invoke_trap(vector, &mut self.registers, &mut self.memory)
        {
            Ok(control) => {
                self.memory.commit_journal();
                self.registers.set_pc(self.registers.get(7).as_binary());
                Ok(match control {
                    TrapControl::Resume => StepOutcome::Continue,
                    TrapControl::Halt => StepOutcome::Halted,
                })
            }
            Err(error) => {
                self.memory.roll_back_journal();
                self.registers = saved_registers;
                Err(match error {
                    TrapError::Unregistered => ExecutionError::UnhandledTrap { vector, address },
                    TrapError::Failed => ExecutionError::TrapRoutineFailed { vector },
                })
            }
        }
    }

    /// Steps until a trap routine halts.
    ///
    /// # Errors
    /// First failing instruction, PC points to it.
    pub fn run(&mut self) -> Result<RunOutcome, ExecutionError> {
        self.run_up_to(None)
    }

    /// Steps until a trap routine halts or `max_instructions` were executed.
    ///
    /// # Errors
    /// First failing instruction, PC points to it.
    pub fn run_with_limit(
        &mut self,
        max_instructions: usize,
    ) -> Result<RunOutcome, ExecutionError> {
        self.run_up_to(Some(max_instructions))
    }

    fn run_up_to(&mut self, limit: Option<usize>) -> Result<RunOutcome, ExecutionError> {
        let mut steps = 0;
        loop {
            if limit.is_some_and(|max| steps >= max) {
                tracing::debug!(steps, "instruction limit reached");
                return Ok(RunOutcome::LimitReached { steps });
            }
            let outcome = self.step()?;
            steps += 1;
            if outcome == StepOutcome::Halted {
                tracing::debug!(steps, pc = self.registers.pc(), "halted");
                return Ok(RunOutcome::Halted { steps });
            }
        }
    }

    #[must_use]
    pub const fn registers(&self) -> &Registers {
        &self.registers
    }
    /// # Panics
    /// - `r` is not in `0..=7`
    #[must_use]
    pub fn register(&self, r: u8) -> Register {
        self.registers.get(r)
    }
    /// # Panics
    /// - `r` is not in `0..=7`
    pub fn set_register(&mut self, r: u8, value: Register) {
        self.registers.set(r, value);
    }
    #[must_use]
    pub const fn pc(&self) -> u16 {
        self.registers.pc()
    }
    pub const fn set_pc(&mut self, pc: u16) {
        self.registers.set_pc(pc);
    }
    #[must_use]
    pub const fn condition(&self) -> ConditionFlag {
        self.registers.get_conditional_register()
    }
    #[must_use]
    pub const fn memory(&self) -> &Memory {
        &self.memory
    }
    pub const fn memory_mut(&mut self) -> &mut Memory {
        &mut self.memory
    }
    #[must_use]
    pub const fn trap_handler(&self) -> &T {
        &self.traps
    }
    pub const fn trap_handler_mut(&mut self) -> &mut T {
        &mut self.traps
    }
}
