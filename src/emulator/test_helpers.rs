use crate::emulator::Machine;
use crate::emulator::trap_routines::{TrapControl, TrapHandler};
use crate::errors::TrapError;
use crate::hardware::memory::{Memory, PROGRAM_SECTION_START};
use crate::hardware::registers::Registers;

/// Memory with `program` loaded at the start of the program section.
pub fn create_memory(program: &[u16]) -> Memory {
    let mut mem = Memory::new();
    mem.load(PROGRAM_SECTION_START, program)
        .expect("Error loading program");
    mem
}

/// Machine with `program` loaded at the start of the program section and PC pointing to it.
pub fn create_machine(program: &[u16]) -> Machine {
    let mut image = Vec::with_capacity(program.len() + 1);
    image.push(PROGRAM_SECTION_START);
    image.extend_from_slice(program);
    let mut machine = Machine::new();
    machine.load_image(&image).expect("Error loading program");
    machine
}

/// Trap handler remembering every call, answering with a fixed result.
pub struct RecordingTraps {
    pub calls: Vec<(u8, u16)>,
    pub answer: Result<TrapControl, TrapError>,
}
impl RecordingTraps {
    pub const fn new(answer: Result<TrapControl, TrapError>) -> Self {
        Self {
            calls: Vec::new(),
            answer,
        }
    }
}
impl TrapHandler for RecordingTraps {
    fn invoke_trap(
        &mut self,
        vector: u8,
        registers: &mut Registers,
        _memory: &mut Memory,
    ) -> Result<TrapControl, TrapError> {
        self.calls.push((vector, registers.get(7).as_binary()));
        self.answer
    }
}
