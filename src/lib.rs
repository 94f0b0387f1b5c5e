//! # LC-3 Machine.
//!
//! `lc3-machine` is the fetch, decode and execute core of an LC-3 emulator:
//! 65536 words of memory, eight general purpose registers, program counter and condition code.
//! Usage starts with loading a program via `emulator::Machine::load_image` or
//! `emulator::Machine::load`, then calling `step` or `run`.
//! Device I/O behind the trap vectors is plugged in through
//! `emulator::trap_routines::TrapHandler`.
//!
//!  # Example
//! ```
//! use lc3_machine::emulator::{Machine, RunOutcome};
//! use lc3_machine::hardware::registers::from_decimal;
//! let mut machine = Machine::new();
//! // .ORIG x3000; ADD R0, R1, #5; ST R0, #1; HALT
//! machine.load_image(&[0x3000, 0x1065, 0x3001, 0xF025]).unwrap();
//! machine.set_register(1, from_decimal(10));
//! assert_eq!(machine.run().unwrap(), RunOutcome::Halted { steps: 3 });
//! assert_eq!(machine.memory()[0x3003], 15);
//! ```
//! # Errors
//! - Loading: image is missing the `.ORIG` header or does not fit into memory
//! - Executing: illegal opcode, effective address outside of the address space,
//!   TRAP without registered service routine

pub mod emulator;
pub mod errors;
pub mod hardware;
pub mod numbers;
