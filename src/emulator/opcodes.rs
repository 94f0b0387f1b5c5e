//! Implemented operations for the LC-3.
//!
//! Every handler runs after the fetch incremented PC, so PC-relative addresses are
//! relative to the instruction following the executed one.
//! Handlers compute all effective addresses before writing anything, a failing
//! handler leaves registers and memory untouched.
use crate::emulator::instruction::{Operand, SubroutineTarget};
use crate::errors::ExecutionError;
use crate::hardware::memory::Memory;
use crate::hardware::registers::{Register, Registers, from_binary, from_decimal};

/// Adds a signed offset to an address, failing outside of the 16-bit address space.
///
/// # Errors
/// - `ExecutionError::AddressOutOfRange` if the sum is negative or greater than `0xFFFF`
pub fn offset_address(base: u16, offset: i16) -> Result<u16, ExecutionError> {
    let address = i32::from(base) + i32::from(offset);
    u16::try_from(address).map_err(|_| ExecutionError::AddressOutOfRange { address })
}

fn operand_value(operand: Operand, r: &Registers) -> Register {
    match operand {
        Operand::Register(sr2) => r.get(sr2),
        Operand::Immediate(imm5) => from_decimal(imm5),
    }
}

/// ADD: Mathematical addition in 2 variants
/// - DR is set with result of SR 1 + SR 2
/// ```text
///  15__12__11_9__8_6___5___4_3__2_0_
/// | 0001 |  DR | SR1 | 0 | 00 | SR2 |
///  ---------------------------------
/// ```
/// - DR is set with result of SR 1 + sign extended immediate
/// ```text
///  15__12__11_9__8_6___5___4___0_
/// | 0001 |  DR | SR1 | 1 |  IMM5 |
///  ------------------------------
/// ```
/// The sum wraps around modulo 2^16.
pub fn add(dr: u8, sr1: u8, operand: Operand, r: &mut Registers) {
    let sum = r
        .get(sr1)
        .as_binary()
        .wrapping_add(operand_value(operand, r).as_binary());
    r.set_with_condition(dr, from_binary(sum));
}
/// AND: bit-wise AND in 2 variants
/// - DR is set with result of SR 1 AND SR 2
/// ```text
///  15__12__11_9__8_6___5___4_3__2_0_
/// | 0101 |  DR | SR1 | 0 | 00 | SR2 |
///  ---------------------------------
/// ```
/// - DR is set with result of SR 1 AND sign extended immediate
/// ```text
///  15__12__11_9__8_6___5___4___0_
/// | 0101 |  DR | SR1 | 1 |  IMM5 |
///  ------------------------------
/// ```
pub fn and(dr: u8, sr1: u8, operand: Operand, r: &mut Registers) {
    let value = r.get(sr1).as_binary() & operand_value(operand, r).as_binary();
    r.set_with_condition(dr, from_binary(value));
}

/// NOT: bit-wise complement of the value in SR 1
/// ```text
///  15__12__11_9__8_6___5___0_
/// | 1001 |  DR | SR1 | 11111 |
///  --------------------------
/// ```
pub fn not(dr: u8, sr1: u8, r: &mut Registers) {
    r.set_with_condition(dr, from_binary(!r.get(sr1).as_binary()));
}
/// BR: Conditional Branch
/// This opcode adds the value of the sign extended offset to PC if the current
/// [`ConditionFlag`](crate::hardware::ConditionFlag) matches a set bit of `n`, `z` or `p`.
/// With none of the bits set it never branches.
/// ```text
///  15__12__11_9___8_______0_
/// | 0000 |  nzp | PCoffset9 |
///  -------------------------
/// ```
///
/// # Errors
/// - branch is taken and its target is outside of the address space
pub fn br(
    n: bool,
    z: bool,
    p: bool,
    pc_offset: i16,
    r: &mut Registers,
) -> Result<(), ExecutionError> {
    if r.get_conditional_register().matches(n, z, p) {
        r.set_pc(offset_address(r.pc(), pc_offset)?);
    }
    Ok(())
}
/// JSR: Jump to Sub-Routine.
/// Two variants:
/// - JSR to `PCOffset11`
/// ```text
///  15__12__11_10_________0
/// | 0100 | 1 | PCOffset11 |
///  -----------------------
/// ```
/// - JSRR: JSR to location in `BaseR`
/// ```text
///  15__12__11_9__8___6___5____0_
/// | 0100 | 000 | BaseR | 000000 |
///  -----------------------------
/// ```
/// The former PC is saved in R7 after the target is read, `JSRR R7` jumps to the old R7.
///
/// # Errors
/// - target of `PCOffset11` is outside of the address space
pub fn jsr(target: SubroutineTarget, r: &mut Registers) -> Result<(), ExecutionError> {
    let temp_pc = r.pc();
    let new_pc = match target {
        SubroutineTarget::PcOffset(pc_offset) => offset_address(temp_pc, pc_offset)?,
        SubroutineTarget::BaseRegister(base_r) => r.get(base_r).as_binary(),
    };
    r.set_pc(new_pc);
    r.set(7, from_binary(temp_pc));
    Ok(())
}
/// JMP or RET operation.
/// - JMP sets the PC to the value of register `BaseR`
/// ```text
///  15__12__11_9___8_6____5____0_
/// | 1100 | 000 | BaseR | 000000 |
///  -----------------------------
/// ```
/// - RET same as JMP, but special case for returning from JSR where former PC is saved in R7.
/// ```text
///  15__12__11_9__8_6___5____0_
/// | 1100 | 000 | 111 | 000000 |
///  ---------------------------
/// ```
pub fn jmp_or_ret(base_r: u8, r: &mut Registers) {
    r.set_pc(r.get(base_r).as_binary());
}

/// LD: Loads content of memory address of PC + sign extended offset into DR.
/// ```text
///  15__12__11_9___8_______0_
/// | 0010 |  DR  | PCoffset9 |
///  -------------------------
/// ```
///
/// # Errors
/// - effective address outside of the address space
pub fn ld(
    dr: u8,
    pc_offset: i16,
    r: &mut Registers,
    memory: &Memory,
) -> Result<(), ExecutionError> {
    let value = memory[offset_address(r.pc(), pc_offset)?];
    r.set_with_condition(dr, from_binary(value));
    Ok(())
}

/// LDI: Load indirect.
/// Calculates memory address of PC + sign extended offset and reads another address from there,
/// the content of the memory at that indirectly loaded address is put into DR.
/// ```text
///  15__12__11_9___8_______0_
/// | 1010 |  DR  | PCoffset9 |
///  -------------------------
/// ```
///
/// # Errors
/// - effective address outside of the address space
pub fn ldi(
    dr: u8,
    pc_offset: i16,
    r: &mut Registers,
    memory: &Memory,
) -> Result<(), ExecutionError> {
    let address_address = offset_address(r.pc(), pc_offset)?;
    let value_address = memory[address_address];
    r.set_with_condition(dr, from_binary(memory[value_address]));
    Ok(())
}
/// LDR: Load address from base register and adds sign extended offset to load the memory content
/// from there into DR.
/// ```text
///  15__12__11_9__8___6____5____0_
/// | 0110 |  DR | BaseR | offset6 |
///  ------------------------------
/// ```
///
/// # Errors
/// - effective address outside of the address space
pub fn ldr(
    dr: u8,
    base_r: u8,
    offset: i16,
    r: &mut Registers,
    memory: &Memory,
) -> Result<(), ExecutionError> {
    let value_address = offset_address(r.get(base_r).as_binary(), offset)?;
    r.set_with_condition(dr, from_binary(memory[value_address]));
    Ok(())
}

/// LEA: Load Effective Address loads PC + sign extended offset into DR.
/// ```text
///  15__12__11_9___8_______0_
/// | 1110 |  DR  | PCoffset9 |
///  -------------------------
/// ```
/// Sets the condition code from the address like any other load.
///
/// # Errors
/// - computed address outside of the address space
pub fn lea(dr: u8, pc_offset: i16, r: &mut Registers) -> Result<(), ExecutionError> {
    let address = offset_address(r.pc(), pc_offset)?;
    r.set_with_condition(dr, from_binary(address));
    Ok(())
}
/// ST: Store. The contents of the SR are written to memory address PC + sign extended offset.
/// ```text
///  15__12__11_9___8_______0_
/// | 0011 |  SR  | PCoffset9 |
///  -------------------------
/// ```
///
/// # Errors
/// - effective address outside of the address space
pub fn st(
    sr: u8,
    pc_offset: i16,
    r: &Registers,
    memory: &mut Memory,
) -> Result<(), ExecutionError> {
    let store_address = offset_address(r.pc(), pc_offset)?;
    memory[store_address] = r.get(sr).as_binary();
    Ok(())
}
/// STI: Store Indirect. The contents of the SR are written to the address which is loaded from
/// memory address PC + sign extended offset.
/// ```text
///  15__12__11_9___8_______0_
/// | 1011 |  SR  | PCoffset9 |
///  -------------------------
/// ```
///
/// # Errors
/// - effective address outside of the address space
pub fn sti(
    sr: u8,
    pc_offset: i16,
    r: &Registers,
    memory: &mut Memory,
) -> Result<(), ExecutionError> {
    let address_of_store_address = offset_address(r.pc(), pc_offset)?;
    let store_address = memory[address_of_store_address];
    memory[store_address] = r.get(sr).as_binary();
    Ok(())
}
/// STR: Store contents of SR to memory address of base register plus sign extended offset.
/// ```text
///  15__12__11_9__8___6____5____0_
/// | 0111 |  SR | BaseR | offset6 |
///  ------------------------------
/// ```
///
/// # Errors
/// - effective address outside of the address space
pub fn str(
    sr: u8,
    base_r: u8,
    offset: i16,
    r: &Registers,
    memory: &mut Memory,
) -> Result<(), ExecutionError> {
    let store_address = offset_address(r.get(base_r).as_binary(), offset)?;
    memory[store_address] = r.get(sr).as_binary();
    Ok(())
}
