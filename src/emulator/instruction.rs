use crate::numbers;
use std::fmt::{Debug, Formatter};

/// The opcodes the machine has handlers for, bits 16 to 13 of an instruction.
///
/// `0b1000` (RTI) and `0b1101` (reserved) have no handler.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, enumn::N)]
pub enum Opcode {
    Br = 0b0000,
    Add = 0b0001,
    Ld = 0b0010,
    St = 0b0011,
    Jsr = 0b0100,
    And = 0b0101,
    Ldr = 0b0110,
    Str = 0b0111,
    Not = 0b1001,
    Ldi = 0b1010,
    Sti = 0b1011,
    Jmp = 0b1100,
    Lea = 0b1110,
    Trap = 0b1111,
}

/// Wrapper for LC-3 u16 instruction.
/// format is: `OOOO_DDD_P_PPPP_PPPP`
///
/// Bit positions are 1-based, bit 1 being the least significant one.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct Instruction(u16);

impl Instruction {
    /// Gives the value of `count` bits starting at bit `position`.
    /// See [`numbers::extract_bits()`]
    #[must_use]
    pub fn field(self, count: u8, position: u8) -> u16 {
        numbers::extract_bits(self.0, count, position)
    }
    /// Gives the value of a field of at most 8 bits as u8.
    /// # Panics
    /// - value does not fit into u8 with message from `expect`
    #[must_use]
    pub fn field_u8(self, count: u8, position: u8, expect: &str) -> u8 {
        u8::try_from(self.field(count, position)).expect(expect)
    }
    #[must_use]
    pub fn get_bit(self, position: u8) -> bool {
        self.field(1, position) == 1
    }
    #[must_use]
    pub fn op_code(self) -> u8 {
        self.field_u8(4, 13, "Error parsing op_code")
    }
    #[must_use]
    pub fn dr_number(self) -> u8 {
        self.field_u8(3, 10, "Error parsing dr")
    }
    #[must_use]
    pub fn sr1_number(self) -> u8 {
        self.field_u8(3, 7, "Error parsing sr1")
    }
    /// Same bits as SR1, named `BaseR` by JMP, JSRR, LDR and STR.
    #[must_use]
    pub fn base_r_number(self) -> u8 {
        self.sr1_number()
    }
    #[must_use]
    pub fn sr2_number(self) -> u8 {
        self.field_u8(3, 1, "Error parsing sr2")
    }
    #[must_use]
    pub fn is_immediate(self) -> bool {
        self.get_bit(6)
    }
    /// Sign extended `imm5`.
    #[must_use]
    pub fn immediate(self) -> i16 {
        numbers::signed_field(self.0, 5, 1)
    }
    /// Sign extended offset of the lowest `len` bits.
    /// Used as `PCoffset9`, `PCoffset11` and `offset6`.
    #[must_use]
    pub fn pc_offset(self, len: u8) -> i16 {
        numbers::signed_field(self.0, len, 1)
    }
    #[must_use]
    pub fn trap_vector(self) -> u8 {
        self.field_u8(8, 1, "Error parsing trapvect8")
    }
    #[must_use]
    pub const fn as_binary(self) -> u16 {
        self.0
    }

    /// Decodes into the field layout of the opcode.
    ///
    /// Returns `None` for opcodes without handler.
    #[must_use]
    pub fn decode(self) -> Option<DecodedInstruction> {
        let opcode = Opcode::n(self.op_code())?;
        let operand = || {
            if self.is_immediate() {
                Operand::Immediate(self.immediate())
            } else {
                Operand::Register(self.sr2_number())
            }
        };
        let pc_relative = |op| DecodedInstruction::PcRelative {
            op,
            reg: self.dr_number(),
            pc_offset: self.pc_offset(9),
        };
        let base_offset = |op| DecodedInstruction::BaseOffset {
            op,
            reg: self.dr_number(),
            base_r: self.base_r_number(),
            offset: self.pc_offset(6),
        };
        let operate = |op| DecodedInstruction::Operate {
            op,
            dr: self.dr_number(),
            sr1: self.sr1_number(),
        };
        Some(match opcode {
            Opcode::Add => operate(OperateOp::Add(operand())),
            Opcode::And => operate(OperateOp::And(operand())),
            Opcode::Not => operate(OperateOp::Not),
            Opcode::Ld => pc_relative(PcRelativeOp::Ld),
            Opcode::St => pc_relative(PcRelativeOp::St),
            Opcode::Ldi => pc_relative(PcRelativeOp::Ldi),
            Opcode::Sti => pc_relative(PcRelativeOp::Sti),
            Opcode::Lea => pc_relative(PcRelativeOp::Lea),
            Opcode::Ldr => base_offset(BaseOffsetOp::Ldr),
            Opcode::Str => base_offset(BaseOffsetOp::Str),
            // JMP has no register and offset, fields are kept zero
            Opcode::Jmp => DecodedInstruction::BaseOffset {
                op: BaseOffsetOp::Jmp,
                reg: 0,
                base_r: self.base_r_number(),
                offset: 0,
            },
            Opcode::Br => DecodedInstruction::Branch {
                n: self.get_bit(12),
                z: self.get_bit(11),
                p: self.get_bit(10),
                pc_offset: self.pc_offset(9),
            },
            Opcode::Jsr => DecodedInstruction::Subroutine(if self.get_bit(12) {
                SubroutineTarget::PcOffset(self.pc_offset(11))
            } else {
                SubroutineTarget::BaseRegister(self.base_r_number())
            }),
            Opcode::Trap => DecodedInstruction::Trap {
                vector: self.trap_vector(),
            },
        })
    }
}

impl Debug for Instruction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Op: {:04b}, DR: {:03b}, PC_Off: {:09b}",
            self.op_code(),
            self.dr_number(),
            self.field(9, 1)
        )
    }
}

impl From<u16> for Instruction {
    fn from(bits: u16) -> Self {
        Self(bits)
    }
}

/// Second operand of ADD and AND.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Operand {
    Register(u8),
    /// Sign extended `imm5`
    Immediate(i16),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum OperateOp {
    Add(Operand),
    And(Operand),
    Not,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PcRelativeOp {
    Ld,
    St,
    Ldi,
    Sti,
    Lea,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BaseOffsetOp {
    Ldr,
    Str,
    Jmp,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SubroutineTarget {
    /// JSR: sign extended `PCoffset11`
    PcOffset(i16),
    /// JSRR
    BaseRegister(u8),
}

/// An instruction decoded into the field layout of its opcode class.
/// All signed fields are sign extended already.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DecodedInstruction {
    /// ADD, AND, NOT
    Operate { op: OperateOp, dr: u8, sr1: u8 },
    /// LD, ST, LDI, STI, LEA
    PcRelative {
        op: PcRelativeOp,
        reg: u8,
        pc_offset: i16,
    },
    /// LDR, STR, JMP
    BaseOffset {
        op: BaseOffsetOp,
        reg: u8,
        base_r: u8,
        offset: i16,
    },
    /// BR
    Branch {
        n: bool,
        z: bool,
        p: bool,
        pc_offset: i16,
    },
    /// JSR, JSRR
    Subroutine(SubroutineTarget),
    /// TRAP
    Trap { vector: u8 },
}

#[expect(clippy::unusual_byte_groupings)]
#[cfg(test)]
mod tests {
    use super::*;
    use googletest::prelude::*;
    use yare::parameterized;

    #[gtest]
    pub fn test_instr_fields() {
        let sut = Instruction::from(0b1010_101_001010101);
        expect_that!(sut.op_code(), eq(0b1010));
        expect_that!(sut.dr_number(), eq(0b101));
        expect_that!(sut.pc_offset(9), eq(0b0_0101_0101));

        // Add: DR: 3, SR1: 2, Immediate: false, SR2: 1
        let sut = Instruction::from(0b0001_011_010_0_00_001);
        expect_that!(sut.op_code(), eq(1));
        expect_that!(sut.dr_number(), eq(3));
        expect_that!(sut.sr1_number(), eq(2));
        expect_that!(sut.sr2_number(), eq(1));
        expect_that!(sut.is_immediate(), eq(false));

        // Add: DR: 7, SR1: 0, Immediate: true, imm5: 14
        let sut = Instruction::from(0b0001_111_000_1_01110);
        expect_that!(sut.dr_number(), eq(7));
        expect_that!(sut.sr1_number(), eq(0));
        expect_that!(sut.is_immediate(), eq(true));
        expect_that!(sut.immediate(), eq(14));

        let sut = Instruction::from(0b1111_0000_0010_0101);
        expect_that!(sut.trap_vector(), eq(0x25));
    }

    #[gtest]
    pub fn test_decode_add_register() {
        expect_that!(
            Instruction::from(0b0001_001_010_0_00_001).decode(),
            some(eq(DecodedInstruction::Operate {
                op: OperateOp::Add(Operand::Register(1)),
                dr: 1,
                sr1: 2,
            }))
        );
    }

    #[gtest]
    pub fn test_decode_immediate_sign_extended() {
        // imm5 10001 is -15, not 17
        expect_that!(
            Instruction::from(0b0001_001_010_1_10001).decode(),
            some(eq(DecodedInstruction::Operate {
                op: OperateOp::Add(Operand::Immediate(-15)),
                dr: 1,
                sr1: 2,
            }))
        );
        expect_that!(
            Instruction::from(0b0101_000_000_1_10001).decode(),
            some(eq(DecodedInstruction::Operate {
                op: OperateOp::And(Operand::Immediate(-15)),
                dr: 0,
                sr1: 0,
            }))
        );
    }

    #[parameterized(
        canonical = { 0b1001_011_100_1_11111 },
        low_bits_clear = { 0b1001_011_100_0_00000 },
        low_bits_mixed = { 0b1001_011_100_0_10110 },
    )]
    fn test_decode_not_ignores_low_bits(word: u16) {
        assert_that!(
            Instruction::from(word).decode(),
            some(eq(DecodedInstruction::Operate {
                op: OperateOp::Not,
                dr: 3,
                sr1: 4,
            }))
        );
    }

    #[gtest]
    pub fn test_decode_pc_relative_and_base_offset() {
        expect_that!(
            Instruction::from(0b1010_001_1_1010_0000).decode(),
            some(eq(DecodedInstruction::PcRelative {
                op: PcRelativeOp::Ldi,
                reg: 1,
                pc_offset: -96,
            }))
        );
        expect_that!(
            Instruction::from(0b0111_010_110_100000).decode(),
            some(eq(DecodedInstruction::BaseOffset {
                op: BaseOffsetOp::Str,
                reg: 2,
                base_r: 6,
                offset: -32,
            }))
        );
        expect_that!(
            Instruction::from(0b1100_000_111_000000).decode(),
            some(eq(DecodedInstruction::BaseOffset {
                op: BaseOffsetOp::Jmp,
                reg: 0,
                base_r: 7,
                offset: 0,
            }))
        );
    }

    #[gtest]
    pub fn test_decode_control_flow() {
        expect_that!(
            Instruction::from(0b0000_010_1_1111_1101).decode(),
            some(eq(DecodedInstruction::Branch {
                n: false,
                z: true,
                p: false,
                pc_offset: -3,
            }))
        );
        expect_that!(
            Instruction::from(0b0100_1_00110100001).decode(),
            some(eq(DecodedInstruction::Subroutine(
                SubroutineTarget::PcOffset(0x1A1)
            )))
        );
        expect_that!(
            Instruction::from(0b0100_0_00_101_000000).decode(),
            some(eq(DecodedInstruction::Subroutine(
                SubroutineTarget::BaseRegister(5)
            )))
        );
        expect_that!(
            Instruction::from(0xF021).decode(),
            some(eq(DecodedInstruction::Trap { vector: 0x21 }))
        );
    }

    #[parameterized(
        reserved = { 0b1101_0000_0000_0000 },
        reserved_all_ones = { 0xDFFF },
        rti = { 0b1000_0000_0000_0000 },
    )]
    fn test_decode_illegal_opcode(word: u16) {
        assert_that!(Instruction::from(word).decode(), none());
    }
}
