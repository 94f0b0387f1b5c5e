use crate::numbers;
use std::fmt::{Debug, Formatter};

/// Content of a general purpose register.
///
/// Stored as raw 16 bits, read as signed value for arithmetic and as unsigned value
/// whenever it is used as an address.
#[derive(Copy, Clone, PartialEq, Eq, Default)]
pub struct Register(u16);

impl Register {
    #[must_use]
    pub const fn from_binary(value: u16) -> Self {
        Self(value)
    }
    #[must_use]
    pub const fn from_decimal(value: i16) -> Self {
        Self(value.cast_unsigned())
    }
    #[must_use]
    pub const fn as_binary(self) -> u16 {
        self.0
    }
    #[must_use]
    pub const fn as_decimal(self) -> i16 {
        numbers::twos_complement_to_decimal(self.0)
    }
}
impl Debug for Register {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#06X} ({})", self.0, self.as_decimal())
    }
}

#[must_use]
pub const fn from_binary(value: u16) -> Register {
    Register::from_binary(value)
}
#[must_use]
pub const fn from_decimal(value: i16) -> Register {
    Register::from_decimal(value)
}

/// Condition code of the LC-3.
///
/// Exactly one of negative, zero and positive holds at any time,
/// set from the sign of the last value written by a data instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionFlag {
    Pos = 1 << 0, // Positive
    Zero = 1 << 1,
    Neg = 1 << 2, // Negative
}

impl ConditionFlag {
    /// Checks the flag against the `nzp` bits of a BR instruction.
    #[must_use]
    pub const fn matches(self, n: bool, z: bool, p: bool) -> bool {
        match self {
            Self::Neg => n,
            Self::Zero => z,
            Self::Pos => p,
        }
    }
}

impl From<Register> for ConditionFlag {
    fn from(value: Register) -> Self {
        match value.as_decimal() {
            0 => Self::Zero,
            v if v < 0 => Self::Neg,
            _ => Self::Pos,
        }
    }
}

/// General purpose registers R0 to R7, program counter and condition code.
#[derive(Clone, PartialEq, Eq)]
pub struct Registers {
    general_purpose: [Register; 8],
    pc: u16,
    cond: ConditionFlag,
}
impl Debug for Registers {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "PC: {:#06X}, COND: {:?}", self.pc, self.cond)?;
        for (idx, r) in self.general_purpose.iter().enumerate() {
            write!(f, ", R{idx}: {r:?}")?;
        }
        Ok(())
    }
}
impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}

impl Registers {
    /// Zeroed registers, condition code `Zero` matching the zero content.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            general_purpose: [Register(0); 8],
            pc: 0,
            cond: ConditionFlag::Zero,
        }
    }

    /// # Panics
    /// - `r` is not in `0..=7`
    #[must_use]
    pub fn get(&self, r: u8) -> Register {
        assert!(r <= 7, "Invalid general purpose register get: {r}");
        self.general_purpose[usize::from(r)]
    }
    /// # Panics
    /// - `r` is not in `0..=7`
    pub fn set(&mut self, r: u8, value: Register) {
        assert!(r <= 7, "Invalid general purpose register set: {r}");
        self.general_purpose[usize::from(r)] = value;
    }
    #[must_use]
    pub const fn pc(&self) -> u16 {
        self.pc
    }
    pub const fn set_pc(&mut self, pc: u16) {
        self.pc = pc;
    }
    #[must_use]
    pub const fn get_conditional_register(&self) -> ConditionFlag {
        self.cond
    }
    pub(crate) fn update_conditional_register(&mut self, r: u8) {
        self.cond = ConditionFlag::from(self.get(r));
    }
    /// Sets register `r` and the condition code from the written value.
    pub(crate) fn set_with_condition(&mut self, r: u8, value: Register) {
        self.set(r, value);
        self.update_conditional_register(r);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use googletest::prelude::*;
    use yare::parameterized;

    #[parameterized(
        zero = { 0, ConditionFlag::Zero },
        one = { 1, ConditionFlag::Pos },
        largest_positive = { 0x7FFF, ConditionFlag::Pos },
        smallest_negative = { 0x8000, ConditionFlag::Neg },
        minus_one = { 0xFFFF, ConditionFlag::Neg },
    )]
    fn test_condition_flag_from_register(value: u16, expected: ConditionFlag) {
        assert_that!(ConditionFlag::from(from_binary(value)), eq(expected));
    }

    #[gtest]
    pub fn test_registers_new_zeroed() {
        let regs = Registers::new();
        for r in 0..8 {
            expect_that!(regs.get(r), eq(from_binary(0)));
        }
        expect_that!(regs.pc(), eq(0));
        expect_that!(regs.get_conditional_register(), eq(ConditionFlag::Zero));
    }

    #[gtest]
    pub fn test_set_with_condition() {
        let mut regs = Registers::new();
        regs.set_with_condition(3, from_decimal(-7));
        expect_that!(regs.get(3).as_decimal(), eq(-7));
        expect_that!(regs.get(3).as_binary(), eq(0xFFF9));
        expect_that!(regs.get_conditional_register(), eq(ConditionFlag::Neg));
        // plain set leaves the condition code alone
        regs.set(3, from_decimal(5));
        expect_that!(regs.get_conditional_register(), eq(ConditionFlag::Neg));
    }

    #[gtest]
    pub fn test_condition_flag_matches() {
        expect_that!(ConditionFlag::Zero.matches(true, false, false), eq(false));
        expect_that!(ConditionFlag::Zero.matches(false, true, false), eq(true));
        expect_that!(ConditionFlag::Neg.matches(true, false, true), eq(true));
        expect_that!(ConditionFlag::Pos.matches(false, false, false), eq(false));
    }

    #[gtest]
    #[should_panic(expected = "Invalid general purpose register get: 8")]
    pub fn test_get_invalid_register() {
        let _ = Registers::new().get(8);
    }
}
