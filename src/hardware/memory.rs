use crate::errors::LoadProgramError;
use std::fmt::{Debug, Formatter};
use std::ops::{Index, IndexMut};

/// Number of addressable words, the complete 16-bit address space.
pub const MEMORY_SIZE: usize = 1 << 16;
/// Conventional origin of user programs.
pub const PROGRAM_SECTION_START: u16 = 0x3000;

/// The LC-3 memory, one `u16` word for every 16-bit address.
///
/// Every `u16` is a valid index, so indexing never fails.
/// While a journal is open every write remembers the overwritten word, so
/// the writes can be rolled back.
#[derive(Clone)]
pub struct Memory {
    /// Index equals memory address
    data: Box<[u16]>,
    /// Overwritten `(address, word)` pairs in write order
    journal: Option<Vec<(u16, u16)>>,
}

impl Debug for Memory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let used = self.data.iter().filter(|w| **w != 0).count();
        write!(f, "Memory: {MEMORY_SIZE} words, {used} non-zero")
    }
}
impl PartialEq for Memory {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}
impl Eq for Memory {}
impl Index<u16> for Memory {
    type Output = u16;
    fn index(&self, index: u16) -> &Self::Output {
        &self.data[usize::from(index)]
    }
}
impl IndexMut<u16> for Memory {
    fn index_mut(&mut self, index: u16) -> &mut Self::Output {
        let cell = &mut self.data[usize::from(index)];
        if let Some(journal) = &mut self.journal {
            journal.push((index, *cell));
        }
        cell
    }
}
impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}
impl Memory {
    #[must_use]
    pub fn new() -> Self {
        Self {
            data: vec![0x0u16; MEMORY_SIZE].into_boxed_slice(),
            journal: None,
        }
    }
    pub fn reset(&mut self) {
        if let Some(journal) = &mut self.journal {
            journal.extend((0..=u16::MAX).zip(self.data.iter().copied()));
        }
        self.data.fill(0);
    }
    /// Copies `words` into memory starting at `address`.
    ///
    /// # Errors
    /// - Block reaches past address `0xFFFF`, memory is left untouched then
    pub fn load(&mut self, address: u16, words: &[u16]) -> Result<(), LoadProgramError> {
        let start = usize::from(address);
        let end = start + words.len();
        if end > MEMORY_SIZE {
            return Err(LoadProgramError::ExceedsAddressSpace {
                address,
                length: words.len(),
            });
        }
        if let Some(journal) = &mut self.journal {
            journal.extend((address..=u16::MAX).zip(self.data[start..end].iter().copied()));
        }
        self.data[start..end].copy_from_slice(words);
        Ok(())
    }

    /// Starts recording writes, dropping a journal that is still open.
    pub(crate) fn open_journal(&mut self) {
        self.journal = Some(Vec::new());
    }
    /// Keeps every write since [`Self::open_journal`].
    pub(crate) fn commit_journal(&mut self) {
        self.journal = None;
    }
    /// Undoes every write since [`Self::open_journal`].
    pub(crate) fn roll_back_journal(&mut self) {
        if let Some(journal) = self.journal.take() {
            for (address, word) in journal.into_iter().rev() {
                self.data[usize::from(address)] = word;
            }
        }
    }
}
