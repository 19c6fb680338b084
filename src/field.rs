//! # Field Descriptors
//!
//! A [`FieldEntry`] names one masked subrange of bits inside a
//! register bank, together with the accesses it permits. Entries are
//! built by the driver describing its hardware and are immutable once
//! the bank owns them.

use alloc::string::String;

bitflags::bitflags! {
    /// Accesses a field permits
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Access: u8 {
        /// Field may be read
        const READ = 1 << 0;
        /// Field may be written
        const WRITE = 1 << 1;
    }
}

impl Default for Access {
    fn default() -> Self {
        Access::READ | Access::WRITE
    }
}

/// One named bitfield inside a register bank.
///
/// The mask identifies which register bits belong to the field; values
/// exchanged with callers are right-aligned and shifted into position
/// by the bank. A zero mask marks a reserved placeholder slot: it is
/// skipped during exposure and rejected by direct get/set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldEntry {
    name: String,
    mask: u32,
    access: Access,
}

impl FieldEntry {
    /// Create a read/write field.
    pub fn new(name: impl Into<String>, mask: u32) -> Self {
        Self {
            name: name.into(),
            mask,
            access: Access::default(),
        }
    }

    /// Restrict the accesses this field permits.
    pub fn with_access(mut self, access: Access) -> Self {
        self.access = access;
        self
    }

    /// Field name, unique within its bank.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Mask of the register bits belonging to this field.
    #[inline]
    pub fn mask(&self) -> u32 {
        self.mask
    }

    /// Permitted accesses.
    #[inline]
    pub fn access(&self) -> Access {
        self.access
    }

    /// Whether this entry is a reserved placeholder (zero mask).
    #[inline]
    pub fn is_reserved(&self) -> bool {
        self.mask == 0
    }

    /// Bit position of the field's least-significant bit.
    ///
    /// Only meaningful for non-reserved entries.
    #[inline]
    pub(crate) fn shift(&self) -> u32 {
        self.mask.trailing_zeros()
    }
}
