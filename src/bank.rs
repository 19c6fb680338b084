//! # Register Banks
//!
//! A [`RegisterBank`] models exactly one hardware register, sliced into
//! named bitfields. All accesses funnel through the bank's
//! reader/writer lock: field reads share the lock, field writes hold it
//! exclusively for the whole read-modify-write cycle. The lock is
//! bank-wide on purpose — every field write must read the shared
//! register, so per-field locks could not prevent torn updates.

use core::fmt;
use core::sync::atomic::{AtomicBool, Ordering};

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;

use spin::RwLock;

use crate::access::{RegisterAccess, Width};
use crate::error::{Error, Result};
use crate::field::FieldEntry;

/// One hardware register and its named bitfields.
pub struct RegisterBank {
    /// Bank name, used for external presentation
    name: String,
    /// Access granularity for every field
    width: Width,
    /// Raw backend, guarded by the bank-wide reader/writer lock
    io: RwLock<Box<dyn RegisterAccess>>,
    /// Ordered field descriptors, exclusively owned
    fields: Vec<FieldEntry>,
    /// Lifecycle flag, maintained by the registry
    registered: AtomicBool,
}

impl RegisterBank {
    /// Describe a bank over the given register backend.
    ///
    /// The bank is inert until registered; see
    /// [`BankRegistry::register`](crate::registry::BankRegistry::register).
    pub fn new(
        name: impl Into<String>,
        width: Width,
        io: Box<dyn RegisterAccess>,
        fields: Vec<FieldEntry>,
    ) -> Self {
        Self {
            name: name.into(),
            width,
            io: RwLock::new(io),
            fields,
            registered: AtomicBool::new(false),
        }
    }

    /// Bank name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Hardware access width.
    #[inline]
    pub fn width(&self) -> Width {
        self.width
    }

    /// Address of the backing register.
    pub fn address(&self) -> usize {
        self.io.read().address()
    }

    /// All field descriptors, in declaration order.
    #[inline]
    pub fn fields(&self) -> &[FieldEntry] {
        &self.fields
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldEntry> {
        self.fields.iter().find(|f| f.name() == name)
    }

    /// Whether the bank is currently registered.
    pub fn is_registered(&self) -> bool {
        self.registered.load(Ordering::Acquire)
    }

    pub(crate) fn set_registered(&self, registered: bool) {
        self.registered.store(registered, Ordering::Release);
    }

    /// Read a field's current value, right-aligned to bit 0.
    ///
    /// Takes the bank lock in read mode for the single raw access;
    /// normalization happens on locals after the lock is dropped.
    pub fn get(&self, field: &FieldEntry) -> Result<u32> {
        if field.is_reserved() {
            return Err(Error::InvalidField {
                field: String::from(field.name()),
            });
        }

        let reg = self.io.read().read(self.width);

        Ok((reg & field.mask()) >> field.shift())
    }

    /// Write a right-aligned value into a field.
    ///
    /// Holds the bank lock in write mode across the whole
    /// read-modify-write, so concurrent sets on any fields of this bank
    /// never interleave. A value too wide for the field fails with
    /// [`Error::Overflow`] and leaves the register untouched.
    pub fn set(&self, field: &FieldEntry, value: u32) -> Result<()> {
        if field.is_reserved() {
            return Err(Error::InvalidField {
                field: String::from(field.name()),
            });
        }

        let mut io = self.io.write();
        let reg = io.read(self.width);

        // Position the caller's value; the 64-bit intermediate keeps a
        // large value from silently wrapping before the fit check.
        let positioned = u64::from(value) << field.shift();
        if positioned & u64::from(field.mask()) != positioned {
            return Err(Error::Overflow {
                field: String::from(field.name()),
                value,
                mask: field.mask(),
            });
        }

        io.write(self.width, (reg & !field.mask()) | positioned as u32);
        Ok(())
    }
}

impl fmt::Debug for RegisterBank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterBank")
            .field("name", &self.name)
            .field("width", &self.width)
            .field("fields", &self.fields.len())
            .field("registered", &self.is_registered())
            .finish()
    }
}
