//! # Exposure Boundary
//!
//! The core does not know how fields reach users; an
//! [`ExposureAdapter`] supplied by the host environment binds each
//! non-reserved field to an externally reachable read/write access
//! point. The adapter receives a [`FieldHandle`] per field: a
//! permission-checking forwarder straight into the bank's get/set path,
//! with no caching in between.

use core::any::Any;

use alloc::boxed::Box;
use alloc::string::String;
use alloc::sync::Arc;

use crate::bank::RegisterBank;
use crate::error::{Error, Result};
use crate::field::{Access, FieldEntry};
use crate::text;

/// Opaque handle to a bank's external identity.
///
/// Created by [`ExposureAdapter::present`], stored by the registry, and
/// only ever passed back into the adapter that produced it.
pub type Presentation = Box<dyn Any + Send + Sync>;

/// Host-environment hooks that make fields user-visible.
///
/// Implementations live outside the core. `expose` must wire the
/// handle's [`read`](FieldHandle::read)/[`write`](FieldHandle::write)
/// (or [`show`](FieldHandle::show)/[`store`](FieldHandle::store) for
/// textual surfaces) directly to its access point; `unexpose` must be
/// idempotent.
pub trait ExposureAdapter: Send + Sync {
    /// Create the external identity for a bank.
    fn present(&self, parent: Option<&str>, name: &str) -> Result<Presentation>;

    /// Bind a user-facing access point for one field.
    fn expose(&self, presentation: &Presentation, handle: FieldHandle) -> Result<()>;

    /// Remove a previously bound access point. Idempotent.
    fn unexpose(&self, presentation: &Presentation, field: &str);

    /// Release a bank's external identity.
    fn destroy(&self, presentation: Presentation);
}

/// Permission-checked access to one field of a registered bank.
#[derive(Debug, Clone)]
pub struct FieldHandle {
    bank: Arc<RegisterBank>,
    index: usize,
}

impl FieldHandle {
    pub(crate) fn new(bank: Arc<RegisterBank>, index: usize) -> Self {
        debug_assert!(index < bank.fields().len());
        Self { bank, index }
    }

    #[inline]
    fn entry(&self) -> &FieldEntry {
        &self.bank.fields()[self.index]
    }

    /// Name of the bound field.
    pub fn field_name(&self) -> &str {
        self.entry().name()
    }

    /// Name of the owning bank.
    pub fn bank_name(&self) -> &str {
        self.bank.name()
    }

    /// Accesses the bound field permits.
    pub fn mode(&self) -> Access {
        self.entry().access()
    }

    /// Read the field, enforcing [`Access::READ`].
    pub fn read(&self) -> Result<u32> {
        let entry = self.entry();
        if !entry.access().contains(Access::READ) {
            return Err(Error::PermissionDenied {
                field: String::from(entry.name()),
                access: Access::READ,
            });
        }
        self.bank.get(entry)
    }

    /// Write the field, enforcing [`Access::WRITE`].
    pub fn write(&self, value: u32) -> Result<()> {
        let entry = self.entry();
        if !entry.access().contains(Access::WRITE) {
            return Err(Error::PermissionDenied {
                field: String::from(entry.name()),
                access: Access::WRITE,
            });
        }
        self.bank.set(entry, value)
    }

    /// Render the field's value for a textual surface.
    pub fn show(&self) -> Result<String> {
        Ok(text::render(self.read()?))
    }

    /// Parse textual input and write it to the field.
    pub fn store(&self, input: &str) -> Result<()> {
        self.write(text::parse(input)?)
    }
}

/// Recording fake of the host environment, shared by the lifecycle
/// tests here and in the registry.
#[cfg(test)]
pub(crate) struct RecordingAdapter {
    /// Chronological event log: "present:x", "expose:x", ...
    pub events: spin::Mutex<alloc::vec::Vec<String>>,
    /// Field name whose exposure should fail
    pub fail_on: Option<&'static str>,
}

#[cfg(test)]
impl RecordingAdapter {
    pub fn new() -> Self {
        Self {
            events: spin::Mutex::new(alloc::vec::Vec::new()),
            fail_on: None,
        }
    }

    pub fn failing_on(field: &'static str) -> Self {
        Self {
            fail_on: Some(field),
            ..Self::new()
        }
    }

    pub fn events(&self) -> alloc::vec::Vec<String> {
        self.events.lock().clone()
    }

    fn record(&self, event: String) {
        self.events.lock().push(event);
    }
}

#[cfg(test)]
impl ExposureAdapter for RecordingAdapter {
    fn present(&self, _parent: Option<&str>, name: &str) -> Result<Presentation> {
        self.record(alloc::format!("present:{name}"));
        Ok(Box::new(String::from(name)))
    }

    fn expose(&self, _presentation: &Presentation, handle: FieldHandle) -> Result<()> {
        if self.fail_on == Some(handle.field_name()) {
            return Err(Error::Adapter {
                op: "expose",
                reason: "injected failure",
            });
        }
        self.record(alloc::format!("expose:{}", handle.field_name()));
        Ok(())
    }

    fn unexpose(&self, _presentation: &Presentation, field: &str) {
        self.record(alloc::format!("unexpose:{field}"));
    }

    fn destroy(&self, presentation: Presentation) {
        let name = presentation
            .downcast_ref::<String>()
            .map_or("?", String::as_str);
        self.record(alloc::format!("destroy:{name}"));
    }
}
