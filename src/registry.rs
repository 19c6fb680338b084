//! # Bank Registry
//!
//! Process-wide tracking of live register banks and the
//! registration/teardown lifecycle. The registry is an explicit,
//! dependency-injected object with its own reader/writer lock; it holds
//! non-owning `Arc` handles to banks and owns each bank's presentation
//! handle for the duration of its registration.
//!
//! Registration is all-or-nothing: if binding any field's exposure
//! fails partway through, every binding made so far is removed again in
//! reverse order and the bank never enters the registry.

use alloc::sync::Arc;
use alloc::vec::Vec;

use spin::RwLock;

use crate::bank::RegisterBank;
use crate::error::{Error, Result};
use crate::expose::{ExposureAdapter, FieldHandle, Presentation};

/// A registered bank paired with its presentation handle.
struct BankEntry {
    bank: Arc<RegisterBank>,
    presentation: Presentation,
}

/// The set of currently registered banks, insertion order preserved.
pub struct BankRegistry {
    banks: RwLock<Vec<BankEntry>>,
}

impl BankRegistry {
    /// Create an empty registry.
    pub const fn new() -> Self {
        Self {
            banks: RwLock::new(Vec::new()),
        }
    }

    /// Number of registered banks.
    pub fn len(&self) -> usize {
        self.banks.read().len()
    }

    /// Whether no banks are registered.
    pub fn is_empty(&self) -> bool {
        self.banks.read().is_empty()
    }

    /// Whether this exact bank is registered.
    pub fn contains(&self, bank: &Arc<RegisterBank>) -> bool {
        self.banks
            .read()
            .iter()
            .any(|entry| Arc::ptr_eq(&entry.bank, bank))
    }

    /// Snapshot of the registered banks, in registration order.
    pub fn banks(&self) -> Vec<Arc<RegisterBank>> {
        self.banks
            .read()
            .iter()
            .map(|entry| Arc::clone(&entry.bank))
            .collect()
    }

    /// Validate a bank, expose its fields, and add it to the registry.
    ///
    /// Exposure failures roll back every binding already made and
    /// propagate the adapter's error unchanged; the bank is left
    /// unregistered. Reserved (zero-mask) fields are skipped with a
    /// diagnostic note.
    pub fn register(
        &self,
        adapter: &dyn ExposureAdapter,
        parent: Option<&str>,
        bank: &Arc<RegisterBank>,
    ) -> Result<()> {
        if bank.name().is_empty() {
            return Err(Error::InvalidArgument {
                param: "name",
                reason: "bank name is empty",
            });
        }
        if bank.fields().is_empty() {
            return Err(Error::InvalidArgument {
                param: "fields",
                reason: "bank has no fields",
            });
        }

        let address = bank.address();
        let width = bank.width();
        if address == 0 {
            return Err(Error::InvalidArgument {
                param: "address",
                reason: "register address is null",
            });
        }
        if width.bytes() > 1 && address & width.align_mask() != 0 {
            return Err(Error::Misaligned { address, width });
        }

        if self.contains(bank) {
            return Err(Error::InvalidArgument {
                param: "bank",
                reason: "bank is already registered",
            });
        }

        let presentation = adapter.present(parent, bank.name())?;

        let mut rollback = ExposureRollback::new(adapter, &presentation);
        for (index, field) in bank.fields().iter().enumerate() {
            if field.is_reserved() {
                log::info!(
                    "bank {}: skipping field {} (mask is zero)",
                    bank.name(),
                    field.name()
                );
                continue;
            }

            let handle = FieldHandle::new(Arc::clone(bank), index);
            if let Err(err) = adapter.expose(&presentation, handle) {
                log::error!(
                    "bank {}: failed to expose field {}: {}",
                    bank.name(),
                    field.name(),
                    err
                );
                drop(rollback);
                adapter.destroy(presentation);
                return Err(err);
            }
            rollback.bound(field.name());
        }
        rollback.commit();

        self.banks.write().push(BankEntry {
            bank: Arc::clone(bank),
            presentation,
        });
        bank.set_registered(true);

        log::info!(
            "registered bank {} at {:#x}, width {}",
            bank.name(),
            address,
            width
        );
        Ok(())
    }

    /// Tear down a registered bank: unbind its exposures, destroy its
    /// presentation, and drop it from the registry.
    ///
    /// Unwind-only; unregistering a bank that is not present is a no-op
    /// beyond a diagnostic.
    pub fn unregister(&self, adapter: &dyn ExposureAdapter, bank: &Arc<RegisterBank>) {
        let entry = {
            let mut banks = self.banks.write();
            match banks.iter().position(|e| Arc::ptr_eq(&e.bank, bank)) {
                Some(pos) => banks.remove(pos),
                None => {
                    log::warn!("unregister: bank {} is not registered", bank.name());
                    return;
                },
            }
        };

        for field in entry.bank.fields().iter().filter(|f| !f.is_reserved()) {
            adapter.unexpose(&entry.presentation, field.name());
        }
        adapter.destroy(entry.presentation);
        entry.bank.set_registered(false);

        log::debug!("unregistered bank {}", entry.bank.name());
    }
}

impl Default for BankRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for BankRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BankRegistry")
            .field("banks", &self.len())
            .finish()
    }
}

/// Reverse-order unexposure of the bindings made so far.
///
/// Dropped on the failure path with its bound list intact; `commit`
/// empties the list once every field is exposed, making the drop a
/// no-op.
struct ExposureRollback<'a> {
    adapter: &'a dyn ExposureAdapter,
    presentation: &'a Presentation,
    bound: Vec<&'a str>,
}

impl<'a> ExposureRollback<'a> {
    fn new(adapter: &'a dyn ExposureAdapter, presentation: &'a Presentation) -> Self {
        Self {
            adapter,
            presentation,
            bound: Vec::new(),
        }
    }

    fn bound(&mut self, field: &'a str) {
        self.bound.push(field);
    }

    fn commit(mut self) {
        self.bound.clear();
    }
}

impl Drop for ExposureRollback<'_> {
    fn drop(&mut self) {
        for field in self.bound.iter().rev() {
            self.adapter.unexpose(self.presentation, field);
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::string::String;
    use alloc::vec;
    use alloc::vec::Vec;

    use super::*;
    use crate::access::{FakeRegister, FakeState, Width};
    use crate::expose::RecordingAdapter;
    use crate::field::FieldEntry;

    fn bank_at(
        addr: usize,
        width: Width,
        fields: Vec<FieldEntry>,
    ) -> (Arc<RegisterBank>, Arc<spin::Mutex<FakeState>>) {
        let (fake, state) = FakeRegister::at(addr);
        (
            Arc::new(RegisterBank::new("pmctrl", width, Box::new(fake), fields)),
            state,
        )
    }

    fn three_fields() -> Vec<FieldEntry> {
        vec![
            FieldEntry::new("enable", 0x0000_0001),
            FieldEntry::new("divider", 0x0000_FF00),
            FieldEntry::new("source", 0x0003_0000),
        ]
    }

    #[test]
    fn register_exposes_fields_and_tracks_the_bank() {
        let registry = BankRegistry::new();
        let adapter = RecordingAdapter::new();
        let (bank, _state) = bank_at(0x4000_0000, Width::Word, three_fields());

        registry.register(&adapter, None, &bank).unwrap();

        assert!(registry.contains(&bank));
        assert!(bank.is_registered());
        assert_eq!(registry.len(), 1);
        assert_eq!(
            adapter.events(),
            vec![
                String::from("present:pmctrl"),
                String::from("expose:enable"),
                String::from("expose:divider"),
                String::from("expose:source"),
            ]
        );
    }

    #[test]
    fn reserved_fields_are_skipped_not_failed() {
        let registry = BankRegistry::new();
        let adapter = RecordingAdapter::new();
        let (bank, _state) = bank_at(
            0x4000_0000,
            Width::Word,
            vec![
                FieldEntry::new("enable", 0x1),
                FieldEntry::new("rsvd", 0),
                FieldEntry::new("mode", 0xC),
            ],
        );

        registry.register(&adapter, None, &bank).unwrap();

        let events = adapter.events();
        assert!(events.contains(&String::from("expose:enable")));
        assert!(events.contains(&String::from("expose:mode")));
        assert!(!events.iter().any(|e| e.contains("rsvd")));
    }

    #[test]
    fn misaligned_bank_is_rejected_without_hardware_access() {
        let registry = BankRegistry::new();
        let adapter = RecordingAdapter::new();

        for (addr, width) in [(0x4000_0001, Width::Half), (0x4000_0002, Width::Word)] {
            let (bank, state) = bank_at(addr, width, three_fields());
            let err = registry.register(&adapter, None, &bank).unwrap_err();

            assert!(matches!(err, Error::Misaligned { .. }));
            assert_eq!(state.lock().reads, 0);
            assert_eq!(state.lock().writes, 0);
            assert!(!registry.contains(&bank));
        }
        assert!(adapter.events().is_empty());
    }

    #[test]
    fn byte_banks_need_no_alignment() {
        let registry = BankRegistry::new();
        let adapter = RecordingAdapter::new();
        let (bank, _state) = bank_at(0x4000_0003, Width::Byte, vec![FieldEntry::new("v", 0xF)]);

        registry.register(&adapter, None, &bank).unwrap();
    }

    #[test]
    fn empty_name_and_empty_fields_are_invalid() {
        let registry = BankRegistry::new();
        let adapter = RecordingAdapter::new();

        let (fake, _state) = FakeRegister::new();
        let nameless = Arc::new(RegisterBank::new(
            "",
            Width::Word,
            Box::new(fake),
            three_fields(),
        ));
        assert!(matches!(
            registry.register(&adapter, None, &nameless),
            Err(Error::InvalidArgument { param: "name", .. })
        ));

        let (fake, _state) = FakeRegister::new();
        let fieldless = Arc::new(RegisterBank::new(
            "pmctrl",
            Width::Word,
            Box::new(fake),
            Vec::new(),
        ));
        assert!(matches!(
            registry.register(&adapter, None, &fieldless),
            Err(Error::InvalidArgument { param: "fields", .. })
        ));

        assert!(adapter.events().is_empty());
    }

    #[test]
    fn partial_exposure_failure_rolls_back_in_reverse() {
        let registry = BankRegistry::new();
        let adapter = RecordingAdapter::failing_on("source");
        let (bank, _state) = bank_at(0x4000_0000, Width::Word, three_fields());

        let err = registry.register(&adapter, None, &bank).unwrap_err();

        assert!(matches!(err, Error::Adapter { op: "expose", .. }));
        assert!(!registry.contains(&bank));
        assert!(!bank.is_registered());
        assert_eq!(
            adapter.events(),
            vec![
                String::from("present:pmctrl"),
                String::from("expose:enable"),
                String::from("expose:divider"),
                String::from("unexpose:divider"),
                String::from("unexpose:enable"),
                String::from("destroy:pmctrl"),
            ]
        );
    }

    #[test]
    fn double_registration_is_rejected() {
        let registry = BankRegistry::new();
        let adapter = RecordingAdapter::new();
        let (bank, _state) = bank_at(0x4000_0000, Width::Word, three_fields());

        registry.register(&adapter, None, &bank).unwrap();
        assert!(matches!(
            registry.register(&adapter, None, &bank),
            Err(Error::InvalidArgument { param: "bank", .. })
        ));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn unregister_unwinds_exposures_and_registry_entry() {
        let registry = BankRegistry::new();
        let adapter = RecordingAdapter::new();
        let (bank, _state) = bank_at(0x4000_0000, Width::Word, three_fields());

        registry.register(&adapter, None, &bank).unwrap();
        registry.unregister(&adapter, &bank);

        assert!(!registry.contains(&bank));
        assert!(!bank.is_registered());
        assert!(registry.is_empty());

        let events = adapter.events();
        assert!(events.contains(&String::from("unexpose:enable")));
        assert!(events.contains(&String::from("unexpose:divider")));
        assert!(events.contains(&String::from("unexpose:source")));
        assert_eq!(events.last(), Some(&String::from("destroy:pmctrl")));
    }

    #[test]
    fn unregistering_an_unknown_bank_is_a_noop() {
        let registry = BankRegistry::new();
        let adapter = RecordingAdapter::new();
        let (bank, _state) = bank_at(0x4000_0000, Width::Word, three_fields());

        registry.unregister(&adapter, &bank);
        assert!(adapter.events().is_empty());
    }

    #[test]
    fn banks_snapshot_preserves_registration_order() {
        let registry = BankRegistry::new();
        let adapter = RecordingAdapter::new();

        let mut banks = Vec::new();
        for name in ["alpha", "beta", "gamma"] {
            let (fake, _state) = FakeRegister::new();
            let bank = Arc::new(RegisterBank::new(
                name,
                Width::Word,
                Box::new(fake),
                vec![FieldEntry::new("v", 0xF)],
            ));
            registry.register(&adapter, None, &bank).unwrap();
            banks.push(bank);
        }

        let snapshot = registry.banks();
        let names: Vec<&str> = snapshot.iter().map(|b| b.name()).collect();
        assert_eq!(names, vec!["alpha", "beta", "gamma"]);

        registry.unregister(&adapter, &banks[1]);
        let names: Vec<String> = registry
            .banks()
            .iter()
            .map(|b| String::from(b.name()))
            .collect();
        assert_eq!(names, vec!["alpha", "gamma"]);
    }
}
