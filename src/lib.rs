//! # regbank
//!
//! Named, permission-controlled bitfield access over memory-mapped
//! hardware registers. A driver describes a register bank declaratively
//! (register location, access width, a list of named bitfields with
//! masks and permissions) and this crate supplies the read-modify-write
//! machinery, the concurrency discipline, and the registration
//! lifecycle that makes each field individually addressable.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        BankRegistry                          │
//! │  RwLock ─ set of live banks, insertion order preserved       │
//! └──────────────┬───────────────────────────────────────────────┘
//!                │ register / unregister (rollback on failure)
//! ┌──────────────▼───────────────────────────────────────────────┐
//! │                        RegisterBank                          │
//! │  RwLock ─ one hardware register, width 1/2/4 B               │
//! │  ├─ FieldEntry "enable"  mask 0x0000_0001  rw                │
//! │  ├─ FieldEntry "divider" mask 0x0000_FF00  rw                │
//! │  └─ FieldEntry "status"  mask 0x000F_0000  ro                │
//! └──────────────┬───────────────────────────────────────────────┘
//!                │ get / set (masked read-modify-write)
//! ┌──────────────▼───────────────────────────────────────────────┐
//! │              RegisterAccess (MmioRegister)                   │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Fields become user-visible through an [`ExposureAdapter`] supplied
//! by the host environment; the core hands it one permission-checked
//! [`FieldHandle`] per non-reserved field and otherwise stays ignorant
//! of how values reach users.
//!
//! ## Example
//!
//! ```
//! use regbank::{FieldEntry, RegisterBank, Width};
//!
//! # struct Loopback(core::cell::Cell<u32>);
//! # unsafe impl Sync for Loopback {}
//! # impl regbank::RegisterAccess for Loopback {
//! #     fn address(&self) -> usize { 0x4000_0000 }
//! #     fn read(&self, _w: Width) -> u32 { self.0.get() }
//! #     fn write(&mut self, _w: Width, v: u32) { self.0.set(v) }
//! # }
//! # let io = Box::new(Loopback(core::cell::Cell::new(0)));
//! let bank = RegisterBank::new(
//!     "pmctrl",
//!     Width::Word,
//!     io,
//!     vec![
//!         FieldEntry::new("enable", 0x0000_0001),
//!         FieldEntry::new("divider", 0x0000_FF00),
//!     ],
//! );
//!
//! let divider = bank.field("divider").unwrap();
//! bank.set(divider, 0x2A)?;
//! assert_eq!(bank.get(divider)?, 0x2A);
//! # Ok::<(), regbank::Error>(())
//! ```

#![no_std]

extern crate alloc;

#[cfg(test)]
extern crate std;

pub mod access;
pub mod bank;
pub mod error;
pub mod expose;
pub mod field;
pub mod registry;
pub mod text;

pub use access::{MmioRegister, RegisterAccess, Width};
pub use bank::RegisterBank;
pub use error::{Error, Result};
pub use expose::{ExposureAdapter, FieldHandle, Presentation};
pub use field::{Access, FieldEntry};
pub use registry::BankRegistry;
