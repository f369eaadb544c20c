//! Dependency-ordered unit loading.
//!
//! A unit is a loadable slice of the application that declares which other
//! units must be loaded before it. The loader computes a deterministic total
//! order over the declared graph and drives the caller's load callbacks
//! through it, one unit at a time.
//!
//! Two reserved units, [`CORE_UNIT`] and [`BOOTSTRAP_UNIT`], are always
//! placed first; every other unit implicitly depends on them and must not
//! name them in its `depends` list.

mod loader;
mod unit;

pub use loader::{LoadError, Loader, UnitHost};
pub use unit::{BOOTSTRAP_UNIT, CORE_UNIT, RESERVED_UNITS, Unit};
