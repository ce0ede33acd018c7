//! Indus Core -- recipe-driven industry production.
//!
//! Industries accumulate the commodities they accept and, according to their
//! type's supply mode, turn them into output commodities, optionally
//! amplified by a boost. Everything runs synchronously inside the call that
//! delivers cargo; there is no tick.
//!
//! # Supply Modes
//!
//! - **Convert** -- every evaluation consumes all present stock.
//! - **Assemble** -- waits until every input is present, then consumes the
//!   smallest common amount from each.
//! - **Boost** -- produces a fixed base amount per evaluation; stock only
//!   counts toward the boost threshold.
//!
//! # Key Types
//!
//! - [`engine::Engine`] -- owns the instance table; `accept_commodity` is the
//!   sole mutating entrypoint for cargo.
//! - [`catalog::IndustryCatalog`] -- immutable recipes, built through
//!   [`catalog::IndustryCatalogBuilder`] and shared by `Arc`.
//! - [`instance::IndustryTable`] -- handle-indexed instance slots.
//! - [`sink::DeliverySink`] -- where produced cargo goes.
//! - [`station::CargoLedger`] -- per-station cargo loads; a ready-made sink.
//! - [`commodity::CommodityCatalog`] -- display units for presentation.
//! - [`fixed::Fixed64`] -- Q32.32 amounts for deterministic math.

pub mod builtin;
pub mod catalog;
pub mod commodity;
pub mod engine;
pub mod fixed;
pub mod id;
pub mod instance;
pub mod sink;
pub mod station;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
