//! Shared test helpers for unit tests, integration tests and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]`.

use crate::builtin;
use crate::catalog::IndustryCatalog;
use crate::commodity::CommodityCatalog;
use crate::engine::{Engine, EngineConfig};
use crate::fixed::{Fixed64, fixed64_to_f64};
use crate::id::{IndustryHandle, IndustryTypeId};
use std::sync::Arc;

/// Tolerance for comparing fixed-point results against decimal literals.
/// Weights like 0.2 are not exact in Q32.32.
pub const EPSILON: f64 = 1e-6;

pub fn fixed(v: f64) -> Fixed64 {
    Fixed64::from_num(v)
}

#[track_caller]
pub fn assert_close(actual: Fixed64, expected: f64) {
    let actual = fixed64_to_f64(actual);
    assert!(
        (actual - expected).abs() < EPSILON,
        "expected {expected}, got {actual}"
    );
}

pub fn builtin_commodities() -> CommodityCatalog {
    builtin::commodities().expect("builtin commodities are valid")
}

pub fn builtin_industries() -> Arc<IndustryCatalog> {
    let commodities = builtin_commodities();
    Arc::new(builtin::industries(&commodities).expect("builtin industries are valid"))
}

/// Engine over the stock catalog with default config and no sink.
pub fn builtin_engine() -> Engine {
    Engine::new(builtin_industries(), &EngineConfig::default())
}

pub fn type_named(engine: &Engine, name: &str) -> IndustryTypeId {
    engine
        .catalog()
        .id_by_name(name)
        .unwrap_or_else(|| panic!("no industry type named {name}"))
}

/// Spawn one instance of the named stock type.
pub fn spawn_named(engine: &mut Engine, name: &str) -> IndustryHandle {
    let id = type_named(engine, name);
    engine.spawn(id).expect("spawn")
}
