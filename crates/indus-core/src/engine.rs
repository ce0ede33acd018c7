//! The production engine: owns the industry instance table and turns
//! accepted cargo into output.
//!
//! # Call flow
//!
//! Everything happens inside [`Engine::accept_commodity`]:
//! 1. **Validate** -- handle, supply mode, accept slot, amount. Nothing is
//!    mutated until all checks pass.
//! 2. **Accumulate** -- add the amount to the slot and the running total.
//! 3. **Evaluate** -- snapshot the boost condition, run the supply mode,
//!    scale by the boost rate.
//! 4. **Distribute** -- credit each supply slot by its weight and offer the
//!    delta to the [`DeliverySink`], if one is installed.
//!
//! There is no tick and no deferred work; a call either fails without side
//! effects or completes the whole pass.

use crate::catalog::{IndustryCatalog, IndustryType, SupplyMode};
use crate::fixed::{Fixed64, saturating_mul_64};
use crate::id::{CommodityId, IndustryHandle, IndustryTypeId};
use crate::instance::{
    DEFAULT_MAX_INDUSTRIES, IndustryInstance, IndustryTable, ProductionState, TableError,
};
use crate::sink::DeliverySink;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace, warn};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Engine settings. Loaded from `engine.{ron,toml,json}` by `indus-data`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Upper bound on instance slots; spawning past it fails.
    pub max_industries: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_industries: DEFAULT_MAX_INDUSTRIES,
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why an engine call was refused. A refused call leaves every accumulator
/// untouched. "Not enough stock yet" is not an error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IndustryError {
    #[error("no industry exists with handle {0}")]
    IndustryNotFound(IndustryHandle),
    #[error("industry {0} has an unknown supply mode")]
    UnknownSupplyMode(IndustryHandle),
    #[error("industry {industry} has no accept slot {slot}")]
    UnknownAcceptSlot { industry: IndustryHandle, slot: usize },
    #[error("industry {industry} cannot accept a negative amount ({amount})")]
    InvalidAmount {
        industry: IndustryHandle,
        amount: Fixed64,
    },
    #[error("industry {industry} cannot stock {amount} more in slot {slot}")]
    StockOverflow {
        industry: IndustryHandle,
        slot: usize,
        amount: Fixed64,
    },
}

// ---------------------------------------------------------------------------
// Production result
// ---------------------------------------------------------------------------

/// Output credited to one supply slot by a production pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputDelta {
    pub slot: usize,
    pub commodity: CommodityId,
    pub amount: Fixed64,
    /// Whether the sink took it. If not, it is still in `produced[slot]`.
    pub delivered: bool,
}

/// The outcome of one production evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductionResult {
    /// Total production after boosting, before supply weights.
    pub production: Fixed64,
    pub boosted: bool,
    /// Stock removed from each accept slot, `(slot, amount)`.
    pub consumed: Vec<(usize, Fixed64)>,
    pub outputs: Vec<OutputDelta>,
}

impl ProductionResult {
    /// True when the pass produced nothing (not ready, or no stock).
    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }

    pub fn output_of(&self, commodity: CommodityId) -> Fixed64 {
        self.outputs
            .iter()
            .filter(|o| o.commodity == commodity)
            .fold(Fixed64::ZERO, |acc, o| acc + o.amount)
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Recipe-driven production engine.
pub struct Engine {
    catalog: Arc<IndustryCatalog>,
    table: IndustryTable,
    sink: Option<Box<dyn DeliverySink>>,
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("industry_types", &self.catalog.len())
            .field("table", &self.table)
            .field("has_sink", &self.sink.is_some())
            .finish()
    }
}

impl Engine {
    /// Create an engine over a frozen catalog. No sink is installed.
    pub fn new(catalog: Arc<IndustryCatalog>, config: &EngineConfig) -> Self {
        Self {
            catalog,
            table: IndustryTable::with_capacity(config.max_industries),
            sink: None,
        }
    }

    pub fn catalog(&self) -> &IndustryCatalog {
        &self.catalog
    }

    pub fn table(&self) -> &IndustryTable {
        &self.table
    }

    // -----------------------------------------------------------------------
    // Sink
    // -----------------------------------------------------------------------

    pub fn set_sink<S: DeliverySink + 'static>(&mut self, sink: S) {
        self.sink = Some(Box::new(sink));
    }

    /// Remove the sink. Output produced afterwards stays in the backlog.
    pub fn clear_sink(&mut self) -> Option<Box<dyn DeliverySink>> {
        self.sink.take()
    }

    pub fn has_sink(&self) -> bool {
        self.sink.is_some()
    }

    // -----------------------------------------------------------------------
    // Instance lifecycle
    // -----------------------------------------------------------------------

    /// Place a new instance of `type_id` into the table.
    pub fn spawn(&mut self, type_id: IndustryTypeId) -> Result<IndustryHandle, TableError> {
        let industry = self
            .catalog
            .get(type_id)
            .ok_or(TableError::UnknownIndustryType(type_id))?;
        let handle = self.table.spawn(type_id, industry)?;
        debug!(%handle, industry = %industry.name, "industry spawned");
        Ok(handle)
    }

    /// Vacate an instance slot, discarding its stock and backlog. The sink
    /// is told so it can forget the handle before the slot is reused.
    pub fn free(&mut self, handle: IndustryHandle) -> bool {
        if !self.table.free(handle) {
            return false;
        }
        if let Some(sink) = self.sink.as_deref_mut() {
            sink.release(handle);
        }
        debug!(%handle, "industry freed");
        true
    }

    pub fn instance(&self, handle: IndustryHandle) -> Option<&IndustryInstance> {
        self.table.get(handle)
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    /// Check that `handle` names a live instance with a known supply mode.
    /// Returns its type.
    pub fn validate(&self, handle: IndustryHandle) -> Result<&IndustryType, IndustryError> {
        lookup(&self.catalog, &self.table, handle)
    }

    /// [`validate`](Self::validate), then check `slot` against the type's
    /// accept list.
    pub fn validate_accept_slot(
        &self,
        handle: IndustryHandle,
        slot: usize,
    ) -> Result<&IndustryType, IndustryError> {
        let industry = self.validate(handle)?;
        if slot >= industry.accepts.len() {
            return Err(IndustryError::UnknownAcceptSlot {
                industry: handle,
                slot,
            });
        }
        Ok(industry)
    }

    // -----------------------------------------------------------------------
    // Accept entrypoint
    // -----------------------------------------------------------------------

    /// Deposit `amount` Cargo Units into accept slot `slot`, then run a
    /// production pass. Stock is unbounded.
    pub fn accept_commodity(
        &mut self,
        handle: IndustryHandle,
        slot: usize,
        amount: Fixed64,
    ) -> Result<(), IndustryError> {
        self.try_accept(handle, slot, amount)
            .inspect_err(|e| warn!(%handle, slot, error = %e, "cargo refused"))?;
        self.evaluate(handle)?;
        Ok(())
    }

    fn try_accept(
        &mut self,
        handle: IndustryHandle,
        slot: usize,
        amount: Fixed64,
    ) -> Result<(), IndustryError> {
        self.validate_accept_slot(handle, slot)?;
        if amount.is_negative() {
            return Err(IndustryError::InvalidAmount {
                industry: handle,
                amount,
            });
        }

        let inst = self
            .table
            .get_mut(handle)
            .ok_or(IndustryError::IndustryNotFound(handle))?;
        let overflow = IndustryError::StockOverflow {
            industry: handle,
            slot,
            amount,
        };
        let stock = inst.material[slot].checked_add(amount).ok_or_else(|| overflow.clone())?;
        let total = inst.material_total.checked_add(amount).ok_or(overflow)?;
        inst.material[slot] = stock;
        inst.material_total = total;
        inst.state = ProductionState::Accumulating;
        trace!(%handle, slot, %amount, "cargo accepted");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Production
    // -----------------------------------------------------------------------

    /// Whether the next production pass would be boosted, judged on the
    /// current (pre-consumption) stock.
    pub fn is_boosted(&self, handle: IndustryHandle) -> Result<bool, IndustryError> {
        let industry = self.validate(handle)?;
        let inst = self
            .table
            .get(handle)
            .ok_or(IndustryError::IndustryNotFound(handle))?;
        Ok(boost_condition(industry, &inst.material, inst.material_total))
    }

    /// Run one production pass on an instance and distribute the output.
    ///
    /// Convert and Assemble passes are idempotent without new deposits: the
    /// second call finds no stock (or an empty slot) and produces nothing.
    /// Boost produces its base amount on every call.
    pub fn evaluate(&mut self, handle: IndustryHandle) -> Result<ProductionResult, IndustryError> {
        let industry = lookup(&self.catalog, &self.table, handle)
            .inspect_err(|e| warn!(%handle, error = %e, "evaluation refused"))?;
        let inst = self
            .table
            .get_mut(handle)
            .ok_or(IndustryError::IndustryNotFound(handle))?;

        let Some(mut result) = run_supply_mode(industry, inst) else {
            trace!(%handle, "not ready");
            return Ok(ProductionResult::default());
        };

        if result.production == Fixed64::ZERO {
            trace!(%handle, "nothing produced");
            return Ok(result);
        }

        for (slot, supply) in industry.supplies.iter().enumerate() {
            let amount = saturating_mul_64(result.production, supply.weight);
            if amount == Fixed64::ZERO {
                continue;
            }
            inst.produced[slot] = inst.produced[slot].saturating_add(amount);

            let delivered = match self.sink.as_deref_mut() {
                Some(sink) => sink.deposit(supply.commodity, handle, amount),
                None => false,
            };
            if delivered {
                inst.produced[slot] -= amount;
            }

            result.outputs.push(OutputDelta {
                slot,
                commodity: supply.commodity,
                amount,
                delivered,
            });
        }

        debug!(
            %handle,
            industry = %industry.name,
            production = %result.production,
            boosted = result.boosted,
            "production pass"
        );
        Ok(result)
    }

    /// Offer an instance's whole backlog to the sink. Returns the total the
    /// sink took. Without a sink nothing moves.
    pub fn deliver_backlog(&mut self, handle: IndustryHandle) -> Result<Fixed64, IndustryError> {
        let industry = lookup(&self.catalog, &self.table, handle)?;
        let inst = self
            .table
            .get_mut(handle)
            .ok_or(IndustryError::IndustryNotFound(handle))?;
        let Some(sink) = self.sink.as_deref_mut() else {
            return Ok(Fixed64::ZERO);
        };

        let mut total = Fixed64::ZERO;
        for (slot, supply) in industry.supplies.iter().enumerate() {
            let pending = inst.produced[slot];
            if pending > Fixed64::ZERO && sink.deposit(supply.commodity, handle, pending) {
                inst.produced[slot] = Fixed64::ZERO;
                total = total.saturating_add(pending);
            }
        }
        Ok(total)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn lookup<'c>(
    catalog: &'c IndustryCatalog,
    table: &IndustryTable,
    handle: IndustryHandle,
) -> Result<&'c IndustryType, IndustryError> {
    let industry = table
        .get(handle)
        .and_then(IndustryInstance::type_id)
        .and_then(|id| catalog.get(id))
        .ok_or(IndustryError::IndustryNotFound(handle))?;
    if !industry.supply_mode.is_known() {
        return Err(IndustryError::UnknownSupplyMode(handle));
    }
    Ok(industry)
}

/// The boost condition on a stock snapshot. A zero boost rate means the
/// type has no boost.
fn boost_condition(industry: &IndustryType, material: &[Fixed64], material_total: Fixed64) -> bool {
    if industry.boost_rate == Fixed64::ZERO {
        return false;
    }
    match industry.supply_mode {
        SupplyMode::Convert | SupplyMode::Assemble => {
            !material.is_empty() && material.iter().all(|m| *m != Fixed64::ZERO)
        }
        SupplyMode::Boost => material_total >= industry.boost_threshold,
        SupplyMode::Unknown => false,
    }
}

/// Consume stock according to the supply mode. `None` when an Assemble
/// industry is missing an input. The boost flag is taken from the stock as it
/// was before consumption.
fn run_supply_mode(industry: &IndustryType, inst: &mut IndustryInstance) -> Option<ProductionResult> {
    let boosted = boost_condition(industry, &inst.material, inst.material_total);
    let mut result = ProductionResult {
        boosted,
        ..ProductionResult::default()
    };

    let base = match industry.supply_mode {
        SupplyMode::Assemble => {
            if inst.material.is_empty() || inst.material.iter().any(|m| *m <= Fixed64::ZERO) {
                return None;
            }
            let spend = inst.material.iter().copied().min()?;
            for (slot, m) in inst.material.iter_mut().enumerate() {
                *m -= spend;
                result.consumed.push((slot, spend));
            }
            saturating_mul_64(spend, Fixed64::from_num(inst.material.len()))
        }
        SupplyMode::Convert => {
            let mut total = Fixed64::ZERO;
            for (slot, m) in inst.material.iter_mut().enumerate() {
                if *m == Fixed64::ZERO {
                    continue;
                }
                total = total.saturating_add(*m);
                result.consumed.push((slot, *m));
                *m = Fixed64::ZERO;
            }
            total
        }
        SupplyMode::Boost => industry.base_production,
        SupplyMode::Unknown => return None,
    };

    result.production = if boosted {
        saturating_mul_64(base, industry.boost_rate)
    } else {
        base
    };
    Some(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::IndustryCatalogBuilder;
    use crate::commodity::{CommodityCatalog, CommodityDef};
    use crate::sink::{Delivery, RejectingSink};
    use crate::station::CargoLedger;
    use crate::test_utils::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    const X: CommodityId = CommodityId(0);
    const Y: CommodityId = CommodityId(1);
    const Z: CommodityId = CommodityId(2);

    fn commodities() -> CommodityCatalog {
        CommodityCatalog::new(vec![
            CommodityDef::new("X", "l", 512),
            CommodityDef::new("Y", "l", 512),
            CommodityDef::new("Z", "l", 512),
        ])
        .unwrap()
    }

    fn engine_with(types: Vec<IndustryType>) -> Engine {
        let mut builder = IndustryCatalogBuilder::new();
        for t in types {
            builder.register(t);
        }
        let catalog = builder.build(&commodities()).unwrap();
        Engine::new(Arc::new(catalog), &EngineConfig::default())
    }

    fn converter(boost_rate: f64) -> IndustryType {
        IndustryType::new("Converter", SupplyMode::Convert)
            .boost(fixed(boost_rate), fixed(0.0))
            .accept(X, fixed(1.0))
            .supply(Y, fixed(0.2))
    }

    fn two_input_converter() -> IndustryType {
        IndustryType::new("Two Input", SupplyMode::Convert)
            .boost(fixed(2.0), fixed(0.0))
            .accept(X, fixed(1.0))
            .accept(Y, fixed(1.0))
            .supply(Z, fixed(0.5))
    }

    fn assembler() -> IndustryType {
        IndustryType::new("Assembler", SupplyMode::Assemble)
            .boost(fixed(2.5), fixed(0.0))
            .accept(X, fixed(0.5))
            .accept(Y, fixed(1.25))
            .supply(Z, fixed(0.8))
    }

    fn booster() -> IndustryType {
        IndustryType::new("Fields", SupplyMode::Boost)
            .base_production(fixed(12.0))
            .boost(fixed(3.0), fixed(20.0))
            .accept(X, fixed(1.0))
            .supply(Y, fixed(5.0))
    }

    // -----------------------------------------------------------------------
    // Convert
    // -----------------------------------------------------------------------

    #[test]
    fn single_slot_convert_is_boosted_from_snapshot() {
        let mut engine = engine_with(vec![converter(3.0)]);
        let h = engine.spawn(IndustryTypeId(0)).unwrap();

        engine.accept_commodity(h, 0, fixed(100.0)).unwrap();

        let inst = engine.instance(h).unwrap();
        assert_eq!(inst.material(0), Some(Fixed64::ZERO));
        assert_close(inst.produced(0).unwrap(), 60.0);
    }

    #[test]
    fn zero_boost_rate_means_no_boost() {
        let mut engine = engine_with(vec![converter(0.0)]);
        let h = engine.spawn(IndustryTypeId(0)).unwrap();

        engine.accept_commodity(h, 0, fixed(100.0)).unwrap();

        assert_close(engine.instance(h).unwrap().produced(0).unwrap(), 20.0);
    }

    #[test]
    fn convert_partial_stock_is_consumed_unboosted() {
        let mut engine = engine_with(vec![two_input_converter()]);
        let h = engine.spawn(IndustryTypeId(0)).unwrap();

        engine.accept_commodity(h, 0, fixed(40.0)).unwrap();

        let inst = engine.instance(h).unwrap();
        assert_eq!(inst.materials(), &[Fixed64::ZERO, Fixed64::ZERO]);
        assert_close(inst.produced(0).unwrap(), 20.0);
    }

    #[test]
    fn convert_second_evaluation_produces_nothing() {
        let mut engine = engine_with(vec![converter(3.0)]);
        let h = engine.spawn(IndustryTypeId(0)).unwrap();
        engine.accept_commodity(h, 0, fixed(10.0)).unwrap();
        let before = engine.instance(h).unwrap().clone();

        let result = engine.evaluate(h).unwrap();

        assert!(result.is_empty());
        assert!(!result.boosted);
        assert_eq!(engine.instance(h).unwrap(), &before);
    }

    // -----------------------------------------------------------------------
    // Assemble
    // -----------------------------------------------------------------------

    #[test]
    fn assemble_waits_for_every_input() {
        let mut engine = engine_with(vec![assembler()]);
        let h = engine.spawn(IndustryTypeId(0)).unwrap();

        engine.accept_commodity(h, 0, fixed(30.0)).unwrap();

        let inst = engine.instance(h).unwrap();
        assert_eq!(inst.material(0), Some(fixed(30.0)));
        assert_eq!(inst.material(1), Some(Fixed64::ZERO));
        assert_eq!(inst.produced(0), Some(Fixed64::ZERO));
        assert_eq!(inst.state(), ProductionState::Accumulating);
    }

    #[test]
    fn assemble_spends_the_minimum_from_every_slot() {
        let mut engine = engine_with(vec![assembler()]);
        let h = engine.spawn(IndustryTypeId(0)).unwrap();

        engine.accept_commodity(h, 0, fixed(30.0)).unwrap();
        engine.accept_commodity(h, 1, fixed(12.0)).unwrap();

        let inst = engine.instance(h).unwrap();
        assert_eq!(inst.material(0), Some(fixed(18.0)));
        assert_eq!(inst.material(1), Some(Fixed64::ZERO));
        // 12 spent from each of 2 slots = 24, boosted x2.5 = 60, x0.8 weight = 48.
        assert_close(inst.produced(0).unwrap(), 48.0);
    }

    #[test]
    fn assemble_does_not_fall_through_into_convert() {
        let mut engine = engine_with(vec![assembler()]);
        let h = engine.spawn(IndustryTypeId(0)).unwrap();
        engine.accept_commodity(h, 0, fixed(30.0)).unwrap();
        engine.accept_commodity(h, 1, fixed(12.0)).unwrap();

        // The leftover 18 in slot 0 must stay put.
        let result = engine.evaluate(h).unwrap();
        assert!(result.is_empty());
        assert_eq!(engine.instance(h).unwrap().material(0), Some(fixed(18.0)));
    }

    #[test]
    fn assemble_runs_again_when_the_short_input_is_topped_up() {
        let mut engine = engine_with(vec![assembler()]);
        let h = engine.spawn(IndustryTypeId(0)).unwrap();
        engine.accept_commodity(h, 0, fixed(5.0)).unwrap();
        engine.accept_commodity(h, 1, fixed(7.0)).unwrap();
        assert_eq!(engine.instance(h).unwrap().materials(), &[fixed(0.0), fixed(2.0)]);

        engine.accept_commodity(h, 0, fixed(3.0)).unwrap();

        let inst = engine.instance(h).unwrap();
        assert_eq!(inst.materials(), &[fixed(1.0), fixed(0.0)]);
        // (5 + 5) and then (2 + 2), each x2.5 boost and x0.8 weight.
        assert_close(inst.produced(0).unwrap(), 28.0);
    }

    // -----------------------------------------------------------------------
    // Boost
    // -----------------------------------------------------------------------

    #[test]
    fn boost_produces_base_without_stock() {
        let mut engine = engine_with(vec![booster()]);
        let h = engine.spawn(IndustryTypeId(0)).unwrap();

        for _ in 0..3 {
            let result = engine.evaluate(h).unwrap();
            assert_eq!(result.production, fixed(12.0));
            assert!(!result.boosted);
        }
        let inst = engine.instance(h).unwrap();
        assert_eq!(inst.produced(0), Some(fixed(180.0)));
        assert_eq!(inst.state(), ProductionState::Idle);
    }

    #[test]
    fn boost_engages_at_threshold_and_keeps_stock() {
        let mut engine = engine_with(vec![booster()]);
        let h = engine.spawn(IndustryTypeId(0)).unwrap();

        engine.accept_commodity(h, 0, fixed(19.0)).unwrap();
        assert!(!engine.is_boosted(h).unwrap());
        assert_eq!(engine.instance(h).unwrap().produced(0), Some(fixed(60.0)));

        engine.accept_commodity(h, 0, fixed(1.0)).unwrap();
        assert!(engine.is_boosted(h).unwrap());
        // 60 from the first pass + 12 * 3 * 5 = 180.
        assert_eq!(engine.instance(h).unwrap().produced(0), Some(fixed(240.0)));
        assert_eq!(engine.instance(h).unwrap().material(0), Some(fixed(20.0)));
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    #[test]
    fn out_of_range_handle_is_not_found() {
        let mut engine = engine_with(vec![converter(3.0)]);
        engine.spawn(IndustryTypeId(0)).unwrap();
        let before = engine.table().clone();

        let err = engine
            .accept_commodity(IndustryHandle(5), 0, fixed(1.0))
            .unwrap_err();

        assert_eq!(err, IndustryError::IndustryNotFound(IndustryHandle(5)));
        assert_eq!(engine.table(), &before);
    }

    #[test]
    fn freed_handle_is_not_found() {
        let mut engine = engine_with(vec![converter(3.0)]);
        let h = engine.spawn(IndustryTypeId(0)).unwrap();
        assert!(engine.free(h));
        assert_eq!(engine.validate(h).unwrap_err(), IndustryError::IndustryNotFound(h));
        assert_eq!(engine.evaluate(h).unwrap_err(), IndustryError::IndustryNotFound(h));
    }

    #[test]
    fn bad_slot_is_rejected_without_mutation() {
        let mut engine = engine_with(vec![two_input_converter()]);
        let h = engine.spawn(IndustryTypeId(0)).unwrap();
        let before = engine.table().clone();

        let err = engine.accept_commodity(h, 2, fixed(1.0)).unwrap_err();

        assert_eq!(err, IndustryError::UnknownAcceptSlot { industry: h, slot: 2 });
        assert_eq!(engine.table(), &before);
    }

    #[test]
    fn negative_amount_is_rejected_without_mutation() {
        let mut engine = engine_with(vec![assembler()]);
        let h = engine.spawn(IndustryTypeId(0)).unwrap();
        engine.accept_commodity(h, 0, fixed(4.0)).unwrap();
        let before = engine.table().clone();

        let err = engine.accept_commodity(h, 0, fixed(-1.0)).unwrap_err();

        assert!(matches!(err, IndustryError::InvalidAmount { industry, .. } if industry == h));
        assert_eq!(engine.table(), &before);
    }

    #[test]
    fn slot_is_checked_before_amount() {
        let mut engine = engine_with(vec![converter(1.0)]);
        let h = engine.spawn(IndustryTypeId(0)).unwrap();
        let err = engine.accept_commodity(h, 7, fixed(-1.0)).unwrap_err();
        assert_eq!(err, IndustryError::UnknownAcceptSlot { industry: h, slot: 7 });
    }

    #[test]
    fn unknown_supply_mode_is_refused() {
        let mut engine = engine_with(vec![
            IndustryType::new("Portal", SupplyMode::Unknown)
                .accept(X, fixed(1.0))
                .supply(Y, fixed(1.0)),
        ]);
        let h = engine.spawn(IndustryTypeId(0)).unwrap();
        let before = engine.table().clone();

        assert_eq!(
            engine.accept_commodity(h, 0, fixed(5.0)).unwrap_err(),
            IndustryError::UnknownSupplyMode(h)
        );
        assert_eq!(engine.is_boosted(h).unwrap_err(), IndustryError::UnknownSupplyMode(h));
        assert_eq!(engine.table(), &before);
    }

    #[test]
    fn overflowing_deposit_is_refused_without_mutation() {
        let mut engine = engine_with(vec![assembler()]);
        let h = engine.spawn(IndustryTypeId(0)).unwrap();
        engine.accept_commodity(h, 0, fixed(1e9)).unwrap();
        engine.accept_commodity(h, 0, fixed(1e9)).unwrap();
        let before = engine.table().clone();

        let err = engine.accept_commodity(h, 0, fixed(1e9)).unwrap_err();

        assert_eq!(
            err,
            IndustryError::StockOverflow {
                industry: h,
                slot: 0,
                amount: fixed(1e9),
            }
        );
        assert_eq!(engine.table(), &before);
        assert_eq!(engine.instance(h).unwrap().material(0), Some(fixed(2e9)));
    }

    #[test]
    fn running_total_overflow_is_refused() {
        // Convert empties the slot each pass, so only the total can overflow.
        let mut engine = engine_with(vec![converter(1.0)]);
        let h = engine.spawn(IndustryTypeId(0)).unwrap();
        engine.accept_commodity(h, 0, fixed(2e9)).unwrap();
        let before = engine.table().clone();

        assert!(matches!(
            engine.accept_commodity(h, 0, fixed(2e9)),
            Err(IndustryError::StockOverflow { slot: 0, .. })
        ));
        assert_eq!(engine.table(), &before);
    }

    #[test]
    fn zero_deposit_moves_to_accumulating() {
        let mut engine = engine_with(vec![assembler()]);
        let h = engine.spawn(IndustryTypeId(0)).unwrap();
        assert_eq!(engine.instance(h).unwrap().state(), ProductionState::Idle);
        engine.accept_commodity(h, 1, Fixed64::ZERO).unwrap();
        assert_eq!(engine.instance(h).unwrap().state(), ProductionState::Accumulating);
    }

    #[test]
    fn spawn_unknown_type_fails() {
        let mut engine = engine_with(vec![converter(1.0)]);
        assert_eq!(
            engine.spawn(IndustryTypeId(4)).unwrap_err(),
            TableError::UnknownIndustryType(IndustryTypeId(4))
        );
    }

    #[test]
    fn spawn_respects_configured_capacity() {
        let mut builder = IndustryCatalogBuilder::new();
        builder.register(converter(1.0));
        let catalog = Arc::new(builder.build(&commodities()).unwrap());
        let mut engine = Engine::new(catalog, &EngineConfig { max_industries: 1 });

        engine.spawn(IndustryTypeId(0)).unwrap();
        assert_eq!(
            engine.spawn(IndustryTypeId(0)).unwrap_err(),
            TableError::CapacityExceeded { capacity: 1 }
        );
    }

    // -----------------------------------------------------------------------
    // Delivery
    // -----------------------------------------------------------------------

    #[test]
    fn sink_receives_each_nonzero_output() {
        let mut engine = engine_with(vec![converter(3.0)]);
        let h = engine.spawn(IndustryTypeId(0)).unwrap();
        let log = Rc::new(RefCell::new(Vec::<Delivery>::new()));
        engine.set_sink(Rc::clone(&log));

        engine.accept_commodity(h, 0, fixed(100.0)).unwrap();

        let log = log.borrow();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].commodity, Y);
        assert_eq!(log[0].origin, h);
        assert_close(log[0].amount, 60.0);
        // Taken by the sink, so nothing is left in the backlog.
        assert_eq!(engine.instance(h).unwrap().produced(0), Some(Fixed64::ZERO));
    }

    #[test]
    fn declined_output_stays_in_backlog() {
        let mut engine = engine_with(vec![converter(1.0)]);
        let h = engine.spawn(IndustryTypeId(0)).unwrap();
        engine.set_sink(RejectingSink);

        engine.accept_commodity(h, 0, fixed(50.0)).unwrap();

        assert_close(engine.instance(h).unwrap().produced(0).unwrap(), 10.0);
    }

    #[test]
    fn free_releases_the_handle_in_the_sink() {
        let mut engine = engine_with(vec![converter(1.0)]);
        let ledger = Rc::new(RefCell::new(CargoLedger::new()));
        let depot = ledger.borrow_mut().add_station("Depot");
        engine.set_sink(Rc::clone(&ledger));

        let old = engine.spawn(IndustryTypeId(0)).unwrap();
        ledger.borrow_mut().link_industry(old, depot).unwrap();
        assert!(engine.free(old));
        let reused = engine.spawn(IndustryTypeId(0)).unwrap();
        assert_eq!(reused, old);

        engine.accept_commodity(reused, 0, fixed(100.0)).unwrap();

        assert_eq!(ledger.borrow().linked_station(reused), None);
        assert!(ledger.borrow().station(depot).unwrap().loads().is_empty());
        assert_close(engine.instance(reused).unwrap().produced(0).unwrap(), 20.0);
    }

    #[test]
    fn backlog_is_delivered_once_a_sink_appears() {
        let mut engine = engine_with(vec![converter(1.0)]);
        let h = engine.spawn(IndustryTypeId(0)).unwrap();
        engine.accept_commodity(h, 0, fixed(50.0)).unwrap();
        engine.accept_commodity(h, 0, fixed(50.0)).unwrap();
        assert_eq!(engine.deliver_backlog(h).unwrap(), Fixed64::ZERO);

        let log = Rc::new(RefCell::new(Vec::<Delivery>::new()));
        engine.set_sink(Rc::clone(&log));
        let delivered = engine.deliver_backlog(h).unwrap();

        assert_close(delivered, 20.0);
        assert_eq!(log.borrow().len(), 1);
        assert_eq!(engine.instance(h).unwrap().produced(0), Some(Fixed64::ZERO));
    }
}
