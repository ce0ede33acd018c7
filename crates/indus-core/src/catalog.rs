//! Industry type catalog: the immutable recipes every industry instance runs.
//!
//! A catalog is assembled through [`IndustryCatalogBuilder`] (register, then
//! optionally mutate by name, then build). `build` validates every type
//! against the commodity catalog and freezes the result; after that the
//! catalog is shared read-only (usually behind an `Arc`).

use crate::commodity::CommodityCatalog;
use crate::fixed::Fixed64;
use crate::id::{CommodityId, IndustryTypeId};
use std::collections::{HashMap, HashSet};

/// Maximum number of accept or supply slots on one industry type.
pub const MAX_SLOTS: usize = 4;

/// How an industry turns its stock into output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SupplyMode {
    /// Consumes all present stock on every evaluation.
    Convert,
    /// Requires every input; consumes the smallest common amount.
    Assemble,
    /// Produces a fixed base amount regardless of stock.
    Boost,
    /// A mode named by content this build does not understand. Instances of
    /// such a type exist but every engine operation on them is refused.
    Unknown,
}

impl SupplyMode {
    /// Parse a mode name as written in data files. Unrecognised names map to
    /// [`SupplyMode::Unknown`] rather than failing the whole load.
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "convert" => SupplyMode::Convert,
            "assemble" => SupplyMode::Assemble,
            "boost" => SupplyMode::Boost,
            _ => SupplyMode::Unknown,
        }
    }

    pub fn is_known(self) -> bool {
        self != SupplyMode::Unknown
    }
}

/// One positional entry of an accept or supply list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub commodity: CommodityId,
    /// For supplies: output multiplier. For accepts: reserved, not used by
    /// production math.
    pub weight: Fixed64,
}

/// An industry type (recipe) definition.
#[derive(Debug, Clone, PartialEq)]
pub struct IndustryType {
    pub name: String,
    pub supply_mode: SupplyMode,
    /// Output per evaluation in Boost mode.
    pub base_production: Fixed64,
    pub boost_rate: Fixed64,
    /// Boost mode only: total intake at which the boost engages.
    pub boost_threshold: Fixed64,
    /// Placement radius. Read by placement code only.
    pub reach: Fixed64,
    pub accepts: Vec<Slot>,
    pub supplies: Vec<Slot>,
}

impl IndustryType {
    pub fn new(name: &str, supply_mode: SupplyMode) -> Self {
        Self {
            name: name.to_string(),
            supply_mode,
            base_production: Fixed64::ZERO,
            boost_rate: Fixed64::ZERO,
            boost_threshold: Fixed64::ZERO,
            reach: Fixed64::ZERO,
            accepts: Vec::new(),
            supplies: Vec::new(),
        }
    }

    pub fn base_production(mut self, amount: Fixed64) -> Self {
        self.base_production = amount;
        self
    }

    pub fn boost(mut self, rate: Fixed64, threshold: Fixed64) -> Self {
        self.boost_rate = rate;
        self.boost_threshold = threshold;
        self
    }

    pub fn reach(mut self, reach: Fixed64) -> Self {
        self.reach = reach;
        self
    }

    pub fn accept(mut self, commodity: CommodityId, weight: Fixed64) -> Self {
        self.accepts.push(Slot { commodity, weight });
        self
    }

    pub fn supply(mut self, commodity: CommodityId, weight: Fixed64) -> Self {
        self.supplies.push(Slot { commodity, weight });
        self
    }

    /// Name of the first parameter or slot weight below zero.
    fn negative_field(&self) -> Option<&'static str> {
        let scalars = [
            ("base_production", self.base_production),
            ("boost_rate", self.boost_rate),
            ("boost_threshold", self.boost_threshold),
            ("reach", self.reach),
        ];
        if let Some((field, _)) = scalars.into_iter().find(|(_, v)| v.is_negative()) {
            return Some(field);
        }
        if self.accepts.iter().any(|s| s.weight.is_negative()) {
            return Some("accept weight");
        }
        if self.supplies.iter().any(|s| s.weight.is_negative()) {
            return Some("supply weight");
        }
        None
    }

    /// Position of the first accept slot taking `commodity`.
    pub fn accept_slot_for(&self, commodity: CommodityId) -> Option<usize> {
        self.accepts.iter().position(|s| s.commodity == commodity)
    }
}

/// Errors raised while assembling a catalog.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("duplicate name: {0}")]
    DuplicateName(String),
    #[error("industry '{industry}' has {count} {kind} slots (max {MAX_SLOTS})")]
    TooManySlots {
        industry: String,
        kind: &'static str,
        count: usize,
    },
    #[error("industry '{industry}' references unknown commodity {commodity:?}")]
    UnknownCommodity {
        industry: String,
        commodity: CommodityId,
    },
    #[error("industry '{industry}' has a negative {field}")]
    NegativeValue {
        industry: String,
        field: &'static str,
    },
}

/// Builder for constructing an immutable [`IndustryCatalog`].
#[derive(Debug, Default)]
pub struct IndustryCatalogBuilder {
    types: Vec<IndustryType>,
    name_to_id: HashMap<String, IndustryTypeId>,
}

impl IndustryCatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an industry type. Returns its ID. A later registration with
    /// the same name is reported by `build`.
    pub fn register(&mut self, industry: IndustryType) -> IndustryTypeId {
        let id = IndustryTypeId(self.types.len() as u32);
        self.name_to_id.entry(industry.name.clone()).or_insert(id);
        self.types.push(industry);
        id
    }

    /// Mutate an already registered type by name.
    pub fn mutate<F>(&mut self, name: &str, f: F) -> Result<(), CatalogError>
    where
        F: FnOnce(&mut IndustryType),
    {
        let id = self
            .name_to_id
            .get(name)
            .ok_or_else(|| CatalogError::NotFound(name.to_string()))?;
        f(&mut self.types[id.0 as usize]);
        Ok(())
    }

    pub fn id_by_name(&self, name: &str) -> Option<IndustryTypeId> {
        self.name_to_id.get(name).copied()
    }

    /// Validate against `commodities` and freeze.
    pub fn build(self, commodities: &CommodityCatalog) -> Result<IndustryCatalog, CatalogError> {
        let mut seen: HashSet<&str> = HashSet::with_capacity(self.types.len());
        for industry in &self.types {
            if !seen.insert(industry.name.as_str()) {
                return Err(CatalogError::DuplicateName(industry.name.clone()));
            }
            if let Some(field) = industry.negative_field() {
                return Err(CatalogError::NegativeValue {
                    industry: industry.name.clone(),
                    field,
                });
            }
            for (kind, slots) in [("accept", &industry.accepts), ("supply", &industry.supplies)] {
                if slots.len() > MAX_SLOTS {
                    return Err(CatalogError::TooManySlots {
                        industry: industry.name.clone(),
                        kind,
                        count: slots.len(),
                    });
                }
                if let Some(bad) = slots.iter().find(|s| !commodities.contains(s.commodity)) {
                    return Err(CatalogError::UnknownCommodity {
                        industry: industry.name.clone(),
                        commodity: bad.commodity,
                    });
                }
            }
        }

        Ok(IndustryCatalog {
            types: self.types,
            name_to_id: self.name_to_id,
        })
    }
}

/// Immutable industry catalog. Frozen after build(). Thread-safe to share.
#[derive(Debug, Clone)]
pub struct IndustryCatalog {
    types: Vec<IndustryType>,
    name_to_id: HashMap<String, IndustryTypeId>,
}

impl IndustryCatalog {
    pub fn get(&self, id: IndustryTypeId) -> Option<&IndustryType> {
        self.types.get(id.0 as usize)
    }

    pub fn id_by_name(&self, name: &str) -> Option<IndustryTypeId> {
        self.name_to_id.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (IndustryTypeId, &IndustryType)> {
        self.types
            .iter()
            .enumerate()
            .map(|(i, t)| (IndustryTypeId(i as u32), t))
    }

    /// Types that accept `commodity` in any slot.
    pub fn consumers_of(&self, commodity: CommodityId) -> impl Iterator<Item = IndustryTypeId> + '_ {
        self.iter()
            .filter(move |(_, t)| t.accepts.iter().any(|s| s.commodity == commodity))
            .map(|(id, _)| id)
    }

    /// Types that supply `commodity` in any slot.
    pub fn producers_of(&self, commodity: CommodityId) -> impl Iterator<Item = IndustryTypeId> + '_ {
        self.iter()
            .filter(move |(_, t)| t.supplies.iter().any(|s| s.commodity == commodity))
            .map(|(id, _)| id)
    }
}
