//! Commodity catalog: display names and units for every cargo type.
//!
//! Every amount in the engine is kept in Cargo Units. A commodity may name
//! its own display unit (kg, l, kJ) together with a conversion figure: how
//! many display units exist in 512 Cargo Units. None of this feeds back into
//! production math; it exists for presentation layers.

use crate::catalog::CatalogError;
use crate::fixed::{CARGO_UNIT_SCALE, Fixed64, fixed64_to_f64, saturating_mul_64};
use crate::id::CommodityId;
use std::collections::HashMap;

/// A commodity definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommodityDef {
    pub name: String,
    /// Display unit. Empty means amounts are shown in raw Cargo Units.
    pub unit: String,
    /// Display units per 512 Cargo Units.
    pub conversion: u32,
}

impl CommodityDef {
    pub fn new(name: &str, unit: &str, conversion: u32) -> Self {
        Self {
            name: name.to_string(),
            unit: unit.to_string(),
            conversion,
        }
    }
}

/// Immutable commodity catalog. Ids are positional.
#[derive(Debug, Clone, Default)]
pub struct CommodityCatalog {
    defs: Vec<CommodityDef>,
    name_to_id: HashMap<String, CommodityId>,
}

impl CommodityCatalog {
    /// Build a catalog from definitions in id order. Names must be unique.
    pub fn new(defs: Vec<CommodityDef>) -> Result<Self, CatalogError> {
        let mut name_to_id = HashMap::with_capacity(defs.len());
        for (i, def) in defs.iter().enumerate() {
            if name_to_id
                .insert(def.name.clone(), CommodityId(i as u32))
                .is_some()
            {
                return Err(CatalogError::DuplicateName(def.name.clone()));
            }
        }
        Ok(Self { defs, name_to_id })
    }

    pub fn get(&self, id: CommodityId) -> Option<&CommodityDef> {
        self.defs.get(id.0 as usize)
    }

    pub fn id_by_name(&self, name: &str) -> Option<CommodityId> {
        self.name_to_id.get(name).copied()
    }

    pub fn contains(&self, id: CommodityId) -> bool {
        (id.0 as usize) < self.defs.len()
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (CommodityId, &CommodityDef)> {
        self.defs
            .iter()
            .enumerate()
            .map(|(i, def)| (CommodityId(i as u32), def))
    }

    /// Display units per Cargo Unit.
    pub fn unit_conversion(&self, id: CommodityId) -> Option<Fixed64> {
        self.get(id)
            .map(|def| Fixed64::from_num(def.conversion) / Fixed64::from_num(CARGO_UNIT_SCALE))
    }

    pub fn display_unit(&self, id: CommodityId) -> Option<&str> {
        self.get(id).map(|def| def.unit.as_str())
    }

    /// Convert a Cargo Unit amount into the commodity's display unit.
    /// Commodities without a display unit are returned unchanged.
    pub fn to_display(&self, id: CommodityId, amount: Fixed64) -> Option<Fixed64> {
        let def = self.get(id)?;
        if def.unit.is_empty() {
            return Some(amount);
        }
        let ratio = self.unit_conversion(id)?;
        Some(saturating_mul_64(amount, ratio))
    }

    /// Human-readable amount, e.g. `"460.0 kg"` or `"12.0 CU"`.
    pub fn format_amount(&self, id: CommodityId, amount: Fixed64) -> Option<String> {
        let def = self.get(id)?;
        let shown = fixed64_to_f64(self.to_display(id, amount)?);
        if def.unit.is_empty() {
            Some(format!("{shown:.1} CU"))
        } else {
            Some(format!("{shown:.1} {}", def.unit))
        }
    }
}
