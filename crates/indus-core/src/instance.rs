//! Industry instance table: per-industry accumulators and slot lifecycle.
//!
//! Handles index directly into the table. A freed slot keeps its position
//! (with `type_id == None`) and is handed out again by the next spawn, so a
//! handle is only meaningful while its instance is alive.

use crate::catalog::IndustryType;
use crate::fixed::Fixed64;
use crate::id::{IndustryHandle, IndustryTypeId};

/// Default bound on the number of instance slots.
pub const DEFAULT_MAX_INDUSTRIES: usize = 512;

/// Observable production state of an instance. Production itself happens
/// inside a single engine call and never shows up here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ProductionState {
    /// No deposit accepted yet.
    #[default]
    Idle,
    /// At least one deposit accepted; stock is waiting for readiness.
    Accumulating,
}

/// Mutable state of one industry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndustryInstance {
    pub(crate) type_id: Option<IndustryTypeId>,
    /// One accumulator per accept slot.
    pub(crate) material: Vec<Fixed64>,
    /// Every amount ever accepted. Consumption does not reduce it.
    pub(crate) material_total: Fixed64,
    /// One accumulator per supply slot: output the sink has not taken.
    pub(crate) produced: Vec<Fixed64>,
    pub(crate) state: ProductionState,
}

impl IndustryInstance {
    fn occupied_by(type_id: IndustryTypeId, industry: &IndustryType) -> Self {
        Self {
            type_id: Some(type_id),
            material: vec![Fixed64::ZERO; industry.accepts.len()],
            material_total: Fixed64::ZERO,
            produced: vec![Fixed64::ZERO; industry.supplies.len()],
            state: ProductionState::Idle,
        }
    }

    /// `None` for a vacant slot.
    pub fn type_id(&self) -> Option<IndustryTypeId> {
        self.type_id
    }

    pub fn is_vacant(&self) -> bool {
        self.type_id.is_none()
    }

    pub fn material(&self, slot: usize) -> Option<Fixed64> {
        self.material.get(slot).copied()
    }

    pub fn materials(&self) -> &[Fixed64] {
        &self.material
    }

    pub fn material_total(&self) -> Fixed64 {
        self.material_total
    }

    pub fn produced(&self, slot: usize) -> Option<Fixed64> {
        self.produced.get(slot).copied()
    }

    pub fn produced_all(&self) -> &[Fixed64] {
        &self.produced
    }

    pub fn state(&self) -> ProductionState {
        self.state
    }
}

/// Errors raised by instance allocation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TableError {
    #[error("industry table is full ({capacity} slots)")]
    CapacityExceeded { capacity: usize },
    #[error("unknown industry type: {0:?}")]
    UnknownIndustryType(IndustryTypeId),
}

/// Growable, handle-indexed store of industry instances.
#[derive(Debug, Clone, PartialEq)]
pub struct IndustryTable {
    slots: Vec<IndustryInstance>,
    capacity: usize,
}

impl Default for IndustryTable {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_MAX_INDUSTRIES)
    }
}

impl IndustryTable {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::new(),
            capacity,
        }
    }

    /// Occupy the first vacant slot (or a new one) with an instance of
    /// `industry`. Accumulators start at zero.
    pub fn spawn(
        &mut self,
        type_id: IndustryTypeId,
        industry: &IndustryType,
    ) -> Result<IndustryHandle, TableError> {
        let instance = IndustryInstance::occupied_by(type_id, industry);

        if let Some(index) = self.slots.iter().position(IndustryInstance::is_vacant) {
            self.slots[index] = instance;
            return Ok(IndustryHandle(index as u32));
        }

        if self.slots.len() >= self.capacity {
            return Err(TableError::CapacityExceeded {
                capacity: self.capacity,
            });
        }

        self.slots.push(instance);
        Ok(IndustryHandle((self.slots.len() - 1) as u32))
    }

    /// Vacate a slot. Returns false if it was already vacant or out of range.
    pub fn free(&mut self, handle: IndustryHandle) -> bool {
        match self.slots.get_mut(handle.index()) {
            Some(slot) if !slot.is_vacant() => {
                *slot = IndustryInstance::default();
                true
            }
            _ => false,
        }
    }

    /// The live instance behind `handle`, if any.
    pub fn get(&self, handle: IndustryHandle) -> Option<&IndustryInstance> {
        self.slots.get(handle.index()).filter(|i| !i.is_vacant())
    }

    pub(crate) fn get_mut(&mut self, handle: IndustryHandle) -> Option<&mut IndustryInstance> {
        self.slots.get_mut(handle.index()).filter(|i| !i.is_vacant())
    }

    /// Raw slot access, vacant slots included.
    pub fn slot(&self, handle: IndustryHandle) -> Option<&IndustryInstance> {
        self.slots.get(handle.index())
    }

    /// Number of live instances.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|i| !i.is_vacant()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of slots ever allocated, vacant ones included.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn occupied(&self) -> impl Iterator<Item = (IndustryHandle, &IndustryInstance)> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, i)| !i.is_vacant())
            .map(|(idx, i)| (IndustryHandle(idx as u32), i))
    }
}
