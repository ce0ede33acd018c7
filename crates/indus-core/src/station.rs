//! Station cargo ledger.
//!
//! A station holds cargo as *loads*: one entry per (commodity, origin)
//! pair. Cargo of the same commodity from different origins is kept apart so
//! that payment can later depend on where it came from.
//!
//! Industries linked to a station deliver their output straight into it, so
//! the ledger doubles as the engine's [`DeliverySink`].

use crate::fixed::Fixed64;
use crate::id::{CommodityId, IndustryHandle, StationId};
use crate::sink::DeliverySink;
use std::collections::HashMap;
use tracing::{trace, warn};

/// Where a load of cargo came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CargoOrigin {
    Station(StationId),
    Industry(IndustryHandle),
}

/// An amount of one commodity from one origin, waiting at a station.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CargoLoad {
    pub commodity: CommodityId,
    pub origin: CargoOrigin,
    pub amount: Fixed64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Station {
    pub name: String,
    loads: Vec<CargoLoad>,
}

impl Station {
    pub fn loads(&self) -> &[CargoLoad] {
        &self.loads
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("no station exists with id {0}")]
    StationNotFound(StationId),
    #[error("station {station} cannot hold more of commodity {commodity:?}")]
    Overflow {
        station: StationId,
        commodity: CommodityId,
    },
}

/// All stations in the world and which industries feed them.
#[derive(Debug, Clone, Default)]
pub struct CargoLedger {
    stations: Vec<Station>,
    links: HashMap<IndustryHandle, StationId>,
}

impl CargoLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_station(&mut self, name: &str) -> StationId {
        let id = StationId(self.stations.len() as u32);
        self.stations.push(Station {
            name: name.to_string(),
            loads: Vec::new(),
        });
        id
    }

    pub fn station(&self, id: StationId) -> Result<&Station, LedgerError> {
        self.stations
            .get(id.0 as usize)
            .ok_or(LedgerError::StationNotFound(id))
    }

    pub fn station_count(&self) -> usize {
        self.stations.len()
    }

    /// Add cargo to a station, merging into an existing load with the same
    /// commodity and origin. `origin = None` means the station itself.
    pub fn add_cargo(
        &mut self,
        station: StationId,
        commodity: CommodityId,
        origin: Option<CargoOrigin>,
        amount: Fixed64,
    ) -> Result<(), LedgerError> {
        let origin = origin.unwrap_or(CargoOrigin::Station(station));
        let st = self
            .stations
            .get_mut(station.0 as usize)
            .ok_or(LedgerError::StationNotFound(station))?;

        match st
            .loads
            .iter_mut()
            .find(|l| l.commodity == commodity && l.origin == origin)
        {
            Some(load) => {
                load.amount = load
                    .amount
                    .checked_add(amount)
                    .ok_or(LedgerError::Overflow { station, commodity })?;
            }
            None => st.loads.push(CargoLoad {
                commodity,
                origin,
                amount,
            }),
        }
        Ok(())
    }

    /// Total of `commodity` at a station across every origin. Saturates.
    pub fn cargo_amount(
        &self,
        station: StationId,
        commodity: CommodityId,
    ) -> Result<Fixed64, LedgerError> {
        let st = self.station(station)?;
        Ok(st
            .loads
            .iter()
            .filter(|l| l.commodity == commodity)
            .fold(Fixed64::ZERO, |acc, l| acc.saturating_add(l.amount)))
    }

    /// Route an industry's output into `station`. Replaces any earlier link.
    pub fn link_industry(
        &mut self,
        industry: IndustryHandle,
        station: StationId,
    ) -> Result<(), LedgerError> {
        self.station(station)?;
        self.links.insert(industry, station);
        Ok(())
    }

    pub fn unlink_industry(&mut self, industry: IndustryHandle) -> Option<StationId> {
        self.links.remove(&industry)
    }

    pub fn linked_station(&self, industry: IndustryHandle) -> Option<StationId> {
        self.links.get(&industry).copied()
    }
}

impl DeliverySink for CargoLedger {
    fn deposit(&mut self, commodity: CommodityId, origin: IndustryHandle, amount: Fixed64) -> bool {
        let Some(station) = self.linked_station(origin) else {
            trace!(%origin, "no linked station; output stays in backlog");
            return false;
        };
        self.add_cargo(station, commodity, Some(CargoOrigin::Industry(origin)), amount)
            .inspect_err(|e| warn!(%origin, error = %e, "delivery declined"))
            .is_ok()
    }

    fn release(&mut self, origin: IndustryHandle) {
        if let Some(station) = self.unlink_industry(origin) {
            trace!(%origin, %station, "industry freed; link dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed::f64_to_fixed64;

    #[test]
    fn loads_merge_by_commodity_and_origin() {
        let mut ledger = CargoLedger::new();
        let s = ledger.add_station("Depot");
        let iron = CommodityId(7);

        ledger.add_cargo(s, iron, None, f64_to_fixed64(10.0)).unwrap();
        ledger.add_cargo(s, iron, None, f64_to_fixed64(5.0)).unwrap();
        ledger
            .add_cargo(s, iron, Some(CargoOrigin::Industry(IndustryHandle(2))), f64_to_fixed64(1.0))
            .unwrap();

        let st = ledger.station(s).unwrap();
        assert_eq!(st.loads().len(), 2);
        assert_eq!(st.loads()[0].origin, CargoOrigin::Station(s));
        assert_eq!(st.loads()[0].amount, f64_to_fixed64(15.0));
        assert_eq!(ledger.cargo_amount(s, iron).unwrap(), f64_to_fixed64(16.0));
    }

    #[test]
    fn cargo_amount_of_absent_commodity_is_zero() {
        let mut ledger = CargoLedger::new();
        let s = ledger.add_station("Empty");
        assert_eq!(ledger.cargo_amount(s, CommodityId(0)).unwrap(), Fixed64::ZERO);
    }

    #[test]
    fn unknown_station_is_an_error() {
        let mut ledger = CargoLedger::new();
        let bad = StationId(3);
        assert_eq!(
            ledger.add_cargo(bad, CommodityId(0), None, f64_to_fixed64(1.0)),
            Err(LedgerError::StationNotFound(bad))
        );
        assert!(ledger.cargo_amount(bad, CommodityId(0)).is_err());
        assert!(ledger.link_industry(IndustryHandle(0), bad).is_err());
    }

    #[test]
    fn overflowing_load_is_refused_and_declined() {
        let mut ledger = CargoLedger::new();
        let s = ledger.add_station("Silo");
        let gas = CommodityId(13);
        ledger.link_industry(IndustryHandle(0), s).unwrap();
        ledger.add_cargo(s, gas, Some(CargoOrigin::Industry(IndustryHandle(0))), Fixed64::MAX).unwrap();

        assert_eq!(
            ledger.add_cargo(s, gas, Some(CargoOrigin::Industry(IndustryHandle(0))), f64_to_fixed64(1.0)),
            Err(LedgerError::Overflow { station: s, commodity: gas })
        );
        assert!(!ledger.deposit(gas, IndustryHandle(0), f64_to_fixed64(1.0)));
        assert_eq!(ledger.station(s).unwrap().loads()[0].amount, Fixed64::MAX);

        // Another origin opens its own load; the total saturates.
        ledger.add_cargo(s, gas, None, f64_to_fixed64(5.0)).unwrap();
        assert_eq!(ledger.cargo_amount(s, gas).unwrap(), Fixed64::MAX);
    }

    #[test]
    fn release_drops_the_link() {
        let mut ledger = CargoLedger::new();
        let s = ledger.add_station("Yard");
        ledger.link_industry(IndustryHandle(4), s).unwrap();

        ledger.release(IndustryHandle(4));

        assert_eq!(ledger.linked_station(IndustryHandle(4)), None);
        assert!(!ledger.deposit(CommodityId(0), IndustryHandle(4), f64_to_fixed64(1.0)));
    }

    #[test]
    fn sink_deposits_only_for_linked_industries() {
        let mut ledger = CargoLedger::new();
        let s = ledger.add_station("Yard");
        ledger.link_industry(IndustryHandle(1), s).unwrap();

        assert!(ledger.deposit(CommodityId(5), IndustryHandle(1), f64_to_fixed64(7.0)));
        assert!(!ledger.deposit(CommodityId(5), IndustryHandle(2), f64_to_fixed64(7.0)));

        let loads = ledger.station(s).unwrap().loads();
        assert_eq!(loads.len(), 1);
        assert_eq!(loads[0].origin, CargoOrigin::Industry(IndustryHandle(1)));

        assert_eq!(ledger.unlink_industry(IndustryHandle(1)), Some(s));
        assert!(!ledger.deposit(CommodityId(5), IndustryHandle(1), f64_to_fixed64(1.0)));
    }
}
