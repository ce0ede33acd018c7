//! Output delivery.
//!
//! The engine never decides where produced cargo goes. After a production
//! pass it offers each nonzero output to a [`DeliverySink`]; whatever the
//! sink declines stays in the instance's `produced` backlog.

use crate::fixed::Fixed64;
use crate::id::{CommodityId, IndustryHandle};
use std::cell::RefCell;
use std::rc::Rc;

/// One `(commodity, origin, amount)` tuple handed to a sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delivery {
    pub commodity: CommodityId,
    pub origin: IndustryHandle,
    pub amount: Fixed64,
}

/// Receives produced cargo. Called synchronously from inside the engine and
/// must not block.
pub trait DeliverySink {
    /// Returns whether the sink took the cargo. Declined cargo remains in the
    /// producing industry's backlog.
    fn deposit(&mut self, commodity: CommodityId, origin: IndustryHandle, amount: Fixed64) -> bool;

    /// Called when `origin` is freed. Its handle may be reused by the next
    /// spawn, so any routing keyed on it must be dropped.
    fn release(&mut self, _origin: IndustryHandle) {}
}

/// Records every delivery and takes all of it.
impl DeliverySink for Vec<Delivery> {
    fn deposit(&mut self, commodity: CommodityId, origin: IndustryHandle, amount: Fixed64) -> bool {
        self.push(Delivery {
            commodity,
            origin,
            amount,
        });
        true
    }
}

/// Lets the caller keep a handle on a sink it gave to the engine.
impl<S: DeliverySink> DeliverySink for Rc<RefCell<S>> {
    fn deposit(&mut self, commodity: CommodityId, origin: IndustryHandle, amount: Fixed64) -> bool {
        self.borrow_mut().deposit(commodity, origin, amount)
    }

    fn release(&mut self, origin: IndustryHandle) {
        self.borrow_mut().release(origin);
    }
}

/// Declines everything. Useful to exercise the backlog path.
#[derive(Debug, Clone, Copy, Default)]
pub struct RejectingSink;

impl DeliverySink for RejectingSink {
    fn deposit(&mut self, _: CommodityId, _: IndustryHandle, _: Fixed64) -> bool {
        false
    }
}
