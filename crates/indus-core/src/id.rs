use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies a commodity (cargo type) in the commodity catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CommodityId(pub u32);

/// Identifies an industry type (recipe) in the industry catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IndustryTypeId(pub u32);

/// Index of an instance slot in the industry table. Stable for the life of
/// the instance; reused after the slot is freed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IndustryHandle(pub u32);

/// Identifies a station in the cargo ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StationId(pub u32);

impl IndustryHandle {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for IndustryHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "industry#{}", self.0)
    }
}

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "station#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commodity_id_equality() {
        assert_eq!(CommodityId(3), CommodityId(3));
        assert_ne!(CommodityId(3), CommodityId(4));
    }

    #[test]
    fn handle_index_and_display() {
        let h = IndustryHandle(7);
        assert_eq!(h.index(), 7);
        assert_eq!(h.to_string(), "industry#7");
    }

    #[test]
    fn ids_are_hashable() {
        use std::collections::HashMap;
        let mut map = HashMap::new();
        map.insert(CommodityId(0), "flesh");
        map.insert(CommodityId(5), "blood");
        assert_eq!(map[&CommodityId(5)], "blood");
    }
}
