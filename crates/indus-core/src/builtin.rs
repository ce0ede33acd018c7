//! The stock content shipped with the engine: 17 commodities and 11
//! industry types. Content directories loaded through `indus-data` replace
//! these wholesale; nothing merges with them.

use crate::catalog::{CatalogError, IndustryCatalog, IndustryCatalogBuilder, IndustryType, SupplyMode};
use crate::commodity::{CommodityCatalog, CommodityDef};
use crate::fixed::f64_to_fixed64 as fx;
use crate::id::CommodityId;

pub const FLESH: CommodityId = CommodityId(0);
pub const BONES: CommodityId = CommodityId(1);
pub const BRAINS: CommodityId = CommodityId(2);
pub const HOOVES: CommodityId = CommodityId(3);
pub const WART: CommodityId = CommodityId(4);
pub const BLOOD: CommodityId = CommodityId(5);
pub const BOTTLED_PAIN: CommodityId = CommodityId(6);
pub const STEEL: CommodityId = CommodityId(7);
pub const BONESTEEL: CommodityId = CommodityId(8);
pub const FERTILIZER: CommodityId = CommodityId(9);
pub const ENERGY: CommodityId = CommodityId(10);
pub const BOTTLED_PRIDE: CommodityId = CommodityId(11);
pub const HATE_ALE: CommodityId = CommodityId(12);
pub const GAS: CommodityId = CommodityId(13);
pub const GOODS: CommodityId = CommodityId(14);
pub const SILICON: CommodityId = CommodityId(15);
pub const MICROCHIPS: CommodityId = CommodityId(16);

/// Densities are in grams per litre; a litre is 512 Cargo Units.
const fn per_litre(grams: u32) -> u32 {
    (grams * 512) / 1000
}

pub fn commodity_defs() -> Vec<CommodityDef> {
    vec![
        CommodityDef::new("Flesh", "kg", per_litre(920)),
        CommodityDef::new("Bones", "l", 512),
        CommodityDef::new("Brains", "kg", per_litre(1100)),
        // Hooves are steel.
        CommodityDef::new("Hooves", "kg", per_litre(7859)),
        CommodityDef::new("Wart", "l", 512),
        CommodityDef::new("Blood", "l", 512),
        CommodityDef::new("Bottled Pain", "l", 512),
        CommodityDef::new("Steel", "kg", per_litre(7859)),
        CommodityDef::new("Bonesteel", "kg", per_litre(7100)),
        CommodityDef::new("Fertilizer", "kg", per_litre(961)),
        // 25400 kJ boils 10 l of water.
        CommodityDef::new("Energy", "kJ", 25400 * 512),
        CommodityDef::new("Bottled Pride", "l", 512),
        CommodityDef::new("Hate Ale", "l", 512),
        CommodityDef::new("Gas", "l", 512),
        CommodityDef::new("Goods", "kg", per_litre(3500)),
        CommodityDef::new("Silicon", "kg", per_litre(2330)),
        CommodityDef::new("Microchips", "l", 512),
    ]
}

pub fn commodities() -> Result<CommodityCatalog, CatalogError> {
    CommodityCatalog::new(commodity_defs())
}

/// The stock industry types, in catalog order.
pub fn industry_types() -> Vec<IndustryType> {
    use SupplyMode::*;

    vec![
        IndustryType::new("Flesh Exsanguiner", Convert)
            .reach(fx(512.0))
            .accept(FLESH, fx(1.0))
            .supply(BLOOD, fx(0.7)),
        IndustryType::new("Hoof Smeltery", Convert)
            .boost(fx(2.5), fx(0.0))
            .reach(fx(512.0))
            .accept(HOOVES, fx(0.8))
            .accept(ENERGY, fx(2.0))
            .supply(STEEL, fx(1.1))
            .supply(BLOOD, fx(0.15)),
        IndustryType::new("Wart Fields", Boost)
            .base_production(fx(12.0))
            .boost(fx(3.0), fx(20.0))
            .reach(fx(1200.0))
            .accept(FERTILIZER, fx(1.0))
            .supply(WART, fx(5.0)),
        IndustryType::new("Neural Exciter", Convert)
            .boost(fx(1.6), fx(0.0))
            .reach(fx(600.0))
            .accept(BRAINS, fx(0.4))
            .accept(BOTTLED_PAIN, fx(1.2))
            .supply(BOTTLED_PRIDE, fx(2.0)),
        IndustryType::new("Bonesteel Refinery", Convert)
            .boost(fx(1.8), fx(0.0))
            .reach(fx(700.0))
            .accept(STEEL, fx(0.6))
            .accept(BONES, fx(0.4))
            .supply(BONESTEEL, fx(0.3)),
        IndustryType::new("Brewery", Convert)
            .boost(fx(1.6), fx(0.0))
            .reach(fx(512.0))
            .accept(BOTTLED_PRIDE, fx(1.2))
            .accept(WART, fx(0.8))
            .accept(FLESH, fx(0.3))
            .supply(FERTILIZER, fx(1.1))
            .supply(HATE_ALE, fx(0.4)),
        IndustryType::new("Fermenting Pit", Convert)
            .boost(fx(1.6), fx(0.0))
            .reach(fx(768.0))
            .accept(BOTTLED_PAIN, fx(1.1))
            .accept(BLOOD, fx(0.8))
            .accept(FLESH, fx(0.3))
            .supply(FERTILIZER, fx(3.0))
            .supply(GAS, fx(8.0)),
        IndustryType::new("Gas Furnace", Convert)
            .boost(fx(3.0), fx(0.0))
            .reach(fx(768.0))
            .accept(GAS, fx(1.0))
            .supply(ENERGY, fx(0.2)),
        IndustryType::new("Artisan Workshop", Convert)
            .boost(fx(2.5), fx(0.0))
            .reach(fx(512.0))
            .accept(BONESTEEL, fx(0.5))
            .accept(HATE_ALE, fx(1.8))
            .accept(MICROCHIPS, fx(1.1))
            .supply(GOODS, fx(1.5)),
        // Takes Bones, not Bonesteel, in its first slot.
        IndustryType::new("Silicon Furnace", Assemble)
            .boost(fx(2.5), fx(0.0))
            .reach(fx(512.0))
            .accept(BONES, fx(0.5))
            .accept(GAS, fx(1.25))
            .supply(SILICON, fx(0.8)),
        IndustryType::new("Semiconductor Factory", Convert)
            .boost(fx(2.5), fx(0.0))
            .reach(fx(768.0))
            .accept(SILICON, fx(0.5))
            .accept(BRAINS, fx(1.0))
            .accept(ENERGY, fx(0.5))
            .supply(MICROCHIPS, fx(2.5)),
    ]
}

pub fn industries(commodities: &CommodityCatalog) -> Result<IndustryCatalog, CatalogError> {
    let mut builder = IndustryCatalogBuilder::new();
    for industry in industry_types() {
        builder.register(industry);
    }
    builder.build(commodities)
}
