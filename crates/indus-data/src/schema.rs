//! On-disk format for content directories.
//!
//! Amounts, weights and rates are written as decimals and converted to
//! `Fixed64` by the loader. Commodities are referenced by name.

use serde::Deserialize;

// ===========================================================================
// Commodities
// ===========================================================================

/// A commodity definition in a data file.
#[derive(Debug, Clone, Deserialize)]
pub struct CommodityData {
    pub name: String,
    /// Display unit, e.g. `"l"` or `"kg"`.
    pub unit: String,
    /// Display units per 512 Cargo Units. Defaults to 512 (one to one).
    #[serde(default = "default_conversion")]
    pub conversion: u32,
}

fn default_conversion() -> u32 {
    512
}

// ===========================================================================
// Industries
// ===========================================================================

/// An industry type definition in a data file.
#[derive(Debug, Clone, Deserialize)]
pub struct IndustryData {
    pub name: String,
    /// `"convert"`, `"assemble"` or `"boost"`. Anything else loads, but the
    /// engine refuses to run it.
    pub mode: String,
    #[serde(default)]
    pub base_production: f64,
    #[serde(default)]
    pub boost_rate: f64,
    #[serde(default)]
    pub boost_threshold: f64,
    #[serde(default)]
    pub reach: f64,
    /// `(commodity name, weight)` per accept slot.
    #[serde(default)]
    pub accepts: Vec<(String, f64)>,
    /// `(commodity name, weight)` per supply slot.
    #[serde(default)]
    pub supplies: Vec<(String, f64)>,
}

// ===========================================================================
// TOML wrappers (TOML does not support top-level arrays)
// ===========================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct TomlCommodities {
    pub commodities: Vec<CommodityData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TomlIndustries {
    pub industries: Vec<IndustryData>,
}
