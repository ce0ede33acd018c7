//! Reads a content directory and resolves it into engine catalogs.
//!
//! A content directory holds:
//! - `commodities.{ron,toml,json}` (required)
//! - `industries.{ron,toml,json}` (required)
//! - `engine.{ron,toml,json}` (optional, [`EngineConfig`])
//!
//! Exactly one format may exist per base name. Industries refer to
//! commodities by name; ids follow file order.

use crate::schema::{CommodityData, IndustryData};
use indus_core::catalog::{CatalogError, IndustryCatalog, IndustryCatalogBuilder, IndustryType, SupplyMode};
use indus_core::commodity::{CommodityCatalog, CommodityDef};
use indus_core::engine::EngineConfig;
use indus_core::fixed::Fixed64;
use indus_core::id::CommodityId;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

// ===========================================================================
// Errors
// ===========================================================================

#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    #[error("required file '{base_name}' not found in {dir}")]
    MissingRequired { base_name: String, dir: PathBuf },

    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// Two files share a base name but differ in format.
    #[error("conflicting formats: {a} and {b}")]
    ConflictingFormats { a: PathBuf, b: PathBuf },

    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    #[error("unresolved {expected_kind} reference '{name}' in {file}")]
    UnresolvedRef {
        file: PathBuf,
        name: String,
        expected_kind: &'static str,
    },

    #[error("duplicate name '{name}' in {file}")]
    DuplicateName { file: PathBuf, name: String },

    /// A decimal that is NaN, infinite, or outside the fixed-point range.
    #[error("{field} of '{name}' is out of range in {file}")]
    OutOfRange {
        file: PathBuf,
        name: String,
        field: &'static str,
    },

    /// The resolved definitions were rejected by the catalog builder.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Format detection
// ===========================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

const EXTENSIONS: [(&str, Format); 3] = [
    ("ron", Format::Ron),
    ("toml", Format::Toml),
    ("json", Format::Json),
];

pub fn detect_format(path: &Path) -> Result<Format, DataLoadError> {
    let ext = path.extension().and_then(|e| e.to_str());
    EXTENSIONS
        .iter()
        .find(|(e, _)| Some(*e) == ext)
        .map(|(_, format)| *format)
        .ok_or_else(|| DataLoadError::UnsupportedFormat {
            file: path.to_path_buf(),
        })
}

// ===========================================================================
// File discovery
// ===========================================================================

/// Find `{base_name}.ron|toml|json` in `dir`. `Ok(None)` if absent.
pub fn find_data_file(dir: &Path, base_name: &str) -> Result<Option<PathBuf>, DataLoadError> {
    let mut found: Option<PathBuf> = None;
    for (ext, _) in EXTENSIONS {
        let candidate = dir.join(format!("{base_name}.{ext}"));
        if !candidate.exists() {
            continue;
        }
        if let Some(existing) = found {
            return Err(DataLoadError::ConflictingFormats {
                a: existing,
                b: candidate,
            });
        }
        found = Some(candidate);
    }
    Ok(found)
}

pub fn require_data_file(dir: &Path, base_name: &str) -> Result<PathBuf, DataLoadError> {
    find_data_file(dir, base_name)?.ok_or_else(|| DataLoadError::MissingRequired {
        base_name: base_name.to_string(),
        dir: dir.to_path_buf(),
    })
}

// ===========================================================================
// Deserialization
// ===========================================================================

fn parse_error(path: &Path, e: impl std::fmt::Display) -> DataLoadError {
    DataLoadError::Parse {
        file: path.to_path_buf(),
        detail: e.to_string(),
    }
}

/// Read and deserialize a single value, format chosen by extension.
pub fn deserialize_file<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    match format {
        Format::Ron => ron::from_str(&content).map_err(|e| parse_error(path, e)),
        Format::Json => serde_json::from_str(&content).map_err(|e| parse_error(path, e)),
        Format::Toml => toml::from_str(&content).map_err(|e| parse_error(path, e)),
    }
}

/// Read a list. RON and JSON hold a bare top-level array; TOML holds an
/// array of tables under `toml_key`.
pub fn deserialize_list<T: DeserializeOwned>(
    path: &Path,
    toml_key: &str,
) -> Result<Vec<T>, DataLoadError> {
    if detect_format(path)? != Format::Toml {
        return deserialize_file(path);
    }

    let content = std::fs::read_to_string(path)?;
    let mut table: toml::Table = toml::from_str(&content).map_err(|e| parse_error(path, e))?;
    let array = table
        .remove(toml_key)
        .ok_or_else(|| parse_error(path, format!("missing key '{toml_key}' in TOML file")))?;
    array
        .try_into()
        .map_err(|e: toml::de::Error| parse_error(path, e))
}

// ===========================================================================
// Name resolution
// ===========================================================================

pub fn resolve_name<'a, V>(
    map: &'a HashMap<String, V>,
    name: &str,
    file: &Path,
    expected_kind: &'static str,
) -> Result<&'a V, DataLoadError> {
    map.get(name).ok_or_else(|| DataLoadError::UnresolvedRef {
        file: file.to_path_buf(),
        name: name.to_string(),
        expected_kind,
    })
}

pub fn check_duplicate<V>(
    map: &HashMap<String, V>,
    name: &str,
    file: &Path,
) -> Result<(), DataLoadError> {
    if map.contains_key(name) {
        return Err(DataLoadError::DuplicateName {
            file: file.to_path_buf(),
            name: name.to_string(),
        });
    }
    Ok(())
}

// ===========================================================================
// Content
// ===========================================================================

/// Everything needed to construct an [`Engine`](indus_core::engine::Engine).
#[derive(Debug, Clone)]
pub struct Content {
    pub commodities: CommodityCatalog,
    pub industries: Arc<IndustryCatalog>,
    pub config: EngineConfig,
}

/// Load and resolve a content directory.
pub fn load_content(dir: &Path) -> Result<Content, DataLoadError> {
    let commodities_path = require_data_file(dir, "commodities")?;
    let industries_path = require_data_file(dir, "industries")?;

    let (commodities, names) = load_commodities(&commodities_path)?;
    let industries = load_industries(&industries_path, &names, &commodities)?;

    let config = match find_data_file(dir, "engine")? {
        Some(path) => deserialize_file(&path)?,
        None => EngineConfig::default(),
    };

    debug!(
        dir = %dir.display(),
        commodities = commodities.len(),
        industries = industries.len(),
        max_industries = config.max_industries,
        "content loaded"
    );
    Ok(Content {
        commodities,
        industries: Arc::new(industries),
        config,
    })
}

fn load_commodities(
    path: &Path,
) -> Result<(CommodityCatalog, HashMap<String, CommodityId>), DataLoadError> {
    let data: Vec<CommodityData> = deserialize_list(path, "commodities")?;

    let mut names = HashMap::with_capacity(data.len());
    let mut defs = Vec::with_capacity(data.len());
    for (index, c) in data.iter().enumerate() {
        check_duplicate(&names, &c.name, path)?;
        names.insert(c.name.clone(), CommodityId(index as u32));
        defs.push(CommodityDef::new(&c.name, &c.unit, c.conversion));
    }

    Ok((CommodityCatalog::new(defs)?, names))
}

fn load_industries(
    path: &Path,
    commodity_names: &HashMap<String, CommodityId>,
    commodities: &CommodityCatalog,
) -> Result<IndustryCatalog, DataLoadError> {
    let data: Vec<IndustryData> = deserialize_list(path, "industries")?;

    let mut registered = HashMap::with_capacity(data.len());
    let mut builder = IndustryCatalogBuilder::new();
    for d in &data {
        check_duplicate(&registered, &d.name, path)?;
        let id = builder.register(resolve_industry(d, commodity_names, path)?);
        registered.insert(d.name.clone(), id);
    }

    Ok(builder.build(commodities)?)
}

fn resolve_industry(
    data: &IndustryData,
    commodity_names: &HashMap<String, CommodityId>,
    path: &Path,
) -> Result<IndustryType, DataLoadError> {
    let mode = SupplyMode::from_name(&data.mode);
    if !mode.is_known() {
        warn!(
            industry = %data.name,
            mode = %data.mode,
            "unknown supply mode; the engine will refuse this industry"
        );
    }

    let fx = |value: f64, field: &'static str| to_fixed(value, field, &data.name, path);
    let mut industry = IndustryType::new(&data.name, mode)
        .base_production(fx(data.base_production, "base_production")?)
        .boost(
            fx(data.boost_rate, "boost_rate")?,
            fx(data.boost_threshold, "boost_threshold")?,
        )
        .reach(fx(data.reach, "reach")?);

    for (name, weight) in &data.accepts {
        let id = resolve_name(commodity_names, name, path, "commodity")?;
        industry = industry.accept(*id, fx(*weight, "accept weight")?);
    }
    for (name, weight) in &data.supplies {
        let id = resolve_name(commodity_names, name, path, "commodity")?;
        industry = industry.supply(*id, fx(*weight, "supply weight")?);
    }
    Ok(industry)
}

fn to_fixed(value: f64, field: &'static str, name: &str, path: &Path) -> Result<Fixed64, DataLoadError> {
    Fixed64::checked_from_num(value).ok_or_else(|| DataLoadError::OutOfRange {
        file: path.to_path_buf(),
        name: name.to_string(),
        field,
    })
}

// ===========================================================================
// Tests
// ===========================================================================
