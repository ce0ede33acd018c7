//! Content loading for `indus-core`: commodity and industry catalogs plus
//! engine settings, read from RON, TOML or JSON files in one directory.

pub mod loader;
pub mod schema;

pub use loader::{Content, DataLoadError, load_content};
