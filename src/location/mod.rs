//! Location normalization for eclipse lookups.
//!
//! Turns a free-form place name or postal code into an ordered list of
//! folded match tokens, using a built-in (or user-supplied) gazetteer.

pub mod resolver;
pub mod tables;
pub mod text;
pub mod types;

pub use resolver::LocationNormalizer;
pub use tables::{AdminRegion, Country, RegionTables, TableError};
pub use types::{ResolutionFailure, ResolvedLocation};
