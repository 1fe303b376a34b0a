//! Eclipse catalog: event records and the CSV files they are loaded from.

pub mod loader;
pub mod types;

pub use loader::{approximate_regions, load_dir, load_file, read_catalog, CatalogError, LUNAR_FILE, SOLAR_FILE};
pub use types::{compose_title, Coordinates, EclipseCatalog, EclipseEvent, EclipseKind};
