//! Eclipse Finder: the next solar and lunar eclipse visible from a
//! free-form location, answered from an offline catalog.
//!
//! ```text
//! "Toronto, ON, Canada" ─► LocationNormalizer ─► tokens ─► EventMatcher ─► MatchOutcome
//!                                                               ▲
//!                                            EclipseCatalog (CSV)
//! ```

pub mod catalog;
pub mod config;
pub mod finder;
pub mod location;
pub mod logging;
pub mod matcher;
pub mod report;
pub mod server;

pub use catalog::{EclipseCatalog, EclipseEvent, EclipseKind};
pub use finder::{EclipseFinder, FinderError, Report};
pub use location::{LocationNormalizer, ResolutionFailure, ResolvedLocation};
pub use matcher::{EventMatcher, MatchOutcome, MatchResult, NoMatch};
