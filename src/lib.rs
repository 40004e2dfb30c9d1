//! cp2k-kinds Library
//!
//! Element availability and variant resolution for CP2K basis sets and
//! pseudopotentials, rendered as `&KIND` input sections.

pub mod catalog;
pub mod cli;
pub mod config;
pub mod elements;
pub mod engine;
pub mod error;
pub mod logic;
pub mod selection;
pub mod source;
pub mod types;
pub mod variant;

// Re-export main types for convenience
pub use catalog::{Catalog, CatalogEntry, CatalogListing, Catalogs, DataBlock, EntryData, EntryMetadata};
pub use config::{AppConfig, SourceConfig};
pub use elements::{periodic_table, Element, ElementSet};
pub use error::{KindsError, Result};
pub use selection::{SelectionEvent, SelectionState};
pub use types::{BasisType, CatalogKind};
pub use variant::{ElementVariants, Variant, VariantMap, VariantTag};

// Resolvers and renderer
pub use logic::availability::{
    combined_availability, is_selectable, selectable_entries, selection_availability,
};
pub use logic::render::{render_kinds, RenderOptions, NO_ELEMENT_PLACEHOLDER};
pub use logic::variants::{resolve_variants, ElementResolution, Resolution, VariantMaps};
pub use logic::{compute_outputs, KindsOutput};

// Data layer and session
pub use engine::session::{FetchFailure, FetchedPass, PassTicket, Session};
#[cfg(feature = "http")]
pub use source::HttpSource;
pub use source::{DataSource, LibrarySource};
