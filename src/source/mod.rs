//! Data sources: where catalogs, metadata and variant tables come from.
//!
//! The resolvers never talk to a source directly: the session asks a
//! `DataSource` for the tables of a pass and hands the results to the pure
//! logic layer.
//!
//! # Implementations
//!
//! - `library`: a JSON library file read from disk
//! - `http`: the REST API of a running cp2k-basis webservice (feature `http`)

#[cfg(feature = "http")]
pub mod http;
pub mod library;

use crate::catalog::{Catalog, CatalogListing, Catalogs, EntryData, EntryMetadata};
use crate::elements::ElementSet;
use crate::error::Result;
use crate::types::CatalogKind;

#[cfg(feature = "http")]
pub use http::HttpSource;
pub use library::{Library, LibraryAtom, LibraryFamily, LibrarySource};

/// The external data layer
pub trait DataSource: Send + Sync {
    /// Entries of one catalog kind with the elements (and tags) they cover
    fn list_catalog(&self, kind: CatalogKind) -> Result<CatalogListing>;

    /// Description of one entry
    fn get_metadata(&self, kind: CatalogKind, name: &str) -> Result<EntryMetadata>;

    /// Data and variant table of one entry, restricted to `elements`
    /// (every element of the entry when `elements` is empty)
    fn get_data(&self, kind: CatalogKind, name: &str, elements: &ElementSet) -> Result<EntryData>;

    /// The three catalogs at once
    fn load_catalogs(&self) -> Result<Catalogs> {
        Ok(Catalogs {
            orbital: Catalog::from_listing(
                CatalogKind::OrbitalBasis,
                &self.list_catalog(CatalogKind::OrbitalBasis)?,
            ),
            auxiliary: Catalog::from_listing(
                CatalogKind::AuxiliaryBasis,
                &self.list_catalog(CatalogKind::AuxiliaryBasis)?,
            ),
            pseudopotential: Catalog::from_listing(
                CatalogKind::Pseudopotential,
                &self.list_catalog(CatalogKind::Pseudopotential)?,
            ),
        })
    }
}

/// Keep only the entries of a basis-set listing that belong to `kind`
pub(crate) fn restrict_listing(listing: CatalogListing, kind: CatalogKind) -> CatalogListing {
    if !kind.is_basis() {
        return listing;
    }

    let wanted_orbital = kind == CatalogKind::OrbitalBasis;
    let is_orbital = |name: &str| listing.types.get(name).is_none_or(|t| t.is_orbital());

    let keep: Vec<String> = listing
        .elements
        .keys()
        .filter(|name| is_orbital(name.as_str()) == wanted_orbital)
        .cloned()
        .collect();

    CatalogListing {
        elements: keep
            .iter()
            .filter_map(|n| listing.elements.get(n).map(|e| (n.clone(), e.clone())))
            .collect(),
        tags: keep
            .iter()
            .filter_map(|n| listing.tags.get(n).map(|t| (n.clone(), t.clone())))
            .collect(),
        types: keep
            .iter()
            .filter_map(|n| listing.types.get(n).map(|t| (n.clone(), t.clone())))
            .collect(),
    }
}
