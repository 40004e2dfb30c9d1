//! Catalog index: the basis sets and pseudopotentials known to the data layer
//!
//! A catalog is read-only. Entries are looked up and borrowed by the
//! resolvers, never copied into their results.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::elements::{Element, ElementSet};
use crate::logic::availability::is_selectable;
use crate::types::{BasisType, CatalogKind};
use crate::variant::VariantMap;

// ============================================================================
// Wire records
// ============================================================================

/// Listing of one storage as served by the data layer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogListing {
    /// Elements covered by each entry
    pub elements: BTreeMap<String, BTreeSet<Element>>,
    /// Search tags of each entry
    #[serde(default)]
    pub tags: BTreeMap<String, BTreeSet<String>>,
    /// Basis-set type of each entry (basis-set storage only)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub types: BTreeMap<String, BasisType>,
}

/// Description of a catalog entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryMetadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub references: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Basis-set type; absent for pseudopotentials and untyped basis sets
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub basis_type: Option<BasisType>,
}

impl EntryMetadata {
    /// One-line summary shown next to a selection
    pub fn summary(&self) -> String {
        format!("Name: {} | Description: {}", self.name, self.description)
    }
}

/// Data of an entry restricted to a set of elements
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntryData {
    /// Raw CP2K data block(s), ready to be written to a library file
    pub data: String,
    pub metadata: EntryMetadata,
    pub variants: VariantMap,
}

impl EntryData {
    /// Separate the variant table from what is shown to the user
    pub fn into_parts(self) -> (VariantMap, DataBlock) {
        (
            self.variants,
            DataBlock {
                data: self.data,
                metadata: self.metadata,
            },
        )
    }
}

/// Data text and description of a fetched entry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataBlock {
    pub data: String,
    pub metadata: EntryMetadata,
}

// ============================================================================
// Catalog
// ============================================================================

/// One basis set or pseudopotential family
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub name: String,
    pub elements: BTreeSet<Element>,
    pub tags: BTreeSet<String>,
    pub basis_type: BasisType,
}

impl CatalogEntry {
    pub fn new(name: impl Into<String>, elements: impl IntoIterator<Item = Element>) -> Self {
        Self {
            name: name.into(),
            elements: elements.into_iter().collect(),
            tags: BTreeSet::new(),
            basis_type: BasisType::default(),
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_basis_type(mut self, basis_type: BasisType) -> Self {
        self.basis_type = basis_type;
        self
    }
}

/// Entries of a single catalog kind, sorted by name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    kind: CatalogKind,
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn new(kind: CatalogKind, mut entries: Vec<CatalogEntry>) -> Self {
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        entries.dedup_by(|a, b| a.name == b.name);
        Self { kind, entries }
    }

    pub fn empty(kind: CatalogKind) -> Self {
        Self::new(kind, Vec::new())
    }

    /// Build a catalog from every entry of a listing
    pub fn from_listing(kind: CatalogKind, listing: &CatalogListing) -> Self {
        let entries = listing
            .elements
            .iter()
            .map(|(name, elements)| entry_from_listing(listing, name, elements))
            .collect();
        Self::new(kind, entries)
    }

    /// Split a basis-set listing into its orbital and auxiliary catalogs
    pub fn split_basis_sets(listing: &CatalogListing) -> (Self, Self) {
        let (orbital, auxiliary): (Vec<_>, Vec<_>) = listing
            .elements
            .iter()
            .map(|(name, elements)| entry_from_listing(listing, name, elements))
            .partition(|entry| entry.basis_type.is_orbital());

        (
            Self::new(CatalogKind::OrbitalBasis, orbital),
            Self::new(CatalogKind::AuxiliaryBasis, auxiliary),
        )
    }

    pub fn kind(&self) -> CatalogKind {
        self.kind
    }

    pub fn get(&self, name: &str) -> Option<&CatalogEntry> {
        self.entries
            .binary_search_by(|e| e.name.as_str().cmp(name))
            .ok()
            .map(|i| &self.entries[i])
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries that remain selectable for `selected`, in catalog order
    pub fn selectable<'a>(&'a self, selected: &'a ElementSet) -> impl Iterator<Item = &'a CatalogEntry> {
        self.entries.iter().filter(move |e| is_selectable(selected, e))
    }

    /// Selectable entries further narrowed by a name search and a tag
    ///
    /// The search is a case-insensitive substring match; an empty search
    /// does not constrain anything.
    pub fn filter<'a>(
        &'a self,
        selected: &'a ElementSet,
        search: &str,
        tag: Option<&str>,
    ) -> Vec<&'a CatalogEntry> {
        let search = search.trim().to_lowercase();

        self.selectable(selected)
            .filter(|e| search.is_empty() || e.name.to_lowercase().contains(&search))
            .filter(|e| tag.is_none_or(|t| e.tags.contains(t)))
            .collect()
    }
}

fn entry_from_listing(
    listing: &CatalogListing,
    name: &str,
    elements: &BTreeSet<Element>,
) -> CatalogEntry {
    CatalogEntry::new(name, elements.iter().copied())
        .with_tags(listing.tags.get(name).into_iter().flatten().cloned())
        .with_basis_type(listing.types.get(name).cloned().unwrap_or_default())
}

/// The three catalogs a selection is made from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalogs {
    pub orbital: Catalog,
    pub auxiliary: Catalog,
    pub pseudopotential: Catalog,
}

impl Default for Catalogs {
    fn default() -> Self {
        Self {
            orbital: Catalog::empty(CatalogKind::OrbitalBasis),
            auxiliary: Catalog::empty(CatalogKind::AuxiliaryBasis),
            pseudopotential: Catalog::empty(CatalogKind::Pseudopotential),
        }
    }
}

impl Catalogs {
    /// Build the catalogs from the basis-set and pseudopotential listings
    pub fn from_listings(basis_sets: &CatalogListing, pseudopotentials: &CatalogListing) -> Self {
        let (orbital, auxiliary) = Catalog::split_basis_sets(basis_sets);
        Self {
            orbital,
            auxiliary,
            pseudopotential: Catalog::from_listing(CatalogKind::Pseudopotential, pseudopotentials),
        }
    }

    pub fn get(&self, kind: CatalogKind) -> &Catalog {
        match kind {
            CatalogKind::OrbitalBasis => &self.orbital,
            CatalogKind::AuxiliaryBasis => &self.auxiliary,
            CatalogKind::Pseudopotential => &self.pseudopotential,
        }
    }

    /// Look up an entry of the given kind
    pub fn entry(&self, kind: CatalogKind, name: &str) -> Option<&CatalogEntry> {
        self.get(kind).get(name)
    }
}
