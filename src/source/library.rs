//! JSON library file
//!
//! A library holds every basis-set and pseudopotential family, with the raw
//! CP2K data and the variant table of each element:
//!
//! ```json
//! {
//!   "build_date": "2024-03-01T10:00:00",
//!   "basis_sets": {
//!     "DZVP-MOLOPT-SR-GTH": {
//!       "metadata": { "description": "DZVP MOLOPT basis sets", "references": [] },
//!       "basis_type": "ORB",
//!       "tags": ["MOLOPT", "DZVP"],
//!       "elements": {
//!         "H": { "data": "H DZVP-MOLOPT-SR-GTH-q1\n ...", "variants": { "q1": "DZVP-MOLOPT-SR-GTH-q1" } }
//!       }
//!     }
//!   },
//!   "pseudopotentials": { }
//! }
//! ```
//!
//! Variant tags are checked when the file is parsed: a malformed tag makes
//! the whole file unreadable.
//!
//! Data is served with a comment header naming where it came from:
//!
//! ```text
//! # SOURCE: library.json:basis/DZVP-MOLOPT-SR-GTH?elements=H,O
//! # BUILD: 01/03/2024 @ 10:00
//! # FETCHED: 19/10/2026 @ 12:30
//! # ---
//! ```

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::catalog::{CatalogListing, EntryData, EntryMetadata};
use crate::elements::{Element, ElementSet};
use crate::error::{KindsError, Result};
use crate::source::{restrict_listing, DataSource};
use crate::types::{BasisType, CatalogKind};
use crate::variant::{ElementVariants, VariantMap};

/// Data of one element within a family
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LibraryAtom {
    #[serde(default)]
    pub data: String,
    #[serde(default)]
    pub variants: ElementVariants,
}

/// One basis-set or pseudopotential family
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LibraryFamily {
    #[serde(default)]
    pub metadata: EntryMetadata,
    #[serde(default)]
    pub basis_type: BasisType,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    pub elements: BTreeMap<Element, LibraryAtom>,
}

/// Content of a library file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Library {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_date: Option<String>,
    #[serde(default)]
    pub basis_sets: BTreeMap<String, LibraryFamily>,
    #[serde(default)]
    pub pseudopotentials: BTreeMap<String, LibraryFamily>,
}

impl Library {
    /// Families of the storage serving `kind`
    pub fn storage(&self, kind: CatalogKind) -> &BTreeMap<String, LibraryFamily> {
        if kind.is_basis() {
            &self.basis_sets
        } else {
            &self.pseudopotentials
        }
    }

    /// Listing of a whole storage (both basis kinds for basis sets)
    fn listing(&self, kind: CatalogKind) -> CatalogListing {
        let storage = self.storage(kind);
        CatalogListing {
            elements: storage
                .iter()
                .map(|(name, family)| (name.clone(), family.elements.keys().copied().collect()))
                .collect(),
            tags: storage
                .iter()
                .filter(|(_, family)| !family.tags.is_empty())
                .map(|(name, family)| (name.clone(), family.tags.clone()))
                .collect(),
            types: if kind.is_basis() {
                storage
                    .iter()
                    .map(|(name, family)| (name.clone(), family.basis_type.clone()))
                    .collect()
            } else {
                BTreeMap::new()
            },
        }
    }

    fn family(&self, kind: CatalogKind, name: &str) -> Result<&LibraryFamily> {
        self.storage(kind)
            .get(name)
            .ok_or_else(|| KindsError::not_found(format!("{} `{name}` does not exist", kind.label())))
    }
}

const HEADER_DATE_FORMAT: &str = "%d/%m/%Y @ %H:%M";

/// Comment lines written above the data of an entry.
///
/// An unparsable build date is written as is, a missing one as `?`.
pub fn data_header(location: &str, build_date: Option<&str>, fetched: NaiveDateTime) -> String {
    let build = match build_date {
        Some(date) => NaiveDateTime::parse_from_str(date, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|d| d.format(HEADER_DATE_FORMAT).to_string())
            .unwrap_or_else(|_| date.to_string()),
        None => "?".to_string(),
    };

    format!(
        "# SOURCE: {location}\n# BUILD: {build}\n# FETCHED: {}\n# ---\n",
        fetched.format(HEADER_DATE_FORMAT)
    )
}

/// `DataSource` backed by a library held in memory
#[derive(Debug, Clone)]
pub struct LibrarySource {
    library: Library,
    origin: String,
    header: bool,
}

impl Default for LibrarySource {
    fn default() -> Self {
        Self::new(Library::default())
    }
}

impl LibrarySource {
    pub fn new(library: Library) -> Self {
        Self {
            library,
            origin: "library".to_string(),
            header: true,
        }
    }

    /// Whether `get_data` prepends the comment header
    pub fn with_header(mut self, header: bool) -> Self {
        self.header = header;
        self
    }

    /// Read a library file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)?;
        let mut source = Self::from_json(&content)?;
        source.origin = path.as_ref().display().to_string();
        debug!(
            "Loaded library {:?}: {} basis set(s), {} pseudopotential(s)",
            path.as_ref(),
            source.library.basis_sets.len(),
            source.library.pseudopotentials.len()
        );
        Ok(source)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(Self::new(serde_json::from_str(content)?))
    }

    pub fn library(&self) -> &Library {
        &self.library
    }

    /// Where the data of an entry comes from, as shown in its header
    fn location(&self, kind: CatalogKind, name: &str, elements: &ElementSet) -> String {
        let location = format!("{}:{}/{name}", self.origin, kind.api_segment());
        if elements.is_empty() {
            location
        } else {
            format!("{location}?elements={}", elements.to_query())
        }
    }
}

impl DataSource for LibrarySource {
    fn list_catalog(&self, kind: CatalogKind) -> Result<CatalogListing> {
        Ok(restrict_listing(self.library.listing(kind), kind))
    }

    fn get_metadata(&self, kind: CatalogKind, name: &str) -> Result<EntryMetadata> {
        let family = self.library.family(kind, name)?;
        let mut metadata = family.metadata.clone();
        if metadata.name.is_empty() {
            metadata.name = name.to_string();
        }
        if kind.is_basis() && metadata.basis_type.is_none() {
            metadata.basis_type = Some(family.basis_type.clone());
        }
        Ok(metadata)
    }

    fn get_data(&self, kind: CatalogKind, name: &str, elements: &ElementSet) -> Result<EntryData> {
        let family = self.library.family(kind, name)?;

        let atoms: Vec<(Element, &LibraryAtom)> = if elements.is_empty() {
            family.elements.iter().map(|(e, atom)| (*e, atom)).collect()
        } else {
            elements
                .iter_sorted()
                .map(|element| {
                    family.elements.get(&element).map(|atom| (element, atom)).ok_or_else(|| {
                        KindsError::not_found(format!(
                            "{} `{name}` does not exist for atom {element}",
                            kind.label()
                        ))
                    })
                })
                .collect::<Result<_>>()?
        };

        let mut data = if self.header {
            data_header(
                &self.location(kind, name, elements),
                self.library.build_date.as_deref(),
                Local::now().naive_local(),
            )
        } else {
            String::new()
        };
        data.extend(atoms.iter().map(|(_, atom)| atom.data.as_str()));
        let variants: VariantMap = atoms
            .into_iter()
            .map(|(element, atom)| (element, atom.variants.clone()))
            .collect();

        Ok(EntryData {
            data,
            metadata: self.get_metadata(kind, name)?,
            variants,
        })
    }
}
