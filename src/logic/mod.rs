//! Logic modules: translates the user's selection into `&KIND` text.
//!
//! Everything here is pure: no I/O, no shared state. Given the same
//! selection, catalogs and variant tables, the output is always the same.
//!
//! # Modules
//!
//! - `availability`: which entries stay selectable, which elements are covered
//! - `variants`: per-element intersection of variant tags and default choice
//! - `render`: `&KIND` sections with alternatives and incompatibility notes

pub mod availability;
pub mod render;
pub mod variants;

use std::collections::{BTreeMap, BTreeSet};

use crate::catalog::{Catalogs, DataBlock};
use crate::elements::Element;
use crate::selection::SelectionState;
use crate::types::CatalogKind;

use self::availability::selection_availability;
use self::render::{render_kinds, RenderOptions};
use self::variants::{resolve_variants, ElementResolution, VariantMaps};

/// Everything the presentation layer binds to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindsOutput {
    /// Elements covered by every chosen entry
    pub availability: BTreeSet<Element>,
    /// Rendered `&KIND` sections (or the placeholder)
    pub text: String,
    /// Per-element incompatibility flag, in selection order
    pub incompatible: Vec<(Element, bool)>,
    /// Full resolution, for callers that want more than the text
    pub resolutions: Vec<ElementResolution>,
    /// Data text and description fetched for each chosen kind
    pub data: BTreeMap<CatalogKind, DataBlock>,
}

impl KindsOutput {
    /// Elements without any common variant
    pub fn incompatible_elements(&self) -> Vec<Element> {
        self.incompatible
            .iter()
            .filter(|(_, flag)| *flag)
            .map(|(element, _)| *element)
            .collect()
    }

    pub fn has_incompatibility(&self) -> bool {
        self.incompatible.iter().any(|(_, flag)| *flag)
    }

    /// Attach the data blocks the variant tables were fetched with
    pub fn with_data(mut self, data: BTreeMap<CatalogKind, DataBlock>) -> Self {
        self.data = data;
        self
    }
}

/// Resolve and render the selection against the tables of the current pass.
///
/// The auxiliary basis type comes from the chosen auxiliary entry when the
/// catalog knows it, from `options` otherwise.
pub fn compute_outputs(
    selection: &SelectionState,
    catalogs: &Catalogs,
    maps: &VariantMaps,
    options: &RenderOptions,
) -> KindsOutput {
    let availability = selection_availability(selection, catalogs);
    let resolutions = resolve_variants(selection, maps);

    let mut options = options.clone();
    if let Some(entry) = selection
        .chosen(CatalogKind::AuxiliaryBasis)
        .and_then(|name| catalogs.entry(CatalogKind::AuxiliaryBasis, name))
        .filter(|entry| !entry.basis_type.is_orbital())
    {
        options.aux_basis_type = entry.basis_type.clone();
    }

    let text = render_kinds(selection, &resolutions, maps, &options);
    let incompatible = resolutions
        .iter()
        .map(|r| (r.element, r.resolution.is_incompatible()))
        .collect();

    KindsOutput {
        availability,
        text,
        incompatible,
        resolutions,
        data: BTreeMap::new(),
    }
}
