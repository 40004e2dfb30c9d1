//! Availability Resolver
//!
//! Answers two questions about element coverage:
//!
//! - which catalog entries can still be picked for the selected elements
//!   (`is_selectable`), and
//! - which elements are covered by every entry currently chosen
//!   (`combined_availability`), used to highlight the periodic table.
//!
//! # Design
//!
//! - **Pure logic**: No I/O; catalog entries are borrowed, never copied
//! - **Intersection, not union**: a kind without a choice adds no constraint
//! - **Unfiltered**: combined availability ignores the selected elements

use std::collections::BTreeSet;

use crate::catalog::{Catalog, CatalogEntry, Catalogs};
use crate::elements::{Element, ElementSet};
use crate::selection::SelectionState;
use crate::types::CatalogKind;

/// An entry is selectable iff it covers every selected element.
///
/// With no element selected, every entry is selectable.
pub fn is_selectable(selected: &ElementSet, entry: &CatalogEntry) -> bool {
    selected.is_subset_of(&entry.elements)
}

/// Entries of `catalog` that can still be picked, in catalog order
pub fn selectable_entries<'a>(catalog: &'a Catalog, selected: &ElementSet) -> Vec<&'a CatalogEntry> {
    catalog
        .entries()
        .iter()
        .filter(|entry| is_selectable(selected, entry))
        .collect()
}

/// Elements covered by all of `chosen` at once.
///
/// Returns an empty set when nothing is chosen: there is nothing to
/// highlight yet. Two chosen entries sharing no element also give an empty
/// set, which is a valid state.
pub fn combined_availability<'a, I>(chosen: I) -> BTreeSet<Element>
where
    I: IntoIterator<Item = &'a CatalogEntry>,
{
    let mut chosen = chosen.into_iter();

    let Some(first) = chosen.next() else {
        return BTreeSet::new();
    };

    chosen.fold(first.elements.clone(), |acc, entry| {
        acc.intersection(&entry.elements).copied().collect()
    })
}

/// Entries chosen in `selection`, looked up in `catalogs`, in rendering order.
///
/// Names that do not exist in their catalog are skipped.
pub fn chosen_entries<'a>(
    selection: &SelectionState,
    catalogs: &'a Catalogs,
) -> Vec<(CatalogKind, &'a CatalogEntry)> {
    CatalogKind::all()
        .filter_map(|kind| {
            let name = selection.chosen(kind)?;
            catalogs.entry(kind, name).map(|entry| (kind, entry))
        })
        .collect()
}

/// Combined availability of the entries chosen in `selection`
pub fn selection_availability(selection: &SelectionState, catalogs: &Catalogs) -> BTreeSet<Element> {
    combined_availability(chosen_entries(selection, catalogs).into_iter().map(|(_, e)| e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, elements: &str) -> CatalogEntry {
        CatalogEntry::new(name, ElementSet::parse(elements).unwrap().iter())
    }

    fn set(elements: &str) -> BTreeSet<Element> {
        ElementSet::parse(elements).unwrap().to_sorted_set()
    }

    #[test]
    fn test_is_selectable_requires_full_coverage() {
        let e = entry("DZVP", "H-Ne");
        assert!(is_selectable(&ElementSet::parse("H,O").unwrap(), &e));
        assert!(!is_selectable(&ElementSet::parse("H,Fe").unwrap(), &e));
    }

    #[test]
    fn test_is_selectable_with_no_elements() {
        let e = entry("EMPTY", "H");
        assert!(is_selectable(&ElementSet::new(), &e));
    }

    #[test]
    fn test_selectable_entries_in_catalog_order() {
        let catalog = Catalog::new(
            CatalogKind::OrbitalBasis,
            vec![entry("TZVP", "H-Ne"), entry("DZVP", "H-Ar"), entry("SZV", "H")],
        );
        let names: Vec<&str> = selectable_entries(&catalog, &ElementSet::parse("O").unwrap())
            .into_iter()
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(names, vec!["DZVP", "TZVP"]);
        assert_eq!(selectable_entries(&catalog, &ElementSet::new()).len(), 3);
    }

    #[test]
    fn test_combined_availability_intersects() {
        let basis = entry("DZVP", "H-Ne");
        let pseudo = entry("GTH", "Li-Na");
        assert_eq!(combined_availability([&basis, &pseudo]), set("Li-Ne"));
    }

    #[test]
    fn test_combined_availability_single_entry() {
        let basis = entry("DZVP", "H,O");
        assert_eq!(combined_availability([&basis]), set("H,O"));
    }

    #[test]
    fn test_combined_availability_disjoint_is_empty() {
        let a = entry("A", "H-He");
        let b = entry("B", "Fe");
        assert!(combined_availability([&a, &b]).is_empty());
    }

    #[test]
    fn test_combined_availability_nothing_chosen() {
        assert!(combined_availability(std::iter::empty()).is_empty());
    }

    #[test]
    fn test_selection_availability_ignores_selected_elements() {
        let catalogs = Catalogs {
            orbital: Catalog::new(CatalogKind::OrbitalBasis, vec![entry("DZVP", "H-Ne")]),
            pseudopotential: Catalog::new(CatalogKind::Pseudopotential, vec![entry("GTH", "H-Ar")]),
            ..Default::default()
        };

        let selection = SelectionState::new()
            .with_elements(ElementSet::parse("O").unwrap())
            .with_choice(CatalogKind::OrbitalBasis, Some("DZVP"))
            .with_choice(CatalogKind::Pseudopotential, Some("GTH"));

        assert_eq!(selection_availability(&selection, &catalogs), set("H-Ne"));
    }

    #[test]
    fn test_chosen_entries_skip_unknown_names() {
        let catalogs = Catalogs {
            orbital: Catalog::new(CatalogKind::OrbitalBasis, vec![entry("DZVP", "H")]),
            ..Default::default()
        };
        let selection = SelectionState::new()
            .with_choice(CatalogKind::OrbitalBasis, Some("DZVP"))
            .with_choice(CatalogKind::Pseudopotential, Some("missing"));

        let chosen = chosen_entries(&selection, &catalogs);
        assert_eq!(chosen.len(), 1);
        assert_eq!(chosen[0].0, CatalogKind::OrbitalBasis);
    }
}
