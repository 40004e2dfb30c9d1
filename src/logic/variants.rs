//! Variant Resolver
//!
//! For every selected element, finds the variant tags offered by all the
//! active catalog kinds at once and picks a default among them.
//!
//! # Resolution Rules
//!
//! | Situation                               | Result |
//! |-----------------------------------------|--------|
//! | no active kind                          | `Unconstrained` (bare `&KIND` header) |
//! | candidates = ∩ tags over active kinds   | |
//! | candidates empty                        | `Incompatible`, with each kind's tags |
//! | otherwise                               | default = largest `q<N>`, others are alternatives |
//!
//! An active kind is a kind with a chosen entry *and* a variant table for
//! the current pass. A chosen kind whose table is missing (failed fetch)
//! adds no constraint. Each element is resolved on its own: one incompatible
//! element never prevents the others from resolving.

use std::collections::BTreeMap;

use crate::elements::Element;
use crate::selection::SelectionState;
use crate::types::CatalogKind;
use crate::variant::{VariantMap, VariantTag};

/// Variant tables of the current pass, one per catalog kind
pub type VariantMaps = BTreeMap<CatalogKind, VariantMap>;

/// Variant tables taking part in the resolution, in rendering order
pub type ActiveMaps<'a> = Vec<(CatalogKind, &'a VariantMap)>;

/// Outcome of resolving one element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// No active kind: nothing to resolve
    Unconstrained,
    /// At least one common variant
    Resolved {
        default: VariantTag,
        /// Other common variants, in source order
        alternatives: Vec<VariantTag>,
    },
    /// No common variant; tags each active kind offers for the element
    Incompatible { available: Vec<(CatalogKind, Vec<VariantTag>)> },
}

impl Resolution {
    pub fn is_incompatible(&self) -> bool {
        matches!(self, Self::Incompatible { .. })
    }

    pub fn default_tag(&self) -> Option<VariantTag> {
        match self {
            Self::Resolved { default, .. } => Some(*default),
            _ => None,
        }
    }
}

/// Resolution of one selected element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementResolution {
    pub element: Element,
    pub resolution: Resolution,
}

/// Tables of the chosen kinds that are present in `maps`
pub fn active_maps<'a>(selection: &SelectionState, maps: &'a VariantMaps) -> ActiveMaps<'a> {
    selection
        .active_kinds()
        .into_iter()
        .filter_map(|kind| maps.get(&kind).map(|map| (kind, map)))
        .collect()
}

/// Tags of `element` common to every active table, in the first table's order.
///
/// `None` when there is no active table.
pub fn candidate_tags(element: Element, active: &[(CatalogKind, &VariantMap)]) -> Option<Vec<VariantTag>> {
    let ((_, first), rest) = active.split_first()?;

    let mut candidates: Vec<VariantTag> = first
        .get(&element)
        .map(|variants| variants.tags().collect())
        .unwrap_or_default();

    for (_, map) in rest {
        let variants = map.get(&element);
        candidates.retain(|tag| variants.is_some_and(|v| v.contains(*tag)));
    }

    Some(candidates)
}

/// Resolve a single element against the active tables
pub fn resolve_element(element: Element, active: &[(CatalogKind, &VariantMap)]) -> Resolution {
    let Some(candidates) = candidate_tags(element, active) else {
        return Resolution::Unconstrained;
    };

    // Largest valence count first: fewest core electrons replaced
    let Some(default) = candidates.iter().copied().max() else {
        let available = active
            .iter()
            .map(|(kind, map)| {
                let tags = map
                    .get(&element)
                    .map(|variants| variants.tags().collect())
                    .unwrap_or_default();
                (*kind, tags)
            })
            .collect();
        return Resolution::Incompatible { available };
    };

    let alternatives = candidates.into_iter().filter(|tag| *tag != default).collect();
    Resolution::Resolved { default, alternatives }
}

/// Resolve every selected element, in selection order
pub fn resolve_variants(selection: &SelectionState, maps: &VariantMaps) -> Vec<ElementResolution> {
    let active = active_maps(selection, maps);

    selection
        .elements
        .iter()
        .map(|element| ElementResolution {
            element,
            resolution: resolve_element(element, &active),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::ElementSet;
    use crate::variant::ElementVariants;

    fn el(symbol: &str) -> Element {
        Element::from_symbol(symbol).unwrap()
    }

    fn q(n: u32) -> VariantTag {
        VariantTag::new(n)
    }

    fn table(element: &str, pairs: &[(&str, &str)]) -> VariantMap {
        let variants = ElementVariants::try_from(pairs.to_vec()).unwrap();
        VariantMap::from([(el(element), variants)])
    }

    #[test]
    fn test_no_active_map_is_unconstrained() {
        assert_eq!(resolve_element(el("H"), &[]), Resolution::Unconstrained);
    }

    #[test]
    fn test_default_is_largest_suffix() {
        let map = table("Fe", &[("q4", "a"), ("q10", "b"), ("q2", "c")]);
        let resolution = resolve_element(el("Fe"), &[(CatalogKind::OrbitalBasis, &map)]);
        assert_eq!(
            resolution,
            Resolution::Resolved {
                default: q(10),
                alternatives: vec![q(4), q(2)],
            }
        );
    }

    #[test]
    fn test_intersection_across_kinds() {
        let basis = table("Fe", &[("q8", "Fe-q8"), ("q16", "Fe-q16")]);
        let pseudo = table("Fe", &[("q8", "Fe-pot-q8")]);
        let active = [
            (CatalogKind::OrbitalBasis, &basis),
            (CatalogKind::Pseudopotential, &pseudo),
        ];
        let resolution = resolve_element(el("Fe"), &active);
        assert_eq!(resolution.default_tag(), Some(q(8)));
        assert_eq!(
            resolution,
            Resolution::Resolved {
                default: q(8),
                alternatives: vec![],
            }
        );
    }

    #[test]
    fn test_disjoint_tags_are_incompatible() {
        let basis = table("Li", &[("q1", "Li-q1")]);
        let pseudo = table("Li", &[("q3", "Li-pot-q3")]);
        let active = [
            (CatalogKind::OrbitalBasis, &basis),
            (CatalogKind::Pseudopotential, &pseudo),
        ];
        let resolution = resolve_element(el("Li"), &active);
        assert!(resolution.is_incompatible());
        assert_eq!(
            resolution,
            Resolution::Incompatible {
                available: vec![
                    (CatalogKind::OrbitalBasis, vec![q(1)]),
                    (CatalogKind::Pseudopotential, vec![q(3)]),
                ]
            }
        );
    }

    #[test]
    fn test_missing_element_in_one_table_is_incompatible() {
        let basis = table("O", &[("q6", "O-q6")]);
        let pseudo = VariantMap::new();
        let active = [
            (CatalogKind::OrbitalBasis, &basis),
            (CatalogKind::Pseudopotential, &pseudo),
        ];
        assert!(resolve_element(el("O"), &active).is_incompatible());
    }

    #[test]
    fn test_resolve_variants_keeps_selection_order() {
        let mut basis = table("O", &[("q6", "O-q6")]);
        basis.extend(table("H", &[("q1", "H-q1")]));

        let selection = SelectionState::new()
            .with_elements(ElementSet::parse("O,H").unwrap())
            .with_choice(CatalogKind::OrbitalBasis, Some("DZVP"));
        let maps = VariantMaps::from([(CatalogKind::OrbitalBasis, basis)]);

        let resolved = resolve_variants(&selection, &maps);
        assert_eq!(resolved[0].element, el("O"));
        assert_eq!(resolved[0].resolution.default_tag(), Some(q(6)));
        assert_eq!(resolved[1].element, el("H"));
        assert_eq!(resolved[1].resolution.default_tag(), Some(q(1)));
    }

    #[test]
    fn test_unselected_kind_adds_no_constraint() {
        let basis = table("H", &[("q1", "H-q1")]);
        let pseudo = table("H", &[("q3", "H-pot-q3")]);

        // pseudopotential table left over, but no pseudopotential chosen
        let selection = SelectionState::new()
            .with_elements(ElementSet::parse("H").unwrap())
            .with_choice(CatalogKind::OrbitalBasis, Some("DZVP"));
        let maps = VariantMaps::from([
            (CatalogKind::OrbitalBasis, basis),
            (CatalogKind::Pseudopotential, pseudo),
        ]);

        let resolved = resolve_variants(&selection, &maps);
        assert_eq!(resolved[0].resolution.default_tag(), Some(q(1)));
    }

    #[test]
    fn test_chosen_kind_without_table_adds_no_constraint() {
        let basis = table("H", &[("q1", "H-q1")]);
        let selection = SelectionState::new()
            .with_elements(ElementSet::parse("H").unwrap())
            .with_choice(CatalogKind::OrbitalBasis, Some("DZVP"))
            .with_choice(CatalogKind::Pseudopotential, Some("GTH-PBE"));
        let maps = VariantMaps::from([(CatalogKind::OrbitalBasis, basis)]);

        let active = active_maps(&selection, &maps);
        assert_eq!(active.len(), 1);
        let resolved = resolve_variants(&selection, &maps);
        assert_eq!(resolved[0].resolution.default_tag(), Some(q(1)));
    }
}
