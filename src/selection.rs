//! Selection state: what the user picked
//!
//! `SelectionState` is a plain value. Every user intent is a
//! `SelectionEvent`, and applying an event returns a new state instead of
//! mutating fields one by one, so a state can be kept as the snapshot that
//! identifies a resolution pass.

use serde::{Deserialize, Serialize};

use crate::catalog::Catalogs;
use crate::elements::{Element, ElementSet};
use crate::logic::availability::is_selectable;
use crate::types::CatalogKind;

/// User intents that change the selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionEvent {
    /// Click on a cell of the periodic table
    ToggleElement(Element),
    /// Replace the whole element selection
    SetElements(ElementSet),
    /// Choose an entry of a catalog (`None` unselects)
    Pick {
        kind: CatalogKind,
        name: Option<String>,
    },
    /// Unselect everything
    Clear,
}

/// Current choices: elements plus zero or one entry per catalog kind
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SelectionState {
    pub elements: ElementSet,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orbital: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auxiliary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pseudopotential: Option<String>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_elements(mut self, elements: ElementSet) -> Self {
        self.elements = elements;
        self
    }

    pub fn with_choice(mut self, kind: CatalogKind, name: Option<&str>) -> Self {
        *self.choice_mut(kind) = normalize_name(name.map(str::to_string));
        self
    }

    /// Name of the entry chosen for `kind`
    pub fn chosen(&self, kind: CatalogKind) -> Option<&str> {
        match kind {
            CatalogKind::OrbitalBasis => self.orbital.as_deref(),
            CatalogKind::AuxiliaryBasis => self.auxiliary.as_deref(),
            CatalogKind::Pseudopotential => self.pseudopotential.as_deref(),
        }
    }

    fn choice_mut(&mut self, kind: CatalogKind) -> &mut Option<String> {
        match kind {
            CatalogKind::OrbitalBasis => &mut self.orbital,
            CatalogKind::AuxiliaryBasis => &mut self.auxiliary,
            CatalogKind::Pseudopotential => &mut self.pseudopotential,
        }
    }

    /// Kinds with a chosen entry, in rendering order
    pub fn active_kinds(&self) -> Vec<CatalogKind> {
        CatalogKind::all()
            .filter(|kind| self.chosen(*kind).is_some())
            .collect()
    }

    /// Variant tables are only needed once there is something to resolve
    pub fn needs_variants(&self) -> bool {
        !self.elements.is_empty() && !self.active_kinds().is_empty()
    }

    /// State after `event`
    pub fn apply(&self, event: &SelectionEvent) -> Self {
        let mut next = self.clone();
        match event {
            SelectionEvent::ToggleElement(element) => next.elements.toggle(*element),
            SelectionEvent::SetElements(elements) => next.elements = elements.clone(),
            SelectionEvent::Pick { kind, name } => *next.choice_mut(*kind) = normalize_name(name.clone()),
            SelectionEvent::Clear => next = Self::default(),
        }
        next
    }

    /// Drop choices that are unknown or no longer cover every selected element
    ///
    /// Returns the kinds that were dropped.
    pub fn retain_selectable(&mut self, catalogs: &Catalogs) -> Vec<CatalogKind> {
        let mut dropped = Vec::new();

        for kind in CatalogKind::all() {
            let keep = match self.chosen(kind) {
                Some(name) => catalogs
                    .entry(kind, name)
                    .is_some_and(|entry| is_selectable(&self.elements, entry)),
                None => continue,
            };

            if !keep {
                *self.choice_mut(kind) = None;
                dropped.push(kind);
            }
        }

        dropped
    }
}

/// Empty names mean "nothing selected"
fn normalize_name(name: Option<String>) -> Option<String> {
    name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty())
}
