//! Chemical elements and element selections
//!
//! `Element` is a validated atomic number (H..Lr) that displays as its
//! symbol. `ElementSet` keeps the order in which the user picked elements,
//! which is the order `&KIND` blocks are rendered in, while behaving as a set
//! for every membership question.
//!
//! # Element lists
//!
//! `ElementSet::parse` accepts the same syntax as the webservice query
//! string: comma-separated symbols or atomic numbers, with inclusive ranges.
//!
//! ```text
//! H,O        -> [H, O]
//! H-Be,26    -> [H, He, Li, Be, Fe]
//! Ne-Li      -> [Li, Be, B, C, N, O, F, Ne]   (ends may be swapped)
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::{KindsError, Result};

/// Highest atomic number known to the library (Lr)
pub const MAX_Z: u8 = 103;

const SYMBOLS: [&str; MAX_Z as usize] = [
    "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne", "Na", "Mg", "Al", "Si", "P", "S", "Cl",
    "Ar", "K", "Ca", "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn", "Ga", "Ge", "As",
    "Se", "Br", "Kr", "Rb", "Sr", "Y", "Zr", "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd", "In",
    "Sn", "Sb", "Te", "I", "Xe", "Cs", "Ba", "La", "Ce", "Pr", "Nd", "Pm", "Sm", "Eu", "Gd", "Tb",
    "Dy", "Ho", "Er", "Tm", "Yb", "Lu", "Hf", "Ta", "W", "Re", "Os", "Ir", "Pt", "Au", "Hg", "Tl",
    "Pb", "Bi", "Po", "At", "Rn", "Fr", "Ra", "Ac", "Th", "Pa", "U", "Np", "Pu", "Am", "Cm", "Bk",
    "Cf", "Es", "Fm", "Md", "No", "Lr",
];

// ============================================================================
// Element
// ============================================================================

/// A chemical element, ordered by atomic number
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Element(u8);

impl Element {
    /// Element from its atomic number (1..=103)
    pub fn from_z(z: u8) -> Result<Self> {
        if (1..=MAX_Z).contains(&z) {
            Ok(Self(z))
        } else {
            Err(KindsError::invalid_element(format!("`{z}` is not a valid Z value")))
        }
    }

    /// Element from its symbol (case-sensitive, e.g. `Fe`)
    pub fn from_symbol(symbol: &str) -> Result<Self> {
        SYMBOLS
            .iter()
            .position(|s| *s == symbol)
            .map(|i| Self(i as u8 + 1))
            .ok_or_else(|| KindsError::invalid_element(format!("`{symbol}` is not a valid element")))
    }

    /// Atomic number
    pub const fn z(self) -> u8 {
        self.0
    }

    pub fn symbol(self) -> &'static str {
        SYMBOLS[self.0 as usize - 1]
    }
}

impl FromStr for Element {
    type Err = KindsError;

    /// Accepts a symbol or an atomic number
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        match s.parse::<u8>() {
            Ok(z) => Self::from_z(z),
            Err(_) if s.chars().all(|c| c.is_ascii_digit()) && !s.is_empty() => Err(
                KindsError::invalid_element(format!("`{s}` is not a valid Z value")),
            ),
            Err(_) => Self::from_symbol(s),
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.symbol())
    }
}

impl TryFrom<String> for Element {
    type Error = KindsError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Element> for String {
    fn from(value: Element) -> Self {
        value.symbol().to_string()
    }
}

// ============================================================================
// ElementSet
// ============================================================================

/// Elements picked by the user: insertion ordered, no duplicates
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<Element>")]
pub struct ElementSet(Vec<Element>);

impl ElementSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an element list such as `H-Ne,Fe,26`
    pub fn parse(input: &str) -> Result<Self> {
        let mut set = Self::new();

        for item in input.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            match item.split_once('-') {
                Some((start, end)) => {
                    if end.contains('-') {
                        return Err(KindsError::invalid_element(format!(
                            "range `{item}` should be two elements"
                        )));
                    }

                    let (mut start, mut end) = (start.parse::<Element>()?, end.parse::<Element>()?);
                    if start > end {
                        std::mem::swap(&mut start, &mut end);
                    }

                    for z in start.z()..=end.z() {
                        set.insert(Element(z));
                    }
                }
                None => {
                    set.insert(item.parse()?);
                }
            }
        }

        Ok(set)
    }

    /// Add an element; returns false if it was already selected
    pub fn insert(&mut self, element: Element) -> bool {
        if self.contains(element) {
            false
        } else {
            self.0.push(element);
            true
        }
    }

    /// Remove an element; returns false if it was not selected
    pub fn remove(&mut self, element: Element) -> bool {
        match self.0.iter().position(|e| *e == element) {
            Some(pos) => {
                self.0.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Add the element if absent, remove it otherwise
    pub fn toggle(&mut self, element: Element) {
        if !self.remove(element) {
            self.0.push(element);
        }
    }

    pub fn contains(&self, element: Element) -> bool {
        self.0.contains(&element)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Elements in selection order
    pub fn iter(&self) -> impl Iterator<Item = Element> + '_ {
        self.0.iter().copied()
    }

    /// Elements in atomic number order
    pub fn iter_sorted(&self) -> impl Iterator<Item = Element> {
        self.to_sorted_set().into_iter()
    }

    pub fn to_sorted_set(&self) -> BTreeSet<Element> {
        self.0.iter().copied().collect()
    }

    /// Every selected element belongs to `other`
    pub fn is_subset_of(&self, other: &BTreeSet<Element>) -> bool {
        self.0.iter().all(|e| other.contains(e))
    }

    /// Query-string form used by the data layer: symbols sorted by Z
    pub fn to_query(&self) -> String {
        self.iter_sorted()
            .map(Element::symbol)
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl FromIterator<Element> for ElementSet {
    fn from_iter<T: IntoIterator<Item = Element>>(iter: T) -> Self {
        let mut set = Self::new();
        for element in iter {
            set.insert(element);
        }
        set
    }
}

impl From<Vec<Element>> for ElementSet {
    fn from(elements: Vec<Element>) -> Self {
        elements.into_iter().collect()
    }
}

impl FromStr for ElementSet {
    type Err = KindsError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for ElementSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbols: Vec<&str> = self.0.iter().map(|e| e.symbol()).collect();
        write!(f, "{}", symbols.join(","))
    }
}

// ============================================================================
// Periodic table
// ============================================================================

const TABLE_COLUMNS: usize = 18;

/// Main table rows as (column, Z) pairs; `0` marks the f-block placeholder.
fn main_rows() -> Vec<Vec<(usize, u8)>> {
    let run = |first_col: usize, zs: std::ops::RangeInclusive<u8>| {
        zs.enumerate()
            .map(move |(i, z)| (first_col + i, z))
            .collect::<Vec<_>>()
    };

    vec![
        vec![(0, 1), (17, 2)],
        [run(0, 3..=4), run(12, 5..=10)].concat(),
        [run(0, 11..=12), run(12, 13..=18)].concat(),
        run(0, 19..=36),
        run(0, 37..=54),
        [run(0, 55..=56), vec![(2, 0)], run(3, 72..=86)].concat(),
        [run(0, 87..=88), vec![(2, 0)]].concat(),
    ]
}

fn format_row(cells: &[(usize, String)]) -> String {
    let mut line = vec![String::from("  "); TABLE_COLUMNS];
    for (col, text) in cells {
        line[*col] = format!("{text:2}");
    }
    line.join(" ").trim_end().to_string()
}

/// Text periodic table where elements outside `available` print as `..`
pub fn periodic_table(title: &str, available: &BTreeSet<Element>) -> String {
    let cell = |z: u8| -> String {
        let element = Element(z);
        if available.contains(&element) {
            element.symbol().to_string()
        } else {
            "..".to_string()
        }
    };

    let mut lines = vec![format!("Available for {title}:"), String::new()];

    for (row_index, row) in main_rows().into_iter().enumerate() {
        let marker = if row_index == 5 { "*" } else { "**" };
        let cells: Vec<(usize, String)> = row
            .into_iter()
            .map(|(col, z)| (col, if z == 0 { marker.to_string() } else { cell(z) }))
            .collect();
        lines.push(format_row(&cells));
    }

    lines.push(String::new());
    for (marker, zs) in [("*", 57..=71u8), ("**", 89..=MAX_Z)] {
        let mut cells = vec![(2, marker.to_string())];
        cells.extend(zs.enumerate().map(|(i, z)| (3 + i, cell(z))));
        lines.push(format_row(&cells));
    }

    lines.join("\n")
}
