//! Type-safe catalog kinds for cp2k-kinds
//!
//! The three independently selectable catalogs and the CP2K basis-set types
//! are proper enums instead of strings, so a kind can never be misspelled
//! between the selection, the data layer and the renderer.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// The catalog a selection is picked from
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum CatalogKind {
    #[strum(to_string = "orbital", serialize = "orb", serialize = "basis")]
    OrbitalBasis,
    #[strum(to_string = "auxiliary", serialize = "aux")]
    AuxiliaryBasis,
    #[strum(to_string = "pseudopotential", serialize = "pseudo", serialize = "pp")]
    Pseudopotential,
}

impl CatalogKind {
    /// All kinds, in rendering order (orbital, auxiliary, pseudopotential)
    pub fn all() -> impl Iterator<Item = Self> {
        Self::iter()
    }

    /// Human readable label used in messages
    pub const fn label(self) -> &'static str {
        match self {
            Self::OrbitalBasis => "orbital basis set",
            Self::AuxiliaryBasis => "auxiliary basis set",
            Self::Pseudopotential => "pseudopotential",
        }
    }

    /// Whether entries of this kind come from the basis-set storage
    pub const fn is_basis(self) -> bool {
        matches!(self, Self::OrbitalBasis | Self::AuxiliaryBasis)
    }

    /// Path segment of the REST API serving this kind
    pub const fn api_segment(self) -> &'static str {
        if self.is_basis() {
            "basis"
        } else {
            "pseudopotentials"
        }
    }

    /// CP2K `&KIND` keyword for this kind
    pub const fn keyword(self) -> &'static str {
        if self.is_basis() {
            "BASIS_SET"
        } else {
            "POTENTIAL"
        }
    }
}

/// CP2K basis-set type, as written after `BASIS_SET` in a `&KIND` section
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[derive(Display, EnumString)]
#[serde(from = "String", into = "String")]
pub enum BasisType {
    #[default]
    #[strum(serialize = "ORB")]
    Orb,
    #[strum(serialize = "AUX")]
    Aux,
    #[strum(serialize = "AUX_FIT")]
    AuxFit,
    #[strum(serialize = "RI_AUX")]
    RiAux,
    #[strum(serialize = "LRI_AUX")]
    LriAux,
    #[strum(serialize = "RI_HXC")]
    RiHxc,
    #[strum(serialize = "RI_HFX")]
    RiHfx,
    /// Any other type the library declares
    #[strum(default)]
    Other(String),
}

impl BasisType {
    /// Orbital basis sets go to the orbital catalog, everything else is auxiliary
    pub fn is_orbital(&self) -> bool {
        matches!(self, Self::Orb)
    }
}

impl From<String> for BasisType {
    fn from(value: String) -> Self {
        // `strum(default)` makes parsing infallible
        value.parse().unwrap_or(Self::Other(value))
    }
}

impl From<BasisType> for String {
    fn from(value: BasisType) -> Self {
        value.to_string()
    }
}
