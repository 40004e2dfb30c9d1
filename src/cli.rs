use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::elements::ElementSet;
use crate::types::{BasisType, CatalogKind};

/// cp2k-kinds - Basis sets and pseudopotentials for CP2K `&KIND` sections
#[derive(Parser)]
#[command(name = "cp2k-kinds")]
#[command(about = "Resolve compatible basis sets and pseudopotentials into CP2K &KIND sections")]
#[command(version)]
pub struct Cli {
    /// Path to a JSON configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Read catalogs from a JSON library file (overrides the configuration)
    #[arg(long, global = true, conflicts_with = "url")]
    pub library: Option<PathBuf>,

    /// Base URL of a cp2k-basis webservice (overrides the configuration)
    #[arg(long, global = true)]
    pub url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Entries chosen for each catalog kind
#[derive(Args, Debug, Clone, Default)]
pub struct Choices {
    /// Orbital basis set family
    #[arg(long)]
    pub basis: Option<String>,

    /// Auxiliary basis set family
    #[arg(long)]
    pub aux: Option<String>,

    /// Pseudopotential family
    #[arg(long)]
    pub pseudo: Option<String>,
}

impl Choices {
    /// (kind, name) pairs of the given choices, in rendering order
    pub fn picks(&self) -> Vec<(CatalogKind, String)> {
        [
            (CatalogKind::OrbitalBasis, &self.basis),
            (CatalogKind::AuxiliaryBasis, &self.aux),
            (CatalogKind::Pseudopotential, &self.pseudo),
        ]
        .into_iter()
        .filter_map(|(kind, name)| name.clone().map(|name| (kind, name)))
        .collect()
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render the &KIND sections for a selection
    Kinds {
        /// Elements, e.g. `H,O` or `H-Ne,Fe` (atomic numbers accepted)
        #[arg(short, long)]
        elements: ElementSet,

        #[command(flatten)]
        choices: Choices,

        /// Basis type written for the auxiliary basis (e.g. RI_AUX)
        #[arg(long)]
        aux_type: Option<BasisType>,

        /// Also print the basis-set and pseudopotential data of the selection
        #[arg(long)]
        data: bool,
    },
    /// List the entries of a catalog that cover the given elements
    List {
        /// Catalog kind (orbital, auxiliary, pseudopotential)
        kind: CatalogKind,

        /// Elements every listed entry must cover
        #[arg(short, long)]
        elements: Option<ElementSet>,

        /// Case-insensitive substring of the entry name
        #[arg(short, long, default_value = "")]
        search: String,

        /// Only entries carrying this tag
        #[arg(short, long)]
        tag: Option<String>,
    },
    /// Show which elements are covered by every chosen entry
    Availability {
        #[command(flatten)]
        choices: Choices,
    },
    /// Show the metadata of a catalog entry
    Metadata {
        /// Catalog kind (orbital, auxiliary, pseudopotential)
        kind: CatalogKind,

        /// Entry name
        name: String,
    },
    /// Validate a configuration file
    ValidateConfig {
        /// Path to configuration file to validate
        config: PathBuf,
    },
    /// Write the default configuration to a file
    InitConfig {
        /// Destination path
        path: PathBuf,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        <Self as clap::Parser>::parse()
    }
}
