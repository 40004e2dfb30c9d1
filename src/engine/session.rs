//! Resolution Session
//!
//! Owns the live `SelectionState`, the catalogs it is checked against and
//! the variant tables of the last committed pass.
//!
//! # Pass Flow
//!
//! ```text
//! SelectionEvent
//!     ↓  apply()            new state, unknown picks rejected, uncovered choices dropped
//! PassTicket { generation, snapshot }
//!     ↓  fetch_pass()       one scoped thread per active kind, all settle
//! FetchedPass { ticket, maps, blocks, failures }
//!     ↓  commit()           accepted only if snapshot == live selection
//! outputs()                 availability + &KIND text + incompatibility flags + data blocks
//! ```
//!
//! # Design
//!
//! - **Snapshot-tagged**: a pass that finishes after the selection moved on is dropped
//! - **Wholesale replacement**: tables and data blocks are replaced per pass, never merged
//! - **No retries**: a failed kind is absent for that pass and reported

use std::collections::BTreeMap;
use std::thread;

use tracing::{debug, info, warn};

use crate::catalog::{Catalogs, DataBlock};
use crate::error::{KindsError, Result};
use crate::logic::render::RenderOptions;
use crate::logic::variants::VariantMaps;
use crate::logic::{compute_outputs, KindsOutput};
use crate::selection::{SelectionEvent, SelectionState};
use crate::source::DataSource;
use crate::types::CatalogKind;

// ============================================================================
// Pass records
// ============================================================================

/// Identifies one resolution pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassTicket {
    generation: u64,
    snapshot: SelectionState,
}

impl PassTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Selection the pass was started for
    pub fn snapshot(&self) -> &SelectionState {
        &self.snapshot
    }
}

/// A variant fetch that did not deliver
#[derive(Debug)]
pub struct FetchFailure {
    pub kind: CatalogKind,
    pub name: String,
    pub error: KindsError,
}

/// Results of every fetch of a pass, paired with their catalog kind
#[derive(Debug)]
pub struct FetchedPass {
    pub ticket: PassTicket,
    pub maps: VariantMaps,
    pub blocks: BTreeMap<CatalogKind, DataBlock>,
    pub failures: Vec<FetchFailure>,
}

// ============================================================================
// Session
// ============================================================================

/// Event-driven owner of the selection and its variant tables
#[derive(Debug)]
pub struct Session {
    catalogs: Catalogs,
    selection: SelectionState,
    generation: u64,
    committed_generation: u64,
    maps: VariantMaps,
    blocks: BTreeMap<CatalogKind, DataBlock>,
    failures: Vec<FetchFailure>,
    options: RenderOptions,
}

impl Session {
    pub fn new(catalogs: Catalogs, options: RenderOptions) -> Self {
        Self {
            catalogs,
            selection: SelectionState::default(),
            generation: 0,
            committed_generation: 0,
            maps: VariantMaps::new(),
            blocks: BTreeMap::new(),
            failures: Vec::new(),
            options,
        }
    }

    /// Session over the catalogs listed by `source`
    pub fn load(source: &dyn DataSource, options: RenderOptions) -> Result<Self> {
        let catalogs = source.load_catalogs()?;
        debug!(
            "Catalogs loaded: {} orbital, {} auxiliary, {} pseudopotential",
            catalogs.orbital.len(),
            catalogs.auxiliary.len(),
            catalogs.pseudopotential.len()
        );
        Ok(Self::new(catalogs, options))
    }

    pub fn catalogs(&self) -> &Catalogs {
        &self.catalogs
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Variant tables of the last committed pass
    pub fn maps(&self) -> &VariantMaps {
        &self.maps
    }

    /// Data blocks of the last committed pass
    pub fn blocks(&self) -> &BTreeMap<CatalogKind, DataBlock> {
        &self.blocks
    }

    /// Fetches that failed in the last committed pass
    pub fn failures(&self) -> &[FetchFailure] {
        &self.failures
    }

    /// Ticket of the live selection
    pub fn ticket(&self) -> PassTicket {
        PassTicket {
            generation: self.generation,
            snapshot: self.selection.clone(),
        }
    }

    /// Replace the selection according to `event`.
    ///
    /// Picking a name unknown to its catalog is rejected and leaves the
    /// session untouched. Choices that no longer cover the selected elements
    /// are dropped.
    pub fn apply(&mut self, event: &SelectionEvent) -> Result<PassTicket> {
        if let SelectionEvent::Pick { kind, name: Some(name) } = event {
            let name = name.trim();
            if !name.is_empty() && self.catalogs.entry(*kind, name).is_none() {
                return Err(KindsError::not_found(format!(
                    "{} `{name}` does not exist",
                    kind.label()
                )));
            }
        }

        let mut next = self.selection.apply(event);
        for kind in next.retain_selectable(&self.catalogs) {
            info!("Dropped {} choice: it does not cover {}", kind.label(), next.elements);
        }

        if next != self.selection {
            self.maps.clear();
            self.blocks.clear();
            self.failures.clear();
        }
        self.selection = next;
        self.generation += 1;

        debug!("Pass {} started for elements [{}]", self.generation, self.selection.elements);

        Ok(self.ticket())
    }

    /// Fetch the variant tables a ticket needs, one thread per active kind.
    ///
    /// Returns once every fetch has settled. Nothing is fetched when the
    /// snapshot has no element or no chosen entry.
    pub fn fetch_pass(source: &dyn DataSource, ticket: &PassTicket) -> FetchedPass {
        let snapshot = &ticket.snapshot;
        let mut maps = VariantMaps::new();
        let mut blocks = BTreeMap::new();
        let mut failures = Vec::new();

        if !snapshot.needs_variants() {
            return FetchedPass {
                ticket: ticket.clone(),
                maps,
                blocks,
                failures,
            };
        }

        let requests: Vec<(CatalogKind, &str)> = snapshot
            .active_kinds()
            .into_iter()
            .filter_map(|kind| snapshot.chosen(kind).map(|name| (kind, name)))
            .collect();

        let settled: Vec<(CatalogKind, &str, Result<_>)> = thread::scope(|scope| {
            let handles: Vec<_> = requests
                .iter()
                .map(|&(kind, name)| {
                    let handle = scope.spawn(move || source.get_data(kind, name, &snapshot.elements));
                    (kind, name, handle)
                })
                .collect();

            handles
                .into_iter()
                .map(|(kind, name, handle)| {
                    let result = handle
                        .join()
                        .unwrap_or_else(|_| Err(KindsError::fetch(kind, name, "fetch thread panicked")));
                    (kind, name, result)
                })
                .collect()
        });

        for (kind, name, result) in settled {
            match result {
                Ok(data) => {
                    let (variants, block) = data.into_parts();
                    maps.insert(kind, variants);
                    blocks.insert(kind, block);
                }
                Err(error) => {
                    warn!("Pass {}: {error}", ticket.generation);
                    failures.push(FetchFailure {
                        kind,
                        name: name.to_string(),
                        error,
                    });
                }
            }
        }

        FetchedPass {
            ticket: ticket.clone(),
            maps,
            blocks,
            failures,
        }
    }

    /// Install the tables of a finished pass.
    ///
    /// Returns `false` (and keeps the current tables) when the pass was
    /// started for a selection that is no longer the live one.
    pub fn commit(&mut self, pass: FetchedPass) -> bool {
        if pass.ticket.snapshot != self.selection || pass.ticket.generation < self.committed_generation {
            info!(
                "Discarding stale pass {} (current generation {})",
                pass.ticket.generation, self.generation
            );
            return false;
        }

        debug!(
            "Pass {} committed: {} table(s), {} failure(s)",
            pass.ticket.generation,
            pass.maps.len(),
            pass.failures.len()
        );
        self.committed_generation = pass.ticket.generation;
        self.maps = pass.maps;
        self.blocks = pass.blocks;
        self.failures = pass.failures;
        true
    }

    /// Outputs for the live selection and the committed tables
    pub fn outputs(&self) -> KindsOutput {
        compute_outputs(&self.selection, &self.catalogs, &self.maps, &self.options)
            .with_data(self.blocks.clone())
    }

    /// Apply, fetch and commit in one go
    pub fn run_event(&mut self, source: &dyn DataSource, event: &SelectionEvent) -> Result<KindsOutput> {
        let ticket = self.apply(event)?;
        let pass = Self::fetch_pass(source, &ticket);
        self.commit(pass);
        Ok(self.outputs())
    }
}
