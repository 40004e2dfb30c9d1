// Session tests for cp2k-kinds
//
// Drive a `Session` against an in-memory data source to check pass
// staleness, concurrent fetching and fetch-failure reporting.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Barrier;

use cp2k_kinds::catalog::{CatalogListing, EntryData, EntryMetadata};
use cp2k_kinds::engine::session::Session;
use cp2k_kinds::logic::render::RenderOptions;
use cp2k_kinds::source::DataSource;
use cp2k_kinds::{CatalogKind, Element, ElementSet, ElementVariants, KindsError, Result, SelectionEvent, VariantMap};

fn el(symbol: &str) -> Element {
    Element::from_symbol(symbol).unwrap()
}

/// Serves `DZVP` (orbital) and `GTH-PBE` (pseudopotential) for H, O and Li
struct FakeSource {
    fail_pseudo: bool,
    barrier: Option<Barrier>,
    data_calls: AtomicUsize,
}

impl FakeSource {
    fn new() -> Self {
        Self {
            fail_pseudo: false,
            barrier: None,
            data_calls: AtomicUsize::new(0),
        }
    }

    fn tags(kind: CatalogKind, element: Element) -> Vec<(&'static str, String)> {
        let prefix = if kind == CatalogKind::Pseudopotential { "GTH-PBE" } else { "DZVP" };
        let tags: &[&str] = match (kind, element.symbol()) {
            (_, "H") => &["q1"],
            (_, "O") => &["q6"],
            (CatalogKind::Pseudopotential, "Li") => &["q3"],
            (_, "Li") => &["q1", "q3"],
            _ => &[],
        };
        tags.iter().map(|t| (*t, format!("{prefix}-{t}"))).collect()
    }
}

impl DataSource for FakeSource {
    fn list_catalog(&self, kind: CatalogKind) -> Result<CatalogListing> {
        let name = match kind {
            CatalogKind::OrbitalBasis => "DZVP",
            CatalogKind::AuxiliaryBasis => return Ok(CatalogListing::default()),
            CatalogKind::Pseudopotential => "GTH-PBE",
        };
        Ok(CatalogListing {
            elements: BTreeMap::from([(name.to_string(), ElementSet::parse("H,Li,O").unwrap().to_sorted_set())]),
            ..Default::default()
        })
    }

    fn get_metadata(&self, _kind: CatalogKind, name: &str) -> Result<EntryMetadata> {
        Ok(EntryMetadata {
            name: name.to_string(),
            ..Default::default()
        })
    }

    fn get_data(&self, kind: CatalogKind, name: &str, elements: &ElementSet) -> Result<EntryData> {
        self.data_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(barrier) = &self.barrier {
            barrier.wait();
        }
        if self.fail_pseudo && kind == CatalogKind::Pseudopotential {
            return Err(KindsError::fetch(kind, name, "HTTP 503"));
        }

        let variants: VariantMap = elements
            .iter()
            .map(|e| (e, ElementVariants::try_from(Self::tags(kind, e)).unwrap()))
            .collect();
        Ok(EntryData {
            data: format!("{name} {}\n", elements.to_query()),
            metadata: self.get_metadata(kind, name)?,
            variants,
        })
    }
}

fn pick(kind: CatalogKind, name: &str) -> SelectionEvent {
    SelectionEvent::Pick {
        kind,
        name: Some(name.to_string()),
    }
}

fn session(source: &FakeSource) -> Session {
    Session::load(source, RenderOptions::default()).unwrap()
}

#[test]
fn test_run_event_renders_committed_tables() {
    let source = FakeSource::new();
    let mut session = session(&source);

    session
        .run_event(&source, &SelectionEvent::SetElements(ElementSet::parse("O,H").unwrap()))
        .unwrap();
    let output = session.run_event(&source, &pick(CatalogKind::OrbitalBasis, "DZVP")).unwrap();

    assert_eq!(
        output.text,
        "&KIND O\n  BASIS_SET DZVP-q6\n&END KIND\n&KIND H\n  BASIS_SET DZVP-q1\n&END KIND"
    );
    assert_eq!(source.data_calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_no_fetch_without_elements() {
    let source = FakeSource::new();
    let mut session = session(&source);

    let output = session.run_event(&source, &pick(CatalogKind::OrbitalBasis, "DZVP")).unwrap();

    assert_eq!(output.text, "Select element(s).");
    assert_eq!(source.data_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_stale_pass_is_not_committed() {
    let source = FakeSource::new();
    let mut session = session(&source);

    session.apply(&pick(CatalogKind::OrbitalBasis, "DZVP")).unwrap();
    let first = session.apply(&SelectionEvent::ToggleElement(el("O"))).unwrap();
    let second = session.apply(&SelectionEvent::ToggleElement(el("H"))).unwrap();
    assert!(second.generation() > first.generation());

    let late = Session::fetch_pass(&source, &first);
    assert!(!late.maps.is_empty());
    assert!(!session.commit(late));
    assert!(session.maps().is_empty());

    let current = Session::fetch_pass(&source, &second);
    assert!(session.commit(current));
    assert!(session.outputs().text.contains("BASIS_SET DZVP-q1"));
}

#[test]
fn test_data_follows_committed_pass() {
    let source = FakeSource::new();
    let mut session = session(&source);

    session.apply(&pick(CatalogKind::Pseudopotential, "GTH-PBE")).unwrap();
    let first = session.apply(&SelectionEvent::ToggleElement(el("O"))).unwrap();
    let second = session.apply(&SelectionEvent::ToggleElement(el("H"))).unwrap();

    let late = Session::fetch_pass(&source, &first);
    assert_eq!(late.blocks[&CatalogKind::Pseudopotential].data, "GTH-PBE O\n");
    assert!(!session.commit(late));
    assert!(session.outputs().data.is_empty());

    assert!(session.commit(Session::fetch_pass(&source, &second)));
    let output = session.outputs();
    let block = &output.data[&CatalogKind::Pseudopotential];
    assert_eq!(block.data, "GTH-PBE H,O\n");
    assert_eq!(block.metadata.name, "GTH-PBE");

    session.apply(&SelectionEvent::ToggleElement(el("O"))).unwrap();
    assert!(session.blocks().is_empty());
}

#[test]
fn test_change_clears_committed_tables() {
    let source = FakeSource::new();
    let mut session = session(&source);

    session.apply(&SelectionEvent::SetElements(ElementSet::parse("O").unwrap())).unwrap();
    session.run_event(&source, &pick(CatalogKind::OrbitalBasis, "DZVP")).unwrap();
    assert_eq!(session.maps().len(), 1);

    session.apply(&SelectionEvent::ToggleElement(el("H"))).unwrap();
    assert!(session.maps().is_empty());
    assert_eq!(session.outputs().text, "&KIND O\n  BASIS_SET DZVP\n&END KIND\n&KIND H\n  BASIS_SET DZVP\n&END KIND");
}

#[test]
fn test_fetches_run_concurrently() {
    let source = FakeSource {
        barrier: Some(Barrier::new(2)),
        ..FakeSource::new()
    };
    let mut session = session(&source);

    session.apply(&SelectionEvent::SetElements(ElementSet::parse("Li").unwrap())).unwrap();
    session.apply(&pick(CatalogKind::OrbitalBasis, "DZVP")).unwrap();
    let output = session.run_event(&source, &pick(CatalogKind::Pseudopotential, "GTH-PBE")).unwrap();

    assert_eq!(
        output.text,
        "&KIND Li\n  BASIS_SET DZVP-q3\n  POTENTIAL GTH-PBE-q3\n&END KIND"
    );
    assert_eq!(source.data_calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_failed_fetch_is_reported_not_fatal() {
    let source = FakeSource {
        fail_pseudo: true,
        ..FakeSource::new()
    };
    let mut session = session(&source);

    session.apply(&SelectionEvent::SetElements(ElementSet::parse("H").unwrap())).unwrap();
    session.apply(&pick(CatalogKind::OrbitalBasis, "DZVP")).unwrap();
    let output = session.run_event(&source, &pick(CatalogKind::Pseudopotential, "GTH-PBE")).unwrap();

    assert_eq!(session.failures().len(), 1);
    assert_eq!(session.failures()[0].kind, CatalogKind::Pseudopotential);
    assert!(output.data.contains_key(&CatalogKind::OrbitalBasis));
    assert!(!output.data.contains_key(&CatalogKind::Pseudopotential));
    assert!(session.failures()[0].error.is_fetch_failure());
    assert_eq!(output.text, "&KIND H\n  BASIS_SET DZVP-q1\n  POTENTIAL GTH-PBE\n&END KIND");
    assert!(!output.has_incompatibility());
}

#[test]
fn test_unknown_pick_is_rejected() {
    let source = FakeSource::new();
    let mut session = session(&source);

    let err = session.apply(&pick(CatalogKind::Pseudopotential, "GTH-BLYP")).unwrap_err();
    assert!(matches!(err, KindsError::NotFound(_)));
    assert_eq!(session.generation(), 0);
}

#[test]
fn test_clear_resets_everything() {
    let source = FakeSource::new();
    let mut session = session(&source);

    session.apply(&SelectionEvent::SetElements(ElementSet::parse("O").unwrap())).unwrap();
    session.run_event(&source, &pick(CatalogKind::OrbitalBasis, "DZVP")).unwrap();
    let output = session.run_event(&source, &SelectionEvent::Clear).unwrap();

    assert_eq!(output.text, "Select element(s).");
    assert!(output.availability.is_empty());
    assert!(session.maps().is_empty());
}
