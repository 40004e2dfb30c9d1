// Library file tests for cp2k-kinds
//
// Write a library to a temporary file, load it back as a data source and
// run a full selection through a session.

use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;

use tempfile::NamedTempFile;

use cp2k_kinds::config::{AppConfig, SourceConfig};
use cp2k_kinds::engine::session::Session;
use cp2k_kinds::source::{DataSource, Library, LibraryAtom, LibraryFamily, LibrarySource};
use cp2k_kinds::{BasisType, CatalogKind, Element, ElementSet, ElementVariants, EntryMetadata, SelectionEvent};

fn el(symbol: &str) -> Element {
    Element::from_symbol(symbol).unwrap()
}

fn atom(symbol: &str, family: &str, tags: &[&str]) -> (Element, LibraryAtom) {
    let pairs: Vec<(&str, String)> = tags.iter().map(|t| (*t, format!("{family}-{t}"))).collect();
    (
        el(symbol),
        LibraryAtom {
            data: format!("{symbol} {family}\n"),
            variants: ElementVariants::try_from(pairs).unwrap(),
        },
    )
}

fn family(name: &str, basis_type: BasisType, atoms: Vec<(Element, LibraryAtom)>) -> LibraryFamily {
    LibraryFamily {
        metadata: EntryMetadata {
            description: format!("{name} family"),
            ..Default::default()
        },
        basis_type,
        tags: BTreeSet::from([name.split('-').next().unwrap_or(name).to_string()]),
        elements: atoms.into_iter().collect(),
    }
}

fn library() -> Library {
    Library {
        build_date: Some("2024-03-01T10:00:00".to_string()),
        basis_sets: BTreeMap::from([
            (
                "DZVP-MOLOPT-SR-GTH".to_string(),
                family(
                    "DZVP-MOLOPT-SR-GTH",
                    BasisType::Orb,
                    vec![
                        atom("H", "DZVP-MOLOPT-SR-GTH", &["q1"]),
                        atom("O", "DZVP-MOLOPT-SR-GTH", &["q6"]),
                        atom("Fe", "DZVP-MOLOPT-SR-GTH", &["q8", "q16"]),
                    ],
                ),
            ),
            (
                "RI-TZ".to_string(),
                family(
                    "RI-TZ",
                    BasisType::RiAux,
                    vec![atom("H", "RI-TZ", &["q1"]), atom("O", "RI-TZ", &["q6"])],
                ),
            ),
        ]),
        pseudopotentials: BTreeMap::from([(
            "GTH-PBE".to_string(),
            family(
                "GTH-PBE",
                BasisType::Orb,
                vec![
                    atom("H", "GTH-PBE", &["q1"]),
                    atom("O", "GTH-PBE", &["q6"]),
                    atom("Fe", "GTH-PBE", &["q8", "q16"]),
                ],
            ),
        )]),
    }
}

fn write_library() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    let json = serde_json::to_string_pretty(&library()).unwrap();
    file.write_all(json.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_load_library_file() {
    let file = write_library();
    let source = LibrarySource::load(file.path()).unwrap();

    assert_eq!(source.library(), &library());

    let catalogs = source.load_catalogs().unwrap();
    assert_eq!(catalogs.orbital.len(), 1);
    assert_eq!(catalogs.auxiliary.len(), 1);
    assert_eq!(catalogs.pseudopotential.len(), 1);
    assert_eq!(
        catalogs.entry(CatalogKind::AuxiliaryBasis, "RI-TZ").unwrap().basis_type,
        BasisType::RiAux
    );
}

#[test]
fn test_library_session_end_to_end() {
    let file = write_library();
    let source = LibrarySource::load(file.path()).unwrap();
    let mut session = Session::load(&source, Default::default()).unwrap();

    session
        .apply(&SelectionEvent::SetElements(ElementSet::parse("O,H").unwrap()))
        .unwrap();
    for (kind, name) in [
        (CatalogKind::OrbitalBasis, "DZVP-MOLOPT-SR-GTH"),
        (CatalogKind::AuxiliaryBasis, "RI-TZ"),
    ] {
        session
            .apply(&SelectionEvent::Pick {
                kind,
                name: Some(name.to_string()),
            })
            .unwrap();
    }
    let output = session
        .run_event(
            &source,
            &SelectionEvent::Pick {
                kind: CatalogKind::Pseudopotential,
                name: Some("GTH-PBE".to_string()),
            },
        )
        .unwrap();

    assert_eq!(
        output.text,
        "&KIND O\n  BASIS_SET DZVP-MOLOPT-SR-GTH-q6\n  BASIS_SET RI_AUX RI-TZ-q6\n  POTENTIAL GTH-PBE-q6\n&END KIND\n\
         &KIND H\n  BASIS_SET DZVP-MOLOPT-SR-GTH-q1\n  BASIS_SET RI_AUX RI-TZ-q1\n  POTENTIAL GTH-PBE-q1\n&END KIND"
    );
    assert_eq!(output.availability, ElementSet::parse("H,O").unwrap().to_sorted_set());
}

#[test]
fn test_adding_uncovered_element_drops_auxiliary() {
    let source = LibrarySource::new(library());
    let mut session = Session::load(&source, Default::default()).unwrap();

    session
        .apply(&SelectionEvent::Pick {
            kind: CatalogKind::AuxiliaryBasis,
            name: Some("RI-TZ".to_string()),
        })
        .unwrap();
    let output = session
        .run_event(&source, &SelectionEvent::ToggleElement(el("Fe")))
        .unwrap();

    assert_eq!(session.selection().chosen(CatalogKind::AuxiliaryBasis), None);
    assert_eq!(output.text, "&KIND Fe\n&END KIND");
}

#[test]
fn test_fetch_data_sorted_by_z() {
    let source = LibrarySource::new(library());
    let data = source
        .get_data(
            CatalogKind::Pseudopotential,
            "GTH-PBE",
            &ElementSet::parse("Fe,H").unwrap(),
        )
        .unwrap();

    assert!(data.data.starts_with("# SOURCE: library:pseudopotentials/GTH-PBE?elements=H,Fe\n"));
    assert!(data.data.ends_with("# ---\nH GTH-PBE\nFe GTH-PBE\n"));
    assert_eq!(data.metadata.name, "GTH-PBE");
    assert_eq!(data.variants[&el("Fe")].len(), 2);
}

#[test]
fn test_session_exposes_fetched_data() {
    let file = write_library();
    let source = LibrarySource::load(file.path()).unwrap();
    let mut session = Session::load(&source, Default::default()).unwrap();

    session
        .apply(&SelectionEvent::SetElements(ElementSet::parse("O").unwrap()))
        .unwrap();
    let output = session
        .run_event(
            &source,
            &SelectionEvent::Pick {
                kind: CatalogKind::Pseudopotential,
                name: Some("GTH-PBE".to_string()),
            },
        )
        .unwrap();

    let block = &output.data[&CatalogKind::Pseudopotential];
    let location = format!("# SOURCE: {}:pseudopotentials/GTH-PBE?elements=O", file.path().display());
    assert!(block.data.starts_with(&location));
    assert!(block.data.contains("# BUILD: 01/03/2024 @ 10:00\n"));
    assert!(block.data.ends_with("O GTH-PBE\n"));
    assert_eq!(block.metadata.summary(), "Name: GTH-PBE | Description: GTH-PBE family");
    assert!(!output.data.contains_key(&CatalogKind::OrbitalBasis));
}

#[test]
fn test_config_opens_library_source() {
    let file = write_library();
    let config = AppConfig {
        source: SourceConfig::Library {
            path: file.path().to_path_buf(),
        },
        ..Default::default()
    };
    config.validate().unwrap();

    let source = config.source.open().unwrap();
    let metadata = source.get_metadata(CatalogKind::OrbitalBasis, "DZVP-MOLOPT-SR-GTH").unwrap();
    assert_eq!(
        metadata.summary(),
        "Name: DZVP-MOLOPT-SR-GTH | Description: DZVP-MOLOPT-SR-GTH family"
    );
}

#[test]
fn test_malformed_library_is_rejected() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(
        br#"{"basis_sets": {"X": {"elements": {"H": {"data": "", "variants": {"1q": "X"}}}}}}"#,
    )
    .unwrap();
    file.flush().unwrap();

    let err = LibrarySource::load(file.path()).unwrap_err();
    assert!(err.to_string().contains("Malformed variant tag"));
}
