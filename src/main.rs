//! cp2k-kinds - Main entry point
//!
//! Loads the configuration, opens the data source and dispatches the
//! subcommand. All resolution logic lives in the library.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use cp2k_kinds::cli::{Choices, Cli, Commands};
use cp2k_kinds::config::AppConfig;
use cp2k_kinds::elements::{periodic_table, ElementSet};
use cp2k_kinds::engine::session::Session;
use cp2k_kinds::logic::render::RenderOptions;
use cp2k_kinds::selection::SelectionEvent;
use cp2k_kinds::source::DataSource;
use cp2k_kinds::types::CatalogKind;

/// Initialize tracing; `RUST_LOG` overrides the configured filter
fn init_logging(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse_args();

    let config = match &cli.config {
        Some(path) => match AppConfig::load_from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("✗ Failed to load configuration file: {e:#}");
                std::process::exit(1);
            }
        },
        None => AppConfig::default(),
    };
    let config = config.with_overrides(cli.library.clone(), cli.url.clone());

    init_logging(&config.log_filter);
    debug!("Configuration: {:?}", config);

    if let Err(e) = run(cli.command, &config) {
        error!("{e:#}");
        eprintln!("✗ {e:#}");
        std::process::exit(1);
    }
}

fn run(command: Commands, config: &AppConfig) -> Result<()> {
    match command {
        Commands::ValidateConfig { config } => validate_config(&config),
        Commands::InitConfig { path } => {
            AppConfig::default().save_to_file(&path)?;
            println!("✓ Default configuration written to {path:?}");
            Ok(())
        }
        Commands::Kinds {
            elements,
            choices,
            aux_type,
            data,
        } => {
            let source = open_source(config)?;
            let mut options = config.render_options();
            if let Some(aux_type) = aux_type {
                options.aux_basis_type = aux_type;
            }
            print_kinds(source.as_ref(), options, elements, &choices, data)
        }
        Commands::List {
            kind,
            elements,
            search,
            tag,
        } => {
            let source = open_source(config)?;
            let catalogs = source.load_catalogs()?;
            let elements = elements.unwrap_or_default();
            let entries = catalogs.get(kind).filter(&elements, &search, tag.as_deref());

            if entries.is_empty() {
                println!("No {} covers [{elements}]", kind.label());
            }
            for entry in entries {
                if entry.tags.is_empty() {
                    println!("{}", entry.name);
                } else {
                    let tags: Vec<&str> = entry.tags.iter().map(String::as_str).collect();
                    println!("{}  [{}]", entry.name, tags.join(", "));
                }
            }
            Ok(())
        }
        Commands::Availability { choices } => {
            let source = open_source(config)?;
            let mut session = Session::load(source.as_ref(), config.render_options())?;
            apply_choices(&mut session, &choices)?;

            let chosen: Vec<String> = choices.picks().into_iter().map(|(_, name)| name).collect();
            if chosen.is_empty() {
                println!("Select a basis set or pseudopotential.");
                return Ok(());
            }
            let output = session.outputs();
            println!("{}", periodic_table(&chosen.join(" + "), &output.availability));
            Ok(())
        }
        Commands::Metadata { kind, name } => {
            let source = open_source(config)?;
            let metadata = source.get_metadata(kind, &name)?;
            println!("{}", metadata.summary());
            if let Some(basis_type) = &metadata.basis_type {
                println!("Type: {basis_type}");
            }
            for reference in &metadata.references {
                println!("  - {reference}");
            }
            if let Some(origin) = &metadata.source {
                println!("Source: {origin}");
            }
            Ok(())
        }
    }
}

fn validate_config(path: &Path) -> Result<()> {
    info!("Validating configuration file: {:?}", path);
    let config = AppConfig::load_from_file(path)?;
    config
        .validate()
        .context("Configuration validation failed")?;
    println!("✓ Configuration file is valid: {path:?}");
    Ok(())
}

fn open_source(config: &AppConfig) -> Result<Box<dyn DataSource>> {
    config.validate()?;
    config.source.open()
}

fn apply_choices(session: &mut Session, choices: &Choices) -> Result<()> {
    for (kind, name) in choices.picks() {
        session.apply(&SelectionEvent::Pick {
            kind,
            name: Some(name.clone()),
        })?;
        if session.selection().chosen(kind).is_none() {
            warn!("{} `{name}` was dropped from the selection", kind.label());
            eprintln!(
                "! {} `{name}` does not cover [{}]",
                kind.label(),
                session.selection().elements
            );
        }
    }
    Ok(())
}

fn print_kinds(
    source: &dyn DataSource,
    options: RenderOptions,
    elements: ElementSet,
    choices: &Choices,
    with_data: bool,
) -> Result<()> {
    let mut session = Session::load(source, options)?;
    session.apply(&SelectionEvent::SetElements(elements))?;
    apply_choices(&mut session, choices)?;

    let pass = Session::fetch_pass(source, &session.ticket());
    session.commit(pass);

    for failure in session.failures() {
        eprintln!("! {}", failure.error);
    }

    let output = session.outputs();
    println!("{}", output.text);

    for element in output.incompatible_elements() {
        let kinds: Vec<&str> = CatalogKind::all()
            .filter(|kind| session.selection().chosen(*kind).is_some())
            .map(CatalogKind::label)
            .collect();
        eprintln!("! {element}: no variant shared by the {}", kinds.join(", "));
    }

    if with_data {
        for (kind, block) in &output.data {
            println!();
            println!("[{}] {}", kind.label(), block.metadata.summary());
            print!("{}", block.data);
        }
    }

    Ok(())
}
