//! REST client for a running cp2k-basis webservice
//!
//! Every endpoint answers with the same envelope:
//!
//! ```json
//! { "query": { "type": "BASIS_SET", "name": "DZVP-MOLOPT-SR-GTH" }, "result": { ... } }
//! ```
//!
//! Errors come back as `{ "status": 404, "message": "..." }` and are turned
//! into `KindsError::Fetch` with the server message as reason.
//!
//! `/api/data` does not tell orbital and auxiliary basis sets apart: the type
//! of each basis set is read from its metadata endpoint while listing.

use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

use crate::catalog::{CatalogListing, Catalogs, EntryData, EntryMetadata};
use crate::elements::ElementSet;
use crate::error::{KindsError, Result};
use crate::source::{restrict_listing, DataSource};
use crate::types::CatalogKind;

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Metadata requests in flight at once while typing basis sets
const METADATA_CONCURRENCY: usize = 8;

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    result: T,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct AllData {
    basis_sets: CatalogListing,
    pseudopotentials: CatalogListing,
}

/// `DataSource` talking to the webservice API
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    base_url: String,
}

impl HttpSource {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("cp2k-kinds/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| KindsError::general(format!("Cannot build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL of the listing of every storage
    pub fn catalog_url(&self) -> String {
        format!("{}/api/data", self.base_url)
    }

    /// URL of an entry endpoint (`metadata` or `data`)
    pub fn entry_url(&self, kind: CatalogKind, name: &str, endpoint: &str) -> String {
        format!("{}/api/{}/{name}/{endpoint}", self.base_url, kind.api_segment())
    }

    /// Data URL, restricted to `elements` when not empty
    pub fn data_url(&self, kind: CatalogKind, name: &str, elements: &ElementSet) -> String {
        let url = self.entry_url(kind, name, "data");
        if elements.is_empty() {
            url
        } else {
            format!("{url}?elements={}", elements.to_query())
        }
    }

    fn get_json<T: DeserializeOwned>(&self, kind: CatalogKind, name: &str, url: &str) -> Result<T> {
        debug!("GET {url}");

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| KindsError::fetch(kind, name, e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| KindsError::fetch(kind, name, e.to_string()))?;

        if !status.is_success() {
            let detail = serde_json::from_str::<ApiError>(&body)
                .map(|e| e.message)
                .unwrap_or_default();
            warn!("{url} answered {status}");
            let reason = if detail.is_empty() {
                format!("HTTP {} while requesting {url}", status.as_u16())
            } else {
                format!("HTTP {} while requesting {url}: {detail}", status.as_u16())
            };
            return Err(KindsError::fetch(kind, name, reason));
        }

        let envelope: ApiResponse<T> = serde_json::from_str(&body)?;
        Ok(envelope.result)
    }

    /// Basis-set and pseudopotential listings, basis types filled in
    fn listings(&self) -> Result<(CatalogListing, CatalogListing)> {
        let mut all: AllData = self.get_json(CatalogKind::OrbitalBasis, "*", &self.catalog_url())?;

        let names: Vec<&String> = all.basis_sets.elements.keys().collect();
        let mut metadata = Vec::with_capacity(names.len());
        for chunk in names.chunks(METADATA_CONCURRENCY) {
            let settled: Vec<(String, Result<EntryMetadata>)> = thread::scope(|scope| {
                let handles: Vec<_> = chunk
                    .iter()
                    .map(|name| {
                        let handle = scope.spawn(move || self.get_metadata(CatalogKind::OrbitalBasis, name));
                        (name.to_string(), handle)
                    })
                    .collect();

                handles
                    .into_iter()
                    .map(|(name, handle)| {
                        let result = handle.join().unwrap_or_else(|_| {
                            Err(KindsError::fetch(CatalogKind::OrbitalBasis, &name, "metadata thread panicked"))
                        });
                        (name, result)
                    })
                    .collect()
            });

            for (name, result) in settled {
                match result {
                    Ok(entry) => metadata.push((name, entry)),
                    Err(e) => warn!("Basis set `{name}` listed as orbital: {e}"),
                }
            }
        }

        apply_basis_types(&mut all.basis_sets, metadata);
        debug!(
            "Listed {} basis set(s) ({} typed), {} pseudopotential(s)",
            all.basis_sets.elements.len(),
            all.basis_sets.types.len(),
            all.pseudopotentials.elements.len()
        );
        Ok((all.basis_sets, all.pseudopotentials))
    }
}

/// Record the basis type each entry's metadata declares
fn apply_basis_types<I>(listing: &mut CatalogListing, metadata: I)
where
    I: IntoIterator<Item = (String, EntryMetadata)>,
{
    for (name, entry) in metadata {
        if let Some(basis_type) = entry.basis_type {
            if listing.elements.contains_key(&name) {
                listing.types.insert(name, basis_type);
            }
        }
    }
}

impl DataSource for HttpSource {
    fn list_catalog(&self, kind: CatalogKind) -> Result<CatalogListing> {
        let (basis_sets, pseudopotentials) = self.listings()?;
        let listing = if kind.is_basis() {
            basis_sets
        } else {
            pseudopotentials
        };
        Ok(restrict_listing(listing, kind))
    }

    fn get_metadata(&self, kind: CatalogKind, name: &str) -> Result<EntryMetadata> {
        let mut metadata: EntryMetadata =
            self.get_json(kind, name, &self.entry_url(kind, name, "metadata"))?;
        if metadata.name.is_empty() {
            metadata.name = name.to_string();
        }
        Ok(metadata)
    }

    fn get_data(&self, kind: CatalogKind, name: &str, elements: &ElementSet) -> Result<EntryData> {
        self.get_json(kind, name, &self.data_url(kind, name, elements))
    }

    fn load_catalogs(&self) -> Result<Catalogs> {
        let (basis_sets, pseudopotentials) = self.listings()?;
        Ok(Catalogs::from_listings(&basis_sets, &pseudopotentials))
    }
}
