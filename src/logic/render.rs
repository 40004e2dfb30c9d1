//! Kind Renderer
//!
//! Turns per-element resolutions into CP2K `&KIND` sections:
//!
//! ```text
//! &KIND Fe
//!   BASIS_SET DZVP-MOLOPT-SR-GTH-q16  ! alternatives: DZVP-MOLOPT-SR-GTH-q8
//!   POTENTIAL GTH-PBE-q16
//! &END KIND
//! ```
//!
//! Blocks follow the selection order and are joined by a single newline.
//! An incompatible element still gets its block, with one comment line
//! instead of the basis/potential lines.

use crate::logic::variants::{ElementResolution, Resolution, VariantMaps};
use crate::selection::SelectionState;
use crate::types::{BasisType, CatalogKind};
use crate::variant::VariantTag;

/// Text shown when no element is selected
pub const NO_ELEMENT_PLACEHOLDER: &str = "Select element(s).";

/// Rendering settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Type written after `BASIS_SET` for the auxiliary basis
    pub aux_basis_type: BasisType,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            aux_basis_type: BasisType::AuxFit,
        }
    }
}

/// Render every selected element, or the placeholder if there is none
pub fn render_kinds(
    selection: &SelectionState,
    resolutions: &[ElementResolution],
    maps: &VariantMaps,
    options: &RenderOptions,
) -> String {
    if selection.elements.is_empty() {
        return NO_ELEMENT_PLACEHOLDER.to_string();
    }

    resolutions
        .iter()
        .map(|r| render_block(selection, r, maps, options))
        .collect::<Vec<_>>()
        .join("\n")
}

/// One `&KIND ... &END KIND` block
pub fn render_block(
    selection: &SelectionState,
    resolved: &ElementResolution,
    maps: &VariantMaps,
    options: &RenderOptions,
) -> String {
    let element = resolved.element;
    let mut lines = vec![format!("&KIND {element}")];

    match &resolved.resolution {
        Resolution::Incompatible { available } => {
            let sides: Vec<String> = available
                .iter()
                .map(|(kind, tags)| format!("{} has {}", kind.label(), format_tags(tags)))
                .collect();
            lines.push(format!(
                "  ! no compatible variant for {element}: {}",
                sides.join(", ")
            ));
        }
        resolution => {
            for kind in selection.active_kinds() {
                let (name, alternatives) = match (resolution, maps.get(&kind).and_then(|m| m.get(&element))) {
                    (Resolution::Resolved { default, alternatives }, Some(variants)) => {
                        let name = variants.name_of(*default).map(str::to_string);
                        let others: Vec<String> = alternatives
                            .iter()
                            .filter_map(|tag| variants.name_of(*tag).map(str::to_string))
                            .collect();
                        (name, others)
                    }
                    _ => (None, Vec::new()),
                };

                // Without a variant table, CP2K accepts the family name itself
                let Some(name) = name.or_else(|| selection.chosen(kind).map(str::to_string)) else {
                    continue;
                };

                let mut line = format!("  {}", keyword_for(kind, options));
                line.push(' ');
                line.push_str(&name);
                if !alternatives.is_empty() {
                    line.push_str(&format!("  ! alternatives: {}", alternatives.join(", ")));
                }
                lines.push(line);
            }
        }
    }

    lines.push("&END KIND".to_string());
    lines.join("\n")
}

fn keyword_for(kind: CatalogKind, options: &RenderOptions) -> String {
    match kind {
        CatalogKind::AuxiliaryBasis => format!("{} {}", kind.keyword(), options.aux_basis_type),
        _ => kind.keyword().to_string(),
    }
}

fn format_tags(tags: &[VariantTag]) -> String {
    if tags.is_empty() {
        "none".to_string()
    } else {
        tags.iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}
