//! Artifact Discovery
//!
//! Lists each kind's folder under the source root and turns the relevant
//! entries into [`DiscoveredArtifact`]s. Listing order is preserved.

use std::path::Path;

use tracing::{debug, info};

use super::DiscoveredArtifact;
use crate::registry::{ArtifactTypeSpec, WORKFLOW_SECTIONS};
use crate::source::SourceTree;

/// Discover all artifacts of one kind
///
/// Returns `None` when the kind's folder does not exist at all (for pages:
/// neither `pages/` nor `components/`), `Some(vec![])` when it exists but
/// holds nothing relevant.
pub fn discover<S: SourceTree + ?Sized>(
    spec: &ArtifactTypeSpec,
    source: &S,
    source_root: &Path,
) -> Option<Vec<DiscoveredArtifact>> {
    let dir = source_root.join(spec.folder);
    info!("Looking for /{} in folder: {}", spec.folder, source_root.display());
    let listing = source.list_dir(&dir);

    let mut found = Vec::new();

    if spec.has_companion_script() {
        for bundle in listing? {
            if bundle.starts_with('.') || bundle.contains(".json") {
                continue;
            }
            let file_path = dir.join(&bundle).join(format!("{}{}", bundle, spec.extension));
            found.push(DiscoveredArtifact::new(bundle, spec.kind, file_path));
        }
        debug!("Found {} {} bundles", found.len(), spec.kind);
        return Some(found);
    }

    let secondary = spec.secondary.map(|secondary| {
        let secondary_dir = source_root.join(secondary.folder);
        info!("Looking for /{} in folder: {}", secondary.folder, source_root.display());
        (secondary, secondary_dir.clone(), source.list_dir(&secondary_dir))
    });

    let secondary_present = matches!(&secondary, Some((_, _, Some(_))));
    if listing.is_none() && !secondary_present {
        return None;
    }

    for file_name in listing.unwrap_or_default() {
        if let Some(name) = candidate_name(spec, &file_name, spec.extension) {
            let file_path = dir.join(&file_name);
            if spec.has_multiple_logical_entries() {
                found.extend(expand_sections(spec, name, &file_path));
            } else {
                found.push(DiscoveredArtifact::new(name, spec.kind, file_path));
            }
        }
    }

    // pages and components share one candidate set; same names are kept twice
    if let Some((secondary, secondary_dir, Some(entries))) = secondary {
        for file_name in entries {
            if let Some(name) = candidate_name(spec, &file_name, secondary.extension) {
                let path = secondary_dir.join(&file_name);
                found.push(DiscoveredArtifact::new(name, spec.kind, path));
            }
        }
    }

    debug!("Found {} {} artifacts", found.len(), spec.kind);
    Some(found)
}

/// Base name of a file that passes the kind's filters
fn candidate_name<'a>(
    spec: &ArtifactTypeSpec,
    file_name: &'a str,
    extension: &str,
) -> Option<&'a str> {
    if file_name.starts_with('.') {
        return None;
    }
    if spec.filters_tests && file_name.to_lowercase().contains("test") {
        return None;
    }
    file_name
        .strip_suffix(extension)
        .filter(|name| !name.is_empty())
}

/// One workflow file -> one entry per section, all sharing the file
fn expand_sections<'a>(
    spec: &'a ArtifactTypeSpec,
    base: &'a str,
    file_path: &'a Path,
) -> impl Iterator<Item = DiscoveredArtifact> + 'a {
    WORKFLOW_SECTIONS.iter().map(move |section| DiscoveredArtifact {
        name: format!("{}.{}", base, section.tag),
        kind: spec.kind,
        section: Some(section.section),
        file_path: file_path.to_path_buf(),
    })
}
