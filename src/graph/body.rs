//! Artifact Body Resolution
//!
//! Produces the text that reference detection scans for one artifact:
//! - plain kinds: the primary file
//! - bundle kinds: primary markup plus `.js`, `Controller.js`, `Helper.js`
//! - workflow entries: only the XML sections of the entry's own tag

use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::{debug, warn};

use super::DiscoveredArtifact;
use crate::registry::ArtifactTypeSpec;
use crate::source::SourceTree;

/// Placed between concatenated files so patterns never span two of them
pub const FILE_SEPARATOR: &str = "\n////\n";

/// Text to scan for `artifact`; empty when nothing could be read
pub fn resolve_text<S: SourceTree + ?Sized>(
    spec: &ArtifactTypeSpec,
    artifact: &DiscoveredArtifact,
    source: &S,
) -> String {
    let primary = read(source, &artifact.file_path);

    if let Some(section) = artifact.section.filter(|_| spec.has_multiple_logical_entries()) {
        return extract_sections(&primary, section.tag());
    }

    let Some(companion) = spec.companion else {
        return primary;
    };

    let mut parts: Vec<String> = Vec::with_capacity(companion.variants.len() + 1);
    if !primary.is_empty() {
        parts.push(primary);
    }
    for variant in companion.variants {
        let suffix = format!("{}{}", variant, companion.extension);
        let Some(path) = swap_extension(&artifact.file_path, spec.extension, &suffix) else {
            continue;
        };
        let script = read(source, &path);
        if !script.is_empty() {
            parts.push(script);
        }
    }
    parts.join(FILE_SEPARATOR)
}

/// All `<tag>…</tag>` regions of `xml`, concatenated
pub fn extract_sections(xml: &str, tag: &str) -> String {
    let pattern = format!(r"(?s)<{tag}>.*?</{tag}>", tag = regex::escape(tag));
    let re = match Regex::new(&pattern) {
        Ok(re) => re,
        Err(err) => {
            warn!("Invalid section pattern for <{}>: {}", tag, err);
            return String::new();
        }
    };

    re.find_iter(xml)
        .map(|m| m.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

fn read<S: SourceTree + ?Sized>(source: &S, path: &Path) -> String {
    match source.read_file(path) {
        Some(text) => {
            debug!("Reading {}", path.display());
            text
        }
        None => String::new(),
    }
}

/// `dir/cmp.html` + (`.html` -> `Controller.js`) = `dir/cmpController.js`
fn swap_extension(path: &Path, extension: &str, replacement: &str) -> Option<PathBuf> {
    let file_name = path.file_name()?.to_str()?;
    let stem = file_name.strip_suffix(extension)?;
    Some(path.with_file_name(format!("{}{}", stem, replacement)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{ArtifactKind, ArtifactRegistry, WorkflowSection, WORKFLOW_SECTIONS};
    use crate::source::MemorySourceTree;

    const WORKFLOW: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Workflow xmlns="http://soap.sforce.com/2006/04/metadata">
    <rules>
        <fullName>Stamp_Close_Date</fullName>
        <active>true</active>
    </rules>
</Workflow>"#;

    #[test]
    fn test_plain_kind_reads_primary_only() {
        let registry = ArtifactRegistry::standard();
        let tree = MemorySourceTree::new().with_file("src/classes/Foo.cls", "public class Foo {}");
        let artifact = DiscoveredArtifact::new("Foo", ArtifactKind::Class, "src/classes/Foo.cls");

        assert_eq!(
            resolve_text(registry.get(ArtifactKind::Class), &artifact, &tree),
            "public class Foo {}"
        );
    }

    #[test]
    fn test_missing_file_is_empty() {
        let registry = ArtifactRegistry::standard();
        let tree = MemorySourceTree::new();
        let artifact = DiscoveredArtifact::new("Foo", ArtifactKind::Class, "src/classes/Foo.cls");

        assert_eq!(resolve_text(registry.get(ArtifactKind::Class), &artifact, &tree), "");

        let bundle =
            DiscoveredArtifact::new("cmp", ArtifactKind::AuraComponent, "src/aura/cmp/cmp.cmp");
        assert_eq!(resolve_text(registry.get(ArtifactKind::AuraComponent), &bundle, &tree), "");
    }

    #[test]
    fn test_bundle_concatenates_companions() {
        let registry = ArtifactRegistry::standard();
        let tree = MemorySourceTree::new()
            .with_file("src/aura/card/card.cmp", "<aura:component controller=\"CardCtrl\"/>")
            .with_file("src/aura/card/cardController.js", "({ init: function() {} })")
            .with_file("src/aura/card/cardHelper.js", "({ load: function() {} })");
        let artifact =
            DiscoveredArtifact::new("card", ArtifactKind::AuraComponent, "src/aura/card/card.cmp");

        let text = resolve_text(registry.get(ArtifactKind::AuraComponent), &artifact, &tree);
        let parts: Vec<&str> = text.split(FILE_SEPARATOR).collect();
        assert_eq!(
            parts,
            vec![
                "<aura:component controller=\"CardCtrl\"/>",
                "({ init: function() {} })",
                "({ load: function() {} })",
            ]
        );
    }

    #[test]
    fn test_script_only_bundle() {
        let registry = ArtifactRegistry::standard();
        let tree = MemorySourceTree::new().with_file(
            "src/lwc/utils/utils.js",
            "import getRows from '@salesforce/apex/RowService.getRows';",
        );
        let artifact = DiscoveredArtifact::new(
            "utils",
            ArtifactKind::LightningComponent,
            "src/lwc/utils/utils.html",
        );

        let text = resolve_text(registry.get(ArtifactKind::LightningComponent), &artifact, &tree);
        assert_eq!(text, "import getRows from '@salesforce/apex/RowService.getRows';");
    }

    #[test]
    fn test_workflow_only_rules_populated() {
        let registry = ArtifactRegistry::standard();
        let spec = registry.get(ArtifactKind::WorkflowEntry);
        let tree = MemorySourceTree::new()
            .with_file("src/workflows/Opportunity.workflow-meta.xml", WORKFLOW);

        let texts: Vec<(WorkflowSection, String)> = WORKFLOW_SECTIONS
            .iter()
            .map(|s| {
                let artifact = DiscoveredArtifact {
                    name: format!("Opportunity.{}", s.tag),
                    kind: ArtifactKind::WorkflowEntry,
                    section: Some(s.section),
                    file_path: "src/workflows/Opportunity.workflow-meta.xml".into(),
                };
                (s.section, resolve_text(spec, &artifact, &tree))
            })
            .collect();

        let non_empty: Vec<_> = texts.iter().filter(|(_, t)| !t.is_empty()).collect();
        assert_eq!(non_empty.len(), 1);
        assert_eq!(non_empty[0].0, WorkflowSection::Rules);
        assert!(non_empty[0].1.starts_with("<rules>"));
        assert!(non_empty[0].1.ends_with("</rules>"));
        assert!(!non_empty[0].1.contains("<Workflow"));
    }

    #[test]
    fn test_extract_sections_concatenates_matches() {
        let xml = "<a><tasks>one</tasks><alerts>x</alerts><tasks>\ntwo\n</tasks></a>";
        assert_eq!(extract_sections(xml, "tasks"), "<tasks>one</tasks>\n<tasks>\ntwo\n</tasks>");
        assert_eq!(extract_sections(xml, "rules"), "");
    }
}
