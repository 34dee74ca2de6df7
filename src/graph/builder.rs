//! Cross-Reference Graph Builder
//!
//! Discovers every registered kind, then scans each artifact's text against
//! the class candidates plus the candidates of every in-scope kind, folding
//! each hit into one [`CrossReferenceMap`].

use std::collections::HashSet;
use std::path::Path;

use tracing::{debug, info};

use super::body::resolve_text;
use super::loader::discover;
use super::patterns::{ReferenceDetector, Target};
use super::{ArtifactId, CrossReferenceMap, DiscoveredArtifact, Scope};
use crate::registry::{ArtifactKind, ArtifactRegistry};
use crate::source::SourceTree;

/// Builds the cross-reference map for one run
#[derive(Debug, Clone)]
pub struct GraphBuilder {
    registry: ArtifactRegistry,
    scope: Scope,
}

/// Artifacts discovered for one kind
struct KindCandidates {
    kind: ArtifactKind,
    entries: Vec<(ArtifactId, DiscoveredArtifact)>,
}

impl GraphBuilder {
    pub fn new(registry: ArtifactRegistry, scope: Scope) -> Self {
        Self { registry, scope }
    }

    pub fn registry(&self) -> &ArtifactRegistry {
        &self.registry
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Run discovery and scanning over `source_root`
    pub fn build<S: SourceTree + ?Sized>(
        &self,
        source: &S,
        source_root: &Path,
    ) -> CrossReferenceMap {
        let mut map = CrossReferenceMap::new();
        let discovered = self.discover_all(&mut map, source, source_root);
        let mut detector = ReferenceDetector::new();
        // page/component name clashes share a record; count each pair once
        let mut recorded: HashSet<(ArtifactId, ArtifactId)> = HashSet::new();

        for scanners in &discovered {
            let spec = self.registry.get(scanners.kind);
            for (scanner_id, scanner) in &scanners.entries {
                let text = resolve_text(spec, scanner, source);
                if text.is_empty() {
                    continue;
                }
                map.absorb_text(&text);

                for candidates in discovered.iter().filter(|c| self.is_candidate_kind(c.kind)) {
                    let target_spec = self.registry.get(candidates.kind);
                    for (target_id, target) in &candidates.entries {
                        let pair = (*scanner_id, *target_id);
                        if target_id == scanner_id || recorded.contains(&pair) {
                            continue;
                        }
                        if target_spec.file_scoped && target.file_path != scanner.file_path {
                            continue;
                        }

                        let artifact = map.get(*target_id);
                        let probe = Target {
                            name: &artifact.name,
                            kind: artifact.kind,
                            match_expression: &artifact.match_expression,
                        };
                        if let Some(tokens) = detector.detect(spec.policy, &text, &probe) {
                            debug!(
                                "{} references {} {:?}",
                                scanner.unique_key(),
                                artifact.unique_key,
                                tokens
                            );
                            recorded.insert(pair);
                            map.record_reference(*scanner_id, *target_id, tokens);
                        }
                    }
                }

                map.upsert(*scanner_id);
            }
        }

        info!(
            "Scanned {} artifacts: {} in graph, {} references",
            map.registered_count(),
            map.len(),
            map.edge_count()
        );
        map
    }

    /// Classes are always candidates; other kinds only when in scope
    fn is_candidate_kind(&self, kind: ArtifactKind) -> bool {
        let spec = self.registry.get(kind);
        spec.referenceable && (kind == ArtifactKind::Class || self.scope.contains(kind))
    }

    fn discover_all<S: SourceTree + ?Sized>(
        &self,
        map: &mut CrossReferenceMap,
        source: &S,
        source_root: &Path,
    ) -> Vec<KindCandidates> {
        self.registry
            .iter()
            .filter_map(|spec| {
                let found = discover(spec, source, source_root)?;
                let entries = found
                    .into_iter()
                    .map(|artifact| (map.register(&artifact, &self.registry), artifact))
                    .collect();
                Some(KindCandidates { kind: spec.kind, entries })
            })
            .collect()
    }
}
